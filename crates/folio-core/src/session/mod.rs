//! Per-session UI state: the active tool, selection, in-place editing and
//! the clipboard.
//!
//! Objects stay pure data; everything about how the user is currently
//! interacting with them lives here.

mod clipboard;
mod handles;
mod state;

pub use clipboard::Clipboard;
pub use handles::{
    Handle, HandleKind, HandleShape, hit_test_handle, object_handles, resize_bounds,
    rotation_towards, vertex_handles,
};
pub use state::{EditSession, EditingKind};

use crate::objects::ObjectId;
use crate::tools::ToolKind;

/// Editor session context. One per open book.
#[derive(Debug, Clone, Default)]
pub struct Session {
    active_tool: ToolKind,
    selected: Option<ObjectId>,
    hovered: Option<ObjectId>,
    editing: Option<EditSession>,
    pub clipboard: Clipboard,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn set_active_tool(&mut self, tool: ToolKind) {
        self.active_tool = tool;
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Select a single object. Returns true when the selection changed.
    pub fn select(&mut self, id: ObjectId) -> bool {
        self.selected.replace(id) != Some(id)
    }

    /// Returns true when something was selected.
    pub fn clear_selection(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn hovered(&self) -> Option<ObjectId> {
        self.hovered
    }

    pub fn set_hovered(&mut self, id: Option<ObjectId>) {
        self.hovered = id;
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditSession> {
        self.editing.as_mut()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Start an edit session. Only one may exist; the previous one, if any,
    /// is handed back so the caller can commit or discard it.
    pub fn begin_edit(&mut self, edit: EditSession) -> Option<EditSession> {
        self.selected = Some(edit.target);
        self.editing.replace(edit)
    }

    /// End the current edit session, returning it.
    pub fn end_edit(&mut self) -> Option<EditSession> {
        self.editing.take()
    }

    /// Drop all references to a deleted object.
    pub fn forget(&mut self, id: ObjectId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.editing.as_ref().is_some_and(|e| e.target == id) {
            self.editing = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use uuid::Uuid;

    fn edit(target: ObjectId) -> EditSession {
        EditSession::new(target, 0, EditingKind::Text, "old", Rect::ZERO)
    }

    #[test]
    fn test_select_reports_changes() {
        let mut session = Session::new();
        let id = Uuid::new_v4();
        assert!(session.select(id));
        assert!(!session.select(id));
        assert!(session.clear_selection());
        assert!(!session.clear_selection());
    }

    #[test]
    fn test_single_edit_session() {
        let mut session = Session::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(session.begin_edit(edit(a)).is_none());
        let previous = session.begin_edit(edit(b)).unwrap();
        assert_eq!(previous.target, a);
        assert_eq!(session.editing().unwrap().target, b);
        assert_eq!(session.selected(), Some(b));
    }

    #[test]
    fn test_forget_clears_references() {
        let mut session = Session::new();
        let id = Uuid::new_v4();
        session.begin_edit(edit(id));
        session.set_hovered(Some(id));
        session.forget(id);
        assert!(session.selected().is_none());
        assert!(session.hovered().is_none());
        assert!(!session.is_editing());
    }
}
