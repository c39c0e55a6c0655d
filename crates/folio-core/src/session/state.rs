//! In-place edit sessions.

use crate::objects::ObjectId;
use kurbo::Rect;

/// What an edit session is changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingKind {
    /// Content of a text box.
    Text,
    /// Text of an expanded sticky note.
    StickyNote,
    /// One table cell.
    TableCell { row: usize, col: usize },
}

/// An open in-place editor. The draft is only written to the book on commit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub target: ObjectId,
    /// Page the target lives on.
    pub page: usize,
    pub kind: EditingKind,
    pub draft: String,
    /// Content when the session opened.
    pub original: String,
    /// Where the host should overlay its input widget, in screen space.
    pub screen_rect: Rect,
}

impl EditSession {
    pub fn new(
        target: ObjectId,
        page: usize,
        kind: EditingKind,
        original: impl Into<String>,
        screen_rect: Rect,
    ) -> Self {
        let original = original.into();
        Self {
            target,
            page,
            kind,
            draft: original.clone(),
            original,
            screen_rect,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    pub fn insert_text(&mut self, text: &str) {
        self.draft.push_str(text);
    }

    /// Remove the last character of the draft.
    pub fn delete_back(&mut self) -> bool {
        self.draft.pop().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_draft_editing() {
        let mut edit = EditSession::new(Uuid::new_v4(), 0, EditingKind::Text, "ab", Rect::ZERO);
        assert!(!edit.is_dirty());
        edit.insert_text("c");
        assert!(edit.delete_back());
        assert!(edit.delete_back());
        assert_eq!(edit.draft, "a");
        assert!(edit.is_dirty());
        assert_eq!(edit.original, "ab");
    }
}
