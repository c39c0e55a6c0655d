//! Raw key combinations to semantic editor actions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a shortcut asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorAction {
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    ToggleStrikethrough,
    Copy,
    Cut,
    Paste,
    Delete,
    /// Delete the selection, or the last pen vertex while drawing.
    Backspace,
    Undo,
    Redo,
    Escape,
    /// Close the pen polygon.
    CompleteShape,
    /// Commit the in-place editor (Enter without Shift).
    CommitEdit,
    Duplicate,
    ToggleLock,
    ToggleVisibility,
    BringForward,
    SendBackward,
    ZoomIn,
    ZoomOut,
    ResetView,
    NextPage,
    PrevPage,
    IncreaseStrokeWidth,
    DecreaseStrokeWidth,
}

impl EditorAction {
    pub fn description(self) -> &'static str {
        match self {
            EditorAction::ToggleBold => "Toggle bold",
            EditorAction::ToggleItalic => "Toggle italic",
            EditorAction::ToggleUnderline => "Toggle underline",
            EditorAction::ToggleStrikethrough => "Toggle strikethrough",
            EditorAction::Copy => "Copy object",
            EditorAction::Cut => "Cut object",
            EditorAction::Paste => "Paste object",
            EditorAction::Delete => "Delete selected object",
            EditorAction::Backspace => "Delete selected object or last pen point",
            EditorAction::Undo => "Undo",
            EditorAction::Redo => "Redo",
            EditorAction::Escape => "Cancel current action",
            EditorAction::CompleteShape => "Close pen shape",
            EditorAction::CommitEdit => "Finish editing",
            EditorAction::Duplicate => "Duplicate object",
            EditorAction::ToggleLock => "Lock or unlock object",
            EditorAction::ToggleVisibility => "Show or hide object",
            EditorAction::BringForward => "Bring forward",
            EditorAction::SendBackward => "Send backward",
            EditorAction::ZoomIn => "Zoom in",
            EditorAction::ZoomOut => "Zoom out",
            EditorAction::ResetView => "Reset zoom and pan",
            EditorAction::NextPage => "Next page",
            EditorAction::PrevPage => "Previous page",
            EditorAction::IncreaseStrokeWidth => "Thicker brush",
            EditorAction::DecreaseStrokeWidth => "Thinner brush",
        }
    }
}

/// A key plus modifiers. Letter keys are stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCombo {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

impl KeyCombo {
    pub fn new(key: &str, ctrl: bool, shift: bool) -> Self {
        let key = if key.chars().count() == 1 {
            key.to_uppercase()
        } else {
            key.to_string()
        };
        Self { key, ctrl, shift }
    }

    pub fn plain(key: &str) -> Self {
        Self::new(key, false, false)
    }

    pub fn ctrl(key: &str) -> Self {
        Self::new(key, true, false)
    }

    /// Format the combo for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key.as_str());
        parts.join("+")
    }
}

/// The keyboard dispatch table.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyCombo, EditorAction>,
}

impl Default for Keymap {
    fn default() -> Self {
        use EditorAction::*;
        let mut keymap = Self::empty();
        for (combo, action) in [
            (KeyCombo::ctrl("B"), ToggleBold),
            (KeyCombo::ctrl("I"), ToggleItalic),
            (KeyCombo::ctrl("U"), ToggleUnderline),
            (KeyCombo::new("X", true, true), ToggleStrikethrough),
            (KeyCombo::ctrl("C"), Copy),
            (KeyCombo::ctrl("X"), Cut),
            (KeyCombo::ctrl("V"), Paste),
            (KeyCombo::plain("Delete"), Delete),
            (KeyCombo::plain("Backspace"), Backspace),
            (KeyCombo::ctrl("Z"), Undo),
            (KeyCombo::new("Z", true, true), Redo),
            (KeyCombo::ctrl("Y"), Redo),
            (KeyCombo::plain("Escape"), Escape),
            (KeyCombo::plain("Enter"), CommitEdit),
            (KeyCombo::ctrl("Enter"), CompleteShape),
            (KeyCombo::ctrl("D"), Duplicate),
            (KeyCombo::ctrl("L"), ToggleLock),
            (KeyCombo::ctrl("H"), ToggleVisibility),
            (KeyCombo::ctrl("]"), BringForward),
            (KeyCombo::ctrl("["), SendBackward),
            (KeyCombo::ctrl("="), ZoomIn),
            (KeyCombo::ctrl("-"), ZoomOut),
            (KeyCombo::ctrl("0"), ResetView),
            (KeyCombo::plain("PageDown"), NextPage),
            (KeyCombo::plain("PageUp"), PrevPage),
            (KeyCombo::plain("]"), IncreaseStrokeWidth),
            (KeyCombo::plain("["), DecreaseStrokeWidth),
        ] {
            keymap.bind(combo, action);
        }
        keymap
    }
}

impl Keymap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a combo, replacing any previous action for it.
    pub fn bind(&mut self, combo: KeyCombo, action: EditorAction) -> Option<EditorAction> {
        self.bindings.insert(combo, action)
    }

    pub fn unbind(&mut self, combo: &KeyCombo) -> Option<EditorAction> {
        self.bindings.remove(combo)
    }

    pub fn resolve(&self, combo: &KeyCombo) -> Option<EditorAction> {
        self.bindings.get(combo).copied()
    }

    /// (combo, description) pairs sorted for a help overlay.
    pub fn describe(&self) -> Vec<(String, &'static str)> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(combo, action)| (combo.format(), action.description()))
            .collect();
        entries.sort();
        entries
    }
}
