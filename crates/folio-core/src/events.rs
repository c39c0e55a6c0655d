//! Notifications the editor sends back to its host.

use crate::objects::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient message for the user (toast, status line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Editor-to-host callbacks, queued until the host drains them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    SelectionChanged(Option<ObjectId>),
    /// The committed page changed.
    PageChanged(usize),
    PageCountChanged(usize),
    StrokeWidthChanged(f64),
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// An in-place editor opened (`Some`) or closed (`None`).
    EditingChanged(Option<ObjectId>),
    Notice(Notice),
}
