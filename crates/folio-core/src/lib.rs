//! Folio Core Library
//!
//! Renderer-agnostic document model and editing logic for the Folio
//! multi-page book editor.

pub mod book;
pub mod config;
pub mod editor;
pub mod events;
pub mod history;
pub mod input;
pub mod keymap;
pub mod navigation;
pub mod objects;
pub mod page;
pub mod pen;
pub mod session;
pub mod storage;
pub mod table_editor;
pub mod tools;
pub mod upload;

pub use book::{Book, BookSnapshot, SCHEMA_VERSION};
pub use config::EditorConfig;
pub use editor::Editor;
pub use events::{EditorEvent, Notice, NoticeLevel};
pub use history::History;
pub use input::{InputState, Modifiers, MouseButton, PointerEvent};
pub use keymap::{EditorAction, KeyCombo, Keymap};
pub use navigation::{Navigator, Spread};
pub use objects::{Object, ObjectId, ObjectKind, ObjectPatch};
pub use page::{Page, PageField, PageSide};
pub use pen::{PenEditor, PenMode, PenSettings};
pub use session::{EditSession, EditingKind, Session};
pub use storage::{Storage, StorageError, StorageResult};
pub use table_editor::{ContextMenu, TableAction};
pub use tools::{ToolKind, ToolSettings};
pub use upload::{EmbeddingUploader, ImageUploader, PendingImage, UploadError, UploadedImage};
