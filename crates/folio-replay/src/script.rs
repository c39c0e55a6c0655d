//! Replay scripts: a JSON list of input steps fed to an [`Editor`].

use folio_core::upload::read_image_file;
use folio_core::{
    Book, Editor, EditorAction, EditorConfig, EditorEvent, EmbeddingUploader, ImageUploader,
    KeyCombo, MouseButton, PointerEvent, StorageError, TableAction, ToolKind, ToolSettings,
};
use kurbo::{Point, Vec2};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("usage: folio-replay <script.json> [document-id]")]
    Usage,
    #[error("Failed to read script: {0}")]
    Read(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A whole script.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: EditorConfig,
    #[serde(default)]
    pub settings: ToolSettings,
    pub steps: Vec<Step>,
}

/// One input step. Positions are screen coordinates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Tool(ToolKind),
    Down(Point),
    Move(Point),
    Up(Point),
    /// Press and release at the same spot.
    Click(Point),
    RightClick(Point),
    Scroll(Vec2),
    Key(KeyCombo),
    Action(EditorAction),
    /// Text typed into the open in-place editor.
    Type(String),
    TableAction(TableAction),
    /// Advance animations by this many seconds.
    Tick(f64),
    AddPages(usize),
    /// Upload an image file and place it at `at` (page coordinates).
    Image { path: PathBuf, at: Point },
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build an editor for the script's settings.
    pub fn editor(&self) -> Editor {
        let mut book = Book::new(self.config.initial_pages.max(1));
        if let Some(name) = &self.name {
            book.name.clone_from(name);
        }
        Editor::with_book(book, self.config.clone(), self.settings.clone())
    }
}

fn press(editor: &mut Editor, position: Point, button: MouseButton) {
    editor.handle_pointer_event(PointerEvent::Down { position, button });
    editor.handle_pointer_event(PointerEvent::Up { position, button });
}

/// Run every step. Steps the editor refuses are logged and skipped.
pub fn run(editor: &mut Editor, steps: &[Step]) {
    for (index, step) in steps.iter().enumerate() {
        log::debug!("Step {index}: {step:?}");
        match step {
            Step::Tool(tool) => editor.set_active_tool(*tool),
            Step::Down(position) => editor.handle_pointer_event(PointerEvent::Down {
                position: *position,
                button: MouseButton::Left,
            }),
            Step::Move(position) => {
                editor.handle_pointer_event(PointerEvent::Move {
                    position: *position,
                });
            }
            Step::Up(position) => editor.handle_pointer_event(PointerEvent::Up {
                position: *position,
                button: MouseButton::Left,
            }),
            Step::Click(position) => press(editor, *position, MouseButton::Left),
            Step::RightClick(position) => press(editor, *position, MouseButton::Right),
            Step::Scroll(delta) => editor.handle_pointer_event(PointerEvent::Scroll {
                position: Point::ZERO,
                delta: *delta,
            }),
            Step::Key(combo) => {
                if !editor.handle_key(combo) {
                    log::debug!("Key {} not handled", combo.format());
                }
            }
            Step::Action(action) => {
                if !editor.perform(*action) {
                    log::debug!("Action {action:?} had no effect");
                }
            }
            Step::Type(text) => {
                if !editor.type_text(text) {
                    log::warn!("Step {index}: typing with no editor open");
                }
            }
            Step::TableAction(action) => {
                if !editor.apply_table_action(*action) {
                    log::warn!("Step {index}: table action {action:?} refused");
                }
            }
            Step::Tick(dt) => editor.tick(*dt),
            Step::AddPages(count) => {
                editor.add_pages(*count);
            }
            Step::Image { path, at } => {
                let pending = editor.begin_image_upload(*at);
                let name = path.to_string_lossy().into_owned();
                let result = read_image_file(path)
                    .and_then(|data| pollster::block_on(EmbeddingUploader.upload(&name, data)));
                editor.complete_image_upload(pending, result);
            }
        }
        for event in editor.drain_events() {
            match event {
                EditorEvent::Notice(notice) => log::warn!("{:?}: {}", notice.level, notice.message),
                other => log::debug!("{other:?}"),
            }
        }
    }
}

/// Close any open in-place editor, keeping its text, and hand back the book.
pub fn finish(mut editor: Editor) -> Book {
    if editor.commit_edit() {
        log::debug!("Committed the edit left open by the script");
    }
    editor.into_book()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "name": "Holiday",
        "config": { "flip_duration": 0.0, "double_click_ms": 0 },
        "steps": [
            { "tool": "Text" },
            { "click": { "x": 50.0, "y": 50.0 } },
            { "type": " now" },
            { "key": { "key": "Enter" } },
            { "tool": "Table" },
            { "click": { "x": 300.0, "y": 300.0 } },
            { "right_click": { "x": 350.0, "y": 310.0 } },
            { "table_action": "InsertRowBelow" },
            { "action": "NextPage" },
            { "tool": "Shape" },
            { "click": { "x": 10.0, "y": 10.0 } },
            { "key": { "key": "Z", "ctrl": true } }
        ]
    }"#;

    #[test]
    fn test_parse_and_run_script() {
        let script = Script::from_json(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 12);
        let mut editor = script.editor();
        run(&mut editor, &script.steps);

        let book = editor.book();
        assert_eq!(book.name, "Holiday");
        let cover = book.page(0).unwrap();
        assert_eq!(cover.texts[0].content, "Type here now");
        assert_eq!(cover.tables[0].rows, 4);
        assert_eq!(editor.current_page(), 1);
        // The shape on page 1 was undone.
        assert!(book.page(1).unwrap().shapes.is_empty());
    }

    #[test]
    fn test_finish_keeps_open_edit() {
        let script = Script::from_json(
            r#"{
                "config": { "double_click_ms": 0 },
                "steps": [
                    { "tool": "Text" },
                    { "click": { "x": 50.0, "y": 50.0 } },
                    { "type": " there" }
                ]
            }"#,
        )
        .unwrap();
        let mut editor = script.editor();
        run(&mut editor, &script.steps);
        assert!(editor.session().is_editing());

        let book = finish(editor);
        assert_eq!(book.page(0).unwrap().texts[0].content, "Type here there");
    }

    #[test]
    fn test_missing_image_is_skipped() {
        let script = Script::from_json(
            r#"{ "steps": [ { "image": { "path": "/no/such/file.png", "at": { "x": 0.0, "y": 0.0 } } } ] }"#,
        )
        .unwrap();
        let mut editor = script.editor();
        run(&mut editor, &script.steps);
        assert!(editor.book().pages().all(|page| page.images.is_empty()));
    }

    #[test]
    fn test_invalid_script() {
        let result = Script::from_json(r#"{ "steps": [ { "teleport": 3 } ] }"#);
        assert!(matches!(result, Err(ScriptError::Parse(_))));
    }
}
