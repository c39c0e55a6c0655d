//! Tool kinds and the toolbar settings they read.

use crate::objects::{SerializableColor, ShapeKind, StickyNote, Table, Text};
use crate::pen::PenSettings;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Pen,
    StickyNote,
    Table,
    Text,
    Shape,
    Brush,
    Eraser,
}

/// Defaults for new tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDefaults {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub border_color: SerializableColor,
    pub border_width: f64,
}

impl Default for TableDefaults {
    fn default() -> Self {
        Self {
            rows: Table::DEFAULT_ROWS,
            cols: Table::DEFAULT_COLS,
            cell_width: Table::DEFAULT_CELL_WIDTH,
            cell_height: Table::DEFAULT_CELL_HEIGHT,
            border_color: SerializableColor::black(),
            border_width: 1.0,
        }
    }
}

/// Values owned by the toolbar. The editor only reads them; changes made
/// through shortcuts are reported back as events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    pub eraser_width: f64,
    pub font_family: String,
    pub font_size: f64,
    pub text_color: SerializableColor,
    /// Content of a freshly placed text box.
    pub placeholder_text: String,
    pub shape_kind: ShapeKind,
    pub shape_fill: Option<SerializableColor>,
    pub note_background: SerializableColor,
    pub note_text_color: SerializableColor,
    pub pen: PenSettings,
    pub table: TableDefaults,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            eraser_width: 20.0,
            font_family: Text::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Text::DEFAULT_FONT_SIZE,
            text_color: SerializableColor::black(),
            placeholder_text: "Type here".to_string(),
            shape_kind: ShapeKind::Rectangle,
            shape_fill: Some(SerializableColor::new(0x42, 0x85, 0xf4, 255)),
            note_background: StickyNote::DEFAULT_BACKGROUND,
            note_text_color: SerializableColor::black(),
            pen: PenSettings::default(),
            table: TableDefaults::default(),
        }
    }
}

impl ToolSettings {
    /// Smallest and largest brush width reachable through the shortcuts.
    pub const MIN_STROKE_WIDTH: f64 = 1.0;
    pub const MAX_STROKE_WIDTH: f64 = 50.0;

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adjust the brush width by `delta`, clamped. Returns the new width.
    pub fn nudge_stroke_width(&mut self, delta: f64) -> f64 {
        self.stroke_width =
            (self.stroke_width + delta).clamp(Self::MIN_STROKE_WIDTH, Self::MAX_STROKE_WIDTH);
        self.stroke_width
    }
}
