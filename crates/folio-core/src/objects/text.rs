//! Text boxes.

use super::{ObjectId, ObjectTrait, SerializableColor};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) fn default_visible() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// Style flags toggled by the format shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

/// A single style flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextFormat {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl TextStyle {
    /// Check whether a flag is set.
    pub fn has(&self, format: TextFormat) -> bool {
        match format {
            TextFormat::Bold => self.bold,
            TextFormat::Italic => self.italic,
            TextFormat::Underline => self.underline,
            TextFormat::Strikethrough => self.strikethrough,
        }
    }

    /// Flip a flag, returning its new value.
    pub fn toggle(&mut self, format: TextFormat) -> bool {
        let flag = match format {
            TextFormat::Bold => &mut self.bold,
            TextFormat::Italic => &mut self.italic,
            TextFormat::Underline => &mut self.underline,
            TextFormat::Strikethrough => &mut self.strikethrough,
        };
        *flag = !*flag;
        *flag
    }
}

/// Horizontal alignment, shared with table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Case transform applied at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextCase {
    #[default]
    Normal,
    Uppercase,
}

/// List decoration applied per line at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListStyle {
    #[default]
    None,
    Bullet,
    Ordered,
}

/// A text box placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ObjectId,
    /// Position (top-left corner of the box).
    pub position: Point,
    /// The text content.
    pub content: String,
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub align: TextAlign,
    /// Wrapping box width.
    pub width: f64,
    /// Wrapping box height.
    pub height: f64,
    #[serde(default)]
    pub case: TextCase,
    #[serde(default)]
    pub list: ListStyle,
    #[serde(default = "default_text_color")]
    pub color: SerializableColor,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_text_color() -> SerializableColor {
    SerializableColor::black()
}

impl Text {
    /// Default font size (M = Medium).
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";
    pub const DEFAULT_WIDTH: f64 = 200.0;
    pub const DEFAULT_HEIGHT: f64 = 50.0;

    /// Create a new text box.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content: content.into(),
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            style: TextStyle::default(),
            align: TextAlign::default(),
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            case: TextCase::default(),
            list: ListStyle::default(),
            color: default_text_color(),
            visible: true,
            locked: false,
            rotation: 0.0,
            opacity: 1.0,
        }
    }

    /// Toggle a style flag, returning its new value.
    pub fn toggle_format(&mut self, format: TextFormat) -> bool {
        self.style.toggle(format)
    }

    /// The content as it should be displayed: case transform first, then
    /// one list marker per non-empty line.
    pub fn display_text(&self) -> String {
        let cased = match self.case {
            TextCase::Normal => self.content.clone(),
            TextCase::Uppercase => self.content.to_uppercase(),
        };
        if self.list == ListStyle::None {
            return cased;
        }

        let mut number = 0;
        cased
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    return line.to_string();
                }
                match self.list {
                    ListStyle::Bullet => format!("\u{2022} {line}"),
                    ListStyle::Ordered => {
                        number += 1;
                        format!("{number}. {line}")
                    }
                    ListStyle::None => line.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ObjectTrait for Text {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let text = Text::new(Point::new(50.0, 50.0), "Hello");
        assert_eq!(text.content, "Hello");
        assert_eq!(text.style, TextStyle::default());
        assert!(text.visible);
        assert!(!text.locked);
    }

    #[test]
    fn test_toggle_bold_only_changes_bold() {
        let mut text = Text::new(Point::new(50.0, 50.0), "Hello");
        assert!(text.toggle_format(TextFormat::Bold));
        assert_eq!(
            text.style,
            TextStyle {
                bold: true,
                ..TextStyle::default()
            }
        );
        assert!(!text.toggle_format(TextFormat::Bold));
        assert_eq!(text.style, TextStyle::default());
    }

    #[test]
    fn test_display_uppercase() {
        let mut text = Text::new(Point::ZERO, "hello world");
        text.case = TextCase::Uppercase;
        assert_eq!(text.display_text(), "HELLO WORLD");
    }

    #[test]
    fn test_display_ordered_list_skips_blank_lines() {
        let mut text = Text::new(Point::ZERO, "milk\n\neggs\nbread");
        text.list = ListStyle::Ordered;
        assert_eq!(text.display_text(), "1. milk\n\n2. eggs\n3. bread");
    }

    #[test]
    fn test_display_bullets() {
        let mut text = Text::new(Point::ZERO, "a\nb");
        text.list = ListStyle::Bullet;
        assert_eq!(text.display_text(), "\u{2022} a\n\u{2022} b");
    }

    #[test]
    fn test_legacy_json_gets_defaults() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{"id":"{id}","position":{{"x":1.0,"y":2.0}},"content":"hi",
                "font_family":"Arial","font_size":12.0,"width":100.0,"height":20.0}}"#
        );
        let text: Text = serde_json::from_str(&json).unwrap();
        assert!(text.visible);
        assert!((text.opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(text.list, ListStyle::None);
    }
}
