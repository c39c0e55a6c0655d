//! Sticky notes that collapse to an icon.

use super::{ObjectId, ObjectTrait, SerializableColor};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sticky note with a collapsed and an expanded size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickyNote {
    pub(crate) id: ObjectId,
    pub position: Point,
    pub collapsed_size: Size,
    pub expanded_size: Size,
    pub expanded: bool,
    pub text: String,
    pub background: SerializableColor,
    pub text_color: SerializableColor,
    pub font_family: String,
    pub font_size: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "super::text::default_visible")]
    pub visible: bool,
}

impl StickyNote {
    pub const COLLAPSED_SIZE: Size = Size::new(40.0, 40.0);
    pub const EXPANDED_SIZE: Size = Size::new(200.0, 200.0);
    pub const DEFAULT_BACKGROUND: SerializableColor = SerializableColor::new(0xff, 0xeb, 0x3b, 255);

    /// Create a collapsed, empty note.
    pub fn new(position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            collapsed_size: Self::COLLAPSED_SIZE,
            expanded_size: Self::EXPANDED_SIZE,
            expanded: false,
            text: String::new(),
            background: Self::DEFAULT_BACKGROUND,
            text_color: SerializableColor::black(),
            font_family: "Arial".to_string(),
            font_size: 14.0,
            locked: false,
            visible: true,
        }
    }

    /// The size for the current expansion state.
    pub fn size(&self) -> Size {
        if self.expanded {
            self.expanded_size
        } else {
            self.collapsed_size
        }
    }

    /// Resize whichever state is showing.
    pub fn set_size(&mut self, size: Size) {
        if self.expanded {
            self.expanded_size = size;
        } else {
            self.collapsed_size = size;
        }
    }

    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }
}

impl ObjectTrait for StickyNote {
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
        Rect::from_origin_size(self.position, self.size())
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
