//! Object definitions for book pages.

mod image;
mod shape;
mod sticky_note;
mod stroke;
mod table;
mod text;

pub use image::{Image, ImageFormat, ImageSource};
pub use shape::{Shape, ShapeKind};
pub use sticky_note::StickyNote;
pub use stroke::{Stroke, StrokeTool};
pub use table::{Cell, CellFormat, ColumnPosition, RowPosition, Table, VerticalAlign};
pub use text::{ListStyle, Text, TextAlign, TextCase, TextFormat, TextStyle};

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Return the same color with its alpha scaled by `opacity` (0.0..=1.0).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let alpha = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }

}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Unique identifier for objects.
///
/// Random v4 identifiers are never handed out twice, so a stale id held by a
/// selection, a history snapshot or an edit session can only ever resolve to
/// the object it was created for.
pub type ObjectId = Uuid;

/// Distance from a point to a line segment (a->b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Common trait for all page objects.
pub trait ObjectTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Get the anchor position (top-left for boxed objects).
    fn position(&self) -> Point;

    /// Move the object so its anchor lands on `position`.
    fn set_position(&mut self, position: Point);

    /// Get the bounding box in page coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in page coordinates) hits this object.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn is_locked(&self) -> bool;

    fn set_locked(&mut self, locked: bool);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);
}

/// Which page collection an object lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Stroke,
    Text,
    Shape,
    Image,
    StickyNote,
    Table,
}

/// Enum wrapper for all object types (for serialization and the clipboard).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Object {
    Stroke(Stroke),
    Text(Text),
    Shape(Shape),
    Image(Image),
    StickyNote(StickyNote),
    Table(Table),
}

impl From<Stroke> for Object {
    fn from(value: Stroke) -> Self {
        Object::Stroke(value)
    }
}

impl From<Text> for Object {
    fn from(value: Text) -> Self {
        Object::Text(value)
    }
}

impl From<Shape> for Object {
    fn from(value: Shape) -> Self {
        Object::Shape(value)
    }
}

impl From<Image> for Object {
    fn from(value: Image) -> Self {
        Object::Image(value)
    }
}

impl From<StickyNote> for Object {
    fn from(value: StickyNote) -> Self {
        Object::StickyNote(value)
    }
}

impl From<Table> for Object {
    fn from(value: Table) -> Self {
        Object::Table(value)
    }
}

impl Object {
    fn as_trait(&self) -> &dyn ObjectTrait {
        match self {
            Object::Stroke(o) => o,
            Object::Text(o) => o,
            Object::Shape(o) => o,
            Object::Image(o) => o,
            Object::StickyNote(o) => o,
            Object::Table(o) => o,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ObjectTrait {
        match self {
            Object::Stroke(o) => o,
            Object::Text(o) => o,
            Object::Shape(o) => o,
            Object::Image(o) => o,
            Object::StickyNote(o) => o,
            Object::Table(o) => o,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Stroke(_) => ObjectKind::Stroke,
            Object::Text(_) => ObjectKind::Text,
            Object::Shape(_) => ObjectKind::Shape,
            Object::Image(_) => ObjectKind::Image,
            Object::StickyNote(_) => ObjectKind::StickyNote,
            Object::Table(_) => ObjectKind::Table,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.as_trait().id()
    }

    pub fn position(&self) -> Point {
        self.as_trait().position()
    }

    pub fn set_position(&mut self, position: Point) {
        self.as_trait_mut().set_position(position);
    }

    /// Move the object by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        let position = self.position();
        self.set_position(position + delta);
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_trait().hit_test(point, tolerance)
    }

    pub fn is_locked(&self) -> bool {
        self.as_trait().is_locked()
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.as_trait_mut().set_locked(locked);
    }

    pub fn is_visible(&self) -> bool {
        self.as_trait().is_visible()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.as_trait_mut().set_visible(visible);
    }

    /// Regenerate the object's ID with a new unique identifier.
    /// Used when duplicating or pasting so copies never share an id.
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            Object::Stroke(o) => o.id = new_id,
            Object::Text(o) => o.id = new_id,
            Object::Shape(o) => o.id = new_id,
            Object::Image(o) => o.id = new_id,
            Object::StickyNote(o) => o.id = new_id,
            Object::Table(o) => o.id = new_id,
        }
    }

    /// Get the rotation angle in radians (0 for objects that don't rotate).
    pub fn rotation(&self) -> f64 {
        match self {
            Object::Text(t) => t.rotation,
            Object::Shape(s) => s.rotation,
            Object::Image(i) => i.rotation,
            _ => 0.0,
        }
    }

    /// Check if this object supports rotation.
    pub fn supports_rotation(&self) -> bool {
        matches!(self, Object::Text(_) | Object::Shape(_) | Object::Image(_))
    }

    /// Check if this object can be resized through its corner handles.
    pub fn supports_resize(&self) -> bool {
        matches!(
            self,
            Object::Text(_) | Object::Shape(_) | Object::Image(_) | Object::StickyNote(_)
        )
    }

    /// Apply a partial attribute update. Attributes the variant does not
    /// carry are ignored.
    pub fn apply_patch(&mut self, patch: &ObjectPatch) {
        if let Some(position) = patch.position {
            self.set_position(position);
        }
        match self {
            Object::Stroke(s) => {
                if let Some(color) = patch.color {
                    s.color = color;
                }
                if let Some(fill) = patch.fill {
                    s.fill = fill;
                }
            }
            Object::Text(t) => {
                if let Some(size) = patch.size {
                    t.width = size.width;
                    t.height = size.height;
                }
                if let Some(rotation) = patch.rotation {
                    t.rotation = rotation;
                }
                if let Some(opacity) = patch.opacity {
                    t.opacity = opacity.clamp(0.0, 1.0);
                }
                if let Some(color) = patch.color {
                    t.color = color;
                }
                if let Some(content) = &patch.content {
                    t.content.clone_from(content);
                }
            }
            Object::Shape(s) => {
                if let Some(size) = patch.size {
                    s.width = size.width;
                    s.height = size.height;
                }
                if let Some(rotation) = patch.rotation {
                    s.rotation = rotation;
                }
                if let Some(opacity) = patch.opacity {
                    s.opacity = opacity.clamp(0.0, 1.0);
                }
                if let Some(fill) = patch.fill {
                    s.fill = fill;
                }
                if let Some(color) = patch.color {
                    s.stroke_color = color;
                }
            }
            Object::Image(i) => {
                if let Some(size) = patch.size {
                    i.width = size.width;
                    i.height = size.height;
                }
                if let Some(rotation) = patch.rotation {
                    i.rotation = rotation;
                }
                if let Some(opacity) = patch.opacity {
                    i.opacity = opacity.clamp(0.0, 1.0);
                }
            }
            Object::StickyNote(n) => {
                if let Some(size) = patch.size {
                    n.set_size(size);
                }
                if let Some(content) = &patch.content {
                    n.text.clone_from(content);
                }
                if let Some(color) = patch.color {
                    n.text_color = color;
                }
                if let Some(Some(fill)) = patch.fill {
                    n.background = fill;
                }
            }
            Object::Table(t) => {
                if let Some(fill) = patch.fill {
                    t.fill = fill;
                }
                if let Some(color) = patch.color {
                    t.border_color = color;
                }
            }
        }
    }
}

/// A partial attribute update for any object variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    /// `Some(None)` clears the fill.
    pub fill: Option<Option<SerializableColor>>,
    pub color: Option<SerializableColor>,
    pub content: Option<String>,
}

impl ObjectPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_with_opacity() {
        let half = SerializableColor::black().with_opacity(0.5);
        assert_eq!(half.a, 128);
    }

    #[test]
    fn test_mixed_objects_have_distinct_ids() {
        let objects: Vec<Object> = vec![
            Stroke::new(StrokeTool::Draw, SerializableColor::black(), 2.0).into(),
            Text::new(Point::new(0.0, 0.0), "a").into(),
            Shape::new(ShapeKind::Circle, Point::new(0.0, 0.0)).into(),
            StickyNote::new(Point::new(0.0, 0.0)).into(),
            Table::new(Point::new(0.0, 0.0), 3, 3, 80.0, 30.0).into(),
            Text::new(Point::new(0.0, 0.0), "b").into(),
        ];
        let ids: HashSet<ObjectId> = objects.iter().map(Object::id).collect();
        assert_eq!(ids.len(), objects.len());
    }

    #[test]
    fn test_regenerate_id() {
        let mut object: Object = Text::new(Point::new(0.0, 0.0), "x").into();
        let before = object.id();
        object.regenerate_id();
        assert_ne!(before, object.id());
    }

    #[test]
    fn test_patch_ignores_unsupported_fields() {
        let mut object: Object = Stroke::from_points(
            StrokeTool::Draw,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
        )
        .into();
        let before = object.clone();
        object.apply_patch(&ObjectPatch::rotation(1.0));
        assert_eq!(object, before);
    }

    #[test]
    fn test_translate() {
        let mut object: Object = Shape::new(ShapeKind::Rectangle, Point::new(10.0, 10.0)).into();
        object.translate(Vec2::new(5.0, -5.0));
        assert_eq!(object.position(), Point::new(15.0, 5.0));
    }

    #[test]
    fn test_point_to_segment_dist() {
        let d = point_to_segment_dist(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-9);
    }
}
