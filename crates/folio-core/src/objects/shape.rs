//! Vector shapes.

use super::{ObjectId, ObjectTrait, SerializableColor};
use kurbo::{BezPath, Ellipse, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

/// Shape sub-types offered by the shape tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
    Star,
}

impl ShapeKind {
    /// Cycle to the next shape kind.
    pub fn next(self) -> Self {
        match self {
            ShapeKind::Rectangle => ShapeKind::Circle,
            ShapeKind::Circle => ShapeKind::Triangle,
            ShapeKind::Triangle => ShapeKind::Star,
            ShapeKind::Star => ShapeKind::Rectangle,
        }
    }
}

/// A filled vector shape inside a width x height box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub(crate) id: ObjectId,
    pub kind: ShapeKind,
    /// Top-left corner of the bounding box.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub fill: Option<SerializableColor>,
    #[serde(default = "SerializableColor::black")]
    pub stroke_color: SerializableColor,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "super::text::default_visible")]
    pub visible: bool,
}

fn default_opacity() -> f64 {
    1.0
}

impl Shape {
    pub const DEFAULT_SIZE: f64 = 100.0;

    /// Create a new shape with the default size.
    pub fn new(kind: ShapeKind, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            width: Self::DEFAULT_SIZE,
            height: Self::DEFAULT_SIZE,
            fill: Some(SerializableColor::new(0x42, 0x85, 0xf4, 255)),
            stroke_color: SerializableColor::black(),
            stroke_width: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            locked: false,
            visible: true,
        }
    }

    pub fn with_fill(mut self, fill: Option<SerializableColor>) -> Self {
        self.fill = fill;
        self
    }

    fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    /// Get the outline path for rendering.
    pub fn to_path(&self) -> BezPath {
        let rect = self.as_rect();
        match self.kind {
            ShapeKind::Rectangle => rect.to_path(0.1),
            ShapeKind::Circle => Ellipse::from_rect(rect).to_path(0.1),
            ShapeKind::Triangle => polygon_path(&[
                Point::new(rect.center().x, rect.y0),
                Point::new(rect.x1, rect.y1),
                Point::new(rect.x0, rect.y1),
            ]),
            ShapeKind::Star => polygon_path(&star_points(rect)),
        }
    }
}

fn polygon_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);
    for p in &points[1..] {
        path.line_to(*p);
    }
    path.close_path();
    path
}

/// Five-pointed star inscribed in `rect`, starting at the top point.
fn star_points(rect: Rect) -> Vec<Point> {
    let center = rect.center();
    let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
    (0..10)
        .map(|i| {
            let angle = -PI / 2.0 + i as f64 * PI / 5.0;
            let scale = if i % 2 == 0 { 1.0 } else { 0.4 };
            Point::new(
                center.x + rx * scale * angle.cos(),
                center.y + ry * scale * angle.sin(),
            )
        })
        .collect()
}

impl ObjectTrait for Shape {
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
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.as_rect().inflate(tolerance, tolerance);
        match self.kind {
            ShapeKind::Circle => {
                let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let c = rect.center();
                let nx = (point.x - c.x) / rx;
                let ny = (point.y - c.y) / ry;
                nx * nx + ny * ny <= 1.0
            }
            _ => rect.contains(point),
        }
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
