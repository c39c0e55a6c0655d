//! Manipulation handles for the selected object and the pen draft.

use crate::objects::Object;
use kurbo::{Point, Rect};
use std::f64::consts::FRAC_PI_2;

/// Distance of the rotate handle above the top edge.
const ROTATE_HANDLE_OFFSET: f64 = 30.0;
/// Objects are never resized below this width or height.
const MIN_SIZE: f64 = 1.0;

/// A manipulation handle in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
    pub shape: HandleShape,
}

/// What dragging a handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Rotate,
    /// A pen draft vertex.
    Vertex(usize),
}

/// Visual shape of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleShape {
    #[default]
    Square,
    Circle,
}

impl Handle {
    pub fn new(kind: HandleKind, position: Point) -> Self {
        Self {
            kind,
            position,
            shape: HandleShape::default(),
        }
    }

    pub fn with_shape(mut self, shape: HandleShape) -> Self {
        self.shape = shape;
        self
    }
}

/// Corner and rotate handles for a selected object. Locked objects have none.
pub fn object_handles(object: &Object) -> Vec<Handle> {
    if object.is_locked() {
        return Vec::new();
    }
    let bounds = object.bounds();
    let mut handles = Vec::new();
    if object.supports_resize() {
        handles.extend([
            Handle::new(HandleKind::TopLeft, Point::new(bounds.x0, bounds.y0)),
            Handle::new(HandleKind::TopRight, Point::new(bounds.x1, bounds.y0)),
            Handle::new(HandleKind::BottomLeft, Point::new(bounds.x0, bounds.y1)),
            Handle::new(HandleKind::BottomRight, Point::new(bounds.x1, bounds.y1)),
        ]);
    }
    if object.supports_rotation() {
        handles.push(
            Handle::new(
                HandleKind::Rotate,
                Point::new(bounds.center().x, bounds.y0 - ROTATE_HANDLE_OFFSET),
            )
            .with_shape(HandleShape::Circle),
        );
    }
    handles
}

/// One circular handle per pen vertex.
pub fn vertex_handles(points: &[Point]) -> Vec<Handle> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| Handle::new(HandleKind::Vertex(i), *p).with_shape(HandleShape::Circle))
        .collect()
}

/// The handle within `radius` of `point`, if any.
pub fn hit_test_handle(handles: &[Handle], point: Point, radius: f64) -> Option<HandleKind> {
    handles
        .iter()
        .find(|h| h.position.distance(point) <= radius)
        .map(|h| h.kind)
}

/// New bounds after dragging a corner handle to `point`. The opposite
/// corner stays put.
pub fn resize_bounds(original: Rect, handle: HandleKind, point: Point) -> Rect {
    let (anchor, moving) = match handle {
        HandleKind::TopLeft => (Point::new(original.x1, original.y1), point),
        HandleKind::TopRight => (Point::new(original.x0, original.y1), point),
        HandleKind::BottomLeft => (Point::new(original.x1, original.y0), point),
        HandleKind::BottomRight => (Point::new(original.x0, original.y0), point),
        HandleKind::Rotate | HandleKind::Vertex(_) => return original,
    };
    let rect = Rect::from_points(anchor, moving);
    Rect::from_origin_size(
        rect.origin(),
        (rect.width().max(MIN_SIZE), rect.height().max(MIN_SIZE)),
    )
}

/// Rotation (radians) that points the rotate handle of `bounds` at `point`.
pub fn rotation_towards(bounds: Rect, point: Point) -> f64 {
    let v = point - bounds.center();
    v.y.atan2(v.x) + FRAC_PI_2
}
