//! Freehand and polygon strokes.

use super::{ObjectId, ObjectTrait, SerializableColor};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a stroke is composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeTool {
    /// Additive ink.
    #[default]
    Draw,
    /// Subtractive; the renderer clears what it covers.
    Erase,
}

/// A series of points drawn by the brush, eraser or pen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ObjectId,
    /// Points in the stroke path.
    pub points: Vec<Point>,
    pub tool: StrokeTool,
    pub color: SerializableColor,
    pub width: f64,
    /// Fill for closed pen shapes.
    #[serde(default)]
    pub fill: Option<SerializableColor>,
    /// Whether the last point connects back to the first.
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "super::text::default_visible")]
    pub visible: bool,
}

impl Stroke {
    /// Create a new empty stroke.
    pub fn new(tool: StrokeTool, color: SerializableColor, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: Vec::new(),
            tool,
            color,
            width,
            fill: None,
            closed: false,
            locked: false,
            visible: true,
        }
    }

    /// Create from existing points with the default color and width.
    pub fn from_points(tool: StrokeTool, points: Vec<Point>) -> Self {
        Self {
            points,
            ..Self::new(tool, SerializableColor::black(), 2.0)
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_eraser(&self) -> bool {
        self.tool == StrokeTool::Erase
    }

    /// Simplify the path by removing redundant points.
    pub fn simplify(&mut self, tolerance: f64) {
        if self.points.len() < 3 {
            return;
        }

        // Ramer-Douglas-Peucker algorithm
        self.points = rdp_simplify(&self.points, tolerance);
    }

    /// Get the path representation for rendering.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some(first) = self.points.first() else {
            return path;
        };

        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
        }
        if self.closed {
            path.close_path();
        }

        path
    }
}

/// Ramer-Douglas-Peucker line simplification.
pub(crate) fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // Find point with maximum distance from line between first and last
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);

        // Combine, removing duplicate point at junction
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Calculate perpendicular distance from point to line.
fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;

    let line_len_sq = dx * dx + dy * dy;
    if line_len_sq < f64::EPSILON {
        return point.distance(line_start);
    }

    // Area of triangle * 2 / base = height
    let area2 = ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs();
    area2 / line_len_sq.sqrt()
}

impl ObjectTrait for Stroke {
    fn id(&self) -> ObjectId {
        self.id
    }

    /// The first point of the path.
    fn position(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    fn set_position(&mut self, position: Point) {
        let delta = position - self.position();
        for point in &mut self.points {
            *point += delta;
        }
    }

    fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };
        self.points
            .iter()
            .fold(Rect::from_points(*first, *first), |rect, p| {
                rect.union_pt(*p)
            })
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.width / 2.0;
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance(point) <= reach,
            points => {
                if self.closed && self.fill.is_some() && contains_point(points, point) {
                    return true;
                }
                let mut dist = super::point_to_polyline_dist(point, points);
                if self.closed {
                    let closing = super::point_to_segment_dist(
                        point,
                        points[points.len() - 1],
                        points[0],
                    );
                    dist = dist.min(closing);
                }
                dist <= reach
            }
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

/// Even-odd point-in-polygon test.
fn contains_point(polygon: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
