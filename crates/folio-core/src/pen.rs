//! Pen tool: builds closed polygons or freehand paths from pointer samples.
//!
//! Drafts are kept per page index so switching pages mid-draw leaves each
//! page's work in progress intact.

use crate::objects::{SerializableColor, Stroke, StrokeTool};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How pen samples are turned into a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PenMode {
    /// Click to place vertices; click the first vertex again to close.
    #[default]
    Polygon,
    /// Press, drag, release.
    Freehand,
}

/// Pen configuration supplied by the toolbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenSettings {
    pub mode: PenMode,
    /// Distance to vertex 0 (page units) that counts as closing the path.
    pub snap_distance: f64,
    pub color: SerializableColor,
    pub width: f64,
    pub fill_color: SerializableColor,
    /// Fill is only applied when this is above zero.
    pub fill_opacity: f64,
    /// RDP tolerance for finished freehand paths; 0 keeps every sample.
    pub simplify_tolerance: f64,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            mode: PenMode::Polygon,
            snap_distance: 10.0,
            color: SerializableColor::black(),
            width: 2.0,
            fill_color: SerializableColor::new(0x42, 0x85, 0xf4, 255),
            fill_opacity: 0.0,
            simplify_tolerance: 0.0,
        }
    }
}

/// Work in progress on one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PenDraft {
    pub points: Vec<Point>,
    /// A freehand press is in progress.
    pub drawing: bool,
}

/// What a pen event did.
#[derive(Debug, Clone, PartialEq)]
pub enum PenOutcome {
    /// Event was not relevant in the current state.
    Ignored,
    /// The draft changed; redraw the preview.
    Updated,
    /// The draft was finished; insert this stroke.
    Completed(Stroke),
}

/// Build the stroke for a draft. Used for both the preview and the
/// committed result so they never diverge.
fn build_stroke(draft: &PenDraft, closed: bool, settings: &PenSettings) -> Stroke {
    let mut stroke = Stroke::from_points(StrokeTool::Draw, draft.points.clone());
    stroke.color = settings.color;
    stroke.width = settings.width;
    stroke.closed = closed;
    stroke.fill = (settings.fill_opacity > 0.0)
        .then(|| settings.fill_color.with_opacity(settings.fill_opacity));
    if draft.drawing && settings.simplify_tolerance > 0.0 {
        stroke.simplify(settings.simplify_tolerance);
    }
    stroke
}

/// The pen sub-editor.
#[derive(Debug, Clone, Default)]
pub struct PenEditor {
    drafts: HashMap<usize, PenDraft>,
}

impl PenEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self, page: usize) -> Option<&PenDraft> {
        self.drafts.get(&page)
    }

    pub fn has_draft(&self, page: usize) -> bool {
        self.drafts.get(&page).is_some_and(|d| !d.points.is_empty())
    }

    /// Vertex positions of the draft, for handle rendering.
    pub fn vertices(&self, page: usize) -> &[Point] {
        self.drafts
            .get(&page)
            .map(|d| d.points.as_slice())
            .unwrap_or_default()
    }

    pub fn pointer_down(&mut self, page: usize, point: Point, settings: &PenSettings) -> PenOutcome {
        match settings.mode {
            PenMode::Polygon => {
                let draft = self.drafts.entry(page).or_default();
                let snaps = draft.points.len() > 2
                    && draft.points[0].distance(point) <= settings.snap_distance;
                draft.points.push(point);
                if snaps {
                    return self.finish(page, true, settings);
                }
                PenOutcome::Updated
            }
            PenMode::Freehand => {
                self.drafts.insert(
                    page,
                    PenDraft {
                        points: vec![point],
                        drawing: true,
                    },
                );
                PenOutcome::Updated
            }
        }
    }

    pub fn pointer_move(&mut self, page: usize, point: Point) -> PenOutcome {
        match self.drafts.get_mut(&page) {
            Some(draft) if draft.drawing => {
                draft.points.push(point);
                PenOutcome::Updated
            }
            _ => PenOutcome::Ignored,
        }
    }

    /// Finish a freehand press. The path closes when it ends within snap
    /// distance of where it started.
    pub fn pointer_up(&mut self, page: usize, settings: &PenSettings) -> PenOutcome {
        let Some(draft) = self.drafts.get(&page) else {
            return PenOutcome::Ignored;
        };
        if !draft.drawing {
            return PenOutcome::Ignored;
        }
        if draft.points.len() < 2 {
            self.drafts.remove(&page);
            return PenOutcome::Updated;
        }
        let closed = match (draft.points.first(), draft.points.last()) {
            (Some(first), Some(last)) => {
                draft.points.len() > 2 && first.distance(*last) <= settings.snap_distance
            }
            _ => false,
        };
        self.finish(page, closed, settings)
    }

    /// Explicitly close the polygon draft. Needs at least three vertices.
    pub fn complete(&mut self, page: usize, settings: &PenSettings) -> Option<Stroke> {
        let draft = self.drafts.get(&page)?;
        if draft.drawing || draft.points.len() < 3 {
            return None;
        }
        match self.finish(page, true, settings) {
            PenOutcome::Completed(stroke) => Some(stroke),
            _ => None,
        }
    }

    fn finish(&mut self, page: usize, closed: bool, settings: &PenSettings) -> PenOutcome {
        let Some(draft) = self.drafts.remove(&page) else {
            return PenOutcome::Ignored;
        };
        let stroke = build_stroke(&draft, closed, settings);
        log::debug!(
            "Pen completed on page {page}: {} points, closed={closed}",
            stroke.len()
        );
        PenOutcome::Completed(stroke)
    }

    /// Drop the last polygon vertex.
    pub fn backspace(&mut self, page: usize) -> bool {
        let Some(draft) = self.drafts.get_mut(&page) else {
            return false;
        };
        if draft.drawing || draft.points.pop().is_none() {
            return false;
        }
        if draft.points.is_empty() {
            self.drafts.remove(&page);
        }
        true
    }

    /// Move one polygon vertex (vertex handle drag).
    pub fn move_vertex(&mut self, page: usize, index: usize, point: Point) -> bool {
        match self.drafts.get_mut(&page).and_then(|d| d.points.get_mut(index)) {
            Some(vertex) => {
                *vertex = point;
                true
            }
            None => false,
        }
    }

    /// Discard the page's draft.
    pub fn cancel(&mut self, page: usize) -> bool {
        self.drafts.remove(&page).is_some()
    }

    /// The stroke the draft would become right now. Open until completed.
    pub fn preview(&self, page: usize, settings: &PenSettings) -> Option<Stroke> {
        let draft = self.drafts.get(&page)?;
        if draft.points.is_empty() {
            return None;
        }
        Some(build_stroke(draft, false, settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon() -> PenSettings {
        PenSettings::default()
    }

    fn freehand() -> PenSettings {
        PenSettings {
            mode: PenMode::Freehand,
            ..PenSettings::default()
        }
    }

    #[test]
    fn test_polygon_snap_closes_without_duplicate_vertex() {
        let mut pen = PenEditor::new();
        let s = polygon();
        let clicks = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(3.0, 4.0),
        ];
        let mut outcome = PenOutcome::Ignored;
        for click in clicks {
            outcome = pen.pointer_down(0, click, &s);
        }
        let PenOutcome::Completed(stroke) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert!(stroke.closed);
        assert_eq!(stroke.points.len(), clicks.len());
        assert!(!pen.has_draft(0));
    }

    #[test]
    fn test_no_snap_with_two_vertices() {
        let mut pen = PenEditor::new();
        let s = polygon();
        pen.pointer_down(0, Point::new(0.0, 0.0), &s);
        pen.pointer_down(0, Point::new(100.0, 0.0), &s);
        let outcome = pen.pointer_down(0, Point::new(1.0, 1.0), &s);
        assert_eq!(outcome, PenOutcome::Updated);
        assert_eq!(pen.vertices(0).len(), 3);
    }

    #[test]
    fn test_complete_requires_three_vertices() {
        let mut pen = PenEditor::new();
        let s = polygon();
        pen.pointer_down(0, Point::new(0.0, 0.0), &s);
        pen.pointer_down(0, Point::new(50.0, 0.0), &s);
        assert!(pen.complete(0, &s).is_none());
        pen.pointer_down(0, Point::new(50.0, 50.0), &s);
        let stroke = pen.complete(0, &s).unwrap();
        assert!(stroke.closed);
        assert_eq!(stroke.len(), 3);
    }

    #[test]
    fn test_backspace_and_escape() {
        let mut pen = PenEditor::new();
        let s = polygon();
        pen.pointer_down(0, Point::new(0.0, 0.0), &s);
        pen.pointer_down(0, Point::new(50.0, 0.0), &s);
        assert!(pen.backspace(0));
        assert_eq!(pen.vertices(0), &[Point::new(0.0, 0.0)]);
        assert!(pen.cancel(0));
        assert!(!pen.has_draft(0));
        assert!(!pen.backspace(0));
        assert!(!pen.cancel(0));
    }

    #[test]
    fn test_drafts_are_per_page() {
        let mut pen = PenEditor::new();
        let s = polygon();
        pen.pointer_down(1, Point::new(0.0, 0.0), &s);
        pen.pointer_down(2, Point::new(9.0, 9.0), &s);
        assert_eq!(pen.vertices(1), &[Point::new(0.0, 0.0)]);
        assert_eq!(pen.vertices(2), &[Point::new(9.0, 9.0)]);
        pen.cancel(1);
        assert!(pen.has_draft(2));
    }

    #[test]
    fn test_freehand_loop_closes() {
        let mut pen = PenEditor::new();
        let s = freehand();
        pen.pointer_down(0, Point::new(0.0, 0.0), &s);
        pen.pointer_move(0, Point::new(50.0, 0.0));
        pen.pointer_move(0, Point::new(50.0, 50.0));
        pen.pointer_move(0, Point::new(2.0, 3.0));
        let PenOutcome::Completed(stroke) = pen.pointer_up(0, &s) else {
            panic!("expected completion");
        };
        assert!(stroke.closed);
        assert_eq!(stroke.len(), 4);
    }

    #[test]
    fn test_freehand_open_path() {
        let mut pen = PenEditor::new();
        let s = freehand();
        pen.pointer_down(0, Point::new(0.0, 0.0), &s);
        pen.pointer_move(0, Point::new(50.0, 0.0));
        pen.pointer_move(0, Point::new(100.0, 0.0));
        let PenOutcome::Completed(stroke) = pen.pointer_up(0, &s) else {
            panic!("expected completion");
        };
        assert!(!stroke.closed);
        assert_eq!(stroke.fill, None);
    }

    #[test]
    fn test_fill_only_with_positive_opacity() {
        let mut s = polygon();
        s.fill_opacity = 0.5;
        let stroke = build_stroke(&PenDraft { points: vec![Point::ZERO; 3], drawing: false }, true, &s);
        assert_eq!(stroke.fill.map(|c| c.a), Some(128));
    }

    #[test]
    fn test_preview_matches_committed_geometry() {
        let mut pen = PenEditor::new();
        let s = polygon();
        for p in [(0.0, 0.0), (40.0, 0.0), (40.0, 40.0)] {
            pen.pointer_down(0, Point::new(p.0, p.1), &s);
        }
        let preview = pen.preview(0, &s).unwrap();
        let committed = pen.complete(0, &s).unwrap();
        assert_eq!(preview.points, committed.points);
        assert_eq!(preview.width, committed.width);
        assert_eq!(preview.color, committed.color);

        let s = PenSettings {
            simplify_tolerance: 5.0,
            ..freehand()
        };
        pen.pointer_down(0, Point::new(0.0, 0.0), &s);
        for x in [10.0, 20.0, 30.0] {
            pen.pointer_move(0, Point::new(x, 0.0));
        }
        let preview = pen.preview(0, &s).unwrap();
        let PenOutcome::Completed(committed) = pen.pointer_up(0, &s) else {
            panic!("freehand press should complete");
        };
        assert_eq!(preview.points, committed.points);
        assert_eq!(committed.points, vec![Point::new(0.0, 0.0), Point::new(30.0, 0.0)]);
    }
}
