//! Page navigation: the committed page, flip animation, zoom and pan.
//!
//! Tools always act on the committed page. A flip animates towards its
//! target and only commits once it finishes.

use crate::config::EditorConfig;
use crate::page::PageSide;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipDirection {
    Forward,
    Backward,
}

/// A flip in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flip {
    pub from: usize,
    pub to: usize,
    pub direction: FlipDirection,
    /// 0.0..=1.0
    pub progress: f64,
}

/// Pages shown for the committed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    /// The cover, always alone.
    Cover,
    Pages {
        left: Option<usize>,
        right: Option<usize>,
    },
}

/// Manages which page is active and how it is viewed.
#[derive(Debug, Clone)]
pub struct Navigator {
    current_page: usize,
    page_count: usize,
    flip: Option<Flip>,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// View offset in screen units.
    pub pan: Vec2,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Seconds per flip.
    pub flip_duration: f64,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(1, &EditorConfig::default())
    }
}

impl Navigator {
    pub fn new(page_count: usize, config: &EditorConfig) -> Self {
        let (min_zoom, max_zoom) = config.zoom_limits();
        Self {
            current_page: 0,
            page_count,
            flip: None,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            pan: Vec2::ZERO,
            min_zoom,
            max_zoom,
            zoom_step: config.zoom_step,
            flip_duration: config.flip_duration,
        }
    }

    /// The committed page index.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn flip(&self) -> Option<&Flip> {
        self.flip.as_ref()
    }

    pub fn is_flipping(&self) -> bool {
        self.flip.is_some()
    }

    /// Track a changed page count, pulling the current page back in range.
    pub fn set_page_count(&mut self, page_count: usize) {
        self.page_count = page_count;
        let last = page_count.saturating_sub(1);
        if self.current_page > last {
            self.current_page = last;
        }
        if self.flip.is_some_and(|f| f.to > last) {
            self.flip = None;
        }
    }

    fn last_page(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    fn start_flip(&mut self, to: usize, direction: FlipDirection) -> bool {
        if self.flip.is_some() || to == self.current_page {
            return false;
        }
        log::debug!("Flipping {direction:?} from page {} to {to}", self.current_page);
        self.flip = Some(Flip {
            from: self.current_page,
            to,
            direction,
            progress: 0.0,
        });
        if self.flip_duration <= 0.0 {
            self.finish_flip();
        }
        true
    }

    /// Start flipping forward: the cover goes to page 1, later pages move a
    /// whole spread. Returns false when already at the end or mid-flip.
    pub fn flip_next(&mut self) -> bool {
        let target = if self.current_page == 0 {
            1
        } else {
            self.current_page + 2
        };
        let target = target.min(self.last_page());
        if target <= self.current_page {
            return false;
        }
        self.start_flip(target, FlipDirection::Forward)
    }

    /// Start flipping backward; page 1 returns to the cover.
    pub fn flip_prev(&mut self) -> bool {
        if self.current_page == 0 {
            return false;
        }
        let target = if self.current_page <= 1 {
            0
        } else {
            (self.current_page - 2).max(1)
        };
        self.start_flip(target, FlipDirection::Backward)
    }

    /// Advance the flip animation by `dt` seconds. Returns the newly
    /// committed page when the flip completes.
    pub fn advance(&mut self, dt: f64) -> Option<usize> {
        let flip = self.flip.as_mut()?;
        flip.progress = if self.flip_duration > 0.0 {
            (flip.progress + dt / self.flip_duration).min(1.0)
        } else {
            1.0
        };
        if flip.progress >= 1.0 {
            self.finish_flip()
        } else {
            None
        }
    }

    /// Complete any in-flight flip now.
    pub fn finish_flip(&mut self) -> Option<usize> {
        let flip = self.flip.take()?;
        self.current_page = flip.to;
        log::debug!("Committed page {}", self.current_page);
        Some(self.current_page)
    }

    /// Jump without animation. Returns false for an out-of-range index.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        if index >= self.page_count {
            return false;
        }
        self.flip = None;
        self.current_page = index;
        true
    }

    pub fn side(&self) -> PageSide {
        PageSide::of(self.current_page)
    }

    /// Pages visible around the committed index.
    pub fn visible_pages(&self) -> Spread {
        let i = self.current_page;
        match PageSide::of(i) {
            PageSide::Cover => Spread::Cover,
            PageSide::Right => Spread::Pages {
                // Page 1 faces the inside of the cover.
                left: (i >= 2).then(|| i - 1),
                right: Some(i),
            },
            PageSide::Left => Spread::Pages {
                left: Some(i),
                right: (i + 1 < self.page_count).then_some(i + 1),
            },
        }
    }

    /// Set zoom, clamped to the limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let zoom = (zoom * 100.0).round() / 100.0;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.zoom_step);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Reset zoom and pan. The page is left alone.
    pub fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.set_zoom(1.0);
    }

    /// Page-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    pub fn screen_to_page(&self, point: Point) -> Point {
        Affine::scale(1.0 / self.zoom) * (Affine::translate(-self.pan) * point)
    }

    pub fn page_to_screen(&self, point: Point) -> Point {
        self.transform() * point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator(pages: usize) -> Navigator {
        Navigator::new(pages, &EditorConfig::default())
    }

    fn flip_and_settle(nav: &mut Navigator, forward: bool) -> bool {
        let started = if forward {
            nav.flip_next()
        } else {
            nav.flip_prev()
        };
        nav.finish_flip();
        started
    }

    #[test]
    fn test_flip_next_from_cover_goes_to_one() {
        let mut nav = navigator(6);
        assert!(nav.flip_next());
        assert_eq!(nav.current_page(), 0);
        nav.finish_flip();
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn test_flips_move_by_spread() {
        let mut nav = navigator(6);
        flip_and_settle(&mut nav, true);
        flip_and_settle(&mut nav, true);
        assert_eq!(nav.current_page(), 3);
        flip_and_settle(&mut nav, true);
        assert_eq!(nav.current_page(), 5);
        assert!(!flip_and_settle(&mut nav, true));
        assert_eq!(nav.current_page(), 5);

        flip_and_settle(&mut nav, false);
        assert_eq!(nav.current_page(), 3);
        flip_and_settle(&mut nav, false);
        assert_eq!(nav.current_page(), 1);
        flip_and_settle(&mut nav, false);
        assert_eq!(nav.current_page(), 0);
        assert!(!nav.flip_prev());
    }

    #[test]
    fn test_flip_next_clamps_to_last_page() {
        let mut nav = navigator(3);
        flip_and_settle(&mut nav, true);
        assert!(flip_and_settle(&mut nav, true));
        assert_eq!(nav.current_page(), 2);
    }

    #[test]
    fn test_single_page_book_never_flips() {
        let mut nav = navigator(1);
        assert!(!nav.flip_next());
        assert!(!nav.flip_prev());
    }

    #[test]
    fn test_commit_only_on_completion() {
        let mut nav = navigator(4);
        nav.flip_next();
        assert_eq!(nav.advance(0.3), None);
        assert_eq!(nav.current_page(), 0);
        // A second request mid-flight is ignored.
        assert!(!nav.flip_next());
        assert_eq!(nav.advance(0.3), Some(1));
        assert_eq!(nav.current_page(), 1);
        assert!(!nav.is_flipping());
    }

    #[test]
    fn test_zero_duration_flips_immediately() {
        let config = EditorConfig {
            flip_duration: 0.0,
            ..EditorConfig::default()
        };
        let mut nav = Navigator::new(4, &config);
        assert!(nav.flip_next());
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn test_visible_pages() {
        let mut nav = navigator(5);
        assert_eq!(nav.visible_pages(), Spread::Cover);
        nav.go_to_page(1);
        assert_eq!(
            nav.visible_pages(),
            Spread::Pages {
                left: None,
                right: Some(1)
            }
        );
        nav.go_to_page(3);
        assert_eq!(
            nav.visible_pages(),
            Spread::Pages {
                left: Some(2),
                right: Some(3)
            }
        );
        nav.go_to_page(4);
        assert_eq!(
            nav.visible_pages(),
            Spread::Pages {
                left: Some(4),
                right: None
            }
        );
        assert!(!nav.go_to_page(5));
    }

    #[test]
    fn test_zoom_steps_and_clamps() {
        let mut nav = navigator(1);
        for _ in 0..5 {
            nav.zoom_in();
        }
        assert!((nav.zoom - 1.5).abs() < 1e-9);
        for _ in 0..40 {
            nav.zoom_in();
        }
        assert!((nav.zoom - 3.0).abs() < 1e-9);
        for _ in 0..40 {
            nav.zoom_out();
        }
        assert!((nav.zoom - 0.5).abs() < 1e-9);
        nav.reset_view();
        assert!((nav.zoom - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reversed_zoom_bounds_from_config() {
        let config = EditorConfig {
            min_zoom: 3.0,
            max_zoom: 0.5,
            ..EditorConfig::default()
        };
        let mut nav = Navigator::new(1, &config);
        assert!((nav.zoom - 1.0).abs() < 1e-9);
        nav.set_zoom(10.0);
        assert!((nav.zoom - 3.0).abs() < 1e-9);
        nav.set_zoom(f64::NAN);
        assert!((nav.zoom - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_roundtrip() {
        let mut nav = navigator(1);
        nav.set_zoom(2.0);
        nav.pan_by(Vec2::new(30.0, -20.0));
        let page = nav.screen_to_page(Point::new(130.0, 80.0));
        assert!((page.x - 50.0).abs() < 1e-9);
        assert!((page.y - 50.0).abs() < 1e-9);
        let back = nav.page_to_screen(page);
        assert!((back.x - 130.0).abs() < 1e-9);
        assert!((back.y - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_shrinking_page_count_clamps() {
        let mut nav = navigator(6);
        nav.go_to_page(5);
        nav.set_page_count(3);
        assert_eq!(nav.current_page(), 2);
    }
}
