//! Editor-wide configuration.

use crate::history::DEFAULT_HISTORY_DEPTH;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Limits and timings that do not change while editing.
///
/// Every field has a default so partial JSON loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo states kept before the oldest is evicted.
    pub history_depth: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Page flip animation length in seconds. Zero flips instantly.
    pub flip_duration: f64,
    /// Offset applied to duplicated and pasted objects.
    pub duplicate_offset: Vec2,
    /// Hit test slack in page units.
    pub hit_tolerance: f64,
    /// Radius within which a pointer grabs a handle, in page units.
    pub handle_radius: f64,
    /// Pages created with a new book.
    pub initial_pages: usize,
    /// Double-click window in milliseconds; 0 disables double clicks.
    pub double_click_ms: u64,
    /// Uploaded images are scaled down to fit this size.
    pub image_max_side: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            min_zoom: 0.5,
            max_zoom: 3.0,
            zoom_step: 0.1,
            flip_duration: 0.6,
            duplicate_offset: Vec2::new(20.0, 20.0),
            hit_tolerance: 4.0,
            handle_radius: 8.0,
            initial_pages: 2,
            double_click_ms: 500,
            image_max_side: 400.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Zoom bounds as `(min, max)`, usable with `f64::clamp`.
    ///
    /// Reversed bounds are swapped. Non-finite or non-positive bounds fall
    /// back to the defaults.
    pub fn zoom_limits(&self) -> (f64, f64) {
        let valid = |zoom: f64| zoom.is_finite() && zoom > 0.0;
        if !valid(self.min_zoom) || !valid(self.max_zoom) {
            let defaults = Self::default();
            log::warn!(
                "Invalid zoom bounds {}..{}, using {}..{}",
                self.min_zoom,
                self.max_zoom,
                defaults.min_zoom,
                defaults.max_zoom
            );
            return (defaults.min_zoom, defaults.max_zoom);
        }
        if self.min_zoom > self.max_zoom {
            log::warn!("Zoom bounds reversed ({}..{})", self.min_zoom, self.max_zoom);
            return (self.max_zoom, self.min_zoom);
        }
        (self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"history_depth": 5, "max_zoom": 4.0}"#).unwrap();
        assert_eq!(config.history_depth, 5);
        assert!((config.max_zoom - 4.0).abs() < f64::EPSILON);
        assert!((config.min_zoom - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.duplicate_offset, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_zoom_limits_repaired() {
        let reversed = EditorConfig::from_json(r#"{"min_zoom": 3.0, "max_zoom": 0.5}"#).unwrap();
        assert_eq!(reversed.zoom_limits(), (0.5, 3.0));

        let negative = EditorConfig {
            min_zoom: -1.0,
            ..EditorConfig::default()
        };
        assert_eq!(negative.zoom_limits(), (0.5, 3.0));

        let nan = EditorConfig {
            max_zoom: f64::NAN,
            ..EditorConfig::default()
        };
        assert_eq!(nan.zoom_limits(), (0.5, 3.0));
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }
}
