//! Construction-time configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::{Margin, Point};

/// Bounce behavior at scroll boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBounce {
    /// Never bounce; offsets clamp hard at the boundary.
    Off,
    /// Always bounce, even when the content fits inside the container.
    On,
    /// Bounce only on axes where the scaled content exceeds the container.
    #[default]
    Auto,
}

/// Options accepted at construction. Field names deserialize in camelCase,
/// so a JSON options object uses the same keys as the DOM-facing surface
/// (`contentOffset`, `minimumZoomScale`, ...). Every field has a default and
/// an explicit value always wins, including explicit `false` for the
/// boolean switches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportOptions {
    /// Initial translation of the content origin from the container origin.
    pub content_offset: Point,
    /// Content margin; each side is a number, a percentage string or "auto".
    pub content_margin: Margin,
    pub zoom_scale: f64,
    /// Relative scale factor applied per wheel tick.
    pub wheel_zoom_scale: f64,
    pub minimum_zoom_scale: f64,
    pub maximum_zoom_scale: f64,
    /// When true, a single tap is reported only after the double-tap window
    /// has elapsed without a second tap.
    pub check_double_tap_failure: bool,
    pub scroll_bounce: ScrollBounce,
    /// Watch window resize events and relayout automatically.
    pub watch_resize: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        ViewportOptions {
            content_offset: Point::ZERO,
            content_margin: Margin::auto(),
            zoom_scale: 1.0,
            wheel_zoom_scale: 1.1,
            minimum_zoom_scale: 0.5,
            maximum_zoom_scale: 5.5,
            check_double_tap_failure: false,
            scroll_bounce: ScrollBounce::Auto,
            watch_resize: true,
        }
    }
}

impl ViewportOptions {
    /// Parse an options object from JSON. Unknown keys are ignored, missing
    /// keys take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
