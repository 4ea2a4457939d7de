//! Elastic boundary clamp.
//!
//! Overrun past a boundary is mapped through a saturating geometric
//! progression, so the content "gives" less and less the further it is
//! dragged past the edge and never exceeds a fixed travel limit. This is
//! what produces the rubber-band feel at scroll and zoom limits.

/// Common ratio of the progression. The asymptotic travel limit is
/// `1 / (1 - RATIO)`, about 66.7 px of give at stiffness 1.
const RATIO: f64 = 0.985;

/// Saturating overrun curve: `(1 - RATIO^t) / (1 - RATIO)`.
///
/// Strictly increasing in `t`, zero at zero, bounded by `1 / (1 - RATIO)`.
pub fn geometric_progression(t: f64) -> f64 {
    (1.0 - RATIO.powf(t)) / (1.0 - RATIO)
}

/// Clamp `value` to `[min, max]` with elastic give past either boundary.
///
/// Inside the range the value passes through unchanged. Outside, the
/// overrun distance is fed through [`geometric_progression`] and divided by
/// `stiffness`; higher stiffness means a tighter spring.
pub fn limit_spring(min: f64, value: f64, max: f64, stiffness: f64) -> f64 {
    if value < min {
        min - geometric_progression(min - value) / stiffness
    } else if value > max {
        max + geometric_progression(value - max) / stiffness
    } else {
        value
    }
}
