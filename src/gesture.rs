//! Typed gesture events and the delegate hook.
//!
//! The transform engine never sees raw DOM events; it consumes these
//! records. `center` fields are page (global) coordinates unless a caller
//! has already converted them.

use crate::geometry::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapEvent {
    pub center: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanEvent {
    pub phase: GesturePhase,
    pub center: Point,
    /// Cumulative translation since the pan started.
    pub delta: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchEvent {
    pub phase: GesturePhase,
    /// Midpoint between the two touches.
    pub center: Point,
    /// Scale ratio relative to the gesture start (1.0 at start).
    pub scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelTick {
    pub center: Point,
    pub delta_y: f64,
}

/// Intercepts gesture events before the default handling runs. Returning
/// `true` from a method cancels the default behavior for that event,
/// including its internal state transitions. All methods default to "not
/// handled", so implementors override only what they care about.
pub trait GestureDelegate {
    fn handle_single_tap(&self, _event: &TapEvent) -> bool {
        false
    }

    fn handle_double_tap(&self, _event: &TapEvent) -> bool {
        false
    }

    fn handle_pan(&self, _event: &PanEvent) -> bool {
        false
    }

    fn handle_pinch(&self, _event: &PinchEvent) -> bool {
        false
    }
}
