//! Translates raw pointer positions into typed gestures.
//!
//! The recognizer is a pure state machine over page-space positions and
//! millisecond timestamps; the DOM layer feeds it from mouse and touch
//! events and dispatches whatever gestures come back. Single-pointer
//! presses become taps or pans (after a small slop), two-finger touches
//! become pinches keyed off the distance ratio between the fingers.

use crate::geometry::Point;
use crate::gesture::{GesturePhase, PanEvent, PinchEvent, TapEvent};

/// Movement below this many pixels stays a tap candidate.
const PAN_SLOP: f64 = 5.0;
/// Two taps within this window and radius form a double tap.
pub(crate) const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;
const DOUBLE_TAP_SLOP: f64 = 25.0;
/// Finger distances closer than this give no usable pinch ratio.
const MIN_PINCH_DISTANCE: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    SingleTap(TapEvent),
    /// A tap that may still turn into a double tap. The host should call
    /// [`GestureRecognizer::resolve_pending_tap`] once the double-tap
    /// window has elapsed; a second tap in the meantime consumes it.
    SingleTapPending,
    DoubleTap(TapEvent),
    Pan(PanEvent),
    Pinch(PinchEvent),
}

/// Midpoint and distance of a two-finger touch.
pub fn two_finger_geometry(a: Point, b: Point) -> (Point, f64) {
    let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    let dist = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    (mid, dist)
}

struct PinchTrack {
    initial_dist: f64,
    last_center: Point,
    last_scale: f64,
}

pub struct GestureRecognizer {
    check_double_tap_failure: bool,
    press_start: Option<Point>,
    panning: bool,
    last_delta: Point,
    pinch: Option<PinchTrack>,
    last_tap: Option<(Point, f64)>,
    pending_tap: Option<TapEvent>,
}

impl GestureRecognizer {
    pub fn new(check_double_tap_failure: bool) -> Self {
        GestureRecognizer {
            check_double_tap_failure,
            press_start: None,
            panning: false,
            last_delta: Point::ZERO,
            pinch: None,
            last_tap: None,
            pending_tap: None,
        }
    }

    /// Single pointer (mouse button or first finger) went down.
    pub fn on_press(&mut self, pos: Point, _now_ms: f64) -> Vec<Gesture> {
        if self.pinch.is_some() {
            return Vec::new();
        }
        self.press_start = Some(pos);
        self.panning = false;
        self.last_delta = Point::ZERO;
        Vec::new()
    }

    /// Single pointer moved while down.
    pub fn on_drag(&mut self, pos: Point) -> Vec<Gesture> {
        if self.pinch.is_some() {
            return Vec::new();
        }
        let Some(start) = self.press_start else {
            return Vec::new();
        };
        let delta = pos - start;
        self.last_delta = delta;
        if self.panning {
            return vec![Gesture::Pan(PanEvent {
                phase: GesturePhase::Move,
                center: pos,
                delta,
            })];
        }
        if delta.x.hypot(delta.y) > PAN_SLOP {
            self.panning = true;
            return vec![
                Gesture::Pan(PanEvent {
                    phase: GesturePhase::Start,
                    center: start,
                    delta: Point::ZERO,
                }),
                Gesture::Pan(PanEvent {
                    phase: GesturePhase::Move,
                    center: pos,
                    delta,
                }),
            ];
        }
        Vec::new()
    }

    /// Single pointer released.
    pub fn on_release(&mut self, pos: Point, now_ms: f64) -> Vec<Gesture> {
        if self.pinch.is_some() {
            return Vec::new();
        }
        if self.panning {
            self.panning = false;
            self.press_start = None;
            return vec![Gesture::Pan(PanEvent {
                phase: GesturePhase::End,
                center: pos,
                delta: self.last_delta,
            })];
        }
        if self.press_start.take().is_none() {
            return Vec::new();
        }
        let tap = TapEvent { center: pos };
        if let Some((last_pos, last_time)) = self.last_tap {
            let close = (pos.x - last_pos.x).hypot(pos.y - last_pos.y) <= DOUBLE_TAP_SLOP;
            if close && now_ms - last_time <= DOUBLE_TAP_WINDOW_MS {
                self.last_tap = None;
                self.pending_tap = None;
                return vec![Gesture::DoubleTap(tap)];
            }
        }
        self.last_tap = Some((pos, now_ms));
        if self.check_double_tap_failure {
            self.pending_tap = Some(tap);
            vec![Gesture::SingleTapPending]
        } else {
            vec![Gesture::SingleTap(tap)]
        }
    }

    /// Take the deferred single tap, if no double tap consumed it.
    pub fn resolve_pending_tap(&mut self) -> Option<TapEvent> {
        self.pending_tap.take()
    }

    /// Abort any in-flight gesture (pointer capture lost, touch cancel).
    pub fn cancel(&mut self) -> Vec<Gesture> {
        let mut out = Vec::new();
        if self.panning {
            out.push(Gesture::Pan(PanEvent {
                phase: GesturePhase::Cancel,
                center: Point::ZERO,
                delta: self.last_delta,
            }));
        }
        if let Some(track) = self.pinch.take() {
            out.push(Gesture::Pinch(PinchEvent {
                phase: GesturePhase::Cancel,
                center: track.last_center,
                scale: track.last_scale,
            }));
        }
        self.press_start = None;
        self.panning = false;
        out
    }

    /// Touch points currently on the surface after a touchstart.
    pub fn on_touch_start(&mut self, points: &[Point], now_ms: f64) -> Vec<Gesture> {
        if points.len() >= 2 {
            let mut out = Vec::new();
            if self.panning {
                out.push(Gesture::Pan(PanEvent {
                    phase: GesturePhase::Cancel,
                    center: points[0],
                    delta: self.last_delta,
                }));
            }
            self.press_start = None;
            self.panning = false;
            if self.pinch.is_none() {
                let (mid, dist) = two_finger_geometry(points[0], points[1]);
                self.pinch = Some(PinchTrack {
                    initial_dist: dist,
                    last_center: mid,
                    last_scale: 1.0,
                });
                out.push(Gesture::Pinch(PinchEvent {
                    phase: GesturePhase::Start,
                    center: mid,
                    scale: 1.0,
                }));
            }
            out
        } else if points.len() == 1 {
            self.on_press(points[0], now_ms)
        } else {
            Vec::new()
        }
    }

    pub fn on_touch_move(&mut self, points: &[Point]) -> Vec<Gesture> {
        if let Some(track) = &mut self.pinch {
            if points.len() < 2 {
                return Vec::new();
            }
            let (mid, dist) = two_finger_geometry(points[0], points[1]);
            let scale = if track.initial_dist < MIN_PINCH_DISTANCE {
                1.0
            } else {
                dist / track.initial_dist
            };
            track.last_center = mid;
            track.last_scale = scale;
            return vec![Gesture::Pinch(PinchEvent {
                phase: GesturePhase::Move,
                center: mid,
                scale,
            })];
        }
        if points.len() == 1 {
            self.on_drag(points[0])
        } else {
            Vec::new()
        }
    }

    /// `remaining` are the touches still down, `released` the lifted one.
    pub fn on_touch_end(
        &mut self,
        remaining: &[Point],
        released: Option<Point>,
        now_ms: f64,
    ) -> Vec<Gesture> {
        if let Some(track) = &self.pinch {
            if remaining.len() < 2 {
                let event = PinchEvent {
                    phase: GesturePhase::End,
                    center: track.last_center,
                    scale: track.last_scale,
                };
                self.pinch = None;
                return vec![Gesture::Pinch(event)];
            }
            return Vec::new();
        }
        if remaining.is_empty() {
            if let Some(pos) = released {
                return self.on_release(pos, now_ms);
            }
            return self.cancel();
        }
        Vec::new()
    }

    pub fn on_touch_cancel(&mut self) -> Vec<Gesture> {
        self.cancel()
    }
}
