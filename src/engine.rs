//! The viewport transform engine.
//!
//! `ViewportEngine` owns the scroll view's state (offset, zoom, margins,
//! cached sizes) and implements all of the coordinate math, boundary
//! clamping and gesture-to-transform mapping. It never touches the DOM:
//! the host pushes measured sizes in and receives [`Transition`] values
//! telling it what kind of layout pass to run. That keeps every numeric
//! path here natively testable.

use crate::geometry::{Margin, Point, Rect, ResolvedMargin, Size};
use crate::gesture::GesturePhase;
use crate::options::{ScrollBounce, ViewportOptions};
use crate::spring::limit_spring;

/// Zoom factor applied by a double tap on unzoomed content.
const DOUBLE_TAP_ZOOM: f64 = 4.0;

/// Spring stiffness for pinch overrun past the zoom bounds.
const PINCH_STIFFNESS: f64 = 4.0;

/// What the caller should do after a state mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed; no layout needed.
    None,
    /// Re-layout now, without animation (live drag / live pinch path).
    Immediate,
    /// Re-layout with an animated transition (snap-back, double tap).
    Animated,
}

pub struct ViewportEngine {
    content_offset: Point,
    zoom_scale: f64,
    minimum_zoom_scale: f64,
    maximum_zoom_scale: f64,
    wheel_zoom_scale: f64,
    content_margin: Margin,
    scroll_bounce: ScrollBounce,
    container_size: Size,
    base_content_size: Option<Size>,
    margin_px: Option<ResolvedMargin>,

    // Transient gesture state.
    pan_start_offset: Option<Point>,
    pinch_start_zoom: Option<f64>,
    last_pinch_center: Option<Point>,
    locked: bool,
}

impl ViewportEngine {
    pub fn new(options: &ViewportOptions) -> Self {
        ViewportEngine {
            content_offset: options.content_offset,
            zoom_scale: options.zoom_scale,
            minimum_zoom_scale: options.minimum_zoom_scale,
            maximum_zoom_scale: options.maximum_zoom_scale,
            wheel_zoom_scale: options.wheel_zoom_scale,
            content_margin: options.content_margin,
            scroll_bounce: options.scroll_bounce,
            container_size: Size::ZERO,
            base_content_size: None,
            margin_px: None,
            pan_start_offset: None,
            pinch_start_zoom: None,
            last_pinch_center: None,
            locked: false,
        }
    }

    // ── State accessors ──────────────────────────────────────────────────

    pub fn content_offset(&self) -> Point {
        self.content_offset
    }

    pub fn set_content_offset(&mut self, offset: Point) {
        self.content_offset = offset;
    }

    pub fn zoom_scale(&self) -> f64 {
        self.zoom_scale
    }

    pub fn set_zoom_scale(&mut self, scale: f64) {
        self.zoom_scale = scale;
    }

    pub fn minimum_zoom_scale(&self) -> f64 {
        self.minimum_zoom_scale
    }

    pub fn set_minimum_zoom_scale(&mut self, scale: f64) {
        self.minimum_zoom_scale = scale;
    }

    pub fn maximum_zoom_scale(&self) -> f64 {
        self.maximum_zoom_scale
    }

    pub fn set_maximum_zoom_scale(&mut self, scale: f64) {
        self.maximum_zoom_scale = scale;
    }

    pub fn wheel_zoom_scale(&self) -> f64 {
        self.wheel_zoom_scale
    }

    pub fn set_wheel_zoom_scale(&mut self, scale: f64) {
        self.wheel_zoom_scale = scale;
    }

    pub fn content_margin(&self) -> Margin {
        self.content_margin
    }

    pub fn set_content_margin(&mut self, margin: Margin) {
        self.content_margin = margin;
        self.margin_px = None;
    }

    pub fn scroll_bounce(&self) -> ScrollBounce {
        self.scroll_bounce
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    pub fn set_container_size(&mut self, size: Size) {
        self.container_size = size;
        self.margin_px = None;
    }

    /// Push the measured content size at scale 1.0.
    pub fn set_base_content_size(&mut self, size: Size) {
        self.base_content_size = Some(size);
    }

    /// Drop the cached content size and resolved margins; the host must
    /// re-measure before the next layout.
    pub fn invalidate_size(&mut self) {
        self.base_content_size = None;
        self.margin_px = None;
    }

    pub fn needs_measure(&self) -> bool {
        self.base_content_size.is_none()
    }

    pub fn lock(&mut self, flag: bool) {
        self.locked = flag;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    // ── Geometry ─────────────────────────────────────────────────────────

    /// Content size at the given scale. Unmeasured content counts as zero.
    pub fn content_size_at(&self, scale: f64) -> Size {
        self.base_content_size.unwrap_or(Size::ZERO).scaled(scale)
    }

    /// Content size at the current zoom scale.
    pub fn content_size(&self) -> Size {
        self.content_size_at(self.zoom_scale)
    }

    /// Margins resolved to pixels, cached until the container size or
    /// margin configuration changes.
    pub fn margin_in_pixel(&mut self) -> ResolvedMargin {
        if self.margin_px.is_none() {
            self.margin_px = Some(self.content_margin.resolve(self.container_size));
        }
        self.margin_px.unwrap_or_default()
    }

    /// Additional offset positioning undersized content inside the
    /// container. Per axis: no margins set centers the content (never
    /// negative), a single margin pins that edge, both margins pin the far
    /// edge but let the near margin win when it pushes further.
    pub fn content_adjust(&mut self, scale: f64) -> Point {
        if scale <= 0.0 {
            log::warn!("content_adjust called with non-positive scale {scale}");
            return Point::ZERO;
        }
        let size = self.content_size_at(scale);
        let margin = self.margin_in_pixel();
        Point::new(
            adjust_axis(
                self.container_size.width,
                size.width,
                margin.left,
                margin.right,
                scale,
            ),
            adjust_axis(
                self.container_size.height,
                size.height,
                margin.top,
                margin.bottom,
                scale,
            ),
        )
    }

    /// Map a container-space point into content space at the current
    /// offset and zoom.
    pub fn container_to_content(&mut self, pos: Point) -> Point {
        let adjust = self.content_adjust(self.zoom_scale);
        Point::new(
            (pos.x + self.content_offset.x - adjust.x) / self.zoom_scale,
            (pos.y + self.content_offset.y - adjust.y) / self.zoom_scale,
        )
    }

    /// Inverse of [`container_to_content`](Self::container_to_content).
    pub fn content_to_container(&mut self, pos: Point) -> Point {
        let adjust = self.content_adjust(self.zoom_scale);
        Point::new(
            pos.x * self.zoom_scale - self.content_offset.x + adjust.x,
            pos.y * self.zoom_scale - self.content_offset.y + adjust.y,
        )
    }

    pub fn minimum_content_offset(&self, _scale: f64) -> Point {
        Point::ZERO
    }

    pub fn maximum_content_offset(&mut self, scale: f64) -> Point {
        let size = self.content_size_at(scale);
        let adjust = self.content_adjust(scale);
        Point::new(
            (size.width - self.container_size.width + adjust.x).max(0.0),
            (size.height - self.container_size.height + adjust.y).max(0.0),
        )
    }

    // ── Clamping ─────────────────────────────────────────────────────────

    /// Bound an offset to the scrollable range. With `bounce`, axes where
    /// bouncing applies get elastic overrun (stiffness scaled by the zoom
    /// so the give feels the same at every zoom level); other axes clamp
    /// hard.
    pub fn limit_content_offset(&mut self, offset: Point, bounce: bool, scale: f64) -> Point {
        let min = self.minimum_content_offset(scale);
        let max = self.maximum_content_offset(scale);
        let size = self.content_size_at(scale);

        let (bounce_x, bounce_y) = if bounce {
            match self.scroll_bounce {
                ScrollBounce::Auto => (
                    self.container_size.width < size.width,
                    self.container_size.height < size.height,
                ),
                ScrollBounce::On => (true, true),
                ScrollBounce::Off => (false, false),
            }
        } else {
            (false, false)
        };

        let x = if bounce_x {
            limit_spring(min.x, offset.x, max.x, 4.0 / scale)
        } else {
            offset.x.clamp(min.x, max.x)
        };
        let y = if bounce_y {
            limit_spring(min.y, offset.y, max.y, 4.0 / scale)
        } else {
            offset.y.clamp(min.y, max.y)
        };
        Point::new(x, y)
    }

    /// Bound a zoom scale; `spring` gives elastic overrun for live pinch.
    pub fn limit_zoom_scale(&self, scale: f64, spring: bool) -> f64 {
        if spring {
            limit_spring(
                self.minimum_zoom_scale,
                scale,
                self.maximum_zoom_scale,
                PINCH_STIFFNESS,
            )
        } else {
            scale.clamp(self.minimum_zoom_scale, self.maximum_zoom_scale)
        }
    }

    // ── Zoom targeting ───────────────────────────────────────────────────

    /// Zoom so that `rect` (content coordinates) fills the container,
    /// preserving aspect (fit, no stretch). Returns false and leaves the
    /// state untouched for degenerate rects.
    pub fn zoom_to(&mut self, rect: Rect, limit_offset: bool) -> bool {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            log::warn!(
                "zoom_to rejected degenerate rect {}x{}",
                rect.width,
                rect.height
            );
            return false;
        }
        let scale_x = self.container_size.width / rect.width;
        let scale_y = self.container_size.height / rect.height;
        let new_scale = scale_x.min(scale_y);
        let mut new_offset = Point::new(rect.x * new_scale, rect.y * new_scale);
        if limit_offset {
            new_offset = self.limit_content_offset(new_offset, false, new_scale);
        }
        self.content_offset = new_offset;
        self.zoom_scale = new_scale;
        true
    }

    /// Zoom toward a content-space anchor point: the visible rect is
    /// shrunk/grown around `pos` by the ratio of the current scale to the
    /// new one, then fitted via [`zoom_to`](Self::zoom_to).
    pub fn zoom_to_point(&mut self, pos: Point, scale: f64) -> bool {
        if self.zoom_scale <= 0.0 || scale <= 0.0 {
            log::warn!(
                "zoom_to_point rejected scale {scale} at current zoom {}",
                self.zoom_scale
            );
            return false;
        }
        let adjust = self.content_adjust(self.zoom_scale);
        let current = Rect::new(
            (self.content_offset.x - adjust.x) / self.zoom_scale,
            (self.content_offset.y - adjust.y) / self.zoom_scale,
            self.container_size.width / self.zoom_scale,
            self.container_size.height / self.zoom_scale,
        );
        let ratio = self.zoom_scale / scale;
        let rect = Rect::new(
            pos.x - (pos.x - current.x) * ratio,
            pos.y - (pos.y - current.y) * ratio,
            current.width * ratio,
            current.height * ratio,
        );
        self.zoom_to(rect, true)
    }

    // ── Gesture state machines ───────────────────────────────────────────

    /// Double tap toggles between a 4x zoom anchored at the tapped point
    /// and the home position. `center` is in container coordinates.
    pub fn handle_double_tap(&mut self, center: Point) -> Transition {
        if self.locked || self.pinch_start_zoom.is_some() {
            return Transition::None;
        }
        if self.zoom_scale != 1.0 {
            self.content_offset = Point::ZERO;
            self.zoom_scale = 1.0;
            Transition::Animated
        } else {
            let pos = self.container_to_content(center);
            if self.zoom_to_point(pos, DOUBLE_TAP_ZOOM) {
                Transition::Animated
            } else {
                Transition::None
            }
        }
    }

    /// Pan state machine. `delta` is cumulative since the pan started.
    /// Live moves bounce; releasing outside the hard bounds snaps back.
    pub fn handle_pan(&mut self, phase: GesturePhase, delta: Point) -> Transition {
        if self.locked || self.pinch_start_zoom.is_some() {
            return Transition::None;
        }
        match phase {
            GesturePhase::Start => {
                self.pan_start_offset = Some(self.content_offset);
                Transition::None
            }
            GesturePhase::Move => {
                let Some(start) = self.pan_start_offset else {
                    return Transition::None;
                };
                let candidate = Point::new(start.x - delta.x, start.y - delta.y);
                self.content_offset =
                    self.limit_content_offset(candidate, true, self.zoom_scale);
                Transition::Immediate
            }
            GesturePhase::End | GesturePhase::Cancel => {
                self.pan_start_offset = None;
                // Release check uses the hard bounds, not the bounce-aware
                // clamp; a bounced offset outside [min, max] snaps back.
                let min = self.minimum_content_offset(self.zoom_scale);
                let max = self.maximum_content_offset(self.zoom_scale);
                let offset = self.content_offset;
                if offset.x < min.x
                    || offset.x > max.x
                    || offset.y < min.y
                    || offset.y > max.y
                {
                    self.content_offset = Point::new(
                        offset.x.clamp(min.x, max.x),
                        offset.y.clamp(min.y, max.y),
                    );
                    Transition::Animated
                } else {
                    Transition::None
                }
            }
        }
    }

    /// Pinch state machine. Live moves zoom to the pinch midpoint with
    /// spring overrun; release snaps back inside the zoom bounds.
    /// `center` is in container coordinates, `event_scale` is the ratio
    /// since the gesture began.
    pub fn handle_pinch(
        &mut self,
        phase: GesturePhase,
        event_scale: f64,
        center: Point,
    ) -> Transition {
        if self.locked {
            return Transition::None;
        }
        match phase {
            GesturePhase::Start => {
                self.pinch_start_zoom = Some(self.zoom_scale);
                Transition::None
            }
            GesturePhase::Move => {
                let Some(start_zoom) = self.pinch_start_zoom else {
                    return Transition::None;
                };
                let scale = self.limit_zoom_scale(start_zoom * event_scale, true);
                let pos = self.container_to_content(center);
                self.last_pinch_center = Some(pos);
                if self.zoom_to_point(pos, scale) {
                    Transition::Immediate
                } else {
                    Transition::None
                }
            }
            GesturePhase::End | GesturePhase::Cancel => {
                self.pinch_start_zoom = None;
                if self.zoom_scale < self.minimum_zoom_scale {
                    self.content_offset = Point::ZERO;
                    self.zoom_scale = self.minimum_zoom_scale;
                    Transition::Animated
                } else if self.zoom_scale > self.maximum_zoom_scale {
                    if let Some(center) = self.last_pinch_center {
                        self.zoom_to_point(center, self.maximum_zoom_scale);
                    } else {
                        self.zoom_scale = self.maximum_zoom_scale;
                    }
                    Transition::Animated
                } else {
                    Transition::None
                }
            }
        }
    }

    /// Wheel zoom, anchored at the cursor. Scroll up zooms in by the wheel
    /// factor, scroll down zooms out by its inverse; no spring. Not gated
    /// by `lock`. `center` is in container coordinates.
    pub fn handle_wheel(&mut self, delta_y: f64, center: Point) -> Transition {
        let pos = self.container_to_content(center);
        let target = if delta_y < 0.0 {
            self.zoom_scale * self.wheel_zoom_scale
        } else if delta_y > 0.0 {
            self.zoom_scale / self.wheel_zoom_scale
        } else {
            return Transition::None;
        };
        let scale = self.limit_zoom_scale(target, false);
        if self.zoom_to_point(pos, scale) {
            Transition::Immediate
        } else {
            Transition::None
        }
    }
}

fn adjust_axis(
    container: f64,
    content: f64,
    near: Option<f64>,
    far: Option<f64>,
    scale: f64,
) -> f64 {
    match (near, far) {
        (None, Some(far)) => (container - content - far) / scale,
        (Some(near), None) => near / scale,
        (Some(near), Some(far)) => ((container - content - far) / scale).max(near / scale),
        (None, None) => ((container - content) / 2.0).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MarginValue;

    fn engine(container: Size, content: Size) -> ViewportEngine {
        let mut e = ViewportEngine::new(&ViewportOptions::default());
        e.set_container_size(container);
        e.set_base_content_size(content);
        e
    }

    fn engine_with(
        container: Size,
        content: Size,
        options: ViewportOptions,
    ) -> ViewportEngine {
        let mut e = ViewportEngine::new(&options);
        e.set_container_size(container);
        e.set_base_content_size(content);
        e
    }

    // ── Geometry ────────────────────────────────────────────────────────

    #[test]
    fn undersized_content_is_centered_by_default() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(200.0, 100.0));
        let adjust = e.content_adjust(1.0);
        assert_eq!(adjust, Point::new(100.0, 100.0));
    }

    #[test]
    fn oversized_content_centers_at_zero() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        assert_eq!(e.content_adjust(1.0), Point::ZERO);
    }

    #[test]
    fn near_margin_pins_the_near_edge() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(200.0, 100.0));
        e.set_content_margin(Margin {
            left: MarginValue::Px(30.0),
            ..Margin::auto()
        });
        let adjust = e.content_adjust(2.0);
        assert_eq!(adjust.x, 15.0); // 30 / scale
    }

    #[test]
    fn far_margin_pins_the_far_edge() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(200.0, 100.0));
        e.set_content_margin(Margin {
            right: MarginValue::Px(50.0),
            ..Margin::auto()
        });
        let adjust = e.content_adjust(1.0);
        assert_eq!(adjust.x, 150.0); // (400 - 200 - 50) / 1
    }

    #[test]
    fn both_margins_take_the_larger_candidate() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(200.0, 100.0));
        e.set_content_margin(Margin {
            left: MarginValue::Px(250.0),
            right: MarginValue::Px(50.0),
            ..Margin::auto()
        });
        // far candidate (400-200-50) = 150 < near 250, near wins
        assert_eq!(e.content_adjust(1.0).x, 250.0);

        e.set_content_margin(Margin {
            left: MarginValue::Px(20.0),
            right: MarginValue::Px(50.0),
            ..Margin::auto()
        });
        assert_eq!(e.content_adjust(1.0).x, 150.0);
    }

    #[test]
    fn percent_margin_resolves_against_container_edges() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(200.0, 100.0));
        e.set_content_margin(Margin {
            left: MarginValue::Percent(10.0),
            top: MarginValue::Percent(10.0),
            ..Margin::auto()
        });
        let adjust = e.content_adjust(1.0);
        assert_eq!(adjust.x, 40.0); // 10% of width 400
        assert_eq!(adjust.y, 30.0); // 10% of height 300
    }

    #[test]
    fn margin_cache_invalidated_on_container_resize() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(200.0, 100.0));
        e.set_content_margin(Margin {
            left: MarginValue::Percent(10.0),
            ..Margin::auto()
        });
        assert_eq!(e.margin_in_pixel().left, Some(40.0));
        e.set_container_size(Size::new(800.0, 300.0));
        assert_eq!(e.margin_in_pixel().left, Some(80.0));
    }

    #[test]
    fn maximum_offset_accounts_for_container_and_adjust() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        assert_eq!(e.minimum_content_offset(1.0), Point::ZERO);
        assert_eq!(e.maximum_content_offset(1.0), Point::new(400.0, 300.0));
        // Undersized content never scrolls.
        let mut e = engine(Size::new(400.0, 300.0), Size::new(200.0, 100.0));
        assert_eq!(e.maximum_content_offset(1.0).y, 0.0);
    }

    #[test]
    fn container_content_round_trip() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(200.0, 100.0));
        e.set_content_offset(Point::new(17.0, -4.0));
        e.set_zoom_scale(2.5);
        e.set_content_margin(Margin {
            left: MarginValue::Px(12.0),
            ..Margin::auto()
        });
        for p in [
            Point::ZERO,
            Point::new(50.0, 50.0),
            Point::new(199.0, 99.0),
        ] {
            let in_container = e.content_to_container(p);
            let back = e.container_to_content(in_container);
            assert!(
                (back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9,
                "round trip failed for {p:?}: got {back:?}"
            );
        }
    }

    // ── Clamping ────────────────────────────────────────────────────────

    #[test]
    fn limit_content_offset_is_identity_inside_bounds() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        for x in [0.0, 100.0, 400.0] {
            for y in [0.0, 150.0, 300.0] {
                let offset = Point::new(x, y);
                assert_eq!(e.limit_content_offset(offset, false, 1.0), offset);
            }
        }
    }

    #[test]
    fn bounce_off_clamps_hard() {
        let mut e = engine_with(
            Size::new(400.0, 300.0),
            Size::new(800.0, 600.0),
            ViewportOptions {
                scroll_bounce: ScrollBounce::Off,
                ..Default::default()
            },
        );
        let limited = e.limit_content_offset(Point::new(-50.0, 100.0), true, 1.0);
        assert_eq!(limited, Point::new(0.0, 100.0));
    }

    #[test]
    fn bounce_auto_springs_only_on_overflowing_axes() {
        // Content wider but shorter than the container.
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 100.0));
        let limited = e.limit_content_offset(Point::new(-50.0, -50.0), true, 1.0);
        assert!(limited.x < 0.0, "x overflows, so it bounces");
        assert!(limited.x > -50.0);
        assert_eq!(limited.y, 0.0, "y fits, so it clamps hard");
    }

    #[test]
    fn zoom_limit_hard_and_springy() {
        let e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        assert_eq!(e.limit_zoom_scale(10.0, false), 5.5);
        assert_eq!(e.limit_zoom_scale(0.1, false), 0.5);
        assert_eq!(e.limit_zoom_scale(3.0, false), 3.0);

        let sprung = e.limit_zoom_scale(10.0, true);
        assert!(sprung > 5.5 && sprung < 10.0);
        let sprung = e.limit_zoom_scale(0.1, true);
        assert!(sprung < 0.5 && sprung > 0.1);
    }

    // ── Zoom targeting ──────────────────────────────────────────────────

    #[test]
    fn zoom_to_fits_rect_preserving_aspect() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        assert!(e.zoom_to(Rect::new(0.0, 0.0, 200.0, 150.0), false));
        assert_eq!(e.zoom_scale(), 2.0); // min(400/200, 300/150)
        assert_eq!(e.content_offset(), Point::ZERO);
        assert_eq!(e.content_size(), Size::new(1600.0, 1200.0));

        // A wide rect is constrained by the height.
        assert!(e.zoom_to(Rect::new(10.0, 20.0, 400.0, 100.0), false));
        assert_eq!(e.zoom_scale(), 1.0); // min(400/400, 300/100)
        assert_eq!(e.content_offset(), Point::new(10.0, 20.0));
    }

    #[test]
    fn zoom_to_rejects_degenerate_rects() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        e.set_content_offset(Point::new(5.0, 6.0));
        assert!(!e.zoom_to(Rect::new(0.0, 0.0, 0.0, 100.0), false));
        assert!(!e.zoom_to(Rect::new(0.0, 0.0, 100.0, -1.0), true));
        assert_eq!(e.content_offset(), Point::new(5.0, 6.0));
        assert_eq!(e.zoom_scale(), 1.0);
    }

    #[test]
    fn zoom_to_point_keeps_anchor_fixed() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        let anchor = Point::new(200.0, 150.0);
        let before = e.content_to_container(anchor);
        assert!(e.zoom_to_point(anchor, 2.0));
        assert_eq!(e.zoom_scale(), 2.0);
        let after = e.content_to_container(anchor);
        assert!(
            (before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9,
            "anchor moved from {before:?} to {after:?}"
        );
    }

    // ── Double tap ──────────────────────────────────────────────────────

    #[test]
    fn double_tap_zooms_in_centered_then_resets() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        // Tap the middle of the container: content point (200, 150).
        let t = e.handle_double_tap(Point::new(200.0, 150.0));
        assert_eq!(t, Transition::Animated);
        assert_eq!(e.zoom_scale(), 4.0);
        // The visible rect recenters on the tapped content point.
        let adjust = e.content_adjust(4.0);
        let visible_center = Point::new(
            (e.content_offset().x - adjust.x) / 4.0 + 400.0 / 4.0 / 2.0,
            (e.content_offset().y - adjust.y) / 4.0 + 300.0 / 4.0 / 2.0,
        );
        assert!((visible_center.x - 200.0).abs() < 1e-9);
        assert!((visible_center.y - 150.0).abs() < 1e-9);

        // Second double tap goes home.
        let t = e.handle_double_tap(Point::new(10.0, 10.0));
        assert_eq!(t, Transition::Animated);
        assert_eq!(e.zoom_scale(), 1.0);
        assert_eq!(e.content_offset(), Point::ZERO);
    }

    #[test]
    fn double_tap_ignored_while_locked_or_pinching() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        e.lock(true);
        assert_eq!(e.handle_double_tap(Point::new(10.0, 10.0)), Transition::None);
        assert_eq!(e.zoom_scale(), 1.0);
        e.lock(false);
        e.handle_pinch(GesturePhase::Start, 1.0, Point::ZERO);
        assert_eq!(e.handle_double_tap(Point::new(10.0, 10.0)), Transition::None);
    }

    // ── Pan ─────────────────────────────────────────────────────────────

    #[test]
    fn pan_moves_content_against_the_drag() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        e.set_content_offset(Point::new(100.0, 100.0));
        assert_eq!(e.handle_pan(GesturePhase::Start, Point::ZERO), Transition::None);
        let t = e.handle_pan(GesturePhase::Move, Point::new(30.0, -20.0));
        assert_eq!(t, Transition::Immediate);
        assert_eq!(e.content_offset(), Point::new(70.0, 120.0));
        assert_eq!(e.handle_pan(GesturePhase::End, Point::ZERO), Transition::None);
    }

    #[test]
    fn pan_beyond_bound_with_bounce_off_clamps_exactly() {
        let mut e = engine_with(
            Size::new(400.0, 300.0),
            Size::new(800.0, 600.0),
            ViewportOptions {
                scroll_bounce: ScrollBounce::Off,
                ..Default::default()
            },
        );
        e.handle_pan(GesturePhase::Start, Point::ZERO);
        e.handle_pan(GesturePhase::Move, Point::new(50.0, 0.0));
        assert_eq!(e.content_offset(), Point::ZERO, "no overshoot with bounce off");
    }

    #[test]
    fn pan_release_snaps_back_after_bounce() {
        let mut e = engine_with(
            Size::new(400.0, 300.0),
            Size::new(800.0, 600.0),
            ViewportOptions {
                scroll_bounce: ScrollBounce::On,
                ..Default::default()
            },
        );
        e.handle_pan(GesturePhase::Start, Point::ZERO);
        e.handle_pan(GesturePhase::Move, Point::new(80.0, 0.0));
        let live = e.content_offset();
        assert!(live.x < 0.0, "live drag bounces past the edge");
        assert!(live.x > -80.0);

        let t = e.handle_pan(GesturePhase::End, Point::new(80.0, 0.0));
        assert_eq!(t, Transition::Animated);
        assert_eq!(e.content_offset(), Point::ZERO, "release snaps to the bound");
    }

    #[test]
    fn pan_release_inside_bounds_leaves_offset_alone() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        e.handle_pan(GesturePhase::Start, Point::ZERO);
        e.handle_pan(GesturePhase::Move, Point::new(-120.0, -90.0));
        assert_eq!(e.content_offset(), Point::new(120.0, 90.0));
        assert_eq!(e.handle_pan(GesturePhase::End, Point::ZERO), Transition::None);
        assert_eq!(e.content_offset(), Point::new(120.0, 90.0));
    }

    #[test]
    fn pan_ignored_while_locked_or_pinching() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        e.lock(true);
        assert_eq!(
            e.handle_pan(GesturePhase::Start, Point::ZERO),
            Transition::None
        );
        e.lock(false);
        e.handle_pinch(GesturePhase::Start, 1.0, Point::ZERO);
        assert_eq!(
            e.handle_pan(GesturePhase::Move, Point::new(10.0, 0.0)),
            Transition::None
        );
        assert_eq!(e.content_offset(), Point::ZERO);
    }

    #[test]
    fn pan_move_without_start_is_a_no_op() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        assert_eq!(
            e.handle_pan(GesturePhase::Move, Point::new(10.0, 10.0)),
            Transition::None
        );
    }

    // ── Pinch ───────────────────────────────────────────────────────────

    #[test]
    fn pinch_zooms_live_and_stays_in_bounds_at_rest() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        let center = Point::new(200.0, 150.0);
        e.handle_pinch(GesturePhase::Start, 1.0, center);
        let t = e.handle_pinch(GesturePhase::Move, 1.5, center);
        assert_eq!(t, Transition::Immediate);
        assert!((e.zoom_scale() - 1.5).abs() < 1e-9);
        assert_eq!(e.handle_pinch(GesturePhase::End, 1.5, center), Transition::None);
        assert!((e.zoom_scale() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn pinch_overrun_springs_then_snaps_to_maximum() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        let center = Point::new(200.0, 150.0);
        e.handle_pinch(GesturePhase::Start, 1.0, center);
        e.handle_pinch(GesturePhase::Move, 20.0, center);
        let live = e.zoom_scale();
        assert!(live > 5.5, "live pinch may exceed the maximum");
        assert!(live < 20.0, "but the spring softens it");

        let t = e.handle_pinch(GesturePhase::End, 20.0, center);
        assert_eq!(t, Transition::Animated);
        assert!((e.zoom_scale() - 5.5).abs() < 1e-9, "at rest the bound holds");
    }

    #[test]
    fn pinch_below_minimum_snaps_home() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        let center = Point::new(100.0, 100.0);
        e.handle_pinch(GesturePhase::Start, 1.0, center);
        e.handle_pinch(GesturePhase::Move, 0.05, center);
        assert!(e.zoom_scale() < 0.5);
        let t = e.handle_pinch(GesturePhase::End, 0.05, center);
        assert_eq!(t, Transition::Animated);
        assert_eq!(e.zoom_scale(), 0.5);
        assert_eq!(e.content_offset(), Point::ZERO);
    }

    #[test]
    fn pinch_ignored_while_locked() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        e.lock(true);
        e.handle_pinch(GesturePhase::Start, 1.0, Point::ZERO);
        assert_eq!(
            e.handle_pinch(GesturePhase::Move, 2.0, Point::ZERO),
            Transition::None
        );
        assert_eq!(e.zoom_scale(), 1.0);
    }

    // ── Wheel ───────────────────────────────────────────────────────────

    #[test]
    fn wheel_zoom_steps_match_the_wheel_factor() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        let center = Point::new(200.0, 150.0);
        assert_eq!(e.handle_wheel(-1.0, center), Transition::Immediate);
        assert!((e.zoom_scale() - 1.1).abs() < 1e-9);

        // Two downward ticks from 1.0: 1/1.1/1.1.
        e.set_zoom_scale(1.0);
        e.handle_wheel(1.0, center);
        e.handle_wheel(1.0, center);
        assert!((e.zoom_scale() - 1.0 / 1.1 / 1.1).abs() < 1e-9);
    }

    #[test]
    fn wheel_zoom_clamps_at_the_bounds() {
        let mut e = engine_with(
            Size::new(400.0, 300.0),
            Size::new(800.0, 600.0),
            ViewportOptions {
                minimum_zoom_scale: 0.95,
                maximum_zoom_scale: 1.05,
                ..Default::default()
            },
        );
        let center = Point::new(200.0, 150.0);
        e.handle_wheel(-1.0, center);
        assert_eq!(e.zoom_scale(), 1.05);
        e.handle_wheel(1.0, center);
        e.handle_wheel(1.0, center);
        assert_eq!(e.zoom_scale(), 0.95);
    }

    #[test]
    fn wheel_still_works_while_locked() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        e.lock(true);
        assert_eq!(
            e.handle_wheel(-1.0, Point::new(200.0, 150.0)),
            Transition::Immediate
        );
        assert!((e.zoom_scale() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn zero_wheel_delta_is_ignored() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        assert_eq!(e.handle_wheel(0.0, Point::ZERO), Transition::None);
        assert_eq!(e.zoom_scale(), 1.0);
    }

    // ── Invariants across gesture sequences ─────────────────────────────

    #[test]
    fn zoom_stays_bounded_at_rest_after_mixed_gestures() {
        let mut e = engine(Size::new(400.0, 300.0), Size::new(800.0, 600.0));
        let c = Point::new(150.0, 150.0);

        e.handle_pinch(GesturePhase::Start, 1.0, c);
        e.handle_pinch(GesturePhase::Move, 30.0, c);
        e.handle_pinch(GesturePhase::End, 30.0, c);
        assert!(e.zoom_scale() <= 5.5 + 1e-9);

        for _ in 0..40 {
            e.handle_wheel(1.0, c);
        }
        assert!(e.zoom_scale() >= 0.5 - 1e-9);

        e.handle_double_tap(c);
        e.handle_double_tap(c);
        let z = e.zoom_scale();
        assert!((0.5..=5.5).contains(&z), "zoom {z} escaped its bounds");
    }
}
