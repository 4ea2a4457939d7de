//! The DOM-facing scroll view widget.
//!
//! `ScrollView` attaches to a container element, wraps its children in an
//! absolutely-positioned content root, and keeps the content root's CSS
//! transform in sync with the [`ViewportEngine`]. Animation is declarative:
//! an animated layout just sets a CSS transition duration before writing
//! the transform, and a later write retargets any transition still in
//! flight.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Element, Event, HtmlElement, MouseEvent, TouchEvent, TouchList,
};

use super::recognizer::{Gesture, GestureRecognizer, DOUBLE_TAP_WINDOW_MS};
use crate::engine::{Transition, ViewportEngine};
use crate::error::ScrollViewError;
use crate::geometry::{Margin, Point, Rect, Size};
use crate::gesture::{GestureDelegate, TapEvent, WheelTick};
use crate::options::ViewportOptions;

/// Duration of animated transitions, in seconds.
const ANIMATION_DURATION: f64 = 0.25;

/// Anything that can hand over a DOM element to become the view's content.
pub trait IntoContentElement {
    fn into_content_element(self) -> Element;
}

impl IntoContentElement for Element {
    fn into_content_element(self) -> Element {
        self
    }
}

impl IntoContentElement for HtmlElement {
    fn into_content_element(self) -> Element {
        self.into()
    }
}

struct Shared {
    engine: RefCell<ViewportEngine>,
    recognizer: RefCell<GestureRecognizer>,
    container: HtmlElement,
    content_root: HtmlElement,
    delegate: RefCell<Option<Rc<dyn GestureDelegate>>>,
    layout_timer: Cell<Option<i32>>,
    tap_timer: Cell<Option<i32>>,
    destroyed: Cell<bool>,
}

impl Shared {
    fn measure_container(&self) {
        let size = Size::new(
            self.container.client_width() as f64,
            self.container.client_height() as f64,
        );
        self.engine.borrow_mut().set_container_size(size);
    }

    /// Re-measure the content if the cached base size was invalidated.
    /// The base size is the union of the children's offset boxes.
    fn ensure_measured(&self) {
        if !self.engine.borrow().needs_measure() {
            return;
        }
        let mut size = Size::ZERO;
        let children = self.content_root.children();
        for i in 0..children.length() {
            let Some(child) = children.item(i) else {
                continue;
            };
            let Ok(child) = child.dyn_into::<HtmlElement>() else {
                continue;
            };
            let right = (child.offset_left() + child.offset_width()) as f64;
            let bottom = (child.offset_top() + child.offset_height()) as f64;
            size.width = size.width.max(right);
            size.height = size.height.max(bottom);
        }
        self.engine.borrow_mut().set_base_content_size(size);
    }

    /// Sum of the positioned offsets of the container's offset-parent
    /// chain, i.e. the container origin in page coordinates.
    fn container_origin(&self) -> Point {
        let mut origin = Point::ZERO;
        let mut element = Some(self.container.clone());
        while let Some(el) = element {
            origin.x += el.offset_left() as f64;
            origin.y += el.offset_top() as f64;
            element = el
                .offset_parent()
                .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        }
        origin
    }

    fn global_to_container(&self, pos: Point) -> Point {
        pos - self.container_origin()
    }

    /// Write the composed transform. A zero-size container is reported and
    /// skipped rather than producing a degenerate transform; the state is
    /// left intact for a retry after remeasure.
    fn layout(&self, duration: f64) {
        self.ensure_measured();
        let container = self.engine.borrow().container_size();
        if container.is_empty() {
            log::error!(
                "layout aborted: container measures {}x{}",
                container.width,
                container.height
            );
            return;
        }

        let style = self.content_root.style();
        if duration > 0.0 {
            // An explicit animated layout supersedes any pending deferred
            // layout, which would otherwise kill the transition next tick.
            if let Some(id) = self.layout_timer.take() {
                if let Some(win) = web_sys::window() {
                    win.clear_timeout_with_handle(id);
                }
            }
            let _ = style.set_property("transition", &format!("transform {duration}s"));
        } else {
            let _ = style.set_property("transition", "none");
        }

        let (adjust, offset, zoom) = {
            let mut engine = self.engine.borrow_mut();
            let zoom = engine.zoom_scale();
            (engine.content_adjust(zoom), engine.content_offset(), zoom)
        };
        let transform = format!(
            "translate({}px,{}px) scale({:.4})",
            adjust.x - offset.x,
            adjust.y - offset.y,
            zoom
        );
        let _ = style.set_property("transform", &transform);
    }

    /// Coalesce layout requests into one pass per event-loop turn.
    fn schedule_layout(self: &Rc<Self>) {
        if self.layout_timer.get().is_some() {
            return;
        }
        let shared = Rc::clone(self);
        let cb = Closure::once_into_js(move || {
            shared.layout_timer.set(None);
            if !shared.destroyed.get() {
                shared.layout(0.0);
            }
        });
        if let Some(win) = web_sys::window() {
            if let Ok(id) =
                win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), 0)
            {
                self.layout_timer.set(Some(id));
            }
        }
    }

    /// Fire the deferred single tap once the double-tap window has passed
    /// without a second tap claiming it.
    fn schedule_tap_resolution(self: &Rc<Self>) {
        if self.tap_timer.get().is_some() {
            return;
        }
        let shared = Rc::clone(self);
        let cb = Closure::once_into_js(move || {
            shared.tap_timer.set(None);
            if shared.destroyed.get() {
                return;
            }
            let tap = shared.recognizer.borrow_mut().resolve_pending_tap();
            if let Some(event) = tap {
                shared.fire_single_tap(&event);
            }
        });
        if let Some(win) = web_sys::window() {
            if let Ok(id) = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.unchecked_ref(),
                DOUBLE_TAP_WINDOW_MS as i32,
            ) {
                self.tap_timer.set(Some(id));
            }
        }
    }

    fn delegate_handled(&self, f: impl FnOnce(&dyn GestureDelegate) -> bool) -> bool {
        let delegate = self.delegate.borrow().clone();
        match delegate {
            Some(d) => f(&*d),
            None => false,
        }
    }

    fn fire_single_tap(&self, event: &TapEvent) {
        // Single tap has no default behavior; the delegate gets a chance
        // and that is all.
        self.delegate_handled(|d| d.handle_single_tap(event));
    }

    fn apply(self: &Rc<Self>, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::Immediate => self.layout(0.0),
            Transition::Animated => self.layout(ANIMATION_DURATION),
        }
    }

    fn dispatch(self: &Rc<Self>, gestures: Vec<Gesture>) {
        for gesture in gestures {
            match gesture {
                Gesture::SingleTap(event) => self.fire_single_tap(&event),
                Gesture::SingleTapPending => self.schedule_tap_resolution(),
                Gesture::DoubleTap(event) => {
                    if self.delegate_handled(|d| d.handle_double_tap(&event)) {
                        continue;
                    }
                    self.ensure_measured();
                    let center = self.global_to_container(event.center);
                    let transition = self.engine.borrow_mut().handle_double_tap(center);
                    self.apply(transition);
                }
                Gesture::Pan(event) => {
                    if self.delegate_handled(|d| d.handle_pan(&event)) {
                        continue;
                    }
                    self.ensure_measured();
                    let transition =
                        self.engine.borrow_mut().handle_pan(event.phase, event.delta);
                    self.apply(transition);
                }
                Gesture::Pinch(event) => {
                    if self.delegate_handled(|d| d.handle_pinch(&event)) {
                        continue;
                    }
                    self.ensure_measured();
                    let center = self.global_to_container(event.center);
                    let transition = self
                        .engine
                        .borrow_mut()
                        .handle_pinch(event.phase, event.scale, center);
                    self.apply(transition);
                }
            }
        }
    }

    fn handle_wheel(self: &Rc<Self>, tick: WheelTick) {
        self.ensure_measured();
        let center = self.global_to_container(tick.center);
        let transition = self.engine.borrow_mut().handle_wheel(tick.delta_y, center);
        self.apply(transition);
    }

    fn handle_resize(self: &Rc<Self>) {
        self.measure_container();
        self.engine.borrow_mut().invalidate_size();
        self.schedule_layout();
    }

    fn clear_timers(&self) {
        let win = web_sys::window();
        for id in [self.layout_timer.take(), self.tap_timer.take()]
            .into_iter()
            .flatten()
        {
            if let Some(win) = &win {
                win.clear_timeout_with_handle(id);
            }
        }
    }
}

struct Listeners {
    mouse_down: Closure<dyn FnMut(MouseEvent)>,
    mouse_move: Closure<dyn FnMut(MouseEvent)>,
    mouse_up: Closure<dyn FnMut(MouseEvent)>,
    touch_start: Closure<dyn FnMut(TouchEvent)>,
    touch_move: Closure<dyn FnMut(TouchEvent)>,
    touch_end: Closure<dyn FnMut(TouchEvent)>,
    touch_cancel: Closure<dyn FnMut(TouchEvent)>,
    wheel: Closure<dyn FnMut(web_sys::WheelEvent)>,
    resize: Option<Closure<dyn FnMut(Event)>>,
}

/// A pannable, zoomable scroll view bound to a container element.
///
/// Dropping the view detaches all listeners; the content element itself is
/// never removed from the DOM.
pub struct ScrollView {
    shared: Rc<Shared>,
    listeners: RefCell<Option<Listeners>>,
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

fn mouse_point(event: &MouseEvent) -> Point {
    Point::new(event.page_x() as f64, event.page_y() as f64)
}

fn touch_points(list: &TouchList) -> Vec<Point> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| Point::new(t.page_x() as f64, t.page_y() as f64))
        .collect()
}

impl ScrollView {
    /// Attach a scroll view to the element with the given id, or failing
    /// that, the first element matching it as a selector.
    pub fn attach_to(target: &str, options: ViewportOptions) -> Result<Self, ScrollViewError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(ScrollViewError::NoWindow)?;
        let element = document
            .get_element_by_id(target)
            .or_else(|| document.query_selector(target).ok().flatten())
            .ok_or_else(|| ScrollViewError::MissingContainer(target.to_string()))?;
        Self::attach(element, options)
    }

    /// Attach a scroll view to a container element. Existing children are
    /// moved into the view's content root.
    pub fn attach(container: Element, options: ViewportOptions) -> Result<Self, ScrollViewError> {
        let window = web_sys::window().ok_or(ScrollViewError::NoWindow)?;
        let document = window.document().ok_or(ScrollViewError::NoWindow)?;
        let container: HtmlElement = container
            .dyn_into()
            .map_err(|_| ScrollViewError::NotAnElement)?;

        let _ = container.style().set_property("overflow", "hidden");

        let content_root: HtmlElement = document
            .create_element("div")
            .unwrap()
            .dyn_into()
            .unwrap();
        let _ = content_root.set_attribute("data-scrollview-root", "");
        let root_style = content_root.style();
        let _ = root_style.set_property("position", "absolute");
        let _ = root_style.set_property("width", "100%");
        let _ = root_style.set_property("height", "100%");
        let _ = root_style.set_property("transform-origin", "top left");

        // Adopt any children the container already has.
        while let Some(child) = container.first_element_child() {
            let _ = content_root.append_child(&child);
        }
        let _ = container.append_child(&content_root);

        let shared = Rc::new(Shared {
            engine: RefCell::new(ViewportEngine::new(&options)),
            recognizer: RefCell::new(GestureRecognizer::new(options.check_double_tap_failure)),
            container,
            content_root,
            delegate: RefCell::new(None),
            layout_timer: Cell::new(None),
            tap_timer: Cell::new(None),
            destroyed: Cell::new(false),
        });

        let listeners = Self::install_listeners(&shared, options.watch_resize);

        shared.handle_resize();

        Ok(ScrollView {
            shared,
            listeners: RefCell::new(Some(listeners)),
        })
    }

    fn install_listeners(shared: &Rc<Shared>, watch_resize: bool) -> Listeners {
        let mouse_down = {
            let shared = Rc::clone(shared);
            Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
                ev.prevent_default();
                let gestures = shared
                    .recognizer
                    .borrow_mut()
                    .on_press(mouse_point(&ev), now_ms());
                shared.dispatch(gestures);
            })
        };
        let mouse_move = {
            let shared = Rc::clone(shared);
            Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
                let gestures = shared.recognizer.borrow_mut().on_drag(mouse_point(&ev));
                if !gestures.is_empty() {
                    ev.prevent_default();
                    shared.dispatch(gestures);
                }
            })
        };
        let mouse_up = {
            let shared = Rc::clone(shared);
            Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
                let gestures = shared
                    .recognizer
                    .borrow_mut()
                    .on_release(mouse_point(&ev), now_ms());
                shared.dispatch(gestures);
            })
        };
        let touch_start = {
            let shared = Rc::clone(shared);
            Closure::<dyn FnMut(TouchEvent)>::new(move |ev: TouchEvent| {
                ev.prevent_default();
                let points = touch_points(&ev.touches());
                let gestures = shared
                    .recognizer
                    .borrow_mut()
                    .on_touch_start(&points, now_ms());
                shared.dispatch(gestures);
            })
        };
        let touch_move = {
            let shared = Rc::clone(shared);
            Closure::<dyn FnMut(TouchEvent)>::new(move |ev: TouchEvent| {
                ev.prevent_default();
                let points = touch_points(&ev.touches());
                let gestures = shared.recognizer.borrow_mut().on_touch_move(&points);
                shared.dispatch(gestures);
            })
        };
        let touch_end = {
            let shared = Rc::clone(shared);
            Closure::<dyn FnMut(TouchEvent)>::new(move |ev: TouchEvent| {
                let remaining = touch_points(&ev.touches());
                let released = ev
                    .changed_touches()
                    .get(0)
                    .map(|t| Point::new(t.page_x() as f64, t.page_y() as f64));
                let gestures = shared
                    .recognizer
                    .borrow_mut()
                    .on_touch_end(&remaining, released, now_ms());
                shared.dispatch(gestures);
            })
        };
        let touch_cancel = {
            let shared = Rc::clone(shared);
            Closure::<dyn FnMut(TouchEvent)>::new(move |_ev: TouchEvent| {
                let gestures = shared.recognizer.borrow_mut().on_touch_cancel();
                shared.dispatch(gestures);
            })
        };
        let wheel = {
            let shared = Rc::clone(shared);
            Closure::<dyn FnMut(web_sys::WheelEvent)>::new(move |ev: web_sys::WheelEvent| {
                ev.prevent_default();
                shared.handle_wheel(WheelTick {
                    center: Point::new(ev.page_x() as f64, ev.page_y() as f64),
                    delta_y: ev.delta_y(),
                });
            })
        };

        let container = &shared.container;
        let active = AddEventListenerOptions::new();
        active.set_passive(false);

        let _ = container.add_event_listener_with_callback(
            "mousedown",
            mouse_down.as_ref().unchecked_ref(),
        );
        let _ = container.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            touch_start.as_ref().unchecked_ref(),
            &active,
        );
        let _ = container.add_event_listener_with_callback_and_add_event_listener_options(
            "touchmove",
            touch_move.as_ref().unchecked_ref(),
            &active,
        );
        let _ = container
            .add_event_listener_with_callback("touchend", touch_end.as_ref().unchecked_ref());
        let _ = container.add_event_listener_with_callback(
            "touchcancel",
            touch_cancel.as_ref().unchecked_ref(),
        );
        let _ = container.add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            wheel.as_ref().unchecked_ref(),
            &active,
        );

        // Mouse moves and releases land on the document so drags keep
        // working outside the container bounds.
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let _ = document.add_event_listener_with_callback(
                "mousemove",
                mouse_move.as_ref().unchecked_ref(),
            );
            let _ = document
                .add_event_listener_with_callback("mouseup", mouse_up.as_ref().unchecked_ref());
        }

        let resize = if watch_resize {
            let shared_resize = Rc::clone(shared);
            let cb = Closure::<dyn FnMut(Event)>::new(move |_ev: Event| {
                shared_resize.handle_resize();
            });
            if let Some(win) = web_sys::window() {
                let _ =
                    win.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
            }
            Some(cb)
        } else {
            None
        };

        Listeners {
            mouse_down,
            mouse_move,
            mouse_up,
            touch_start,
            touch_move,
            touch_end,
            touch_cancel,
            wheel,
            resize,
        }
    }

    // ── Content & layout ─────────────────────────────────────────────────

    /// The container element this view is bound to.
    pub fn container(&self) -> HtmlElement {
        self.shared.container.clone()
    }

    /// Replace the view's content. The previous content is removed from
    /// the content root.
    pub fn set_content(&self, content: impl IntoContentElement) {
        self.shared.content_root.set_inner_html("");
        let _ = self
            .shared
            .content_root
            .append_child(&content.into_content_element());
        self.invalidate_size();
        self.set_needs_layout();
    }

    /// Drop cached content/margin measurements. Call after the content or
    /// the container changed size.
    pub fn invalidate_size(&self) {
        self.shared.engine.borrow_mut().invalidate_size();
    }

    /// Request a layout pass on the next event-loop turn. Multiple
    /// requests within one turn coalesce into a single pass.
    pub fn set_needs_layout(&self) {
        self.shared.schedule_layout();
    }

    /// Apply the current transform immediately, optionally animating over
    /// `duration` seconds (0 = no animation).
    pub fn layout(&self, duration: f64) {
        self.shared.layout(duration);
    }

    // ── Offset & zoom ────────────────────────────────────────────────────

    pub fn content_offset(&self) -> Point {
        self.shared.engine.borrow().content_offset()
    }

    pub fn set_content_offset(&self, offset: Point) {
        self.shared.engine.borrow_mut().set_content_offset(offset);
        self.set_needs_layout();
    }

    pub fn set_content_offset_animated(&self, offset: Point, animated: bool) {
        self.shared.engine.borrow_mut().set_content_offset(offset);
        self.layout(if animated { ANIMATION_DURATION } else { 0.0 });
    }

    pub fn zoom_scale(&self) -> f64 {
        self.shared.engine.borrow().zoom_scale()
    }

    pub fn set_zoom_scale(&self, scale: f64) {
        self.shared.engine.borrow_mut().set_zoom_scale(scale);
        self.set_needs_layout();
    }

    pub fn set_zoom_scale_animated(&self, scale: f64, animated: bool) {
        self.shared.engine.borrow_mut().set_zoom_scale(scale);
        self.layout(if animated { ANIMATION_DURATION } else { 0.0 });
    }

    /// Set offset and scale together, committing both in one layout pass.
    pub fn set_content_offset_and_zoom_scale(&self, offset: Point, scale: f64, animated: bool) {
        {
            let mut engine = self.shared.engine.borrow_mut();
            engine.set_content_offset(offset);
            engine.set_zoom_scale(scale);
        }
        self.layout(if animated { ANIMATION_DURATION } else { 0.0 });
    }

    pub fn content_margin(&self) -> Margin {
        self.shared.engine.borrow().content_margin()
    }

    pub fn set_content_margin(&self, margin: Margin) {
        self.shared.engine.borrow_mut().set_content_margin(margin);
    }

    pub fn minimum_zoom_scale(&self) -> f64 {
        self.shared.engine.borrow().minimum_zoom_scale()
    }

    pub fn set_minimum_zoom_scale(&self, scale: f64) {
        self.shared
            .engine
            .borrow_mut()
            .set_minimum_zoom_scale(scale);
    }

    pub fn maximum_zoom_scale(&self) -> f64 {
        self.shared.engine.borrow().maximum_zoom_scale()
    }

    pub fn set_maximum_zoom_scale(&self, scale: f64) {
        self.shared
            .engine
            .borrow_mut()
            .set_maximum_zoom_scale(scale);
    }

    pub fn wheel_zoom_scale(&self) -> f64 {
        self.shared.engine.borrow().wheel_zoom_scale()
    }

    pub fn set_wheel_zoom_scale(&self, scale: f64) {
        self.shared.engine.borrow_mut().set_wheel_zoom_scale(scale);
    }

    // ── Geometry queries ─────────────────────────────────────────────────

    /// Size of the content at the current zoom scale.
    pub fn get_content_size(&self) -> Size {
        self.shared.ensure_measured();
        self.shared.engine.borrow().content_size()
    }

    /// Convert a page-coordinate point into the container's space.
    pub fn global_to_container(&self, pos: Point) -> Point {
        self.shared.global_to_container(pos)
    }

    /// Convert a page-coordinate point into the content's space.
    pub fn global_to_content(&self, pos: Point) -> Point {
        self.shared.ensure_measured();
        let local = self.shared.global_to_container(pos);
        self.shared.engine.borrow_mut().container_to_content(local)
    }

    // ── Zoom targeting ───────────────────────────────────────────────────

    /// Zoom toward a content-space point.
    pub fn zoom_to_point(&self, pos: Point, scale: f64, animated: bool) {
        self.shared.ensure_measured();
        if self.shared.engine.borrow_mut().zoom_to_point(pos, scale) {
            self.layout(if animated { ANIMATION_DURATION } else { 0.0 });
        }
    }

    /// Zoom so the given content-space rect is visible, fit to the
    /// container while preserving aspect.
    pub fn zoom_to(&self, rect: Rect, limit_offset: bool, animated: bool) {
        self.shared.ensure_measured();
        if self.shared.engine.borrow_mut().zoom_to(rect, limit_offset) {
            self.layout(if animated { ANIMATION_DURATION } else { 0.0 });
        }
    }

    // ── Gestures ─────────────────────────────────────────────────────────

    /// Suppress default pan/pinch/double-tap handling (single tap and
    /// wheel stay live) without detaching any listeners.
    pub fn lock(&self, flag: bool) {
        self.shared.engine.borrow_mut().lock(flag);
    }

    pub fn set_gesture_delegate(&self, delegate: Option<Rc<dyn GestureDelegate>>) {
        *self.shared.delegate.borrow_mut() = delegate;
    }

    /// Detach all listeners and timers. The content element stays in the
    /// DOM; removing it is the caller's business. Safe to call twice.
    pub fn destroy(&self) {
        if self.shared.destroyed.replace(true) {
            return;
        }
        self.shared.clear_timers();

        let Some(listeners) = self.listeners.borrow_mut().take() else {
            return;
        };
        let container = &self.shared.container;
        let _ = container.remove_event_listener_with_callback(
            "mousedown",
            listeners.mouse_down.as_ref().unchecked_ref(),
        );
        let _ = container.remove_event_listener_with_callback(
            "touchstart",
            listeners.touch_start.as_ref().unchecked_ref(),
        );
        let _ = container.remove_event_listener_with_callback(
            "touchmove",
            listeners.touch_move.as_ref().unchecked_ref(),
        );
        let _ = container.remove_event_listener_with_callback(
            "touchend",
            listeners.touch_end.as_ref().unchecked_ref(),
        );
        let _ = container.remove_event_listener_with_callback(
            "touchcancel",
            listeners.touch_cancel.as_ref().unchecked_ref(),
        );
        let _ = container.remove_event_listener_with_callback(
            "wheel",
            listeners.wheel.as_ref().unchecked_ref(),
        );
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let _ = document.remove_event_listener_with_callback(
                "mousemove",
                listeners.mouse_move.as_ref().unchecked_ref(),
            );
            let _ = document.remove_event_listener_with_callback(
                "mouseup",
                listeners.mouse_up.as_ref().unchecked_ref(),
            );
        }
        if let Some(resize) = &listeners.resize {
            if let Some(win) = web_sys::window() {
                let _ = win
                    .remove_event_listener_with_callback("resize", resize.as_ref().unchecked_ref());
            }
        }
    }
}

impl Drop for ScrollView {
    fn drop(&mut self) {
        self.destroy();
    }
}
