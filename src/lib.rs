//! A pannable, zoomable scroll view for the browser DOM.
//!
//! The widget binds to a container element, wraps its children in a
//! content root, and maps pan, pinch, double-tap and wheel gestures onto a
//! CSS transform with elastic bounce at the boundaries.
//!
//! The crate splits into a platform-neutral transform engine
//! ([`engine::ViewportEngine`], testable natively) and a thin DOM layer
//! ([`dom::ScrollView`]) that feeds it events and writes the transform.
//! Leptos apps can use the [`components::ScrollView`] component instead of
//! wiring the DOM widget by hand.
//!
//! ```no_run
//! use scrollview::{ScrollView, ViewportOptions};
//!
//! let options = ViewportOptions {
//!     maximum_zoom_scale: 8.0,
//!     ..Default::default()
//! };
//! let view = ScrollView::attach_to("viewer", options)?;
//! view.set_zoom_scale_animated(2.0, true);
//! # Ok::<(), scrollview::ScrollViewError>(())
//! ```

pub mod components;
pub mod dom;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod options;
pub mod spring;

pub use dom::{IntoContentElement, ScrollView};
pub use engine::{Transition, ViewportEngine};
pub use error::ScrollViewError;
pub use geometry::{Margin, MarginValue, Point, Rect, Size};
pub use gesture::{GestureDelegate, GesturePhase, PanEvent, PinchEvent, TapEvent, WheelTick};
pub use options::{ScrollBounce, ViewportOptions};

/// Route `log` output to the browser console and surface panics there
/// too. Call once from the host app's entry point; hosts that already
/// configure logging can skip this.
pub fn init_diagnostics() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
