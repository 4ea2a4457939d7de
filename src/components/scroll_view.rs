use leptos::prelude::*;
use web_sys::Element;

use crate::dom::ScrollView as DomScrollView;
use crate::options::ViewportOptions;

/// Leptos wrapper around [`crate::dom::ScrollView`].
///
/// Renders a container div, attaches the scroll view once the node is
/// mounted, and tears it down on cleanup. The options are read once at
/// mount; reattach with a different key to change them.
#[component]
pub fn ScrollView(
    #[prop(optional)] options: Option<ViewportOptions>,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let container_ref = NodeRef::<leptos::html::Div>::new();
    let view = StoredValue::new_local(None::<DomScrollView>);

    Effect::new(move || {
        if view.with_value(|v| v.is_some()) {
            return;
        }
        let Some(div) = container_ref.get() else {
            return;
        };
        let element: Element = div.into();
        match DomScrollView::attach(element, options.clone().unwrap_or_default()) {
            Ok(attached) => view.set_value(Some(attached)),
            Err(err) => log::error!("scroll view attach failed: {err}"),
        }
    });

    on_cleanup(move || {
        view.update_value(|v| {
            if let Some(attached) = v.take() {
                attached.destroy();
            }
        });
    });

    view! {
        <div class=class node_ref=container_ref>
            {children()}
        </div>
    }
}
