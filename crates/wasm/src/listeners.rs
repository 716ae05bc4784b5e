use stellar_protocol::{HostEvent, KeyInput};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, FormData, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement, KeyboardEvent, Window,
};

use crate::bridge;
use crate::dom::js_err;

fn listen(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> anyhow::Result<()> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(js_err)?;
    // Listeners stay for the lifetime of the page.
    closure.forget();
    Ok(())
}

/// Delegated listeners on the document and window.
pub fn install(window: &Window, document: &Document) -> anyhow::Result<()> {
    listen(document, "click", on_click)?;
    listen(document, "submit", on_submit)?;
    listen(document, "input", on_input)?;
    listen(document, "keydown", on_keydown)?;
    listen(window, "scroll", on_scroll)?;
    if document.ready_state() != "complete" {
        listen(window, "load", |_| on_load())?;
    }
    Ok(())
}

/// Report the load that finished before the listeners were installed.
pub fn catch_up(document: &Document) {
    if document.ready_state() == "complete" {
        on_load();
    }
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

/// Walk from the click target up to the root, the way the click bubbles.
fn on_click(event: Event) {
    let mut current = target_element(&event);
    while let Some(element) = current {
        let outcome = bridge::click(&element);
        if outcome.prevent_default {
            event.prevent_default();
        }
        if outcome.stop_propagation {
            event.stop_propagation();
            break;
        }
        current = element.parent_element();
    }
}

fn on_submit(event: Event) {
    let Some(form) = event
        .target()
        .and_then(|t| t.dyn_into::<HtmlFormElement>().ok())
    else {
        return;
    };
    let Some(node) = bridge::node_of(&form) else {
        return;
    };
    let Ok(data) = FormData::new_with_form(&form) else {
        return;
    };
    let field = |name: &str| data.get(name).as_string().unwrap_or_default();
    let outcome = bridge::dispatch(HostEvent::Submit {
        form: node,
        name: field("name"),
        email: field("email"),
    });
    if outcome.prevent_default {
        event.prevent_default();
    }
}

fn on_input(event: Event) {
    let Some(element) = target_element(&event) else {
        return;
    };
    let Some(node) = bridge::node_of(&element) else {
        return;
    };
    let value = if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
        textarea.value()
    } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else {
        return;
    };
    bridge::dispatch(HostEvent::Input { node, value });
}

fn on_keydown(event: Event) {
    let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
        return;
    };
    let mut input = KeyInput::new(key.key());
    if key.shift_key() {
        input = input.with_shift();
    }
    if let Some(focused) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.active_element())
    {
        input = input.focused_on(focused.tag_name());
    }
    bridge::dispatch(HostEvent::KeyDown(input));
}

fn on_scroll(_: Event) {
    let y = web_sys::window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0);
    bridge::dispatch(HostEvent::Scroll { y });
}

fn on_load() {
    let load_time_ms = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now());
    bridge::dispatch(HostEvent::Loaded { load_time_ms });
}
