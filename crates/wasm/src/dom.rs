//! Applies [`DomCommand`]s to the live document.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context as _, anyhow};
use stellar_protocol::{
    DomCommand, HostEvent, InsertPosition, NodeId, ObserveOptions, ObserverId, StyleProperty,
};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, ScrollToOptions, Window,
};

use crate::{audio, bridge};

/// Best-effort text for a thrown JS value.
pub fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

pub fn js_err(value: JsValue) -> anyhow::Error {
    anyhow!(describe(&value))
}

/// Two-way map between [`NodeId`]s and live elements.
#[derive(Default)]
pub struct Registry {
    elements: BTreeMap<NodeId, Element>,
}

impl Registry {
    pub fn insert(&mut self, node: NodeId, element: Element) {
        self.elements.insert(node, element);
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(&node)
    }

    pub fn remove(&mut self, node: NodeId) -> Option<Element> {
        self.elements.remove(&node)
    }

    pub fn lookup(&self, element: &Element) -> Option<NodeId> {
        self.elements
            .iter()
            .find(|(_, known)| *known == element)
            .map(|(node, _)| *node)
    }
}

pub struct Dom {
    pub window: Window,
    pub document: Document,
    pub registry: Registry,
    observers: HashMap<ObserverId, IntersectionObserver>,
}

impl Dom {
    pub fn new(window: Window, document: Document, registry: Registry) -> Self {
        Self {
            window,
            document,
            registry,
            observers: HashMap::new(),
        }
    }

    fn element(&self, node: NodeId) -> anyhow::Result<&Element> {
        self.registry
            .get(node)
            .with_context(|| format!("unknown {node}"))
    }

    pub fn apply(&mut self, command: DomCommand) -> anyhow::Result<()> {
        match command {
            DomCommand::CreateElement {
                node,
                parent,
                position,
                tag,
                class,
                text,
                styles,
                attributes,
            } => {
                let element = self.document.create_element(tag.as_str()).map_err(js_err)?;
                if let Some(class) = class {
                    element.set_class_name(class.as_str());
                }
                if let Some(text) = text {
                    element.set_text_content(Some(text.as_str()));
                }
                for (name, value) in &attributes {
                    element
                        .set_attribute(name.as_str(), value.as_str())
                        .map_err(js_err)?;
                }
                for (property, value) in &styles {
                    set_style(&element, property, value.as_str())?;
                }
                let parent = self.element(parent)?;
                match position {
                    InsertPosition::Append => {
                        parent.append_child(&element).map_err(js_err)?;
                    }
                    InsertPosition::Prepend => parent.prepend_with_node_1(&element).map_err(js_err)?,
                }
                self.registry.insert(node, element);
            }
            DomCommand::Remove { node } => {
                if let Some(element) = self.registry.remove(node) {
                    element.remove();
                }
            }
            DomCommand::AddClass { node, class } => self
                .element(node)?
                .class_list()
                .add_1(class.as_str())
                .map_err(js_err)?,
            DomCommand::RemoveClass { node, class } => self
                .element(node)?
                .class_list()
                .remove_1(class.as_str())
                .map_err(js_err)?,
            DomCommand::SetStyle {
                node,
                property,
                value,
            } => set_style(self.element(node)?, &property, value.as_str())?,
            DomCommand::SetText { node, text } => {
                self.element(node)?.set_text_content(Some(text.as_str()));
            }
            DomCommand::SetAttribute { node, name, value } => self
                .element(node)?
                .set_attribute(name.as_str(), value.as_str())
                .map_err(js_err)?,
            DomCommand::SetDisabled { node, disabled } => {
                let element = self.element(node)?;
                match element.dyn_ref::<HtmlButtonElement>() {
                    Some(button) => button.set_disabled(disabled),
                    None if disabled => element.set_attribute("disabled", "").map_err(js_err)?,
                    None => element.remove_attribute("disabled").map_err(js_err)?,
                }
            }
            DomCommand::ResetForm { node } => {
                if let Some(form) = self.element(node)?.dyn_ref::<HtmlFormElement>() {
                    form.reset();
                }
            }
            DomCommand::Observe {
                node,
                observer,
                options,
            } => {
                let observer = self.observer(observer, &options)?;
                observer.observe(self.element(node)?);
            }
            DomCommand::Unobserve { node, observer } => {
                if let Some(observer) = self.observers.get(&observer) {
                    observer.unobserve(self.element(node)?);
                }
            }
            DomCommand::ScrollIntoView { node } => {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                options.set_block(ScrollLogicalPosition::Start);
                self.element(node)?
                    .scroll_into_view_with_scroll_into_view_options(&options);
            }
            DomCommand::ScrollTo { top } => {
                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(ScrollBehavior::Smooth);
                self.window.scroll_to_with_scroll_to_options(&options);
            }
            DomCommand::Print => self.window.print().map_err(js_err)?,
            DomCommand::CopyToClipboard { text } => self.copy(text.as_str()),
            DomCommand::PlayTone(tone) => {
                if let Err(err) = audio::play(&tone) {
                    debug!(error = %describe(&err), "Audio not supported");
                }
            }
        }
        Ok(())
    }

    /// The observer named `id`, created with `options` on first use.
    fn observer(
        &mut self,
        id: ObserverId,
        options: &ObserveOptions,
    ) -> anyhow::Result<IntersectionObserver> {
        if let Some(observer) = self.observers.get(&id) {
            return Ok(observer.clone());
        }

        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                bridge::intersect(id, &entry.target(), entry.is_intersecting());
            }
        });
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(options.root_margin.as_str());
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(js_err)?;
        // Observers live as long as the page.
        callback.forget();

        self.observers.insert(id, observer.clone());
        Ok(observer)
    }

    fn copy(&self, text: &str) {
        let promise = self.window.navigator().clipboard().write_text(text);
        wasm_bindgen_futures::spawn_local(async move {
            let ok = match JsFuture::from(promise).await {
                Ok(_) => true,
                Err(err) => {
                    warn!(error = %describe(&err), "Clipboard write rejected");
                    false
                }
            };
            bridge::dispatch(HostEvent::ClipboardWritten { ok });
        });
    }
}

fn set_style(element: &Element, property: &StyleProperty, value: &str) -> anyhow::Result<()> {
    let Some(element) = element.dyn_ref::<HtmlElement>() else {
        return Ok(());
    };
    let style = element.style();
    if value.is_empty() {
        style
            .remove_property(property.css_name())
            .map_err(js_err)?;
    } else {
        style
            .set_property(property.css_name(), value)
            .map_err(js_err)?;
    }
    Ok(())
}
