//! Owns the page's [`Site`] and pumps its timers and frames through the
//! browser's event loop.

use std::cell::RefCell;
use std::time::Duration;

use anyhow::{Context as _, bail};
use stellar_core::clock::SystemClock;
use stellar_core::form::SimulatedBackend;
use stellar_core::storage::{KeyValueStore, MemoryStore};
use stellar_core::{EventOutcome, HostServices, NodeAllocator, Site, SiteConfig};
use stellar_protocol::{HostEvent, NodeId, ObserverId};
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::{Dom, Registry, describe, js_err};
use crate::listeners;
use crate::scan::{self, Anchor};
use crate::storage::LocalStorage;

thread_local! {
    static BRIDGE: RefCell<Option<Bridge>> = const { RefCell::new(None) };
}

struct Bridge {
    site: Site,
    dom: Dom,
    anchors: Vec<Anchor>,
    /// Armed `setTimeout` handle and the deadline it was armed for.
    timer: Option<(i32, Duration)>,
    frame_requested: bool,
}

/// Run `f` against the mounted bridge. `None` before mount, or when called
/// re-entrantly from inside another bridge call.
fn with_bridge<R>(f: impl FnOnce(&mut Bridge) -> R) -> Option<R> {
    BRIDGE.with(|cell| {
        let mut slot = cell.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    })
}

/// Store `bridge` in `slot` once `install` succeeds. A failed install
/// leaves the slot empty so mounting can be retried.
fn occupy<T>(
    slot: &RefCell<Option<T>>,
    bridge: T,
    install: impl FnOnce() -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    if slot.borrow().is_some() {
        bail!("page scripts are already mounted");
    }
    install()?;
    *slot.borrow_mut() = Some(bridge);
    Ok(())
}

pub fn mount(config_json: Option<&str>) -> anyhow::Result<()> {
    if BRIDGE.with(|cell| cell.borrow().is_some()) {
        bail!("page scripts are already mounted");
    }
    let config = match config_json {
        Some(text) => SiteConfig::from_json(text).context("invalid site config")?,
        None => SiteConfig::default(),
    };

    let window = web_sys::window().context("no window")?;
    let document = window.document().context("no document")?;
    let caps = scan::capabilities(&window);
    let mut registry = Registry::default();
    let mut nodes = NodeAllocator::new();
    let page = scan::scan(&window, &document, &mut registry, &mut nodes)?;
    debug!(elements = nodes.allocated(), ?caps, "Page scanned");

    let store: Box<dyn KeyValueStore> = match LocalStorage::open(&window) {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!(error = %err, "Falling back to in-memory storage");
            Box::new(MemoryStore::new())
        }
    };
    let services = HostServices {
        store,
        backend: Box::new(SimulatedBackend),
        clock: Box::new(SystemClock),
        seed: (js_sys::Math::random() * f64::from(u32::MAX)) as u64,
    };

    let mut bridge = Bridge {
        site: Site::new(config, caps, page.manifest, nodes, services),
        dom: Dom::new(window.clone(), document.clone(), registry),
        anchors: page.anchors,
        timer: None,
        frame_requested: false,
    };
    bridge.sync_clock();
    bridge.site.start();
    bridge.flush();
    BRIDGE.with(|cell| occupy(cell, bridge, || listeners::install(&window, &document)))?;
    listeners::catch_up(&document);
    info!("Bridge mounted");
    Ok(())
}

/// Forward an event that is not tied to an element.
pub fn dispatch(event: HostEvent) -> EventOutcome {
    with_bridge(|bridge| bridge.handle(event)).unwrap_or_default()
}

/// Click reaching `element` while bubbling.
pub fn click(element: &Element) -> EventOutcome {
    with_bridge(|bridge| {
        let event = if let Some(anchor) = bridge.anchors.iter().find(|a| a.element == *element) {
            HostEvent::AnchorClick {
                href: anchor.href.as_str().into(),
                target: anchor.target,
            }
        } else if let Some(node) = bridge.dom.registry.lookup(element) {
            HostEvent::Click { node }
        } else {
            return EventOutcome::default();
        };
        bridge.handle(event)
    })
    .unwrap_or_default()
}

/// Entry from the observer named `observer`.
pub fn intersect(observer: ObserverId, element: &Element, intersecting: bool) {
    with_bridge(|bridge| {
        if let Some(node) = bridge.dom.registry.lookup(element) {
            bridge.handle(HostEvent::Intersection {
                observer,
                node,
                intersecting,
            });
        }
    });
}

/// Node id of a known element, for listeners that build their own event.
pub fn node_of(element: &Element) -> Option<NodeId> {
    with_bridge(|bridge| bridge.dom.registry.lookup(element)).flatten()
}

pub fn active_modes() -> Vec<String> {
    with_bridge(|bridge| {
        bridge
            .site
            .panel()
            .modes()
            .active()
            .map(|mode| mode.class().as_str().to_string())
            .collect()
    })
    .unwrap_or_default()
}

fn host_now() -> Duration {
    let ms = web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now());
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

impl Bridge {
    fn handle(&mut self, event: HostEvent) -> EventOutcome {
        self.sync_clock();
        let outcome = self.site.handle(event);
        self.flush();
        outcome
    }

    /// Bring the scheduler up to the browser's clock, running due timers.
    fn sync_clock(&mut self) {
        self.site.advance(host_now());
    }

    /// Apply pending commands, then re-arm the timer and frame callbacks.
    fn flush(&mut self) {
        for command in self.site.drain_commands() {
            if let Err(err) = self.dom.apply(command) {
                warn!(error = %err, "DOM command skipped");
            }
        }
        if let Err(err) = self.pump() {
            warn!(error = %err, "Could not schedule callback");
        }
    }

    fn pump(&mut self) -> anyhow::Result<()> {
        if self.site.wants_frame() && !self.frame_requested {
            let callback = Closure::once_into_js(|| {
                with_bridge(|bridge| {
                    bridge.frame_requested = false;
                    bridge.sync_clock();
                    bridge.site.frame();
                    bridge.flush();
                });
            });
            self.dom
                .window
                .request_animation_frame(callback.unchecked_ref())
                .map_err(js_err)?;
            self.frame_requested = true;
        }

        let Some(deadline) = self.site.next_deadline() else {
            return Ok(());
        };
        if self.timer.is_some_and(|(_, armed)| armed <= deadline) {
            return Ok(());
        }
        if let Some((handle, _)) = self.timer.take() {
            self.dom.window.clear_timeout_with_handle(handle);
        }
        let delay = deadline.saturating_sub(self.site.now());
        let callback = Closure::once_into_js(|| {
            with_bridge(|bridge| {
                bridge.timer = None;
                bridge.sync_clock();
                bridge.flush();
            });
        });
        let handle = self
            .dom
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                i32::try_from(delay.as_millis()).unwrap_or(i32::MAX),
            )
            .map_err(|e| anyhow::anyhow!("setTimeout: {}", describe(&e)))?;
        self.timer = Some((handle, deadline));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_install_leaves_slot_free() {
        let slot = RefCell::new(None);
        let failed = occupy(&slot, 1, || bail!("addEventListener threw"));
        assert!(failed.is_err());
        assert!(slot.borrow().is_none());

        assert!(occupy(&slot, 2, || Ok(())).is_ok());
        assert_eq!(*slot.borrow(), Some(2));
        assert!(occupy(&slot, 3, || Ok(())).is_err());
        assert_eq!(*slot.borrow(), Some(2));
    }
}
