//! Reads the page markup into a [`PageManifest`].

use stellar_core::form::NewsletterForm;
use stellar_core::lazy::LazyImage;
use stellar_core::lightbox::Photo;
use stellar_core::nav::{NavLink, Section};
use stellar_core::page::CounterTarget;
use stellar_core::toggle::Control;
use stellar_core::{HostCapabilities, NodeAllocator, PageManifest};
use stellar_protocol::NodeId;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlTextAreaElement, Window};

use crate::dom::Registry;

const REVEAL_SELECTOR: &str = ".hero-text, .hero-images, .nav-list, .hero-split, .nav-card, \
     .highlight-card, .memory-card, .photo-item, .timeline-item";
const PHOTO_SELECTOR: &str = ".photo-item img, .hero-image";

/// An in-page `a[href^="#"]` and the element it points at, if any.
pub struct Anchor {
    pub element: Element,
    pub href: String,
    pub target: Option<NodeId>,
}

pub struct ScannedPage {
    pub manifest: PageManifest,
    pub anchors: Vec<Anchor>,
}

pub fn capabilities(window: &Window) -> HostCapabilities {
    let matches = |query: &str| {
        window
            .match_media(query)
            .ok()
            .flatten()
            .is_some_and(|list| list.matches())
    };
    HostCapabilities {
        intersection_observer: js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false),
        coarse_pointer: matches("(pointer: coarse)"),
        prefers_reduced_motion: matches("(prefers-reduced-motion: reduce)"),
    }
}

struct Scanner<'a> {
    document: &'a Document,
    registry: &'a mut Registry,
    nodes: &'a mut NodeAllocator,
}

impl Scanner<'_> {
    fn register(&mut self, element: Element) -> NodeId {
        if let Some(node) = self.registry.lookup(&element) {
            return node;
        }
        let node = self.nodes.alloc();
        self.registry.insert(node, element);
        node
    }

    fn by_id(&mut self, id: &str) -> Option<NodeId> {
        let element = self.document.get_element_by_id(id)?;
        Some(self.register(element))
    }

    fn first(&mut self, selector: &str) -> Option<NodeId> {
        let element = self.document.query_selector(selector).ok().flatten()?;
        Some(self.register(element))
    }

    fn all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn newsletter(&mut self) -> Option<NewsletterForm> {
        let form = self.document.get_element_by_id("newsletter-form")?;
        let submit_button = form.query_selector(".submit-btn").ok().flatten();
        let submit_label = submit_button
            .as_ref()
            .and_then(|button| button.text_content())
            .unwrap_or_default();
        Some(NewsletterForm {
            form: self.register(form),
            submit: submit_button.map(|b| self.register(b)),
            submit_label,
            success: self.by_id("form-success"),
            error: self.by_id("form-error"),
        })
    }

    fn char_counter(&mut self) -> Option<CounterTarget> {
        let element = self.document.get_element_by_id("entry-message")?;
        let parent = element.parent_element()?;
        let initial_value = element
            .dyn_ref::<HtmlTextAreaElement>()
            .map(HtmlTextAreaElement::value)
            .unwrap_or_default();
        Some(CounterTarget {
            textarea: self.register(element),
            parent: self.register(parent),
            initial_value,
        })
    }

    fn anchors(&mut self) -> Vec<Anchor> {
        let mut anchors = Vec::new();
        for element in self.all(r##"a[href^="#"]"##) {
            let href = element.get_attribute("href").unwrap_or_default();
            // `#` alone is not a valid selector; smooth scroll ignores it anyway.
            let target = if href.len() > 1 {
                self.document
                    .query_selector(&href)
                    .ok()
                    .flatten()
                    .map(|t| self.register(t))
            } else {
                None
            };
            anchors.push(Anchor {
                element,
                href,
                target,
            });
        }
        anchors
    }
}

/// Register every element the scripts care about. Elements missing from
/// this page leave their feature off.
pub fn scan(
    window: &Window,
    document: &Document,
    registry: &mut Registry,
    nodes: &mut NodeAllocator,
) -> anyhow::Result<ScannedPage> {
    let body = document
        .body()
        .ok_or_else(|| anyhow::anyhow!("document has no body"))?;
    let mut scan = Scanner {
        document,
        registry,
        nodes,
    };

    let mut manifest = PageManifest::new(scan.register(body.into()));
    manifest.starfield = scan.by_id("starfield");
    manifest.controls = Control::ALL
        .iter()
        .filter_map(|c| scan.by_id(c.element_id()).map(|node| (*c, node)))
        .collect();
    manifest.newsletter = scan.newsletter();
    manifest.parallax = scan.by_id("solar-system");

    for element in scan.all(REVEAL_SELECTOR) {
        let node = scan.register(element);
        manifest.reveal_targets.push(node);
    }
    for element in scan.all("section[id]") {
        let id = element.id();
        manifest.sections.push(Section {
            node: scan.register(element),
            id,
        });
    }
    for element in scan.all(".nav-link") {
        let href = element.get_attribute("href").unwrap_or_default();
        manifest.nav_links.push(NavLink {
            node: scan.register(element),
            href,
        });
    }
    for element in scan.all(r#"img[loading="lazy"]"#) {
        let data_src = element.get_attribute("data-src");
        manifest.lazy_images.push(LazyImage {
            node: scan.register(element),
            data_src,
        });
    }
    for element in scan.all(PHOTO_SELECTOR) {
        let src = element.get_attribute("src").unwrap_or_default();
        manifest.photos.push(Photo {
            node: scan.register(element),
            src,
        });
    }

    manifest.page_header = scan.first(".page-header");
    manifest.page_footer = scan.first(".page-footer");
    manifest.char_counter = scan.char_counter();
    manifest.page_url = window.location().href().unwrap_or_default();
    let anchors = scan.anchors();

    Ok(ScannedPage { manifest, anchors })
}
