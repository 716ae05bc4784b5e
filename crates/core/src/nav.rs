use stellar_protocol::{ClassName, DomCommand, NodeId, ObserveOptions};
use tracing::trace;

use crate::event::EventKind;
use crate::runtime::{Context, Handler, NAV_OBSERVER};

/// A `section[id]` on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub node: NodeId,
    pub id: String,
}

/// A `.nav-link` anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub node: NodeId,
    pub href: String,
}

/// Marks the nav link of the section crossing the middle of the viewport.
#[derive(Debug)]
pub struct NavHighlighter {
    sections: Vec<Section>,
    links: Vec<NavLink>,
    current: Option<usize>,
}

impl NavHighlighter {
    /// Observe every section. Returns `None` when there are no sections or
    /// no links to highlight.
    pub fn install(
        sections: Vec<Section>,
        links: Vec<NavLink>,
        root_margin: &str,
        ctx: &mut Context<'_>,
    ) -> Option<Self> {
        if sections.is_empty() || links.is_empty() {
            return None;
        }
        let options = ObserveOptions::new(0.0, root_margin);
        for (index, section) in sections.iter().enumerate() {
            ctx.subscriptions
                .subscribe(EventKind::Intersect(NAV_OBSERVER, section.node), Handler::NavSection(index));
            ctx.emit(DomCommand::Observe {
                node: section.node,
                observer: NAV_OBSERVER,
                options: options.clone(),
            });
        }
        Some(Self {
            sections,
            links,
            current: None,
        })
    }

    pub fn on_section_visible(&mut self, index: usize, out: &mut Vec<DomCommand>) {
        let Some(section) = self.sections.get(index) else {
            return;
        };
        let href = format!("#{}", section.id);
        trace!(section = %section.id, "Section in view");
        for link in &self.links {
            out.push(DomCommand::RemoveClass {
                node: link.node,
                class: ClassName::Active,
            });
            if link.href == href {
                out.push(DomCommand::AddClass {
                    node: link.node,
                    class: ClassName::Active,
                });
            }
        }
        self.current = Some(index);
    }

    /// Id of the section most recently scrolled into view.
    pub fn current_section(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.sections.get(i))
            .map(|s| s.id.as_str())
    }
}

/// Click on an in-page anchor. Returns the scroll command when the click
/// should be taken over; a bare `#` or an unresolved target is left to the
/// browser.
pub fn smooth_scroll(href: &str, target: Option<NodeId>) -> Option<DomCommand> {
    if href == "#" || !href.starts_with('#') {
        return None;
    }
    target.map(|node| DomCommand::ScrollIntoView { node })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;
    use pretty_assertions::assert_eq;

    fn page(h: &mut Runtime) -> (Vec<Section>, Vec<NavLink>) {
        let sections = ["about", "gallery"]
            .iter()
            .map(|id| Section {
                node: h.nodes.alloc(),
                id: (*id).to_string(),
            })
            .collect();
        let links = ["#about", "#gallery"]
            .iter()
            .map(|href| NavLink {
                node: h.nodes.alloc(),
                href: (*href).to_string(),
            })
            .collect();
        (sections, links)
    }

    #[test]
    fn highlights_matching_link() {
        let mut h = Runtime::default();
        let (sections, links) = page(&mut h);
        let gallery_link = links[1].node;
        let about_link = links[0].node;
        let mut nav = NavHighlighter::install(sections, links, "-50% 0px -50% 0px", &mut h.ctx())
            .unwrap_or_else(|| NavHighlighter {
                sections: Vec::new(),
                links: Vec::new(),
                current: None,
            });
        assert_eq!(h.drain().len(), 2);

        let mut out = Vec::new();
        nav.on_section_visible(1, &mut out);
        assert_eq!(
            out,
            vec![
                DomCommand::RemoveClass { node: about_link, class: ClassName::Active },
                DomCommand::RemoveClass { node: gallery_link, class: ClassName::Active },
                DomCommand::AddClass { node: gallery_link, class: ClassName::Active },
            ]
        );
        assert_eq!(nav.current_section(), Some("gallery"));
    }

    #[test]
    fn needs_sections_and_links() {
        let mut h = Runtime::default();
        let (sections, _) = page(&mut h);
        assert!(NavHighlighter::install(sections, Vec::new(), "0px", &mut h.ctx()).is_none());
        assert!(h.subscriptions.is_empty());
    }

    #[test]
    fn smooth_scroll_rules() {
        assert_eq!(smooth_scroll("#", Some(NodeId(1))), None);
        assert_eq!(smooth_scroll("#missing", None), None);
        assert_eq!(
            smooth_scroll("#about", Some(NodeId(4))),
            Some(DomCommand::ScrollIntoView { node: NodeId(4) })
        );
    }
}
