use stellar_protocol::{ClassName, DomCommand, NodeId, ObserveOptions};
use tracing::debug;

use crate::event::EventKind;
use crate::runtime::{Context, Handler, LAZY_OBSERVER};

/// An `img[loading=lazy]`, with its deferred source if the markup uses
/// `data-src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyImage {
    pub node: NodeId,
    pub data_src: Option<String>,
}

/// Loads images as they approach the viewport, once each.
#[derive(Debug)]
pub struct LazyImages {
    images: Vec<LazyImage>,
    loaded: Vec<bool>,
}

impl LazyImages {
    pub fn install(
        images: Vec<LazyImage>,
        observer_available: bool,
        root_margin: &str,
        ctx: &mut Context<'_>,
    ) -> Self {
        let mut lazy = Self {
            loaded: vec![false; images.len()],
            images,
        };
        if !observer_available {
            for index in 0..lazy.images.len() {
                lazy.load(index, ctx.out);
            }
            debug!(count = lazy.images.len(), "Images loaded eagerly");
            return lazy;
        }

        let options = ObserveOptions::new(0.0, root_margin);
        for (index, image) in lazy.images.iter().enumerate() {
            ctx.subscriptions
                .subscribe_once(EventKind::Intersect(LAZY_OBSERVER, image.node), Handler::LazyImage(index));
            ctx.out.push(DomCommand::Observe {
                node: image.node,
                observer: LAZY_OBSERVER,
                options: options.clone(),
            });
        }
        lazy
    }

    pub fn on_visible(&mut self, index: usize, out: &mut Vec<DomCommand>) {
        if self.load(index, out)
            && let Some(image) = self.images.get(index)
        {
            out.push(DomCommand::Unobserve {
                node: image.node,
                observer: LAZY_OBSERVER,
            });
        }
    }

    fn load(&mut self, index: usize, out: &mut Vec<DomCommand>) -> bool {
        let (Some(image), Some(loaded)) = (self.images.get(index), self.loaded.get_mut(index)) else {
            return false;
        };
        if *loaded {
            return false;
        }
        *loaded = true;
        if let Some(src) = &image.data_src {
            out.push(DomCommand::SetAttribute {
                node: image.node,
                name: "src".into(),
                value: src.as_str().into(),
            });
        }
        out.push(DomCommand::AddClass {
            node: image.node,
            class: ClassName::Loaded,
        });
        true
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.iter().filter(|l| **l).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    fn images(h: &mut Runtime) -> Vec<LazyImage> {
        vec![
            LazyImage {
                node: h.nodes.alloc(),
                data_src: Some("/img/portrait.jpg".to_string()),
            },
            LazyImage {
                node: h.nodes.alloc(),
                data_src: None,
            },
        ]
    }

    #[test]
    fn loads_on_first_visibility_only() {
        let mut h = Runtime::default();
        let imgs = images(&mut h);
        let first = imgs[0].node;
        let mut lazy = LazyImages::install(imgs, true, "50px 0px", &mut h.ctx());
        h.drain();

        let mut out = Vec::new();
        lazy.on_visible(0, &mut out);
        lazy.on_visible(0, &mut out);
        assert_eq!(out.len(), 3);
        assert_eq!(
            out[0],
            DomCommand::SetAttribute {
                node: first,
                name: "src".into(),
                value: "/img/portrait.jpg".into(),
            }
        );
        assert_eq!(
            out[2],
            DomCommand::Unobserve {
                node: first,
                observer: LAZY_OBSERVER,
            }
        );
        assert_eq!(lazy.loaded_count(), 1);
    }

    #[test]
    fn without_observer_everything_loads() {
        let mut h = Runtime::default();
        let imgs = images(&mut h);
        let lazy = LazyImages::install(imgs, false, "50px 0px", &mut h.ctx());
        assert_eq!(lazy.loaded_count(), 2);
        assert!(h.subscriptions.is_empty());
    }
}
