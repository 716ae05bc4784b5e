//! Scroll-driven presentation effects.
//!
//! Two behaviors share this controller:
//!
//! - **Reveal**: elements start hidden and offset, and transition to their
//!   final presentation the first time they intersect the viewport. The
//!   intersection subscription is one-shot and every target carries a
//!   `revealed` flag, so a target animates at most once no matter how often
//!   the user scrolls past it.
//! - **Parallax**: one element is translated proportionally to the scroll
//!   offset. Scroll events only arm a frame callback; a `pending` flag keeps
//!   the work to one recompute per display frame.

use stellar_protocol::{ClassName, DomCommand, NodeId, ObserveOptions, StyleProperty};
use tracing::{debug, trace};

use crate::config::SiteConfig;
use crate::event::EventKind;
use crate::runtime::{Context, Handler, REVEAL_OBSERVER, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTarget {
    pub node: NodeId,
    revealed: bool,
}

impl RevealTarget {
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxTarget {
    pub node: NodeId,
    pub rate: f64,
    /// Set on coarse-pointer devices; decided once at tracking time.
    pub suppressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RevealStyle {
    offset_px: f64,
    duration_secs: f64,
    stagger_secs: f64,
}

#[derive(Debug)]
pub struct RevealController {
    options: ObserveOptions,
    style: RevealStyle,
    targets: Vec<RevealTarget>,
    parallax: Option<ParallaxTarget>,
    pending_frame: bool,
    recomputes: u64,
    last_offset: Option<f64>,
}

impl RevealController {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            options: ObserveOptions::new(
                config.reveal_threshold,
                config.reveal_root_margin.as_str(),
            ),
            style: RevealStyle {
                offset_px: config.reveal_offset_px,
                duration_secs: config.reveal_duration_secs,
                stagger_secs: config.reveal_stagger_secs,
            },
            targets: Vec::new(),
            parallax: None,
            pending_frame: false,
            recomputes: 0,
            last_offset: None,
        }
    }

    /// Hide the given elements and reveal each on its first intersection.
    ///
    /// Without an intersection observer every target is revealed right away.
    pub fn register_reveal_targets(
        &mut self,
        nodes: &[NodeId],
        observer_available: bool,
        ctx: &mut Context<'_>,
    ) {
        let base = self.targets.len();
        for (offset, &node) in nodes.iter().enumerate() {
            let index = base + offset;
            self.targets.push(RevealTarget {
                node,
                revealed: false,
            });

            if !observer_available {
                self.reveal(index, ctx);
                continue;
            }

            let delay = offset as f64 * self.style.stagger_secs;
            let duration = self.style.duration_secs;
            ctx.emit(DomCommand::style(node, StyleProperty::Opacity, "0"));
            ctx.emit(DomCommand::style(
                node,
                StyleProperty::Transform,
                format!("translateY({}px)", self.style.offset_px),
            ));
            ctx.emit(DomCommand::style(
                node,
                StyleProperty::Transition,
                format!("opacity {duration}s ease {delay}s, transform {duration}s ease {delay}s"),
            ));
            ctx.subscriptions
                .subscribe_once(EventKind::Intersect(REVEAL_OBSERVER, node), Handler::Reveal(index));
            ctx.emit(DomCommand::Observe {
                node,
                observer: REVEAL_OBSERVER,
                options: self.options.clone(),
            });
        }
        debug!(
            count = nodes.len(),
            observer_available, "Reveal targets registered"
        );
    }

    /// Intersection-enter for target `index`. Returns whether it was
    /// revealed by this call.
    pub fn on_intersect(&mut self, index: usize, ctx: &mut Context<'_>) -> bool {
        let revealed = self.reveal(index, ctx);
        if revealed && let Some(target) = self.targets.get(index) {
            ctx.emit(DomCommand::Unobserve {
                node: target.node,
                observer: REVEAL_OBSERVER,
            });
        }
        revealed
    }

    fn reveal(&mut self, index: usize, ctx: &mut Context<'_>) -> bool {
        let Some(target) = self.targets.get_mut(index) else {
            return false;
        };
        if target.revealed {
            return false;
        }
        target.revealed = true;
        let node = target.node;
        ctx.emit(DomCommand::style(node, StyleProperty::Opacity, "1"));
        ctx.emit(DomCommand::style(
            node,
            StyleProperty::Transform,
            "translateY(0)",
        ));
        ctx.emit(DomCommand::AddClass {
            node,
            class: ClassName::FadeIn,
        });
        true
    }

    /// Follow the scroll position with `node`, except on touch devices.
    pub fn track_parallax(
        &mut self,
        node: NodeId,
        rate: f64,
        coarse_pointer: bool,
        ctx: &mut Context<'_>,
    ) {
        self.parallax = Some(ParallaxTarget {
            node,
            rate,
            suppressed: coarse_pointer,
        });
        if coarse_pointer {
            debug!("Parallax suppressed on coarse pointer");
            return;
        }
        ctx.subscriptions.subscribe(EventKind::Scroll, Handler::Parallax);
    }

    /// Scroll event: schedule one recompute for the next frame unless one
    /// is already pending.
    pub fn on_scroll(&mut self, ctx: &mut Context<'_>) {
        let active = self.parallax.is_some_and(|p| !p.suppressed);
        if !active || self.pending_frame {
            return;
        }
        self.pending_frame = true;
        ctx.scheduler.request_frame(Task::ParallaxFrame);
    }

    /// Frame callback. Clears the pending flag first so scroll events that
    /// arrive from here on schedule the next frame.
    pub fn on_frame(&mut self, scroll_y: f64, ctx: &mut Context<'_>) {
        self.pending_frame = false;
        let Some(target) = self.parallax.filter(|p| !p.suppressed) else {
            return;
        };
        self.recomputes += 1;
        let offset = scroll_y * target.rate;
        self.last_offset = Some(offset);
        trace!(scroll_y, offset, "Parallax recompute");
        ctx.emit(DomCommand::style(
            target.node,
            StyleProperty::Transform,
            format!("translate(-50%, calc(-50% + {offset}px))"),
        ));
    }

    pub fn targets(&self) -> &[RevealTarget] {
        &self.targets
    }

    pub fn revealed_count(&self) -> usize {
        self.targets.iter().filter(|t| t.revealed).count()
    }

    pub fn parallax(&self) -> Option<&ParallaxTarget> {
        self.parallax.as_ref()
    }

    /// How many parallax recomputes have run.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// The most recently applied parallax offset in pixels.
    pub fn parallax_offset(&self) -> Option<f64> {
        self.last_offset
    }
}
