use stellar_protocol::{DomCommand, ObserverId};

use crate::dom::NodeAllocator;
use crate::event::Subscriptions;
use crate::form::MessageRegion;
use crate::schedule::Scheduler;
use crate::toast::ToastId;
use crate::toggle::Control;

/// Host observers, one per component watching the viewport. A node can be
/// watched by several of them at once.
pub const REVEAL_OBSERVER: ObserverId = ObserverId(0);
pub const NAV_OBSERVER: ObserverId = ObserverId(1);
pub const LAZY_OBSERVER: ObserverId = ObserverId(2);

/// Deferred work, run by the scheduler after a delay or on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    ToastEnter(ToastId),
    ToastExit(ToastId),
    ToastRemove(ToastId),
    SubmitComplete,
    HideMessage { region: MessageRegion, generation: u64 },
    ParallaxFrame,
    RestoreCopyLabel,
}

/// Who handles a dispatched host event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Reveal(usize),
    LazyImage(usize),
    NavSection(usize),
    Parallax,
    Control(Control),
    Shortcuts,
    Newsletter,
    ScrollToTop,
    ScrollToTopClick,
    LightboxOpen(usize),
    LightboxDismiss,
    LightboxImage,
    Print,
    CopyLink,
    CharCounter,
}

/// Mutable services every component works against while handling one
/// event, timer or frame.
pub struct Context<'a> {
    pub scheduler: &'a mut Scheduler<Task>,
    pub subscriptions: &'a mut Subscriptions<Handler>,
    pub nodes: &'a mut NodeAllocator,
    pub out: &'a mut Vec<DomCommand>,
}

impl Context<'_> {
    pub fn emit(&mut self, command: DomCommand) {
        self.out.push(command);
    }
}

/// Owned scheduler, subscription registry, allocator and outbox.
///
/// Kept apart from the components so a caller can borrow a [`Context`] from
/// it while also holding `&mut` to a component.
#[derive(Debug, Default)]
pub struct Runtime {
    pub scheduler: Scheduler<Task>,
    pub subscriptions: Subscriptions<Handler>,
    pub nodes: NodeAllocator,
    pub out: Vec<DomCommand>,
}

impl Runtime {
    pub fn ctx(&mut self) -> Context<'_> {
        Context {
            scheduler: &mut self.scheduler,
            subscriptions: &mut self.subscriptions,
            nodes: &mut self.nodes,
            out: &mut self.out,
        }
    }

    pub fn drain(&mut self) -> Vec<DomCommand> {
        std::mem::take(&mut self.out)
    }
}
