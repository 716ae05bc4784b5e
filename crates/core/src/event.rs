use stellar_protocol::{NodeId, ObserverId};

/// What a subscription listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click(NodeId),
    Submit(NodeId),
    Input(NodeId),
    /// The node entered the viewport of the given observer.
    Intersect(ObserverId, NodeId),
    Scroll,
    KeyDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
struct Entry<H> {
    id: SubscriptionId,
    kind: EventKind,
    once: bool,
    handler: H,
}

/// Registry mapping event kinds to handler values.
///
/// Handlers are plain data (usually an enum naming the component and target)
/// rather than closures, so the owner can route them with full mutable
/// access to its own state. One-shot subscriptions are removed the first time
/// they are dispatched.
#[derive(Debug)]
pub struct Subscriptions<H> {
    next_id: u64,
    entries: Vec<Entry<H>>,
}

impl<H: Clone> Subscriptions<H> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Persistent subscription.
    pub fn subscribe(&mut self, kind: EventKind, handler: H) -> SubscriptionId {
        self.insert(kind, handler, false)
    }

    /// Subscription that removes itself after its first dispatch.
    pub fn subscribe_once(&mut self, kind: EventKind, handler: H) -> SubscriptionId {
        self.insert(kind, handler, true)
    }

    fn insert(&mut self, kind: EventKind, handler: H, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            once,
            handler,
        });
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Handlers listening for `kind`, in subscription order.
    pub fn dispatch(&mut self, kind: EventKind) -> Vec<H> {
        let handlers = self
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.handler.clone())
            .collect();
        self.entries.retain(|e| !(e.once && e.kind == kind));
        handlers
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Clone> Default for Subscriptions<H> {
    fn default() -> Self {
        Self::new()
    }
}
