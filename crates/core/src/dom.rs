use stellar_protocol::NodeId;

/// Hands out [`NodeId`]s for scanned and created elements alike.
///
/// Ids start at 1 and are never reused, so a stale id held by a timer can
/// only ever point at its own (possibly removed) element.
#[derive(Debug)]
pub struct NodeAllocator {
    next: u32,
}

impl NodeAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next - 1
    }
}

impl Default for NodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut nodes = NodeAllocator::new();
        let a = nodes.alloc();
        let b = nodes.alloc();
        assert_eq!(a, NodeId(1));
        assert!(b > a);
        assert_eq!(nodes.allocated(), 2);
    }
}
