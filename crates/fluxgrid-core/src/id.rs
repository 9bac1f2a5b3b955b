use serde::{Deserialize, Serialize};

/// Identifies a power network. Cheap to copy and compare.
///
/// Ids are allocated from a monotonic counter, so the "smallest id" of a
/// set of networks is also the oldest surviving one. Ids are never reused;
/// a network produced by a merge keeps the target's id, and every fragment
/// of a split gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub u64);

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "net#{}", self.0)
    }
}

/// Hands out fresh [`NetworkId`]s. Owned by the network manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkIdAllocator {
    next: u64,
}

impl NetworkIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id. Never returns the same id twice.
    pub fn allocate(&mut self) -> NetworkId {
        let id = NetworkId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_ids_are_unique_and_ascending() {
        let mut alloc = NetworkIdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let c = alloc.allocate();
        assert!(a < b && b < c);
        assert_ne!(a, c);
    }

    #[test]
    fn display_shows_counter() {
        assert_eq!(NetworkId(7).to_string(), "net#7");
    }
}
