// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Process-unique, monotonically increasing node identifiers.

use std::sync::atomic::{AtomicU32, Ordering};

/// Identifies a node (pane or group) in a [`super::Tree`]. IDs are assigned by
/// [`NodeId::allocator`] in increasing order starting from 1 and are never
/// reused, even after the node they named is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub fn get(self) -> u32 { self.0 }

    /// Reconstructs a `NodeId` from its raw value, e.g. one just decoded off
    /// the wire. Callers are responsible for the value having originated
    /// from a real [`NodeIdAllocator`] — this does not itself guard against
    /// referencing an ID that was never allocated (that check happens when
    /// the ID is looked up in a [`super::Tree`]).
    #[must_use]
    pub fn from_raw(value: u32) -> Self { NodeId(value) }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Atomic monotone allocator backing [`NodeId`]. One lives on each [`super::Tree`];
/// IDs from two different allocators are not comparable across trees.
#[derive(Debug, Default)]
pub struct NodeIdAllocator {
    next: AtomicU32,
}

impl NodeIdAllocator {
    #[must_use]
    pub fn new() -> Self { Self { next: AtomicU32::new(1) } }

    /// Returns the next never-before-issued ID.
    pub fn allocate(&self) -> NodeId { NodeId(self.next.fetch_add(1, Ordering::Relaxed)) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn allocations_are_monotone_and_unique() {
        let allocator = NodeIdAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();
        let c = allocator.allocate();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn display_shows_the_raw_number() {
        let allocator = NodeIdAllocator::new();
        let id = allocator.allocate();
        assert_eq!(id.to_string(), "1");
    }
}
