// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tracking of per-node viewer resources.
//!
//! Display nodes own a host-side drawing resource (a viewport callback,
//! a debug overlay) that must be created exactly once per node and torn
//! down when the node stops drawing or is removed.

use meshweave_graph::NodeId;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// Registry of live display handles, keyed by the owning node.
///
/// `H` is whatever the host hands out for an active drawing hook.
/// Acquire and release are idempotent, so node `update` can call them
/// unconditionally on every pass.
#[derive(Debug, Default)]
pub struct DisplayRegistry<H> {
    handles: Mutex<HashMap<NodeId, H>>,
}

impl<H> DisplayRegistry<H> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Ensure a handle exists for `node`, creating one with `make` if
    /// needed. Returns true if a new handle was created.
    pub fn acquire(&self, node: NodeId, make: impl FnOnce() -> H) -> bool {
        let mut handles = self.handles.lock();
        if handles.contains_key(&node) {
            return false;
        }
        debug!(?node, "display handle created");
        handles.insert(node, make());
        true
    }

    /// Remove and return the handle for `node`, if one is active
    pub fn release(&self, node: NodeId) -> Option<H> {
        let removed = self.handles.lock().remove(&node);
        if removed.is_some() {
            debug!(?node, "display handle released");
        }
        removed
    }

    /// Remove all handles, returning them for teardown
    pub fn release_all(&self) -> Vec<H> {
        let mut handles = self.handles.lock();
        let count = handles.len();
        if count > 0 {
            debug!(count, "releasing all display handles");
        }
        handles.drain().map(|(_, h)| h).collect()
    }

    /// True if `node` currently owns a handle
    pub fn is_active(&self, node: NodeId) -> bool {
        self.handles.lock().contains_key(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_is_idempotent() {
        let registry = DisplayRegistry::new();
        let node = NodeId::new();
        assert!(registry.acquire(node, || 7_u32));
        assert!(!registry.acquire(node, || 8_u32));
        assert!(registry.is_active(node));
        // The first handle survived the second acquire.
        assert_eq!(registry.release(node), Some(7));
    }

    #[test]
    fn test_release_missing_is_noop() {
        let registry = DisplayRegistry::<u32>::new();
        let node = NodeId::new();
        assert_eq!(registry.release(node), None);
        assert!(!registry.is_active(node));
    }

    #[test]
    fn test_release_all_drains() {
        let registry = DisplayRegistry::new();
        let a = NodeId::new();
        let b = NodeId::new();
        registry.acquire(a, || "a");
        registry.acquire(b, || "b");
        let mut handles = registry.release_all();
        handles.sort_unstable();
        assert_eq!(handles, vec!["a", "b"]);
        assert!(!registry.is_active(a));
        assert!(!registry.is_active(b));
    }
}
