//! Identity-keyed node cache.
//!
//! Nodes are cached under the address of the `Arc` holding their source
//! value, never under value equality. Each entry keeps its value alive, so an
//! address cannot be reused by another allocation while the entry exists.
//!
//! Entries live in a [`SlotMap`] arena and are swept at build boundaries: an
//! entry that was neither inserted nor reused during one completed build is
//! dropped when the next build begins. A build that was abandoned or failed
//! never causes a sweep.

use std::collections::HashMap;
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;
use crate::node::Node;

new_key_type! {
    /// Handle of one cache entry.
    struct CacheSlot;
}

/// Stable surrogate for a value's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ValueId(usize);

impl ValueId {
    fn of<T>(value: &Arc<T>) -> Self {
        Self(Arc::as_ptr(value) as *const () as usize)
    }
}

struct CacheEntry<T> {
    // Held only to pin the address behind `ValueId`.
    _value: Arc<T>,
    node: Arc<Node<T>>,
    generation: u64,
}

/// Cache from source value identity to the node last built for it.
pub(crate) struct NodeCache<T> {
    entries: SlotMap<CacheSlot, CacheEntry<T>>,
    index: HashMap<ValueId, CacheSlot>,
    generation: u64,
    /// Whether the current pass ran to the end of its input.
    completed: bool,
}

impl<T> NodeCache<T> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            index: HashMap::new(),
            generation: 0,
            completed: false,
        }
    }

    /// Starts a new build pass.
    ///
    /// Entries unused by the previous pass are swept only if that pass
    /// completed; otherwise their marks are kept as they are.
    pub fn begin_pass(&mut self) {
        if self.completed {
            let live = self.generation;
            let before = self.entries.len();
            self.entries.retain(|_, entry| entry.generation >= live);
            let entries = &self.entries;
            self.index.retain(|_, slot| entries.contains_key(*slot));

            let swept = before - self.entries.len();
            if swept > 0 {
                tracing::debug!(target: targets::CACHE, swept, remaining = self.entries.len(), generation = live, "swept stale cache entries");
            }
        } else if self.generation > 0 {
            tracing::trace!(target: targets::CACHE, generation = self.generation, "previous pass incomplete, skipping sweep");
        }
        self.generation += 1;
        self.completed = false;
    }

    /// Marks the current pass as having visited its whole input.
    pub fn complete_pass(&mut self) {
        self.completed = true;
    }

    /// Returns the cached node for `value`.
    pub fn get(&self, value: &Arc<T>) -> Option<Arc<Node<T>>> {
        let slot = self.index.get(&ValueId::of(value))?;
        self.entries.get(*slot).map(|entry| Arc::clone(&entry.node))
    }

    /// Whether `value` was already inserted or reused in the current pass.
    pub fn is_live(&self, value: &Arc<T>) -> bool {
        self.index
            .get(&ValueId::of(value))
            .and_then(|slot| self.entries.get(*slot))
            .is_some_and(|entry| entry.generation == self.generation)
    }

    /// Stores `node` as the node for `value`, replacing any previous entry.
    pub fn insert(&mut self, value: &Arc<T>, node: Arc<Node<T>>) {
        let id = ValueId::of(value);
        let entry = CacheEntry {
            _value: Arc::clone(value),
            node,
            generation: self.generation,
        };
        match self.index.get(&id).and_then(|slot| self.entries.get_mut(*slot)) {
            Some(existing) => *existing = entry,
            None => {
                let slot = self.entries.insert(entry);
                self.index.insert(id, slot);
            }
        }
        tracing::trace!(target: targets::CACHE, ?id, "cached node");
    }

    /// Marks the entries of `node` and all its descendants as live in the
    /// current pass.
    pub fn touch_subtree(&mut self, node: &Node<T>) {
        if let Some(value) = node.value() {
            let generation = self.generation;
            if let Some(entry) = self
                .index
                .get(&ValueId::of(value))
                .and_then(|slot| self.entries.get_mut(*slot))
            {
                entry.generation = generation;
            }
        }
        for child in node.child_nodes() {
            self.touch_subtree(child);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
