//! Bounded transposition table mapping position hashes to canonical nodes.
//!
//! The table binds positions reached through different move orders to one
//! node's statistics. It is strictly best-effort: entries are overwritten on
//! collision, merges race with live updates, and the search stays correct
//! with the table disabled. Entries hold `Weak` references — the table
//! never owns tree nodes.

use std::sync::{Arc, Mutex, Weak};

use crate::node::UctNode;

struct Slot {
    key: u64,
    node: Weak<UctNode>,
}

/// Fixed-size table, slot index = hash mod slots, full key stored for
/// verification. A slot count of zero disables the table entirely.
pub struct TranspositionTable {
    slots: Vec<Mutex<Option<Slot>>>,
}

impl TranspositionTable {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: (0..slots).map(|_| Mutex::new(None)).collect(),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Merge the canonical statistics for `hash` into `node`, then make
    /// `node` the canonical entry.
    ///
    /// Called on entry to every node during a descent. If a different live
    /// node is registered under the same key, its visit/value statistics
    /// are copied over — last writer wins, small double-counting accepted.
    pub fn sync(&self, hash: u64, node: &Arc<UctNode>) {
        if self.slots.is_empty() {
            return;
        }
        let index = (hash % self.slots.len() as u64) as usize;
        let mut slot = self.slots[index].lock().unwrap();

        if let Some(entry) = slot.as_ref() {
            if entry.key == hash {
                if let Some(canonical) = entry.node.upgrade() {
                    if !Arc::ptr_eq(&canonical, node) {
                        let (visits, value_sum) = canonical.stats();
                        node.set_stats(visits, value_sum);
                    }
                }
            }
        }

        *slot = Some(Slot {
            key: hash,
            node: Arc::downgrade(node),
        });
    }

    /// Re-register `node` as canonical for `hash` after its statistics were
    /// updated. A no-op unless another thread changed the mapping.
    pub fn publish(&self, hash: u64, node: &Arc<UctNode>) {
        if self.slots.is_empty() {
            return;
        }
        let index = (hash % self.slots.len() as u64) as usize;
        let mut slot = self.slots[index].lock().unwrap();
        *slot = Some(Slot {
            key: hash,
            node: Arc::downgrade(node),
        });
    }
}
