//! Pending exits ordered for finalization.
//!
//! A `BTreeSet<ExitPriority>` keeps the finalization order (smallest key
//! first). An auxiliary `HashMap<Slot, ExitPriority>` gives O(log N)
//! removal when an exit is challenged or finalized.

use std::collections::{BTreeSet, HashMap};

use plasma_types::{ExitPriority, Slot};

/// Min-ordered set of pending exits, at most one per slot.
#[derive(Debug, Default)]
pub struct ExitQueue {
    ordered: BTreeSet<ExitPriority>,
    index: HashMap<Slot, ExitPriority>,
}

impl ExitQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an exit. Returns `false` if the slot is already queued.
    pub fn insert(&mut self, priority: ExitPriority) -> bool {
        if self.index.contains_key(&priority.slot) {
            return false;
        }
        self.index.insert(priority.slot, priority);
        self.ordered.insert(priority);
        true
    }

    /// Dequeue the exit for `slot`, returning its key.
    pub fn remove(&mut self, slot: Slot) -> Option<ExitPriority> {
        let priority = self.index.remove(&slot)?;
        self.ordered.remove(&priority);
        Some(priority)
    }

    #[must_use]
    pub fn priority_of(&self, slot: Slot) -> Option<ExitPriority> {
        self.index.get(&slot).copied()
    }

    #[must_use]
    pub fn contains(&self, slot: Slot) -> bool {
        self.index.contains_key(&slot)
    }

    /// Next exit in finalization order.
    #[must_use]
    pub fn peek(&self) -> Option<&ExitPriority> {
        self.ordered.first()
    }

    /// All queued exits in finalization order.
    pub fn iter(&self) -> impl Iterator<Item = &ExitPriority> {
        self.ordered.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
