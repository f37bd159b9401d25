//! Visitor wait queue.

use std::collections::{BTreeSet, VecDeque};

use mt_core::VisitorId;

/// FIFO of waiting visitors.
///
/// A visitor appears at most once.  Requeued visitors (refused or bounced
/// assignments) go back to the head in their original order so they do not
/// lose their place.
#[derive(Clone, Debug, Default)]
pub struct WaitQueue {
    queue:   VecDeque<VisitorId>,
    members: BTreeSet<VisitorId>,
}

impl WaitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `visitor`.  Returns `false` if it was already queued.
    pub fn push_back(&mut self, visitor: VisitorId) -> bool {
        if !self.members.insert(visitor) {
            return false;
        }
        self.queue.push_back(visitor);
        true
    }

    /// Put `visitors` at the head, keeping their relative order.  Already
    /// queued visitors are skipped.  Returns how many were inserted.
    pub fn push_front_many(&mut self, visitors: &[VisitorId]) -> usize {
        let mut inserted = 0;
        for &v in visitors.iter().rev() {
            if self.members.insert(v) {
                self.queue.push_front(v);
                inserted += 1;
            }
        }
        inserted
    }

    /// Remove up to `n` visitors from the head.
    pub fn pop_front_n(&mut self, n: usize) -> Vec<VisitorId> {
        let n = n.min(self.queue.len());
        let taken: Vec<VisitorId> = self.queue.drain(..n).collect();
        for v in &taken {
            self.members.remove(v);
        }
        taken
    }

    pub fn remove(&mut self, visitor: VisitorId) -> bool {
        if !self.members.remove(&visitor) {
            return false;
        }
        self.queue.retain(|&v| v != visitor);
        true
    }

    pub fn contains(&self, visitor: VisitorId) -> bool {
        self.members.contains(&visitor)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = VisitorId> + '_ {
        self.queue.iter().copied()
    }
}
