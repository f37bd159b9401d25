//! `TimerQueue` — sparse per-tick delay queue with cancellation.
//!
//! # Why this exists
//!
//! Actors never sleep.  Every "do X in N ticks" and every periodic callback
//! is an entry in this queue, and each tick the event loop drains only the
//! entries due at that tick: O(due) work instead of polling every actor.
//!
//! Cancellation is lazy.  `cancel` removes the id from the live set and the
//! stale entry is discarded when its tick is drained, so cancelling is O(1)
//! and never has to search the map.
//!
//! # Ordering
//!
//! Entries due at the same tick are returned in the order they were pushed.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;

use mt_core::{Tick, TimerId};

struct Entry<O, P> {
    id:      TimerId,
    owner:   O,
    payload: P,
}

/// A timer that came due and was not cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredTimer<O, P> {
    pub id:      TimerId,
    pub owner:   O,
    pub payload: P,
}

/// A priority queue mapping simulation ticks → timers due at that tick.
pub struct TimerQueue<O, P> {
    inner: BTreeMap<Tick, VecDeque<Entry<O, P>>>,
    /// Live (scheduled, not yet fired or cancelled) timers and their owners.
    live:  HashMap<TimerId, O>,
}

impl<O, P> Default for TimerQueue<O, P> {
    fn default() -> Self {
        Self {
            inner: BTreeMap::new(),
            live:  HashMap::new(),
        }
    }
}

impl<O: Copy + Eq + Hash, P> TimerQueue<O, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` for `owner` at tick `at` under the caller-allocated `id`.
    ///
    /// Ids must be unique for the queue's lifetime; the simulator allocates
    /// them from a monotonic counter.
    pub fn push(&mut self, at: Tick, id: TimerId, owner: O, payload: P) {
        self.inner.entry(at).or_default().push_back(Entry { id, owner, payload });
        self.live.insert(id, owner);
    }

    /// Cancel one timer.  Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id).is_some()
    }

    /// Cancel every live timer belonging to `owner`.  Returns how many were cancelled.
    pub fn cancel_owner(&mut self, owner: O) -> usize {
        let before = self.live.len();
        self.live.retain(|_, o| *o != owner);
        before - self.live.len()
    }

    /// Remove and return every live timer due at exactly `tick`.
    ///
    /// Returns `None` if nothing live was due (the common case).
    pub fn drain_tick(&mut self, tick: Tick) -> Option<Vec<FiredTimer<O, P>>> {
        let entries = self.inner.remove(&tick)?;
        let fired: Vec<FiredTimer<O, P>> = entries
            .into_iter()
            .filter(|e| self.live.remove(&e.id).is_some())
            .map(|e| FiredTimer { id: e.id, owner: e.owner, payload: e.payload })
            .collect();
        if fired.is_empty() { None } else { Some(fired) }
    }

    /// Remove and return the next live timer due at `tick`.
    ///
    /// The event loop pops one timer at a time, so a timer cancelled by an
    /// earlier handler in the same tick is skipped here.
    pub fn pop_tick(&mut self, tick: Tick) -> Option<FiredTimer<O, P>> {
        let bucket = self.inner.get_mut(&tick)?;
        let mut fired = None;
        while let Some(e) = bucket.pop_front() {
            if self.live.remove(&e.id).is_some() {
                fired = Some(FiredTimer { id: e.id, owner: e.owner, payload: e.payload });
                break;
            }
        }
        if bucket.is_empty() {
            self.inner.remove(&tick);
        }
        fired
    }

    /// `true` if `id` is scheduled and has not fired or been cancelled.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of live timers owned by `owner`.
    pub fn pending_for(&self, owner: O) -> usize {
        self.live.values().filter(|o| **o == owner).count()
    }

    /// The earliest tick with at least one queued entry (possibly cancelled).
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
