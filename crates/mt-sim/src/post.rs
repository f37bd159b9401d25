//! The message channel.

use std::collections::{BTreeMap, VecDeque};

use mt_actor::{Address, Message};
use mt_core::Tick;

/// One message in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Letter {
    pub from: Address,
    pub to:   Address,
    pub msg:  Message,
}

/// Letters keyed by delivery tick.
///
/// Letters due at the same tick come out in posting order.  With a uniform
/// latency that preserves the order between any sender and receiver.
#[derive(Default)]
pub struct PostOffice {
    due:   BTreeMap<Tick, VecDeque<Letter>>,
    count: usize,
}

impl PostOffice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, at: Tick, letter: Letter) {
        self.due.entry(at).or_default().push_back(letter);
        self.count += 1;
    }

    /// Next letter due at `tick`, if any.
    pub fn pop_tick(&mut self, tick: Tick) -> Option<Letter> {
        let bucket = self.due.get_mut(&tick)?;
        let letter = bucket.pop_front();
        if bucket.is_empty() {
            self.due.remove(&tick);
        }
        if letter.is_some() {
            self.count -= 1;
        }
        letter
    }

    /// Letters in flight addressed to `to`.
    pub fn pending_for(&self, to: Address) -> usize {
        self.due.values().flatten().filter(|l| l.to == to).count()
    }

    pub fn next_tick(&self) -> Option<Tick> {
        self.due.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
