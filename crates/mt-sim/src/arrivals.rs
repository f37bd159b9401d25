//! Scheduled visitor arrivals.

use mt_core::Tick;

/// `batch` new visitors every `interval` ticks from `start`, optionally until
/// `until` (inclusive) and up to `limit` in total.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrivalPlan {
    pub interval: u64,
    pub batch:    usize,
    pub start:    Tick,
    pub until:    Option<Tick>,
    pub limit:    Option<usize>,
}

impl ArrivalPlan {
    pub fn every(interval: u64, batch: usize) -> Self {
        Self { interval, batch, start: Tick(interval), until: None, limit: None }
    }

    pub fn starting(mut self, start: Tick) -> Self {
        self.start = start;
        self
    }

    pub fn until(mut self, last: Tick) -> Self {
        self.until = Some(last);
        self
    }

    pub fn limit(mut self, total: usize) -> Self {
        self.limit = Some(total);
        self
    }

    /// How many visitors arrive at `tick`, given `so_far` already arrived.
    pub fn due(&self, tick: Tick, so_far: usize) -> usize {
        if self.interval == 0 || tick < self.start {
            return 0;
        }
        if self.until.is_some_and(|last| tick > last) {
            return 0;
        }
        if !tick.since(self.start).is_multiple_of(self.interval) {
            return 0;
        }
        match self.limit {
            Some(limit) => self.batch.min(limit.saturating_sub(so_far)),
            None => self.batch,
        }
    }
}
