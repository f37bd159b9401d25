//! Ordered tour stops with on-the-fly rerouting.
//!
//! An itinerary is a fixed list of stops, each `Pending`, `Visited`, or
//! `Skipped`.  The guide never follows a cursor blindly: it asks for the next
//! stop given the set of closed and congested locations *right now*, so an
//! emergency or congestion advisory reroutes the tour without rewriting it.

use mt_core::LocationId;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum StopState {
    Pending,
    Visited,
    Skipped,
}

/// What the guide should do next.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NextStop {
    /// Head to this stop.
    Stop(LocationId),
    /// Stops remain but every one of them is closed.
    Blocked,
    /// Nothing left to visit.
    Finished,
}

#[derive(Clone, Debug)]
pub struct Itinerary {
    stops: Vec<(LocationId, StopState)>,
}

impl Itinerary {
    pub fn new(stops: Vec<LocationId>) -> Self {
        Self {
            stops: stops.into_iter().map(|s| (s, StopState::Pending)).collect(),
        }
    }

    /// Pick the next stop.
    ///
    /// Preference order: the first pending stop that is neither closed nor
    /// congested; otherwise the first pending stop that is merely congested.
    /// Closed stops are never returned.
    pub fn next_stop(
        &self,
        is_closed:    impl Fn(LocationId) -> bool,
        is_congested: impl Fn(LocationId) -> bool,
    ) -> NextStop {
        let mut pending = self.pending().peekable();
        if pending.peek().is_none() {
            return NextStop::Finished;
        }
        let open: Vec<LocationId> = pending.filter(|&s| !is_closed(s)).collect();
        if let Some(&stop) = open.iter().find(|&&s| !is_congested(s)) {
            return NextStop::Stop(stop);
        }
        match open.first() {
            Some(&stop) => NextStop::Stop(stop),
            None        => NextStop::Blocked,
        }
    }

    /// Record a visit.  Returns `false` if `stop` was not pending.
    pub fn mark_visited(&mut self, stop: LocationId) -> bool {
        self.transition(stop, StopState::Visited)
    }

    /// Give up on every pending stop for which `is_closed` holds.
    /// Returns how many stops were skipped.
    pub fn skip_closed(&mut self, is_closed: impl Fn(LocationId) -> bool) -> usize {
        let mut skipped = 0;
        for (stop, state) in &mut self.stops {
            if *state == StopState::Pending && is_closed(*stop) {
                *state = StopState::Skipped;
                skipped += 1;
            }
        }
        skipped
    }

    /// Number of stops visited so far (the itinerary index reported upstream).
    pub fn index(&self) -> usize {
        self.count(StopState::Visited)
    }

    pub fn remaining(&self) -> usize {
        self.count(StopState::Pending)
    }

    pub fn skipped(&self) -> usize {
        self.count(StopState::Skipped)
    }

    pub fn is_pending(&self, stop: LocationId) -> bool {
        self.stops.iter().any(|&(s, st)| s == stop && st == StopState::Pending)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Every stop in tour order, regardless of state.
    pub fn stops(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.stops.iter().map(|&(s, _)| s)
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn pending(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.stops
            .iter()
            .filter(|&&(_, st)| st == StopState::Pending)
            .map(|&(s, _)| s)
    }

    fn count(&self, state: StopState) -> usize {
        self.stops.iter().filter(|&&(_, st)| st == state).count()
    }

    fn transition(&mut self, stop: LocationId, to: StopState) -> bool {
        match self
            .stops
            .iter_mut()
            .find(|(s, st)| *s == stop && *st == StopState::Pending)
        {
            Some((_, st)) => {
                *st = to;
                true
            }
            None => false,
        }
    }
}
