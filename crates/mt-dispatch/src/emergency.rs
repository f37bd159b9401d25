//! Closed locations.

use std::collections::BTreeMap;

use mt_actor::EmergencyKind;
use mt_core::{LocationId, Tick, TimerId};

#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Closure {
    pub kind:   EmergencyKind,
    pub since:  Tick,
    /// Pending `EmergencyResolve` timer.
    pub timer:  TimerId,
}

#[derive(Clone, Debug, Default)]
pub struct EmergencyBook {
    closed: BTreeMap<LocationId, Closure>,
}

impl EmergencyBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close `location`.  A second emergency at an already closed location
    /// replaces the first; the superseded resolve timer is returned so the
    /// caller can cancel it.
    pub fn close(&mut self, location: LocationId, closure: Closure) -> Option<TimerId> {
        self.closed.insert(location, closure).map(|old| old.timer)
    }

    pub fn reopen(&mut self, location: LocationId) -> Option<Closure> {
        self.closed.remove(&location)
    }

    pub fn get(&self, location: LocationId) -> Option<&Closure> {
        self.closed.get(&location)
    }

    pub fn is_closed(&self, location: LocationId) -> bool {
        self.closed.contains_key(&location)
    }

    pub fn closed(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.closed.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &Closure)> + '_ {
        self.closed.iter().map(|(&loc, c)| (loc, c))
    }

    pub fn len(&self) -> usize {
        self.closed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closed.is_empty()
    }
}
