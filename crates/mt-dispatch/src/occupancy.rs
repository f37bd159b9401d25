//! Location occupancy and congestion advisories.
//!
//! Occupancy is rebuilt from guide status reports: each guide's latest
//! report overwrites its previous one, so a repeated report changes nothing.
//! A location's occupancy is the sum of group sizes of the guides whose
//! latest report names it.
//!
//! Advisories are edge-triggered: a level is announced when it is first
//! crossed, and cleared once by the periodic scan.

use std::collections::BTreeMap;

use mt_actor::AdvisoryLevel;
use mt_core::{GuideId, LocationId};

/// What changed at a location after a report or a scan.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AdvisoryChange {
    Raised(AdvisoryLevel),
    Cleared,
}

#[derive(Clone, Debug, Default)]
pub struct OccupancyBoard {
    reports:    BTreeMap<GuideId, (LocationId, usize)>,
    advisories: BTreeMap<LocationId, AdvisoryLevel>,
}

/// Level implied by `occupancy / capacity`.  A zero capacity location is
/// congested as soon as anyone is in it.
pub fn level_for(occupancy: usize, capacity: usize, warn: f64, critical: f64) -> Option<AdvisoryLevel> {
    if occupancy == 0 {
        return None;
    }
    let ratio = if capacity == 0 { f64::INFINITY } else { occupancy as f64 / capacity as f64 };
    if ratio > critical {
        Some(AdvisoryLevel::Critical)
    } else if ratio > warn {
        Some(AdvisoryLevel::Congested)
    } else {
        None
    }
}

impl OccupancyBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite `guide`'s position.
    pub fn report(&mut self, guide: GuideId, location: LocationId, group_size: usize) {
        self.reports.insert(guide, (location, group_size));
    }

    /// Forget `guide`; its group left the floor.
    pub fn clear(&mut self, guide: GuideId) -> Option<LocationId> {
        self.reports.remove(&guide).map(|(loc, _)| loc)
    }

    pub fn occupancy(&self, location: LocationId) -> usize {
        self.reports.values().filter(|(l, _)| *l == location).map(|(_, n)| n).sum()
    }

    pub fn location_of(&self, guide: GuideId) -> Option<LocationId> {
        self.reports.get(&guide).map(|(l, _)| *l)
    }

    pub fn guides_at(&self, location: LocationId) -> Vec<GuideId> {
        self.reports.iter().filter(|(_, (l, _))| *l == location).map(|(g, _)| *g).collect()
    }

    pub fn advisory(&self, location: LocationId) -> Option<AdvisoryLevel> {
        self.advisories.get(&location).copied()
    }

    pub fn advisories(&self) -> &BTreeMap<LocationId, AdvisoryLevel> {
        &self.advisories
    }

    /// Occupancy per location with anyone in it.
    pub fn by_location(&self) -> BTreeMap<LocationId, usize> {
        let mut out = BTreeMap::new();
        for (loc, n) in self.reports.values() {
            *out.entry(*loc).or_insert(0) += n;
        }
        out
    }

    /// Raise the stored level if `location` just crossed a higher one.
    ///
    /// Falling levels are left for [`scan`](Self::scan).
    pub fn escalate(
        &mut self,
        location: LocationId,
        capacity: usize,
        warn:     f64,
        critical: f64,
    ) -> Option<AdvisoryChange> {
        let level = level_for(self.occupancy(location), capacity, warn, critical)?;
        match self.advisories.get(&location) {
            Some(current) if *current >= level => None,
            _ => {
                self.advisories.insert(location, level);
                Some(AdvisoryChange::Raised(level))
            }
        }
    }

    /// Re-evaluate every location under advisory.  Locations back below the
    /// warn ratio are cleared; others are lowered to their current level
    /// silently.  `capacity_of` returns `None` for unknown locations, which
    /// are cleared.
    pub fn scan<F>(&mut self, warn: f64, critical: f64, capacity_of: F) -> Vec<LocationId>
    where
        F: Fn(LocationId) -> Option<usize>,
    {
        let mut cleared = Vec::new();
        let locations: Vec<LocationId> = self.advisories.keys().copied().collect();
        for loc in locations {
            let level = capacity_of(loc)
                .and_then(|cap| level_for(self.occupancy(loc), cap, warn, critical));
            match level {
                Some(l) => {
                    self.advisories.insert(loc, l);
                }
                None => {
                    self.advisories.remove(&loc);
                    cleared.push(loc);
                }
            }
        }
        cleared
    }
}
