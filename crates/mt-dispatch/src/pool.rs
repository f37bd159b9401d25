//! The dispatcher's view of every registered guide.
//!
//! Selection is score-based: a guide whose last group left satisfied and
//! rested scores higher, and a fairness term favours guides with fewer
//! completed tours so work spreads across the pool.

use std::collections::BTreeMap;

use mt_core::{Availability, GroupId, GuideId, Theme, TimerId, TourConfig, VisitorId};

/// Satisfaction assumed for a guide that has not finished a tour yet.
pub const FRESH_SATISFACTION: f64 = 0.5;

/// Coefficients of the guide score.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreWeights {
    pub satisfaction: f64,
    pub rest:         f64,
    pub fairness:     f64,
}

impl From<&TourConfig> for ScoreWeights {
    fn from(c: &TourConfig) -> Self {
        Self {
            satisfaction: c.score_satisfaction_weight,
            rest:         c.score_rest_weight,
            fairness:     c.score_fairness_weight,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::from(&TourConfig::default())
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuideRecord {
    pub id:                GuideId,
    pub specialization:    Theme,
    pub availability:      Availability,
    /// Group currently led, set while `Busy`.
    pub group:             Option<GroupId>,
    pub visitors:          Vec<VisitorId>,
    pub completed_tours:   u32,
    pub last_satisfaction: f64,
    pub last_fatigue:      f64,
    /// Consecutive registry misses.
    pub lookup_failures:   u32,
    pub unreachable:       bool,
    pub cooldown_timer:    Option<TimerId>,
}

impl GuideRecord {
    fn new(id: GuideId, specialization: Theme) -> Self {
        Self {
            id,
            specialization,
            availability: Availability::Available,
            group: None,
            visitors: Vec::new(),
            completed_tours: 0,
            last_satisfaction: FRESH_SATISFACTION,
            last_fatigue: 0.0,
            lookup_failures: 0,
            unreachable: false,
            cooldown_timer: None,
        }
    }

    pub fn score(&self, w: &ScoreWeights) -> f64 {
        w.satisfaction * self.last_satisfaction
            + w.rest * (1.0 - self.last_fatigue)
            + w.fairness / (self.completed_tours as f64 + 1.0)
    }

    /// Available, and not written off after repeated registry misses.
    pub fn is_eligible(&self) -> bool {
        self.availability == Availability::Available && !self.unreachable
    }
}

#[derive(Clone, Debug, Default)]
pub struct GuidePool {
    guides:  BTreeMap<GuideId, GuideRecord>,
    weights: ScoreWeights,
}

impl GuidePool {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { guides: BTreeMap::new(), weights }
    }

    /// Add a guide, or refresh one that registered again.
    ///
    /// Re-registration clears the unreachable mark but keeps history and
    /// any tour in progress.  Returns `true` for a new guide.
    pub fn register(&mut self, id: GuideId, specialization: Theme) -> bool {
        match self.guides.get_mut(&id) {
            Some(rec) => {
                rec.specialization = specialization;
                rec.lookup_failures = 0;
                rec.unreachable = false;
                false
            }
            None => {
                self.guides.insert(id, GuideRecord::new(id, specialization));
                true
            }
        }
    }

    pub fn get(&self, id: GuideId) -> Option<&GuideRecord> {
        self.guides.get(&id)
    }

    pub fn get_mut(&mut self, id: GuideId) -> Option<&mut GuideRecord> {
        self.guides.get_mut(&id)
    }

    pub fn score(&self, id: GuideId) -> Option<f64> {
        self.guides.get(&id).map(|r| r.score(&self.weights))
    }

    /// Highest-scoring eligible guide accepted by `filter`.
    ///
    /// Ties go to the guide with fewer completed tours, then the lower id.
    pub fn best_available<F>(&self, mut filter: F) -> Option<GuideId>
    where
        F: FnMut(GuideId) -> bool,
    {
        let mut best: Option<(&GuideRecord, f64)> = None;
        for rec in self.guides.values().filter(|r| r.is_eligible()) {
            if !filter(rec.id) {
                continue;
            }
            let s = rec.score(&self.weights);
            let better = match best {
                None => true,
                Some((b, bs)) => s > bs || (s == bs && rec.completed_tours < b.completed_tours),
            };
            if better {
                best = Some((rec, s));
            }
        }
        best.map(|(r, _)| r.id)
    }

    /// Mark `id` busy with `group`.
    pub fn assign(&mut self, id: GuideId, group: GroupId, visitors: Vec<VisitorId>) {
        if let Some(rec) = self.guides.get_mut(&id) {
            rec.availability = Availability::Busy;
            rec.group = Some(group);
            rec.visitors = visitors;
            rec.lookup_failures = 0;
        }
    }

    /// Record a finished tour and start the cool-down.  Returns the roster
    /// the guide was leading.
    pub fn complete(&mut self, id: GuideId, satisfaction: f64, fatigue: f64) -> Vec<VisitorId> {
        let Some(rec) = self.guides.get_mut(&id) else {
            return Vec::new();
        };
        rec.completed_tours += 1;
        rec.last_satisfaction = satisfaction;
        rec.last_fatigue = fatigue;
        rec.availability = Availability::CoolingDown;
        rec.group = None;
        std::mem::take(&mut rec.visitors)
    }

    /// Send a guide into cool-down without counting a tour, e.g. after a
    /// refused assignment.  Returns the roster it was holding.
    pub fn cool_down(&mut self, id: GuideId) -> Vec<VisitorId> {
        let Some(rec) = self.guides.get_mut(&id) else {
            return Vec::new();
        };
        rec.availability = Availability::CoolingDown;
        rec.group = None;
        std::mem::take(&mut rec.visitors)
    }

    /// Cool-down elapsed.  Returns `false` if the guide was not cooling down.
    pub fn release(&mut self, id: GuideId) -> bool {
        match self.guides.get_mut(&id) {
            Some(rec) if rec.availability == Availability::CoolingDown => {
                rec.availability = Availability::Available;
                rec.cooldown_timer = None;
                true
            }
            _ => false,
        }
    }

    /// Count a registry miss.  Returns `true` once the guide crosses `limit`
    /// and is written off.
    pub fn note_failure(&mut self, id: GuideId, limit: u32) -> bool {
        let Some(rec) = self.guides.get_mut(&id) else {
            return false;
        };
        rec.lookup_failures += 1;
        if !rec.unreachable && rec.lookup_failures >= limit {
            rec.unreachable = true;
            return true;
        }
        false
    }

    /// `(available, busy, cooling_down)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        self.guides.values().fold((0, 0, 0), |(a, b, c), r| match r.availability {
            Availability::Available   => (a + 1, b, c),
            Availability::Busy        => (a, b + 1, c),
            Availability::CoolingDown => (a, b, c + 1),
        })
    }

    /// Max minus min completed tours across reachable guides.
    pub fn workload_spread(&self) -> u32 {
        let mut it = self.guides.values().filter(|r| !r.unreachable).map(|r| r.completed_tours);
        let Some(first) = it.next() else {
            return 0;
        };
        let (lo, hi) = it.fold((first, first), |(lo, hi), n| (lo.min(n), hi.max(n)));
        hi - lo
    }

    pub fn iter(&self) -> impl Iterator<Item = &GuideRecord> {
        self.guides.values()
    }

    pub fn len(&self) -> usize {
        self.guides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guides.is_empty()
    }
}
