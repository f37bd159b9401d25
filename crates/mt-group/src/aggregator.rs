//! Group Dynamics Aggregator.
//!
//! Keeps the most recent satisfaction, fatigue and cohesion reported by each
//! member of a group and rolls them up on demand.  Updates are last-write per
//! metric: replaying a status update leaves the aggregate unchanged.
//!
//! Members are kept in a `BTreeMap` so averages are summed in a fixed order
//! and outliers come back sorted by id.

use std::collections::BTreeMap;

use mt_core::{Metric, VisitorId, unit};

/// Average satisfaction reported for an empty group.
pub const DEFAULT_SATISFACTION: f64 = 0.5;
/// Average fatigue reported for an empty group.
pub const DEFAULT_FATIGUE: f64 = 0.0;
/// Average cohesion reported for an empty group.
pub const DEFAULT_COHESION: f64 = 0.7;

/// A member counts as an outlier when this far below the group's average
/// satisfaction.
pub const OUTLIER_GAP: f64 = 0.3;

/// The latest metrics reported by one member.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberMetrics {
    pub satisfaction: f64,
    pub fatigue:      f64,
    pub cohesion:     f64,
}

impl Default for MemberMetrics {
    fn default() -> Self {
        Self {
            satisfaction: DEFAULT_SATISFACTION,
            fatigue:      DEFAULT_FATIGUE,
            cohesion:     DEFAULT_COHESION,
        }
    }
}

impl MemberMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Satisfaction => self.satisfaction,
            Metric::Fatigue      => self.fatigue,
            Metric::Cohesion     => self.cohesion,
        }
    }

    fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Satisfaction => &mut self.satisfaction,
            Metric::Fatigue      => &mut self.fatigue,
            Metric::Cohesion     => &mut self.cohesion,
        };
        *slot = unit(value);
    }
}

/// Per-group metric rollup.
#[derive(Clone, Debug, Default)]
pub struct GroupDynamics {
    members: BTreeMap<VisitorId, MemberMetrics>,
}

impl GroupDynamics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `visitor` with default metrics.  No-op if already tracked.
    pub fn track(&mut self, visitor: VisitorId) {
        self.members.entry(visitor).or_default();
    }

    /// Overwrite one metric for a tracked member.
    ///
    /// Values are clamped to `[0, 1]`.  Returns `false` (and records nothing)
    /// when `visitor` is not tracked, so late updates from a member that was
    /// already dropped cannot resurrect it.
    pub fn ingest(&mut self, visitor: VisitorId, metric: Metric, value: f64) -> bool {
        match self.members.get_mut(&visitor) {
            Some(m) => {
                m.set(metric, value);
                true
            }
            None => false,
        }
    }

    /// Overwrite all three metrics at once (one `StatusUpdate`).
    pub fn ingest_all(&mut self, visitor: VisitorId, sample: MemberMetrics) -> bool {
        let Some(m) = self.members.get_mut(&visitor) else {
            return false;
        };
        m.set(Metric::Satisfaction, sample.satisfaction);
        m.set(Metric::Fatigue, sample.fatigue);
        m.set(Metric::Cohesion, sample.cohesion);
        true
    }

    /// Mean of `metric` across members, or the metric's default when empty.
    pub fn average(&self, metric: Metric) -> f64 {
        if self.members.is_empty() {
            return MemberMetrics::default().get(metric);
        }
        let sum: f64 = self.members.values().map(|m| m.get(metric)).sum();
        sum / self.members.len() as f64
    }

    pub fn average_satisfaction(&self) -> f64 {
        self.average(Metric::Satisfaction)
    }

    pub fn average_fatigue(&self) -> f64 {
        self.average(Metric::Fatigue)
    }

    pub fn average_cohesion(&self) -> f64 {
        self.average(Metric::Cohesion)
    }

    /// Members whose satisfaction sits at least [`OUTLIER_GAP`] below the
    /// group average, in ascending id order.
    pub fn identify_outliers(&self) -> Vec<VisitorId> {
        let avg = self.average_satisfaction();
        self.members
            .iter()
            .filter(|(_, m)| avg - m.satisfaction >= OUTLIER_GAP - 1e-9)
            .map(|(&v, _)| v)
            .collect()
    }

    pub fn get(&self, visitor: VisitorId) -> Option<&MemberMetrics> {
        self.members.get(&visitor)
    }

    /// Stop tracking a member (dropped from the roster).
    pub fn remove(&mut self, visitor: VisitorId) -> bool {
        self.members.remove(&visitor).is_some()
    }

    /// Forget everything; called when the guide is recycled.
    pub fn reset(&mut self) {
        self.members.clear();
    }

    pub fn contains(&self, visitor: VisitorId) -> bool {
        self.members.contains_key(&visitor)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
