//! Tour coordination constants.
//!
//! Every threshold and timer the dispatcher, guides and visitors consult is a
//! field here rather than a literal in the actor code, so experiments can
//! vary congestion thresholds or emergency timing without touching logic.
//! `Default` carries the reference values.

use crate::{MtError, MtResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TourConfig {
    // ── Group sizing ──────────────────────────────────────────────────────
    /// Smallest group the dispatcher will form.
    pub min_group_size: usize,
    /// Hard ceiling on group size, even under queue pressure.
    pub max_group_size: usize,
    /// A tour whose roster shrinks below this is aborted as degraded.
    pub min_viable_group_size: usize,

    // ── Periodic callbacks (ticks) ────────────────────────────────────────
    pub formation_interval_ticks:  u64,
    pub congestion_interval_ticks: u64,
    pub workload_interval_ticks:   u64,
    pub status_interval_ticks:     u64,
    pub cohesion_interval_ticks:   u64,
    pub visitor_tick_interval:     u64,

    // ── Dispatcher ────────────────────────────────────────────────────────
    /// Ticks a guide spends in CoolingDown after `TourCompleted`.
    pub cooldown_ticks: u64,
    /// Max-minus-min completed tours above which a balancing alert fires.
    pub workload_spread_threshold: u32,
    /// Occupancy / capacity above which guides are told to avoid a location.
    pub congestion_warn_ratio: f64,
    /// Occupancy / capacity above which the guides there are told to reroute.
    pub congestion_critical_ratio: f64,
    pub emergency_resolve_min_ticks: u64,
    pub emergency_resolve_max_ticks: u64,
    /// Registry misses tolerated before a peer is treated as unreachable.
    pub lookup_retry_limit: u32,
    pub lookup_retry_ticks: u64,
    /// Guide score = w_sat * last_sat + w_rest * (1 - last_fatigue)
    ///             + w_fair / (completed + 1)
    pub score_satisfaction_weight: f64,
    pub score_rest_weight:         f64,
    pub score_fairness_weight:     f64,

    // ── Guide ─────────────────────────────────────────────────────────────
    pub convergence_attempts:      u32,
    pub convergence_timeout_ticks: u64,
    pub break_fatigue_threshold:   f64,
    pub break_duration_ticks:      u64,
    pub break_vote_timeout_ticks:  u64,
    /// Share of accepting members that counts as consensus.
    pub break_acceptance_ratio:    f64,
    pub cohesion_threshold:        f64,
    pub cohesion_retry_budget:     u32,
    /// Satisfaction and cohesion above these loosen the formation.
    pub loosen_satisfaction:       f64,
    pub loosen_cohesion:           f64,
    /// How long a guide waits for a closed stop to reopen before skipping it.
    pub reopen_wait_ticks:         u64,

    // ── Visitor ───────────────────────────────────────────────────────────
    /// Questions one visitor may ask per tour.
    pub question_budget: u32,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            min_group_size:        3,
            max_group_size:        8,
            min_viable_group_size: 2,

            formation_interval_ticks:  5,
            congestion_interval_ticks: 10,
            workload_interval_ticks:   30,
            status_interval_ticks:     10,
            cohesion_interval_ticks:   5,
            visitor_tick_interval:     10,

            cooldown_ticks:              15,
            workload_spread_threshold:   2,
            congestion_warn_ratio:       0.8,
            congestion_critical_ratio:   0.9,
            emergency_resolve_min_ticks: 30,
            emergency_resolve_max_ticks: 90,
            lookup_retry_limit:          3,
            lookup_retry_ticks:          5,
            score_satisfaction_weight:   0.6,
            score_rest_weight:           0.3,
            score_fairness_weight:       0.1,

            convergence_attempts:      3,
            convergence_timeout_ticks: 8,
            break_fatigue_threshold:   0.7,
            break_duration_ticks:      20,
            break_vote_timeout_ticks:  5,
            break_acceptance_ratio:    0.5,
            cohesion_threshold:        0.5,
            cohesion_retry_budget:     3,
            loosen_satisfaction:       0.75,
            loosen_cohesion:           0.8,
            reopen_wait_ticks:         60,

            question_budget: 3,
        }
    }
}

impl TourConfig {
    /// Check cross-field constraints.  Called by the simulation builder.
    pub fn validate(&self) -> MtResult<()> {
        if self.min_group_size == 0 {
            return Err(MtError::Config("min_group_size must be >= 1".into()));
        }
        if self.min_group_size > self.max_group_size {
            return Err(MtError::Config(format!(
                "min_group_size {} exceeds max_group_size {}",
                self.min_group_size, self.max_group_size
            )));
        }
        if self.min_viable_group_size == 0 || self.min_viable_group_size > self.min_group_size {
            return Err(MtError::Config(format!(
                "min_viable_group_size must be in 1..={}",
                self.min_group_size
            )));
        }
        let intervals = [
            ("formation_interval_ticks",  self.formation_interval_ticks),
            ("congestion_interval_ticks", self.congestion_interval_ticks),
            ("workload_interval_ticks",   self.workload_interval_ticks),
            ("status_interval_ticks",     self.status_interval_ticks),
            ("cohesion_interval_ticks",   self.cohesion_interval_ticks),
            ("visitor_tick_interval",     self.visitor_tick_interval),
            ("convergence_timeout_ticks", self.convergence_timeout_ticks),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(MtError::Config(format!("{name} must be > 0")));
            }
        }
        if !(0.0 < self.congestion_warn_ratio
            && self.congestion_warn_ratio < self.congestion_critical_ratio)
        {
            return Err(MtError::Config(
                "congestion ratios must satisfy 0 < warn < critical".into(),
            ));
        }
        if self.emergency_resolve_min_ticks == 0
            || self.emergency_resolve_min_ticks > self.emergency_resolve_max_ticks
        {
            return Err(MtError::Config(
                "emergency resolution window must satisfy 0 < min <= max".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.break_acceptance_ratio) {
            return Err(MtError::Config("break_acceptance_ratio must be in [0, 1]".into()));
        }
        if self.convergence_attempts == 0 {
            return Err(MtError::Config("convergence_attempts must be >= 1".into()));
        }
        Ok(())
    }
}
