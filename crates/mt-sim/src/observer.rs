//! Simulation observer trait for progress reporting and data collection.

use mt_core::{GroupId, GuideId, Tick};

use crate::MuseumSnapshot;

/// What one tick did, and where the museum stands after it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSummary {
    pub tick:             Tick,
    pub arrivals:         usize,
    pub delivered:        usize,
    pub bounced:          usize,
    pub timers_fired:     usize,
    pub waiting:          usize,
    pub guides_available: usize,
    pub guides_busy:      usize,
    pub guides_cooling:   usize,
    pub visitors_present: usize,
}

/// One finished tour, as reported to the dispatcher.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourRecord {
    pub tick:             Tick,
    pub guide:            GuideId,
    pub group:            GroupId,
    pub group_size:       usize,
    pub stops_visited:    usize,
    pub avg_satisfaction: f64,
    pub avg_cohesion:     f64,
    pub avg_fatigue:      f64,
    pub degraded:         bool,
}

/// Callbacks invoked by [`Museum::run`][crate::Museum::run] at key points in
/// the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, summary: &TickSummary) {
///         if summary.tick.0 % self.interval == 0 {
///             println!("{}: {} waiting", summary.tick, summary.waiting);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called when a `TourCompleted` reaches the dispatcher.
    fn on_tour_completed(&mut self, _record: &TourRecord) {}

    /// Called every `config.output_interval_ticks` ticks.
    fn on_snapshot(&mut self, _snapshot: &MuseumSnapshot) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Keeps every tour record and the largest queue seen.
#[derive(Default, Debug)]
pub struct TourLog {
    pub records:    Vec<TourRecord>,
    pub max_queue:  usize,
    pub last_tick:  Option<TickSummary>,
}

impl TourLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimObserver for TourLog {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.max_queue = self.max_queue.max(summary.waiting);
        self.last_tick = Some(*summary);
    }

    fn on_tour_completed(&mut self, record: &TourRecord) {
        self.records.push(*record);
    }
}
