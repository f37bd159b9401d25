//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use mt_core::{SimClock, SimConfig, Tick};
use mt_sim::{MuseumSnapshot, SimObserver, TickSummary, TourRecord};

use crate::row::{GuideSnapshotRow, TickSummaryRow, TourRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that streams tours, tick summaries and guide snapshots
/// to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `museum.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    clock:      SimClock,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for wall-clock
    /// conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            clock:      config.make_clock(),
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `museum.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "output write failed");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick:             summary.tick.0,
            unix_time_secs:   self.clock.unix_secs_at(summary.tick),
            arrivals:         summary.arrivals as u64,
            delivered:        summary.delivered as u64,
            bounced:          summary.bounced as u64,
            waiting:          summary.waiting as u64,
            guides_available: summary.guides_available as u64,
            guides_busy:      summary.guides_busy as u64,
            guides_cooling:   summary.guides_cooling as u64,
            visitors_present: summary.visitors_present as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_tour_completed(&mut self, record: &TourRecord) {
        let row = TourRow {
            tick:             record.tick.0,
            guide:            record.guide.0,
            group:            record.group.0,
            group_size:       record.group_size as u32,
            stops_visited:    record.stops_visited as u32,
            avg_satisfaction: record.avg_satisfaction,
            avg_cohesion:     record.avg_cohesion,
            avg_fatigue:      record.avg_fatigue,
            degraded:         record.degraded,
        };
        let result = self.writer.write_tour(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, snapshot: &MuseumSnapshot) {
        let rows: Vec<GuideSnapshotRow> = snapshot
            .guides
            .iter()
            .map(|g| GuideSnapshotRow {
                guide:            g.id.0,
                tick:             snapshot.tick.0,
                availability:     g.availability.as_str(),
                group:            g.group.map_or(u32::MAX, |id| id.0),
                members:          g.members.len() as u32,
                location:         g.location.map_or(u16::MAX, |id| id.0),
                avg_satisfaction: g.avg_satisfaction,
                completed_tours:  g.completed_tours,
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_guide_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        tracing::debug!(%final_tick, "flushing output");
        let result = self.writer.finish();
        self.store_err(result);
    }
}
