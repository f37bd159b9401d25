//! The `OutputWriter` trait implemented by backend writers.

use crate::{GuideSnapshotRow, OutputResult, TickSummaryRow, TourRow};

/// Sink for the three row streams a run produces.
///
/// Errors surface to [`SimOutputObserver`][crate::SimOutputObserver], which
/// stores the first one for [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    fn write_tour(&mut self, row: &TourRow) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write a batch of guide snapshots taken at the same tick.
    fn write_guide_snapshots(&mut self, rows: &[GuideSnapshotRow]) -> OutputResult<()>;

    /// Flush all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
