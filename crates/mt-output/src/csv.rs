//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `tours.csv`
//! - `tick_summaries.csv`
//! - `guide_snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{GuideSnapshotRow, OutputResult, TickSummaryRow, TourRow};

pub const TOUR_HEADERS: [&str; 9] = [
    "tick",
    "guide",
    "group",
    "group_size",
    "stops_visited",
    "avg_satisfaction",
    "avg_cohesion",
    "avg_fatigue",
    "degraded",
];

pub const SUMMARY_HEADERS: [&str; 10] = [
    "tick",
    "unix_time_secs",
    "arrivals",
    "delivered",
    "bounced",
    "waiting",
    "guides_available",
    "guides_busy",
    "guides_cooling",
    "visitors_present",
];

pub const GUIDE_HEADERS: [&str; 8] = [
    "guide",
    "tick",
    "availability",
    "group",
    "members",
    "location",
    "avg_satisfaction",
    "completed_tours",
];

/// Writes run output to three CSV files.
pub struct CsvWriter {
    tours:     Writer<File>,
    summaries: Writer<File>,
    guides:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut tours = Writer::from_path(dir.join("tours.csv"))?;
        tours.write_record(TOUR_HEADERS)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADERS)?;

        let mut guides = Writer::from_path(dir.join("guide_snapshots.csv"))?;
        guides.write_record(GUIDE_HEADERS)?;

        Ok(Self {
            tours,
            summaries,
            guides,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tour(&mut self, row: &TourRow) -> OutputResult<()> {
        self.tours.write_record(&[
            row.tick.to_string(),
            row.guide.to_string(),
            row.group.to_string(),
            row.group_size.to_string(),
            row.stops_visited.to_string(),
            format!("{:.4}", row.avg_satisfaction),
            format!("{:.4}", row.avg_cohesion),
            format!("{:.4}", row.avg_fatigue),
            (row.degraded as u8).to_string(),
        ])?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.arrivals.to_string(),
            row.delivered.to_string(),
            row.bounced.to_string(),
            row.waiting.to_string(),
            row.guides_available.to_string(),
            row.guides_busy.to_string(),
            row.guides_cooling.to_string(),
            row.visitors_present.to_string(),
        ])?;
        Ok(())
    }

    fn write_guide_snapshots(&mut self, rows: &[GuideSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.guides.write_record(&[
                row.guide.to_string(),
                row.tick.to_string(),
                row.availability.to_string(),
                row.group.to_string(),
                row.members.to_string(),
                row.location.to_string(),
                format!("{:.4}", row.avg_satisfaction),
                row.completed_tours.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.tours.flush()?;
        self.summaries.flush()?;
        self.guides.flush()?;
        Ok(())
    }
}
