//! `mt-output` — CSV writers for museum tour runs.
//!
//! | File                  | One row per                               |
//! |-----------------------|-------------------------------------------|
//! | `tours.csv`           | tour reported complete to the dispatcher  |
//! | `tick_summaries.csv`  | simulated tick                            |
//! | `guide_snapshots.csv` | guide, every `output_interval_ticks`      |
//!
//! [`CsvWriter`] implements [`OutputWriter`]; [`SimOutputObserver`] drives
//! any writer from `mt_sim::SimObserver` callbacks.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mt_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &museum.config);
//! museum.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{GuideSnapshotRow, TickSummaryRow, TourRow};
pub use writer::OutputWriter;
