//! CSV layout loader.
//!
//! # CSV format
//!
//! One row per location.  Ids must be dense from 0.
//!
//! ```csv
//! location_id,name,title,theme,capacity,narration_ticks,kind
//! 0,Entrance,the Great Hall,history,40,5,entrance
//! 1,Exhibit1,Ancient Sculpture,art,12,20,exhibit
//! 2,Exit,the Museum Shop,culture,40,5,exit
//! ```
//!
//! **`kind`** is one of `entrance`, `exhibit`, `exit`.  Exhibits form the
//! default tour in file order of their ids.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use mt_core::{LocationId, Theme};

use crate::layout::{Location, LocationKind, MuseumLayout};
use crate::ScheduleError;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LocationRecord {
    location_id:     u16,
    name:            String,
    title:           String,
    theme:           String,
    capacity:        usize,
    narration_ticks: u64,
    kind:            String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`MuseumLayout`] from a CSV file.
pub fn load_layout_csv(path: &Path) -> Result<MuseumLayout, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_layout_reader(file)
}

/// Like [`load_layout_csv`] but accepts any `Read` source.
pub fn load_layout_reader<R: Read>(reader: R) -> Result<MuseumLayout, ScheduleError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut locations = Vec::new();

    for result in csv_reader.deserialize::<LocationRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        let theme: Theme = row
            .theme
            .parse()
            .map_err(|e: mt_core::MtError| ScheduleError::Parse(e.to_string()))?;
        locations.push(Location {
            id:              LocationId(row.location_id),
            name:            row.name,
            title:           row.title,
            theme,
            capacity:        row.capacity,
            narration_ticks: row.narration_ticks.max(1),
            kind:            parse_kind(&row.kind)?,
        });
    }

    MuseumLayout::new(locations)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_kind(s: &str) -> Result<LocationKind, ScheduleError> {
    match s.trim() {
        "entrance" => Ok(LocationKind::Entrance),
        "exhibit"  => Ok(LocationKind::Exhibit),
        "exit"     => Ok(LocationKind::Exit),
        other => Err(ScheduleError::Parse(format!(
            "invalid kind {other:?}: expected \"entrance\", \"exhibit\", or \"exit\""
        ))),
    }
}
