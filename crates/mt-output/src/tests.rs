//! Integration tests for mt-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, GUIDE_HEADERS, SUMMARY_HEADERS, TOUR_HEADERS};
    use crate::row::{GuideSnapshotRow, TickSummaryRow, TourRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: &std::path::Path) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    fn records(path: &std::path::Path) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    fn tour_row(guide: u32, degraded: bool) -> TourRow {
        TourRow {
            tick:             120,
            guide,
            group:            guide + 100,
            group_size:       if degraded { 2 } else { 6 },
            stops_visited:    6,
            avg_satisfaction: 0.75,
            avg_cohesion:     0.5,
            avg_fatigue:      0.125,
            degraded,
        }
    }

    fn guide_row(guide: u32, group: Option<u32>) -> GuideSnapshotRow {
        GuideSnapshotRow {
            guide,
            tick:             60,
            availability:     if group.is_some() { "busy" } else { "available" },
            group:            group.unwrap_or(u32::MAX),
            members:          if group.is_some() { 5 } else { 0 },
            location:         if group.is_some() { 3 } else { u16::MAX },
            avg_satisfaction: 0.5,
            completed_tours:  1,
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("tours.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
        assert!(dir.path().join("guide_snapshots.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(headers(&dir.path().join("tours.csv")), TOUR_HEADERS);
        assert_eq!(headers(&dir.path().join("tick_summaries.csv")), SUMMARY_HEADERS);
        assert_eq!(headers(&dir.path().join("guide_snapshots.csv")), GUIDE_HEADERS);
    }

    #[test]
    fn tour_rows_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tour(&tour_row(0, false)).unwrap();
        w.write_tour(&tour_row(3, true)).unwrap();
        w.finish().unwrap();

        let rows = records(&dir.path().join("tours.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "0");      // guide
        assert_eq!(&rows[0][5], "0.7500"); // avg_satisfaction
        assert_eq!(&rows[0][8], "0");      // degraded
        assert_eq!(&rows[1][1], "3");
        assert_eq!(&rows[1][3], "2");      // group_size
        assert_eq!(&rows[1][8], "1");
    }

    #[test]
    fn tick_summary_row_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick:             7,
            unix_time_secs:   1_700_000_007,
            arrivals:         2,
            delivered:        11,
            bounced:          1,
            waiting:          4,
            guides_available: 1,
            guides_busy:      2,
            guides_cooling:   0,
            visitors_present: 14,
        })
        .unwrap();
        w.finish().unwrap();

        let rows = records(&dir.path().join("tick_summaries.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "7");
        assert_eq!(&rows[0][1], "1700000007");
        assert_eq!(&rows[0][5], "4");  // waiting
        assert_eq!(&rows[0][9], "14"); // visitors_present
    }

    #[test]
    fn idle_guide_uses_sentinels() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_guide_snapshots(&[guide_row(0, Some(9)), guide_row(1, None)]).unwrap();
        w.finish().unwrap();

        let rows = records(&dir.path().join("guide_snapshots.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "busy");
        assert_eq!(&rows[0][3], "9");
        assert_eq!(&rows[1][2], "available");
        assert_eq!(&rows[1][3], u32::MAX.to_string());
        assert_eq!(&rows[1][5], u16::MAX.to_string());
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn empty_snapshot_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_guide_snapshots(&[]).unwrap();
    }

    #[test]
    fn missing_directory_errors() {
        let dir = tmp();
        let result = CsvWriter::new(&dir.path().join("does/not/exist"));
        assert!(result.is_err());
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use mt_core::{SimConfig, Theme, Tick, TourConfig};
    use mt_guide::GuideProfile;
    use mt_sim::{MuseumBuilder, SimObserver, TickSummary};
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::error::{OutputError, OutputResult};
    use crate::observer::SimOutputObserver;
    use crate::row::{GuideSnapshotRow, TickSummaryRow, TourRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    /// Fails every summary write; counts finishes.
    #[derive(Default)]
    struct Broken {
        attempts: usize,
        finishes: usize,
    }

    impl OutputWriter for Broken {
        fn write_tour(&mut self, _row: &TourRow) -> OutputResult<()> {
            Ok(())
        }

        fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
            self.attempts += 1;
            Err(OutputError::Io(std::io::Error::other(format!("disk full at {}", row.tick))))
        }

        fn write_guide_snapshots(&mut self, _rows: &[GuideSnapshotRow]) -> OutputResult<()> {
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finishes += 1;
            Ok(())
        }
    }

    #[test]
    fn first_error_kept() {
        let mut obs = SimOutputObserver::new(Broken::default(), &SimConfig::default());
        for t in 1..=3 {
            obs.on_tick_end(&TickSummary { tick: Tick(t), ..TickSummary::default() });
        }
        obs.on_sim_end(Tick(3));

        let err = obs.take_error().expect("an error was stored");
        assert!(err.to_string().contains("disk full at 1"), "got {err}");
        assert!(obs.take_error().is_none());

        let writer = obs.into_writer();
        assert_eq!(writer.attempts, 3);
        assert_eq!(writer.finishes, 1);
    }

    #[test]
    fn unix_time_follows_clock() {
        let dir = tmp();
        let config = SimConfig {
            start_unix_secs:    1_000,
            tick_duration_secs: 30,
            ..SimConfig::default()
        };
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap(), &config);
        obs.on_tick_end(&TickSummary { tick: Tick(4), waiting: 3, ..TickSummary::default() });
        obs.on_sim_end(Tick(5));
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][1], "1120");
        assert_eq!(&rows[0][5], "3");
    }

    #[test]
    fn integration_csv() {
        let config = SimConfig {
            total_ticks:           3_000,
            output_interval_ticks: 1_000,
            ..SimConfig::default()
        };
        let mut museum = MuseumBuilder::new(config.clone(), TourConfig::default())
            .guide(GuideProfile::new(Theme::History))
            .random_guides(1)
            .visitors(8)
            .build()
            .unwrap();

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer, &config);
        museum.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let count = |name: &str| {
            let mut rdr = csv::Reader::from_path(dir.path().join(name)).unwrap();
            rdr.records().map(|r| r.unwrap()).count()
        };
        assert_eq!(count("tick_summaries.csv"), 3_000);
        // output_interval = 1000 → snapshots at ticks 0, 1000, 2000 for 2 guides
        assert_eq!(count("guide_snapshots.csv"), 6);
        assert!(count("tours.csv") >= 1, "at least one tour should finish");
    }
}
