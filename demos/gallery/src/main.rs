//! gallery — a one-day run of a small riverside gallery.
//!
//! Five guides serve a steady trickle of walk-in visitors across a
//! six-exhibit layout loaded from an embedded CSV.  Halfway through the
//! morning the Planetarium is closed for maintenance so the effect on
//! in-flight tours shows up in `tours.csv`.  A short batch of seeded
//! replications follows the main run.
//!
//! Set `RUST_LOG=debug` to watch the dispatcher work.

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use mt_actor::EmergencyKind;
use mt_core::{SimConfig, Theme, Tick, TourConfig};
use mt_guide::GuideProfile;
use mt_output::{CsvWriter, OutputWriter, SimOutputObserver};
use mt_schedule::load_layout_reader;
use mt_sim::{
    ArrivalPlan, MuseumBuilder, MuseumSnapshot, SimObserver, TickSummary, TourRecord,
    run_replications,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64   = 42;
const OPENING_UNIX_SECS:     i64   = 1_700_038_800; // 09:00 UTC
const TICK_DURATION_SECS:    u32   = 1;
const OPEN_HOURS:            u64   = 8;
const OUTPUT_INTERVAL_TICKS: u64   = 600;           // guide snapshot every 10 min
const INITIAL_VISITORS:      usize = 12;
const REPLICATION_SEEDS:     [u64; 4] = [1, 2, 3, 4];

// ── Layout CSV ────────────────────────────────────────────────────────────────

const LAYOUT_CSV: &str = "\
location_id,name,title,theme,capacity,narration_ticks,kind\n\
0,Lobby,the River Lobby,history,50,30,entrance\n\
1,Sculpture,the Sculpture Court,art,14,240,exhibit\n\
2,Maps,the Old Harbour Maps,history,10,300,exhibit\n\
3,Planetarium,the Planetarium,science,8,420,exhibit\n\
4,Herbarium,the Herbarium,nature,10,240,exhibit\n\
5,Weaving,the Weaving Room,culture,12,240,exhibit\n\
6,Modern,the Modern Wing,art,14,300,exhibit\n\
7,Shop,the Gallery Shop,culture,50,30,exit\n\
";

// ── Observer wrapper to count rows ────────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    tours:         usize,
    degraded:      usize,
    summary_rows:  usize,
    snapshot_rows: usize,
    max_queue:     usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, tours: 0, degraded: 0, summary_rows: 0, snapshot_rows: 0, max_queue: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.summary_rows += 1;
        self.max_queue = self.max_queue.max(summary.waiting);
        self.inner.on_tick_end(summary);
    }

    fn on_tour_completed(&mut self, record: &TourRecord) {
        self.tours += 1;
        self.degraded += usize::from(record.degraded);
        self.inner.on_tour_completed(record);
    }

    fn on_snapshot(&mut self, snapshot: &MuseumSnapshot) {
        self.snapshot_rows += snapshot.guides.len();
        self.inner.on_snapshot(snapshot);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("=== gallery — museum tour simulation ===");
    println!("Hours: {OPEN_HOURS}  |  Seed: {SEED}");
    println!();

    // 1. Layout.
    let layout = load_layout_reader(Cursor::new(LAYOUT_CSV)).context("parse embedded layout")?;
    println!("Layout: {} locations, {} exhibits on the default tour", layout.len(), layout.tour().len());
    let planetarium = layout
        .by_name("Planetarium")
        .map(|l| l.id)
        .context("layout has no Planetarium")?;

    // 2. Config.
    let config = SimConfig {
        start_unix_secs:       OPENING_UNIX_SECS,
        tick_duration_secs:    TICK_DURATION_SECS,
        total_ticks:           OPEN_HOURS * 3_600,
        seed:                  SEED,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
        message_latency_ticks: 1,
    };
    let tour = TourConfig::default();

    // 3. Museum: two fixed specialists plus three drawn from the seed.
    let mut museum = MuseumBuilder::new(config.clone(), tour.clone())
        .layout(layout)
        .guide(GuideProfile::new(Theme::Art))
        .guide(GuideProfile::new(Theme::Science))
        .random_guides(3)
        .visitors(INITIAL_VISITORS)
        .arrivals(ArrivalPlan::every(90, 2).until(Tick(config.total_ticks - 3_600)))
        .build()?;

    // 4. Output.
    let out_dir = Path::new("output/gallery");
    std::fs::create_dir_all(out_dir)?;
    let writer = CsvWriter::new(out_dir)?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer, &config));

    // 5. Run the morning, close the Planetarium, run the rest of the day.
    let t0 = Instant::now();
    museum.run_ticks(5_400, &mut obs)?;
    tracing::info!(tick = %museum.now(), "closing the Planetarium for maintenance");
    museum.emergency(EmergencyKind::Maintenance, planetarium);
    museum.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }
    museum.validate()?;

    // 6. Summary.
    let stats = museum.stats();
    let dispatch = museum.dispatcher().stats();
    println!("Simulation complete in {:.3} s ({})", elapsed.as_secs_f64(), museum.clock);
    println!("  visitors arrived     : {}", INITIAL_VISITORS + stats.arrivals);
    println!("  letters delivered    : {} ({} bounced)", stats.delivered, stats.bounced);
    println!("  tours completed      : {} ({} degraded)", obs.tours, obs.degraded);
    println!("  refusals / requeued  : {} / {}", dispatch.refusals, dispatch.requeued);
    println!("  advisories raised    : {}", dispatch.advisories);
    println!("  longest queue        : {}", obs.max_queue);
    println!("  tours.csv            : {} rows", obs.tours);
    println!("  tick_summaries.csv   : {} rows", obs.summary_rows);
    println!("  guide_snapshots.csv  : {} rows", obs.snapshot_rows);
    println!();

    // 7. Final guide table.
    println!("{:<10} {:<10} {:<18} {:>6} {:>8}", "Guide", "Theme", "Phase", "Tours", "Sat");
    println!("{}", "-".repeat(56));
    for guide in museum.guides() {
        let snap = guide.snapshot();
        println!(
            "{:<10} {:<10} {:<18} {:>6} {:>8.3}",
            guide.id().0,
            guide.profile().specialization.to_string(),
            guide.phase().to_string(),
            snap.completed_tours,
            snap.avg_satisfaction,
        );
    }
    println!();

    // 8. Replications.
    let results = run_replications(&REPLICATION_SEEDS, |seed| {
        MuseumBuilder::new(SimConfig { seed, output_interval_ticks: 0, ..config.clone() }, tour.clone())
            .random_guides(5)
            .visitors(INITIAL_VISITORS)
            .arrivals(ArrivalPlan::every(90, 2))
            .build()
    });

    println!("{:<6} {:>7} {:>9} {:>8} {:>8} {:>10}", "Seed", "Tours", "Degraded", "Served", "MaxQ", "MeanSat");
    println!("{}", "-".repeat(52));
    for result in results {
        let s = result?;
        println!(
            "{:<6} {:>7} {:>9} {:>8} {:>8} {:>10.3}",
            s.seed, s.tours_completed, s.degraded_tours, s.visitors_served, s.max_queue, s.mean_satisfaction,
        );
    }

    Ok(())
}
