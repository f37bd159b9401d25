//! Independent replications over seeds.
//!
//! Each replication builds its own museum from the seed, so replications
//! share nothing and can run in parallel with the `parallel` feature.

use mt_core::Tick;

use crate::{Museum, SimResult, TourLog};

/// Headline numbers from one replication.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplicationSummary {
    pub seed:             u64,
    pub final_tick:       Tick,
    pub tours_completed:  usize,
    pub degraded_tours:   usize,
    pub visitors_served:  usize,
    /// Mean of per-tour average satisfaction; 0 when no tour finished.
    pub mean_satisfaction: f64,
    pub max_queue:        usize,
    pub final_queue:      usize,
}

impl ReplicationSummary {
    fn from_log(seed: u64, museum: &Museum, log: &TourLog) -> Self {
        let tours = log.records.len();
        let mean_satisfaction = if tours == 0 {
            0.0
        } else {
            log.records.iter().map(|r| r.avg_satisfaction).sum::<f64>() / tours as f64
        };
        Self {
            seed,
            final_tick: museum.now(),
            tours_completed: tours,
            degraded_tours: log.records.iter().filter(|r| r.degraded).count(),
            visitors_served: log.records.iter().map(|r| r.group_size).sum(),
            mean_satisfaction,
            max_queue: log.max_queue,
            final_queue: museum.dispatcher().queue().len(),
        }
    }
}

fn replicate<F>(seed: u64, build: &F) -> SimResult<ReplicationSummary>
where
    F: Fn(u64) -> SimResult<Museum>,
{
    let mut museum = build(seed)?;
    let mut log = TourLog::new();
    museum.run(&mut log)?;
    Ok(ReplicationSummary::from_log(seed, &museum, &log))
}

/// Build and run one museum per seed.  Results come back in seed order.
pub fn run_replications<F>(seeds: &[u64], build: F) -> Vec<SimResult<ReplicationSummary>>
where
    F: Fn(u64) -> SimResult<Museum> + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    {
        seeds.iter().map(|&seed| replicate(seed, &build)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        seeds.par_iter().map(|&seed| replicate(seed, &build)).collect()
    }
}
