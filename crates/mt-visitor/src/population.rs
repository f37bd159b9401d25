//! Seeded visitor generation.
//!
//! # Usage
//!
//! ```rust
//! use mt_core::{TourConfig, VisitorId};
//! use mt_visitor::VisitorFactory;
//!
//! let mut factory = VisitorFactory::new(/*seed=*/ 42, &TourConfig::default());
//! let crowd = factory.spawn_many(20);
//!
//! assert_eq!(crowd.len(), 20);
//! assert_eq!(factory.next_id(), VisitorId(20));
//! ```

use mt_core::{SimRng, Theme, TourConfig, VisitorId};

use crate::{Origin, Personality, VisitorActor, VisitorProfile, VisitorTuning};

/// Hands out visitors with sequential ids and seeded random profiles.
///
/// The same seed always yields the same sequence of profiles, so arrivals
/// scheduled mid-run are as reproducible as the initial crowd.
pub struct VisitorFactory {
    rng:     SimRng,
    tuning:  VisitorTuning,
    next_id: u32,
}

impl VisitorFactory {
    pub fn new(seed: u64, config: &TourConfig) -> Self {
        Self {
            rng:     SimRng::new(seed),
            tuning:  VisitorTuning::from(config),
            next_id: 0,
        }
    }

    /// Start numbering at `first` instead of 0.
    pub fn starting_at(mut self, first: VisitorId) -> Self {
        self.next_id = first.0;
        self
    }

    /// Draw a random profile: personality, origin and one to three
    /// preferred themes.
    pub fn next_profile(&mut self) -> VisitorProfile {
        let personality = Personality::random(&mut self.rng);
        let origin = Origin::ALL[self.rng.gen_range(0..Origin::ALL.len())];

        let wanted = self.rng.gen_range(1..=3);
        let mut preferences = Vec::with_capacity(wanted);
        while preferences.len() < wanted {
            let theme = Theme::ALL[self.rng.gen_range(0..Theme::ALL.len())];
            if !preferences.contains(&theme) {
                preferences.push(theme);
            }
        }

        VisitorProfile { personality, origin, preferences }
    }

    pub fn spawn(&mut self) -> VisitorActor {
        let id = VisitorId(self.next_id);
        self.next_id += 1;
        let profile = self.next_profile();
        VisitorActor::new(id, profile, self.tuning)
    }

    pub fn spawn_many(&mut self, n: usize) -> Vec<VisitorActor> {
        (0..n).map(|_| self.spawn()).collect()
    }

    /// The id the next spawned visitor will get.
    pub fn next_id(&self) -> VisitorId {
        VisitorId(self.next_id)
    }
}
