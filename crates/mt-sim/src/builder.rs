//! Fluent builder for constructing a [`Museum`].

use std::collections::BTreeMap;
use std::sync::Arc;

use mt_core::{GuideId, MtError, SimConfig, SimRng, TourConfig, VisitorId};
use mt_dispatch::Dispatcher;
use mt_guide::{GuideController, GuideProfile};
use mt_schedule::MuseumLayout;
use mt_visitor::{VisitorActor, VisitorFactory};

use crate::{ArrivalPlan, Museum, SimError, SimResult};

/// Stream offsets for the builder's own generators.
const GUIDE_STREAM:   u64 = 1;
const VISITOR_STREAM: u64 = 2;

/// Fluent builder for [`Museum`].
///
/// # Required inputs
///
/// - [`SimConfig`] — total ticks, seed, latency, …
/// - [`TourConfig`] — group sizes, thresholds, timers
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                        |
/// |------------------------|--------------------------------|
/// | `.layout(l)`           | `MuseumLayout::standard()`     |
/// | `.guide(p)`            | no guides                      |
/// | `.random_guides(n)`    | no guides                      |
/// | `.visitors(n)`         | nobody waiting at opening      |
/// | `.visitor(v)`          | —                              |
/// | `.arrivals(plan)`      | no arrivals after opening      |
///
/// # Example
///
/// ```rust,ignore
/// let mut museum = MuseumBuilder::new(SimConfig::default(), TourConfig::default())
///     .guide(GuideProfile::new(Theme::Art))
///     .visitors(8)
///     .build()?;
/// museum.run(&mut NoopObserver)?;
/// ```
pub struct MuseumBuilder {
    config:        SimConfig,
    tour:          TourConfig,
    layout:        Option<MuseumLayout>,
    guides:        Vec<GuideProfile>,
    random_guides: usize,
    visitors:      usize,
    custom:        Vec<VisitorActor>,
    arrivals:      Option<ArrivalPlan>,
}

impl MuseumBuilder {
    pub fn new(config: SimConfig, tour: TourConfig) -> Self {
        Self {
            config,
            tour,
            layout:        None,
            guides:        Vec::new(),
            random_guides: 0,
            visitors:      0,
            custom:        Vec::new(),
            arrivals:      None,
        }
    }

    pub fn layout(mut self, layout: MuseumLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Add one guide with a fixed profile.  Guides are numbered in the order
    /// they are added, fixed profiles first.
    pub fn guide(mut self, profile: GuideProfile) -> Self {
        self.guides.push(profile);
        self
    }

    /// Add `n` guides with seeded random profiles.
    pub fn random_guides(mut self, n: usize) -> Self {
        self.random_guides += n;
        self
    }

    /// Add `n` seeded random visitors present at opening.
    pub fn visitors(mut self, n: usize) -> Self {
        self.visitors += n;
        self
    }

    /// Add a hand-built visitor present at opening.  Its id must not clash
    /// with generated ones, which start at 0.
    pub fn visitor(mut self, visitor: VisitorActor) -> Self {
        self.custom.push(visitor);
        self
    }

    pub fn arrivals(mut self, plan: ArrivalPlan) -> Self {
        self.arrivals = Some(plan);
        self
    }

    /// Validate inputs, create every actor and run their `on_start`.
    pub fn build(self) -> SimResult<Museum> {
        self.config.validate()?;
        self.tour.validate()?;
        let layout = Arc::new(match self.layout {
            Some(l) => l,
            None => MuseumLayout::standard(),
        });

        // ── Guides ────────────────────────────────────────────────────────
        let mut rng = SimRng::new(self.config.seed).child(GUIDE_STREAM);
        let profiles = self
            .guides
            .into_iter()
            .chain((0..self.random_guides).map(|_| GuideProfile::random(&mut rng)));
        let mut guides = BTreeMap::new();
        for (i, profile) in profiles.enumerate() {
            let id = GuideId::try_from(i)
                .map_err(|_| MtError::Config(format!("too many guides: {i}")))?;
            guides.insert(id, GuideController::new(id, profile, self.tour.clone(), Arc::clone(&layout)));
        }

        // ── Visitors ──────────────────────────────────────────────────────
        let seed = self.config.seed.wrapping_add(VISITOR_STREAM);
        let mut factory = VisitorFactory::new(seed, &self.tour);
        let mut visitors = BTreeMap::new();
        for visitor in factory.spawn_many(self.visitors) {
            visitors.insert(visitor.id(), visitor);
        }
        for visitor in self.custom {
            if visitors.contains_key(&visitor.id()) {
                return Err(SimError::DuplicateVisitor(visitor.id()));
            }
            visitors.insert(visitor.id(), visitor);
        }
        if let Some(last) = visitors.keys().next_back() {
            factory = factory.starting_at(VisitorId(last.0 + 1));
        }

        let dispatcher = Dispatcher::new(self.tour.clone(), Arc::clone(&layout));
        let mut museum = Museum::new(
            self.config,
            self.tour,
            layout,
            dispatcher,
            guides,
            visitors,
            factory,
            self.arrivals,
        );
        museum.start();
        Ok(museum)
    }
}
