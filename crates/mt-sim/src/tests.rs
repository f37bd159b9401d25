//! Integration tests for mt-sim.

use std::collections::BTreeMap;

use mt_actor::{Address, EmergencyKind, Message};
use mt_core::{
    Availability, GuideId, LocationId, SimConfig, Theme, Tick, TourConfig, VisitorId,
};
use mt_guide::{GuideProfile, TourPhase};
use mt_visitor::{VisitorActor, VisitorProfile, VisitorTuning};

use crate::{
    ArrivalPlan, Letter, Museum, MuseumBuilder, MuseumSnapshot, NoopObserver, PostOffice,
    SimError, SimObserver, TourLog, run_replications,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        total_ticks,
        output_interval_ticks: 0,
        ..SimConfig::default()
    }
}

fn museum(guides: usize, visitors: usize) -> Museum {
    MuseumBuilder::new(test_config(10_000), TourConfig::default())
        .guide(GuideProfile::new(Theme::Art))
        .random_guides(guides.saturating_sub(1))
        .visitors(visitors)
        .build()
        .unwrap()
}

fn loc(n: u16) -> LocationId {
    LocationId(n)
}

/// Step until the first tour record appears, or panic after `limit` ticks.
fn run_until_first_tour(m: &mut Museum, log: &mut TourLog, limit: u64) {
    for _ in 0..limit {
        m.run_ticks(1, log).unwrap();
        if !log.records.is_empty() {
            return;
        }
    }
    panic!("no tour finished within {limit} ticks");
}

fn availability(m: &Museum, g: u32) -> Availability {
    m.dispatcher().pool().get(GuideId(g)).unwrap().availability
}

// ── MuseumBuilder ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let m = museum(2, 5);
        assert_eq!(m.guides().count(), 2);
        assert_eq!(m.visitors().count(), 5);
        assert_eq!(m.now(), Tick(0));
        assert!(m.validate().is_ok());
    }

    #[test]
    fn invalid_tour_config_errors() {
        let tour = TourConfig { min_group_size: 0, ..TourConfig::default() };
        let result = MuseumBuilder::new(test_config(10), tour).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn zero_latency_errors() {
        let config = SimConfig { message_latency_ticks: 0, ..test_config(10) };
        assert!(MuseumBuilder::new(config, TourConfig::default()).build().is_err());
    }

    #[test]
    fn clashing_visitor_ids_error() {
        let clash = VisitorActor::new(VisitorId(1), VisitorProfile::default(), VisitorTuning::default());
        let result = MuseumBuilder::new(test_config(10), TourConfig::default())
            .visitors(2)
            .visitor(clash)
            .build();
        assert!(matches!(result, Err(SimError::DuplicateVisitor(VisitorId(1)))));
    }

    #[test]
    fn generated_ids_continue_after_custom_ones() {
        let custom = VisitorActor::new(VisitorId(40), VisitorProfile::default(), VisitorTuning::default());
        let mut m = MuseumBuilder::new(test_config(10), TourConfig::default())
            .visitors(2)
            .visitor(custom)
            .build()
            .unwrap();
        assert_eq!(m.add_visitor(), VisitorId(41));
    }
}

// ── PostOffice and ArrivalPlan ────────────────────────────────────────────────

#[cfg(test)]
mod plumbing {
    use super::*;

    fn letter(to: Address, msg: Message) -> Letter {
        Letter { from: Address::Dispatcher, to, msg }
    }

    #[test]
    fn letters_come_out_in_posting_order() {
        let mut post = PostOffice::new();
        let a = Address::Visitor(VisitorId(1));
        post.post(Tick(3), letter(a, Message::RegistrationAck));
        post.post(Tick(3), letter(a, Message::InviteQuestions));
        post.post(Tick(2), letter(a, Message::GuideAvailable));
        assert_eq!(post.len(), 3);
        assert_eq!(post.pending_for(a), 3);
        assert_eq!(post.next_tick(), Some(Tick(2)));

        assert!(post.pop_tick(Tick(1)).is_none());
        assert_eq!(post.pop_tick(Tick(3)).unwrap().msg, Message::RegistrationAck);
        assert_eq!(post.pop_tick(Tick(3)).unwrap().msg, Message::InviteQuestions);
        assert!(post.pop_tick(Tick(3)).is_none());
        assert_eq!(post.len(), 1);
    }

    #[test]
    fn arrival_plan_cadence() {
        let plan = ArrivalPlan::every(10, 2);
        assert_eq!(plan.due(Tick(0), 0), 0);
        assert_eq!(plan.due(Tick(10), 0), 2);
        assert_eq!(plan.due(Tick(15), 2), 0);
        assert_eq!(plan.due(Tick(20), 2), 2);
    }

    #[test]
    fn arrival_plan_limits() {
        let plan = ArrivalPlan::every(5, 3).starting(Tick(0)).until(Tick(10)).limit(7);
        assert_eq!(plan.due(Tick(0), 0), 3);
        assert_eq!(plan.due(Tick(5), 3), 3);
        assert_eq!(plan.due(Tick(10), 6), 1);
        assert_eq!(plan.due(Tick(15), 0), 0);
    }

    #[test]
    fn arrivals_join_the_museum() {
        let mut m = MuseumBuilder::new(test_config(100), TourConfig::default())
            .arrivals(ArrivalPlan::every(10, 2))
            .build()
            .unwrap();
        let mut log = TourLog::new();
        m.run_ticks(21, &mut log).unwrap();
        assert_eq!(m.visitors().count(), 4);
        assert_eq!(m.stats().arrivals, 4);
        assert_eq!(log.last_tick.unwrap().visitors_present, 4);
    }
}

// ── Group formation ───────────────────────────────────────────────────────────

#[cfg(test)]
mod formation {
    use super::*;

    #[test]
    fn minimum_group_is_assigned_at_first_formation() {
        let mut m = museum(1, 3);
        m.run_ticks(6, &mut NoopObserver).unwrap();

        let rec = m.dispatcher().pool().get(GuideId(0)).unwrap();
        assert_eq!(rec.availability, Availability::Busy);
        assert_eq!(rec.visitors.len(), 3);
        assert!(m.dispatcher().queue().is_empty());

        m.run_ticks(2, &mut NoopObserver).unwrap();
        let guide = m.guide(GuideId(0)).unwrap();
        assert!(guide.phase().is_touring());
        assert_eq!(guide.group().unwrap().size(), 3);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn crowd_is_split_at_the_ceiling() {
        let mut m = museum(1, 20);
        m.run_ticks(6, &mut NoopObserver).unwrap();
        let rec = m.dispatcher().pool().get(GuideId(0)).unwrap();
        assert_eq!(rec.visitors.len(), 8);
        assert_eq!(m.dispatcher().queue().len(), 12);
    }

    #[test]
    fn too_few_visitors_wait() {
        let mut m = museum(1, 2);
        m.run_ticks(30, &mut NoopObserver).unwrap();
        assert_eq!(availability(&m, 0), Availability::Available);
        assert_eq!(m.dispatcher().queue().len(), 2);
    }

    #[test]
    fn repeated_status_report_is_idempotent() {
        let mut m = museum(1, 0);
        let report = Message::StatusReport {
            guide:            GuideId(7),
            location:         loc(1),
            group_size:       5,
            itinerary_index:  1,
            avg_satisfaction: 0.5,
            avg_fatigue:      0.1,
        };
        m.inject(report.clone());
        m.inject(report);
        m.run_ticks(2, &mut NoopObserver).unwrap();
        assert_eq!(m.dispatcher().board().occupancy(loc(1)), 5);
    }
}

// ── Tour lifecycle ────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn guide_cools_down_before_reassignment() {
        let mut m = museum(1, 3);
        let mut log = TourLog::new();
        run_until_first_tour(&mut m, &mut log, 3_000);

        let cooldown = m.tour_config.cooldown_ticks;
        assert_eq!(availability(&m, 0), Availability::CoolingDown);
        m.run_ticks(cooldown - 1, &mut log).unwrap();
        assert_eq!(availability(&m, 0), Availability::CoolingDown);
        m.run_ticks(1, &mut log).unwrap();
        // Released this tick; a formation pass in the same tick may already
        // have handed it a returning group.
        assert_ne!(availability(&m, 0), Availability::CoolingDown);
    }

    #[test]
    fn completed_tour_visits_every_stop() {
        let mut m = museum(1, 3);
        let mut log = TourLog::new();
        run_until_first_tour(&mut m, &mut log, 3_000);
        let record = log.records[0];
        assert_eq!(record.guide, GuideId(0));
        assert_eq!(record.stops_visited, 6);
        assert!(!record.degraded);
        assert!((0.0..=1.0).contains(&record.avg_satisfaction));
    }

    #[test]
    fn closed_exhibit_is_never_presented() {
        let tour = TourConfig {
            emergency_resolve_min_ticks: 100_000,
            emergency_resolve_max_ticks: 100_000,
            ..TourConfig::default()
        };
        let mut m = MuseumBuilder::new(test_config(10_000), tour)
            .guide(GuideProfile::new(Theme::History))
            .visitors(3)
            .build()
            .unwrap();
        m.emergency(EmergencyKind::Maintenance, loc(3));

        let mut log = TourLog::new();
        for _ in 0..2_000 {
            m.run_ticks(1, &mut log).unwrap();
            let phase = m.guide(GuideId(0)).unwrap().phase();
            assert_ne!(phase, TourPhase::Presenting { location: loc(3) });
        }
        assert!(m.dispatcher().emergencies().is_closed(loc(3)));
        assert!(!log.records.is_empty());
        assert!(log.records.iter().all(|r| r.stops_visited == 5));
    }

    #[test]
    fn vanished_members_degrade_the_tour() {
        let mut m = museum(1, 3);
        let mut log = TourLog::new();
        m.run_ticks(10, &mut log).unwrap();
        assert!(m.guide(GuideId(0)).unwrap().group().is_some());

        m.remove_visitor(VisitorId(0)).unwrap();
        m.remove_visitor(VisitorId(1)).unwrap();
        assert_eq!(m.pending_timers(Address::Visitor(VisitorId(0))), 0);

        run_until_first_tour(&mut m, &mut log, 500);
        let record = log.records[0];
        assert!(record.degraded);
        assert_eq!(record.group_size, 1);
        assert!(m.stats().bounced > 0);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn removing_a_stranger_errors() {
        let mut m = museum(1, 1);
        assert!(matches!(
            m.remove_visitor(VisitorId(9)),
            Err(SimError::UnknownVisitor(VisitorId(9)))
        ));
    }
}

// ── Long-run properties ───────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use super::*;

    #[test]
    fn invariants_hold_every_tick() {
        let mut m = museum(2, 8);
        let mut log = TourLog::new();
        let mut experience: BTreeMap<VisitorId, f64> = BTreeMap::new();
        for _ in 0..3_000 {
            m.run_ticks(1, &mut log).unwrap();
            if let Err(e) = m.validate() {
                panic!("{e}");
            }
            for v in m.visitors() {
                let now = v.model().experience();
                let before = experience.insert(v.id(), now).unwrap_or(0.0);
                assert!(now >= before, "{} lost experience", v.id());
            }
        }
        assert!(!log.records.is_empty());
    }

    #[test]
    fn queue_stays_bounded_under_steady_arrivals() {
        let mut m = MuseumBuilder::new(test_config(6_000), TourConfig::default())
            .random_guides(6)
            .arrivals(ArrivalPlan::every(60, 3))
            .build()
            .unwrap();
        let mut log = TourLog::new();
        m.run(&mut log).unwrap();
        assert!(log.records.len() > 10);
        assert!(log.max_queue <= 40, "queue peaked at {}", log.max_queue);
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut m = museum(3, 12);
            let mut log = TourLog::new();
            m.run_ticks(1_500, &mut log).unwrap();
            (m.snapshot(), log.records)
        };
        let (a, ra) = run();
        let (b, rb) = run();
        assert_eq!(a, b);
        assert_eq!(ra, rb);
    }
}

// ── Observer and batch ────────────────────────────────────────────────────────

#[cfg(test)]
mod reporting {
    use super::*;

    #[derive(Default)]
    struct Counter {
        starts:    usize,
        snapshots: Vec<Tick>,
        ended:     Option<Tick>,
    }

    impl SimObserver for Counter {
        fn on_tick_start(&mut self, _tick: Tick) {
            self.starts += 1;
        }

        fn on_snapshot(&mut self, snapshot: &MuseumSnapshot) {
            self.snapshots.push(snapshot.tick);
        }

        fn on_sim_end(&mut self, final_tick: Tick) {
            self.ended = Some(final_tick);
        }
    }

    #[test]
    fn hooks_fire_on_schedule() {
        let config = SimConfig { output_interval_ticks: 10, ..test_config(30) };
        let mut m = MuseumBuilder::new(config, TourConfig::default())
            .random_guides(1)
            .visitors(3)
            .build()
            .unwrap();
        let mut counter = Counter::default();
        m.run(&mut counter).unwrap();
        assert_eq!(counter.starts, 30);
        assert_eq!(counter.snapshots, vec![Tick(0), Tick(10), Tick(20)]);
        assert_eq!(counter.ended, Some(Tick(30)));
    }

    #[test]
    fn replications_come_back_in_seed_order() {
        let results = run_replications(&[1, 2, 3], |seed| {
            MuseumBuilder::new(SimConfig { seed, ..test_config(800) }, TourConfig::default())
                .random_guides(2)
                .visitors(10)
                .build()
        });
        let summaries: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(summaries.iter().map(|s| s.seed).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(summaries.iter().all(|s| s.final_tick == Tick(800)));
        assert!(summaries.iter().map(|s| s.tours_completed).sum::<usize>() > 0);
    }
}
