//! Unit tests for mt-guide.

use std::sync::Arc;

use mt_actor::{
    Actor, ActorContext, Address, Capability, Directory, Effect, EmergencyKind, Message,
    RefusalReason, Timer,
};
use mt_core::{
    ActorRng, Availability, GroupId, GuideId, LocationId, Theme, Tick, TourConfig, VisitorId,
};
use mt_group::Formation;
use mt_schedule::MuseumLayout;

use crate::{GuideController, GuideProfile, PauseReason, TourPhase, answer, narrate};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn v(n: u32) -> VisitorId {
    VisitorId(n)
}

fn loc(n: u16) -> LocationId {
    LocationId(n)
}

fn guide() -> GuideController {
    GuideController::new(
        GuideId(0),
        GuideProfile::new(Theme::Art),
        TourConfig::default(),
        Arc::new(MuseumLayout::standard()),
    )
}

struct Bench {
    dir:  Directory,
    rng:  ActorRng,
    next: u64,
}

impl Bench {
    fn new() -> Self {
        let mut dir = Directory::new();
        dir.register(Address::Dispatcher, Capability::Dispatcher);
        Self { dir, rng: ActorRng::new(3, 1), next: 0 }
    }

    fn deliver(&mut self, g: &mut GuideController, from: Address, msg: Message) -> Vec<Effect> {
        let me = g.address();
        let mut ctx = ActorContext::new(Tick(0), me, &mut self.rng, &self.dir, &mut self.next);
        g.on_message(from, msg, &mut ctx);
        ctx.into_effects()
    }

    fn fire(&mut self, g: &mut GuideController, timer: Timer) -> Vec<Effect> {
        let me = g.address();
        let mut ctx = ActorContext::new(Tick(0), me, &mut self.rng, &self.dir, &mut self.next);
        g.on_timer(timer, &mut ctx);
        ctx.into_effects()
    }

    fn assign(&mut self, g: &mut GuideController, visitors: &[VisitorId]) -> Vec<Effect> {
        self.deliver(g, Address::Dispatcher, Message::AssignVisitors {
            group:    GroupId(1),
            guide:    GuideId(0),
            visitors: visitors.to_vec(),
        })
    }

    /// Every member reports ready at `at`.
    fn all_ready(&mut self, g: &mut GuideController, members: &[VisitorId], at: LocationId) -> Vec<Effect> {
        let mut effects = Vec::new();
        for &m in members {
            effects.extend(self.deliver(g, Address::Visitor(m), Message::VisitorReady {
                visitor:  m,
                location: at,
            }));
        }
        effects
    }

    fn status(&mut self, g: &mut GuideController, members: &[VisitorId], fatigue: f64, cohesion: f64) {
        for &m in members {
            self.deliver(g, Address::Visitor(m), Message::StatusUpdate {
                visitor: m,
                satisfaction: 0.5,
                fatigue,
                cohesion,
            });
        }
    }
}

fn sent_kinds(effects: &[Effect]) -> Vec<(Address, &'static str)> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Send { to, msg } => Some((*to, msg.kind())),
            _ => None,
        })
        .collect()
}

fn count_kind(effects: &[Effect], kind: &str) -> usize {
    sent_kinds(effects).iter().filter(|(_, k)| *k == kind).count()
}

fn moves_to(effects: &[Effect]) -> Option<LocationId> {
    effects.iter().find_map(|e| match e {
        Effect::Send { msg: Message::Move { destination }, .. } => Some(*destination),
        _ => None,
    })
}

const TRIO: [VisitorId; 3] = [VisitorId(0), VisitorId(1), VisitorId(2)];

/// Accept a trio and walk it to the first exhibit.
fn presenting_first_stop(bench: &mut Bench) -> GuideController {
    let mut g = guide();
    bench.assign(&mut g, &TRIO);
    bench.all_ready(&mut g, &TRIO, loc(0));
    bench.all_ready(&mut g, &TRIO, loc(1));
    assert_eq!(g.phase(), TourPhase::Presenting { location: loc(1) });
    g
}

// ── Assignment ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod assignment {
    use super::*;

    #[test]
    fn idle_guide_accepts_and_gathers_at_entrance() {
        let mut bench = Bench::new();
        let mut g = guide();
        let effects = bench.assign(&mut g, &TRIO);

        assert_eq!(g.phase(), TourPhase::Forming);
        assert_eq!(g.phase().availability(), Availability::Busy);
        assert_eq!(g.group().unwrap().size(), 3);
        assert_eq!(g.dynamics().len(), 3);
        assert_eq!(count_kind(&effects, "Welcome"), 3);
        assert_eq!(count_kind(&effects, "StatusReport"), 1);
        assert_eq!(moves_to(&effects), Some(loc(0)));
    }

    #[test]
    fn busy_guide_refuses() {
        let mut bench = Bench::new();
        let mut g = guide();
        bench.assign(&mut g, &TRIO);
        let effects = bench.assign(&mut g, &[v(7), v(8), v(9)]);
        assert_eq!(
            effects,
            vec![Effect::Send {
                to:  Address::Dispatcher,
                msg: Message::AssignmentRefused {
                    group:    GroupId(1),
                    visitors: vec![v(7), v(8), v(9)],
                    reason:   RefusalReason::Busy,
                },
            }]
        );
        assert_eq!(g.group().unwrap().members(), &TRIO);
    }

    #[test]
    fn oversized_group_refused() {
        let mut bench = Bench::new();
        let mut g = guide();
        let crowd: Vec<_> = (0..9).map(v).collect();
        let effects = bench.assign(&mut g, &crowd);
        assert!(matches!(
            &effects[0],
            Effect::Send { msg: Message::AssignmentRefused { reason: RefusalReason::GroupSize, .. }, .. }
        ));
        assert_eq!(g.phase(), TourPhase::Idle);
    }
}

// ── Touring ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod touring {
    use super::*;

    #[test]
    fn convergence_leads_to_first_stop_and_narration() {
        let mut bench = Bench::new();
        let mut g = guide();
        bench.assign(&mut g, &TRIO);
        let effects = bench.all_ready(&mut g, &TRIO, loc(0));
        assert_eq!(moves_to(&effects), Some(loc(1)));
        assert_eq!(g.phase(), TourPhase::Moving { destination: loc(1) });

        let effects = bench.all_ready(&mut g, &TRIO, loc(1));
        assert_eq!(count_kind(&effects, "Narration"), 3);
        assert_eq!(count_kind(&effects, "StatusReport"), 1);
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Schedule { timer: Timer::PresentationDone(l), .. } if *l == loc(1)
        )));
    }

    #[test]
    fn ready_for_wrong_stop_is_ignored() {
        let mut bench = Bench::new();
        let mut g = guide();
        bench.assign(&mut g, &TRIO);
        bench.all_ready(&mut g, &TRIO, loc(4));
        assert_eq!(g.phase(), TourPhase::Forming);
    }

    #[test]
    fn convergence_timeout_forces_progress_after_last_attempt() {
        let mut bench = Bench::new();
        let mut g = guide();
        bench.assign(&mut g, &TRIO);
        bench.all_ready(&mut g, &TRIO[..2], loc(0));

        let effects = bench.fire(&mut g, Timer::ConvergenceTimeout { attempt: 1 });
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Schedule { timer: Timer::ConvergenceTimeout { attempt: 2 }, .. }
        )));
        bench.fire(&mut g, Timer::ConvergenceTimeout { attempt: 2 });
        assert_eq!(g.phase(), TourPhase::Forming);

        let effects = bench.fire(&mut g, Timer::ConvergenceTimeout { attempt: 3 });
        assert_eq!(g.group().unwrap().formation(), Formation::Line);
        assert_eq!(count_kind(&effects, "Regroup"), 3);
        assert_eq!(g.phase(), TourPhase::Moving { destination: loc(1) });
    }

    #[test]
    fn presentation_done_advances_itinerary() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        let effects = bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        assert_eq!(moves_to(&effects), Some(loc(2)));
        assert_eq!(g.snapshot().itinerary_index, 1);
        assert_eq!(g.group().unwrap().visited(), 1);
    }

    #[test]
    fn questions_are_answered_to_everyone() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        let effects = bench.deliver(&mut g, Address::Visitor(v(1)), Message::Question {
            visitor: v(1),
            text:    "Who carved this?".into(),
        });
        assert_eq!(count_kind(&effects, "Answer"), 3);
    }

    #[test]
    fn full_tour_completes_and_recycles() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        for stop in 1..=6 {
            let effects = bench.fire(&mut g, Timer::PresentationDone(loc(stop)));
            if stop < 6 {
                bench.all_ready(&mut g, &TRIO, loc(stop + 1));
            } else {
                assert_eq!(count_kind(&effects, "Farewell"), 3);
                let done = effects.iter().find_map(|e| match e {
                    Effect::Send { msg: Message::TourCompleted { stops_visited, degraded, .. }, .. } => {
                        Some((*stops_visited, *degraded))
                    }
                    _ => None,
                });
                assert_eq!(done, Some((6, false)));
                assert!(effects.iter().any(|e| matches!(e, Effect::Cancel(_))));
            }
        }
        assert_eq!(g.phase(), TourPhase::CoolingDown);
        assert!(g.group().is_none());
        assert!(g.dynamics().is_empty());
        assert_eq!(g.completed_tours(), 1);

        bench.deliver(&mut g, Address::Dispatcher, Message::GuideAvailable);
        assert_eq!(g.phase(), TourPhase::Idle);
    }
}

// ── Adaptive policy ───────────────────────────────────────────────────────────

#[cfg(test)]
mod adaptive {
    use super::*;

    #[test]
    fn tired_group_gets_break_proposal_on_next_check() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        bench.status(&mut g, &TRIO, 0.75, 0.7);
        let effects = bench.fire(&mut g, Timer::CohesionCheck);
        assert_eq!(count_kind(&effects, "BreakProposal"), 3);
        assert!(effects.iter().any(|e| matches!(e, Effect::Schedule { timer: Timer::BreakVoteTimeout, .. })));
    }

    #[test]
    fn agreed_break_is_taken_at_stop_boundary() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        bench.status(&mut g, &TRIO, 0.8, 0.7);
        bench.fire(&mut g, Timer::CohesionCheck);
        for &m in &TRIO[..2] {
            bench.deliver(&mut g, Address::Visitor(m), Message::BreakResponse { visitor: m, accept: true });
        }
        bench.deliver(&mut g, Address::Visitor(v(2)), Message::BreakResponse { visitor: v(2), accept: false });

        assert_eq!(g.phase(), TourPhase::Presenting { location: loc(1) });
        bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        assert_eq!(g.phase(), TourPhase::Pausing(PauseReason::Break));

        let effects = bench.fire(&mut g, Timer::BreakOver);
        assert_eq!(moves_to(&effects), Some(loc(2)));
    }

    #[test]
    fn rejected_break_is_not_taken() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        bench.status(&mut g, &TRIO, 0.8, 0.7);
        bench.fire(&mut g, Timer::CohesionCheck);
        bench.deliver(&mut g, Address::Visitor(v(0)), Message::BreakResponse { visitor: v(0), accept: true });
        bench.fire(&mut g, Timer::BreakVoteTimeout);
        bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        assert_eq!(g.phase(), TourPhase::Moving { destination: loc(2) });
    }

    #[test]
    fn low_cohesion_tightens_and_holds() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        bench.status(&mut g, &TRIO, 0.1, 0.3);
        let effects = bench.fire(&mut g, Timer::CohesionCheck);
        assert_eq!(count_kind(&effects, "Regroup"), 3);
        assert_eq!(g.group().unwrap().formation(), Formation::Line);

        bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        assert_eq!(g.phase(), TourPhase::Pausing(PauseReason::CohesionHold));

        bench.status(&mut g, &TRIO, 0.1, 0.7);
        let effects = bench.fire(&mut g, Timer::CohesionCheck);
        assert_eq!(moves_to(&effects), Some(loc(2)));
    }

    #[test]
    fn cohesion_hold_gives_up_after_budget() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        bench.status(&mut g, &TRIO, 0.1, 0.2);
        for _ in 0..3 {
            bench.fire(&mut g, Timer::CohesionCheck);
        }
        bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        assert_eq!(g.phase(), TourPhase::Pausing(PauseReason::CohesionHold));
        bench.fire(&mut g, Timer::CohesionCheck);
        assert_eq!(g.phase(), TourPhase::Moving { destination: loc(2) });
    }

    #[test]
    fn happy_group_loosens_and_gets_invited() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        for &m in &TRIO {
            bench.deliver(&mut g, Address::Visitor(m), Message::StatusUpdate {
                visitor: m,
                satisfaction: 0.9,
                fatigue: 0.1,
                cohesion: 0.9,
            });
        }
        let effects = bench.fire(&mut g, Timer::CohesionCheck);
        assert_eq!(g.group().unwrap().formation(), Formation::Circle);
        assert_eq!(count_kind(&effects, "InviteQuestions"), 3);
    }
}

// ── Disruptions ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod disruptions {
    use super::*;

    fn emergency(at: LocationId) -> Message {
        Message::Emergency { kind: EmergencyKind::Maintenance, location: at }
    }

    #[test]
    fn closed_destination_is_rerouted_around() {
        let mut bench = Bench::new();
        let mut g = guide();
        bench.assign(&mut g, &TRIO);
        bench.all_ready(&mut g, &TRIO, loc(0));
        assert_eq!(g.phase(), TourPhase::Moving { destination: loc(1) });

        let effects = bench.deliver(&mut g, Address::Dispatcher, emergency(loc(1)));
        assert_eq!(moves_to(&effects), Some(loc(2)));
        assert!(g.is_closed(loc(1)));
    }

    #[test]
    fn closed_stop_skipped_until_resolved() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        bench.deliver(&mut g, Address::Dispatcher, emergency(loc(3)));
        bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        bench.all_ready(&mut g, &TRIO, loc(2));
        let effects = bench.fire(&mut g, Timer::PresentationDone(loc(2)));
        assert_eq!(moves_to(&effects), Some(loc(4)));

        bench.deliver(&mut g, Address::Dispatcher, Message::EmergencyResolved { location: loc(3) });
        bench.all_ready(&mut g, &TRIO, loc(4));
        let effects = bench.fire(&mut g, Timer::PresentationDone(loc(4)));
        assert_eq!(moves_to(&effects), Some(loc(3)));
    }

    #[test]
    fn blocked_itinerary_waits_then_skips() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        for stop in 2..=6 {
            bench.deliver(&mut g, Address::Dispatcher, emergency(loc(stop)));
        }
        bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        assert_eq!(g.phase(), TourPhase::Pausing(PauseReason::AwaitingReopen));

        let effects = bench.fire(&mut g, Timer::ReopenWait);
        assert_eq!(count_kind(&effects, "TourCompleted"), 1);
        assert_eq!(g.phase(), TourPhase::CoolingDown);
    }

    #[test]
    fn reopening_resumes_a_blocked_tour() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        for stop in 2..=6 {
            bench.deliver(&mut g, Address::Dispatcher, emergency(loc(stop)));
        }
        bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        let effects = bench.deliver(&mut g, Address::Dispatcher, Message::EmergencyResolved {
            location: loc(5),
        });
        assert_eq!(moves_to(&effects), Some(loc(5)));
    }

    #[test]
    fn congested_stop_is_deferred() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        bench.deliver(&mut g, Address::Dispatcher, Message::Advisory {
            location: loc(2),
            level:    mt_actor::AdvisoryLevel::Congested,
        });
        let effects = bench.fire(&mut g, Timer::PresentationDone(loc(1)));
        assert_eq!(moves_to(&effects), Some(loc(3)));
    }

    #[test]
    fn bounced_member_dropped_then_tour_aborted() {
        let mut bench = Bench::new();
        let mut g = presenting_first_stop(&mut bench);
        let bounce = |to: VisitorId| Message::Undeliverable {
            to:       Address::Visitor(to),
            original: Box::new(Message::InviteQuestions),
        };

        bench.deliver(&mut g, Address::Visitor(v(2)), bounce(v(2)));
        assert_eq!(g.group().unwrap().size(), 2);
        assert!(g.phase().is_touring());

        let effects = bench.deliver(&mut g, Address::Visitor(v(1)), bounce(v(1)));
        let degraded = effects.iter().any(|e| matches!(
            e,
            Effect::Send { msg: Message::TourCompleted { degraded: true, group_size: 1, .. }, .. }
        ));
        assert!(degraded);
        assert_eq!(g.phase(), TourPhase::CoolingDown);
    }

    #[test]
    fn dropping_the_laggard_completes_convergence() {
        let mut bench = Bench::new();
        let mut g = guide();
        bench.assign(&mut g, &TRIO);
        bench.all_ready(&mut g, &TRIO[..2], loc(0));
        bench.deliver(&mut g, Address::Visitor(v(2)), Message::Undeliverable {
            to:       Address::Visitor(v(2)),
            original: Box::new(Message::Move { destination: loc(0) }),
        });
        assert_eq!(g.phase(), TourPhase::Moving { destination: loc(1) });
    }
}

// ── Narration ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod narration {
    use super::*;

    #[test]
    fn specialist_talks_longer_than_generalist() {
        let layout = MuseumLayout::standard();
        let art = layout.get(loc(1)).unwrap();
        let mut rng = ActorRng::new(1, 1);
        let specialist = narrate(&GuideProfile::new(Theme::Art), art, Formation::Cluster, 0.7, &mut rng);
        let mut generalist_profile = GuideProfile::new(Theme::Science);
        generalist_profile.adaptability = 0.0;
        let generalist = narrate(&generalist_profile, art, Formation::Cluster, 0.7, &mut rng);
        assert!(specialist.len() > generalist.len());
        assert!(specialist.contains(&art.title));
    }

    #[test]
    fn low_cohesion_asks_group_to_close_up() {
        let layout = MuseumLayout::standard();
        let stop = layout.get(loc(2)).unwrap();
        let mut rng = ActorRng::new(1, 1);
        let text = narrate(&GuideProfile::new(Theme::Art), stop, Formation::Cluster, 0.2, &mut rng);
        assert!(text.contains("stay close"));
    }

    #[test]
    fn answer_quality_in_unit_range_and_favours_specialty() {
        let p = GuideProfile::new(Theme::History);
        let mut rng = ActorRng::new(5, 5);
        let mut on = 0.0;
        let mut off = 0.0;
        for _ in 0..50 {
            let (_, q1) = answer(&p, Theme::History, "why?", &mut rng);
            let (_, q2) = answer(&p, Theme::Nature, "why?", &mut rng);
            assert!((0.0..=1.0).contains(&q1) && (0.0..=1.0).contains(&q2));
            on += q1;
            off += q2;
        }
        assert!(on > off);
    }

    #[test]
    fn efficient_guides_present_faster() {
        let mut quick = GuideProfile::new(Theme::Art);
        quick.efficiency = 1.0;
        let mut slow = GuideProfile::new(Theme::Art);
        slow.efficiency = 0.0;
        assert!(quick.presentation_ticks(20) < slow.presentation_ticks(20));
        assert_eq!(quick.presentation_ticks(0), 1);
    }
}
