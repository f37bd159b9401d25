//! `GuideController` — one guide's side of the tour protocol.
//!
//! # Timers
//!
//! | Timer                | Armed by                        | Effect on fire                         |
//! |----------------------|---------------------------------|----------------------------------------|
//! | `ConvergenceTimeout` | every `Move` broadcast          | next attempt, or tighten and proceed   |
//! | `PresentationDone`   | arrival at a stop               | mark visited, advance                  |
//! | `CohesionCheck`      | accept (periodic)               | adaptive policy                        |
//! | `StatusReport`       | accept (periodic)               | `StatusReport` to the dispatcher       |
//! | `BreakVoteTimeout`   | `BreakProposal` broadcast       | close the vote                         |
//! | `BreakOver`          | break taken at a stop boundary  | advance                                |
//! | `ReopenWait`         | itinerary blocked               | skip closed stops, advance             |
//!
//! Every tour timer is cancelled when the tour ends, so nothing can fire
//! against a group that no longer exists.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, trace};

use mt_actor::{
    Actor, ActorContext, AdvisoryLevel, Address, Capability, Fault, Message, RefusalReason, Timer,
};
use mt_core::{
    Availability, GroupId, GuideId, LocationId, TimerId, TourConfig, VisitorId,
};
use mt_group::{Formation, GroupDynamics, MemberMetrics, TourGroup};
use mt_schedule::{Itinerary, MuseumLayout, NextStop};

use crate::{GuideProfile, PauseReason, TourPhase, answer, narrate};

/// Read-only view of one guide.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuideSnapshot {
    pub id:               GuideId,
    pub phase:            TourPhase,
    pub availability:     Availability,
    pub group:            Option<GroupId>,
    pub members:          Vec<VisitorId>,
    pub location:         Option<LocationId>,
    pub itinerary_index:  usize,
    pub formation:        Formation,
    pub avg_satisfaction: f64,
    pub avg_fatigue:      f64,
    pub avg_cohesion:     f64,
    pub completed_tours:  u32,
}

/// An in-flight readiness wait.
#[derive(Copy, Clone, Debug)]
struct Convergence {
    target:  LocationId,
    attempt: u32,
}

/// Handles of the timers belonging to the current tour.
#[derive(Default)]
struct TourTimers {
    convergence:  Option<TimerId>,
    presentation: Option<TimerId>,
    cohesion:     Option<TimerId>,
    status:       Option<TimerId>,
    break_vote:   Option<TimerId>,
    break_over:   Option<TimerId>,
    reopen:       Option<TimerId>,
}

impl TourTimers {
    fn cancel_all(&mut self, ctx: &mut ActorContext<'_>) {
        let slots = [
            &mut self.convergence,
            &mut self.presentation,
            &mut self.cohesion,
            &mut self.status,
            &mut self.break_vote,
            &mut self.break_over,
            &mut self.reopen,
        ];
        for slot in slots {
            if let Some(id) = slot.take() {
                ctx.cancel(id);
            }
        }
    }
}

fn cancel(slot: &mut Option<TimerId>, ctx: &mut ActorContext<'_>) {
    if let Some(id) = slot.take() {
        ctx.cancel(id);
    }
}

pub struct GuideController {
    id:        GuideId,
    profile:   GuideProfile,
    config:    TourConfig,
    layout:    Arc<MuseumLayout>,
    phase:     TourPhase,

    // ── Per-tour state ────────────────────────────────────────────────────
    group:       Option<TourGroup>,
    dynamics:    GroupDynamics,
    itinerary:   Option<Itinerary>,
    convergence: Option<Convergence>,
    ready:       BTreeSet<VisitorId>,
    /// Open break vote: member → accepted.
    votes:       Option<BTreeMap<VisitorId, bool>>,
    break_agreed: bool,
    /// `visited` count at which the last break was taken.
    last_break_at: Option<usize>,
    cohesion_hold:    bool,
    cohesion_retries: u32,
    timers:      TourTimers,

    // ── Museum state as reported by the dispatcher ────────────────────────
    closed:    BTreeSet<LocationId>,
    congested: BTreeMap<LocationId, AdvisoryLevel>,

    completed: u32,
}

impl GuideController {
    pub fn new(id: GuideId, profile: GuideProfile, config: TourConfig, layout: Arc<MuseumLayout>) -> Self {
        Self {
            id,
            profile,
            config,
            layout,
            phase: TourPhase::Idle,
            group: None,
            dynamics: GroupDynamics::new(),
            itinerary: None,
            convergence: None,
            ready: BTreeSet::new(),
            votes: None,
            break_agreed: false,
            last_break_at: None,
            cohesion_hold: false,
            cohesion_retries: 0,
            timers: TourTimers::default(),
            closed: BTreeSet::new(),
            congested: BTreeMap::new(),
            completed: 0,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn id(&self) -> GuideId {
        self.id
    }

    pub fn address(&self) -> Address {
        Address::Guide(self.id)
    }

    pub fn profile(&self) -> &GuideProfile {
        &self.profile
    }

    pub fn phase(&self) -> TourPhase {
        self.phase
    }

    pub fn group(&self) -> Option<&TourGroup> {
        self.group.as_ref()
    }

    pub fn dynamics(&self) -> &GroupDynamics {
        &self.dynamics
    }

    pub fn completed_tours(&self) -> u32 {
        self.completed
    }

    pub fn is_closed(&self, location: LocationId) -> bool {
        self.closed.contains(&location)
    }

    pub fn snapshot(&self) -> GuideSnapshot {
        GuideSnapshot {
            id:               self.id,
            phase:            self.phase,
            availability:     self.phase.availability(),
            group:            self.group.as_ref().map(TourGroup::id),
            members:          self.group.as_ref().map(|g| g.members().to_vec()).unwrap_or_default(),
            location:         self.group.as_ref().map(TourGroup::location),
            itinerary_index:  self.itinerary.as_ref().map_or(0, Itinerary::index),
            formation:        self.group.as_ref().map(TourGroup::formation).unwrap_or_default(),
            avg_satisfaction: self.dynamics.average_satisfaction(),
            avg_fatigue:      self.dynamics.average_fatigue(),
            avg_cohesion:     self.dynamics.average_cohesion(),
            completed_tours:  self.completed,
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn members(&self) -> Vec<Address> {
        self.group
            .as_ref()
            .map(|g| g.members().iter().map(|&v| Address::Visitor(v)).collect())
            .unwrap_or_default()
    }

    fn is_member(&self, visitor: VisitorId) -> bool {
        self.group.as_ref().is_some_and(|g| g.contains(visitor))
    }

    fn to_group(&self, msg: &Message, ctx: &mut ActorContext<'_>) {
        ctx.broadcast(self.members(), msg);
    }

    fn to_dispatcher(&self, msg: Message, ctx: &mut ActorContext<'_>) {
        match ctx.lookup_one(Capability::Dispatcher) {
            Some(dispatcher) => ctx.send(dispatcher, msg),
            None => Fault::LookupFailure { capability: Capability::Dispatcher, attempts: 1 }
                .report(self.address()),
        }
    }

    fn mismatch(&self, from: Address, msg: &Message) {
        Fault::ProtocolMismatch { from, message: msg.kind(), phase: self.phase.name() }
            .report(self.address());
    }

    fn regroup(&mut self, formation: Formation, ctx: &mut ActorContext<'_>) {
        let Some(group) = self.group.as_mut() else {
            return;
        };
        if group.formation() == formation {
            return;
        }
        debug!(guide = %self.id, from = %group.formation(), to = %formation, "regroup");
        group.set_formation(formation);
        self.to_group(&Message::Regroup { formation }, ctx);
    }

    fn send_status_report(&self, ctx: &mut ActorContext<'_>) {
        let Some(group) = &self.group else {
            return;
        };
        self.to_dispatcher(Message::StatusReport {
            guide:            self.id,
            location:         group.location(),
            group_size:       group.size(),
            itinerary_index:  self.itinerary.as_ref().map_or(0, Itinerary::index),
            avg_satisfaction: self.dynamics.average_satisfaction(),
            avg_fatigue:      self.dynamics.average_fatigue(),
        }, ctx);
    }

    // ── Assignment ────────────────────────────────────────────────────────

    fn join_pool(&mut self, attempt: u32, ctx: &mut ActorContext<'_>) {
        let register = Message::RegisterGuide { specialization: self.profile.specialization };
        if let Some(dispatcher) = ctx.lookup_one(Capability::Dispatcher) {
            ctx.send(dispatcher, register);
            return;
        }
        let attempts = attempt + 1;
        Fault::LookupFailure { capability: Capability::Dispatcher, attempts }.report(self.address());
        if attempts < self.config.lookup_retry_limit {
            ctx.schedule(self.config.lookup_retry_ticks, Timer::LookupRetry { attempt: attempts });
        }
    }

    fn on_assign(
        &mut self,
        from:     Address,
        group_id: GroupId,
        visitors: Vec<VisitorId>,
        ctx:      &mut ActorContext<'_>,
    ) {
        let reason = if self.phase != TourPhase::Idle {
            Some(RefusalReason::Busy)
        } else if visitors.len() < self.config.min_group_size
            || visitors.len() > self.config.max_group_size
        {
            Some(RefusalReason::GroupSize)
        } else {
            None
        };
        if let Some(reason) = reason {
            Fault::Unavailable { resource: self.id.to_string(), detail: "assignment refused" }
                .report(self.address());
            ctx.send(from, Message::AssignmentRefused { group: group_id, visitors, reason });
            return;
        }

        info!(guide = %self.id, group = %group_id, size = visitors.len(), "tour accepted");
        self.dynamics.reset();
        for &v in &visitors {
            self.dynamics.track(v);
        }
        let entrance = self.layout.entrance();
        self.group = Some(TourGroup::new(group_id, self.id, visitors, entrance, ctx.now()));
        self.itinerary = Some(self.layout.itinerary());
        self.phase = TourPhase::Forming;

        let welcome = Message::Welcome { group: group_id, specialization: self.profile.specialization };
        self.to_group(&welcome, ctx);
        self.timers.cohesion = Some(ctx.schedule(self.config.cohesion_interval_ticks, Timer::CohesionCheck));
        self.timers.status = Some(ctx.schedule(self.config.status_interval_ticks, Timer::StatusReport));
        self.send_status_report(ctx);
        self.start_move(entrance, ctx);
    }

    // ── Movement and convergence ──────────────────────────────────────────

    /// Broadcast `Move` and start waiting for everyone to be ready there.
    fn start_move(&mut self, target: LocationId, ctx: &mut ActorContext<'_>) {
        self.to_group(&Message::Move { destination: target }, ctx);
        self.ready.clear();
        self.convergence = Some(Convergence { target, attempt: 1 });
        cancel(&mut self.timers.convergence, ctx);
        self.timers.convergence = Some(ctx.schedule(
            self.config.convergence_timeout_ticks,
            Timer::ConvergenceTimeout { attempt: 1 },
        ));
    }

    fn all_ready(&self) -> bool {
        self.group
            .as_ref()
            .is_some_and(|g| g.members().iter().all(|v| self.ready.contains(v)))
    }

    fn on_ready(&mut self, visitor: VisitorId, location: LocationId, ctx: &mut ActorContext<'_>) {
        let Some(conv) = self.convergence else {
            return;
        };
        if conv.target != location || !self.is_member(visitor) {
            return;
        }
        self.ready.insert(visitor);
        if self.all_ready() {
            self.converged(ctx);
        }
    }

    fn on_convergence_timeout(&mut self, attempt: u32, ctx: &mut ActorContext<'_>) {
        self.timers.convergence = None;
        let Some(conv) = self.convergence else {
            return;
        };
        if conv.attempt != attempt {
            return;
        }
        if attempt < self.config.convergence_attempts {
            trace!(guide = %self.id, attempt, ready = self.ready.len(), "still gathering");
            self.convergence = Some(Convergence { attempt: attempt + 1, ..conv });
            self.timers.convergence = Some(ctx.schedule(
                self.config.convergence_timeout_ticks,
                Timer::ConvergenceTimeout { attempt: attempt + 1 },
            ));
            return;
        }

        let expected = self.group.as_ref().map_or(0, TourGroup::size);
        Fault::ConvergenceTimeout { ready: self.ready.len(), expected, attempts: attempt }
            .report(self.address());
        if let Some(formation) = self.group.as_ref().map(|g| g.formation().tighten()) {
            self.regroup(formation, ctx);
        }
        self.converged(ctx);
    }

    fn converged(&mut self, ctx: &mut ActorContext<'_>) {
        cancel(&mut self.timers.convergence, ctx);
        let Some(conv) = self.convergence.take() else {
            return;
        };
        self.ready.clear();
        match self.phase {
            TourPhase::Forming => self.advance(ctx),
            TourPhase::Moving { destination } if destination == conv.target => {
                self.arrive(destination, ctx)
            }
            _ => {}
        }
    }

    /// Pick and head for the next stop, or pause, or finish.
    fn advance(&mut self, ctx: &mut ActorContext<'_>) {
        if self.group.is_none() {
            return;
        }
        if self.break_agreed {
            self.break_agreed = false;
            self.last_break_at = self.group.as_ref().map(TourGroup::visited);
            self.phase = TourPhase::Pausing(PauseReason::Break);
            info!(guide = %self.id, ticks = self.config.break_duration_ticks, "taking a break");
            self.timers.break_over = Some(ctx.schedule(self.config.break_duration_ticks, Timer::BreakOver));
            return;
        }
        if self.cohesion_hold {
            debug!(guide = %self.id, "holding for cohesion");
            self.phase = TourPhase::Pausing(PauseReason::CohesionHold);
            return;
        }

        let next = match &self.itinerary {
            Some(it) => it.next_stop(
                |l| self.closed.contains(&l),
                |l| self.congested.contains_key(&l),
            ),
            None => NextStop::Finished,
        };
        match next {
            NextStop::Stop(stop) => {
                trace!(guide = %self.id, %stop, "moving on");
                self.phase = TourPhase::Moving { destination: stop };
                self.start_move(stop, ctx);
            }
            NextStop::Blocked => {
                info!(guide = %self.id, "every remaining stop is closed, waiting");
                self.phase = TourPhase::Pausing(PauseReason::AwaitingReopen);
                cancel(&mut self.timers.reopen, ctx);
                self.timers.reopen = Some(ctx.schedule(self.config.reopen_wait_ticks, Timer::ReopenWait));
            }
            NextStop::Finished => self.complete(false, ctx),
        }
    }

    // ── Presenting ────────────────────────────────────────────────────────

    fn arrive(&mut self, location: LocationId, ctx: &mut ActorContext<'_>) {
        if self.closed.contains(&location) {
            self.advance(ctx);
            return;
        }
        let Some(stop) = self.layout.get(location) else {
            self.advance(ctx);
            return;
        };
        let formation = match self.group.as_mut() {
            Some(group) => {
                group.set_location(location);
                group.formation()
            }
            None => return,
        };
        self.phase = TourPhase::Presenting { location };
        self.send_status_report(ctx);

        let cohesion = self.dynamics.average_cohesion();
        let text = narrate(&self.profile, stop, formation, cohesion, ctx.rng());
        let narration = Message::Narration { location, theme: stop.theme, text };
        self.to_group(&narration, ctx);

        let ticks = self.profile.presentation_ticks(stop.narration_ticks);
        cancel(&mut self.timers.presentation, ctx);
        self.timers.presentation = Some(ctx.schedule(ticks, Timer::PresentationDone(location)));
    }

    fn on_presentation_done(&mut self, location: LocationId, ctx: &mut ActorContext<'_>) {
        self.timers.presentation = None;
        if self.phase != (TourPhase::Presenting { location }) {
            return;
        }
        if let Some(it) = self.itinerary.as_mut() {
            it.mark_visited(location);
        }
        if let Some(group) = self.group.as_mut() {
            group.record_visit();
        }
        self.advance(ctx);
    }

    fn on_question(&mut self, visitor: VisitorId, text: &str, ctx: &mut ActorContext<'_>) {
        let Some(group) = &self.group else {
            return;
        };
        let theme = self
            .layout
            .get(group.location())
            .map_or(self.profile.specialization, |l| l.theme);
        let (reply, quality) = answer(&self.profile, theme, text, ctx.rng());
        self.to_group(&Message::Answer { asker: visitor, text: reply, quality }, ctx);
    }

    // ── Adaptive policy ───────────────────────────────────────────────────

    fn on_cohesion_check(&mut self, ctx: &mut ActorContext<'_>) {
        self.timers.cohesion = None;
        if self.group.is_none() {
            return;
        }
        self.timers.cohesion = Some(ctx.schedule(self.config.cohesion_interval_ticks, Timer::CohesionCheck));

        let fatigue = self.dynamics.average_fatigue();
        let cohesion = self.dynamics.average_cohesion();
        let satisfaction = self.dynamics.average_satisfaction();
        let visited = self.group.as_ref().map(TourGroup::visited);

        let on_break = self.phase == TourPhase::Pausing(PauseReason::Break);
        if fatigue > self.config.break_fatigue_threshold
            && !on_break
            && self.votes.is_none()
            && !self.break_agreed
            && self.last_break_at != visited
        {
            self.propose_break(ctx);
        }

        let holding = self.phase == TourPhase::Pausing(PauseReason::CohesionHold);
        if cohesion < self.config.cohesion_threshold {
            if self.cohesion_retries < self.config.cohesion_retry_budget {
                self.cohesion_retries += 1;
                self.cohesion_hold = true;
                if let Some(tighter) = self.group.as_ref().map(|g| g.formation().tighten()) {
                    self.regroup(tighter, ctx);
                }
            } else if self.cohesion_hold {
                info!(guide = %self.id, cohesion, "cohesion retries exhausted, moving on");
                self.cohesion_hold = false;
                if holding {
                    self.advance(ctx);
                }
            }
        } else {
            if self.cohesion_hold {
                debug!(guide = %self.id, cohesion, "cohesion recovered");
                self.cohesion_hold = false;
                self.cohesion_retries = 0;
                if holding {
                    self.advance(ctx);
                }
            }
            if satisfaction > self.config.loosen_satisfaction && cohesion > self.config.loosen_cohesion {
                if let Some(looser) = self.group.as_ref().map(|g| g.formation().loosen()) {
                    self.regroup(looser, ctx);
                }
                self.to_group(&Message::InviteQuestions, ctx);
            }
        }

        let outliers = self.dynamics.identify_outliers();
        if !outliers.is_empty() {
            debug!(guide = %self.id, ?outliers, "members falling behind");
        }
    }

    fn propose_break(&mut self, ctx: &mut ActorContext<'_>) {
        let duration = self.config.break_duration_ticks;
        debug!(guide = %self.id, duration, "proposing a break");
        self.votes = Some(BTreeMap::new());
        self.to_group(&Message::BreakProposal { duration }, ctx);
        self.timers.break_vote = Some(ctx.schedule(self.config.break_vote_timeout_ticks, Timer::BreakVoteTimeout));
    }

    fn on_break_response(&mut self, visitor: VisitorId, accept: bool, ctx: &mut ActorContext<'_>) {
        if !self.is_member(visitor) {
            return;
        }
        let Some(votes) = self.votes.as_mut() else {
            return;
        };
        votes.insert(visitor, accept);
        let size = self.group.as_ref().map_or(0, TourGroup::size);
        if votes.len() >= size {
            self.close_vote(ctx);
        }
    }

    /// Tally the vote.  Members who did not answer count as declining.
    fn close_vote(&mut self, ctx: &mut ActorContext<'_>) {
        cancel(&mut self.timers.break_vote, ctx);
        let Some(votes) = self.votes.take() else {
            return;
        };
        let size = self.group.as_ref().map_or(0, TourGroup::size);
        if size == 0 {
            return;
        }
        let accepted = votes.values().filter(|&&a| a).count();
        let ratio = accepted as f64 / size as f64;
        self.break_agreed = ratio >= self.config.break_acceptance_ratio;
        info!(guide = %self.id, accepted, size, agreed = self.break_agreed, "break vote closed");
    }

    // ── Museum state ──────────────────────────────────────────────────────

    fn on_emergency(&mut self, location: LocationId, ctx: &mut ActorContext<'_>) {
        self.closed.insert(location);
        match self.phase {
            TourPhase::Moving { destination } if destination == location => {
                info!(guide = %self.id, %location, "destination closed, rerouting");
                cancel(&mut self.timers.convergence, ctx);
                self.convergence = None;
                self.advance(ctx);
            }
            TourPhase::Presenting { location: here } if here == location => {
                info!(guide = %self.id, %location, "evacuating stop");
                cancel(&mut self.timers.presentation, ctx);
                self.advance(ctx);
            }
            _ => {}
        }
    }

    fn on_emergency_resolved(&mut self, location: LocationId, ctx: &mut ActorContext<'_>) {
        self.closed.remove(&location);
        if self.phase == TourPhase::Pausing(PauseReason::AwaitingReopen) {
            cancel(&mut self.timers.reopen, ctx);
            self.advance(ctx);
        }
    }

    fn on_reopen_wait(&mut self, ctx: &mut ActorContext<'_>) {
        self.timers.reopen = None;
        if self.phase != TourPhase::Pausing(PauseReason::AwaitingReopen) {
            return;
        }
        let closed = &self.closed;
        let skipped = self.itinerary.as_mut().map_or(0, |it| it.skip_closed(|l| closed.contains(&l)));
        info!(guide = %self.id, skipped, "gave up waiting for closed stops");
        self.advance(ctx);
    }

    fn on_reroute_suggested(&mut self, location: LocationId, ctx: &mut ActorContext<'_>) {
        if self.phase != (TourPhase::Presenting { location }) {
            return;
        }
        debug!(guide = %self.id, %location, "wrapping up early to ease congestion");
        cancel(&mut self.timers.presentation, ctx);
        self.timers.presentation = Some(ctx.schedule(1, Timer::PresentationDone(location)));
    }

    // ── Roster changes ────────────────────────────────────────────────────

    fn drop_member(&mut self, visitor: VisitorId, ctx: &mut ActorContext<'_>) {
        let Some(group) = self.group.as_mut() else {
            return;
        };
        if !group.remove_member(visitor) {
            return;
        }
        let remaining = group.size();
        self.dynamics.remove(visitor);
        self.ready.remove(&visitor);
        Fault::Unreachable { peer: Address::Visitor(visitor), detail: "dropped from roster" }
            .report(self.address());

        if remaining < self.config.min_viable_group_size {
            info!(guide = %self.id, remaining, "group no longer viable, aborting tour");
            self.complete(true, ctx);
            return;
        }
        if let Some(votes) = self.votes.as_mut() {
            votes.remove(&visitor);
            if votes.len() >= remaining {
                self.close_vote(ctx);
            }
        }
        if self.convergence.is_some() && self.all_ready() {
            self.converged(ctx);
        }
    }

    // ── Completion ────────────────────────────────────────────────────────

    fn complete(&mut self, degraded: bool, ctx: &mut ActorContext<'_>) {
        let Some(mut group) = self.group.take() else {
            return;
        };
        self.phase = TourPhase::Completing;
        let satisfaction = self.dynamics.average_satisfaction();
        let cohesion = self.dynamics.average_cohesion();
        let fatigue = self.dynamics.average_fatigue();

        let farewell = Message::Farewell { satisfaction, cohesion };
        for &v in group.members() {
            ctx.send(Address::Visitor(v), farewell.clone());
        }
        group.set_location(self.layout.exit());
        self.to_dispatcher(Message::TourCompleted {
            guide:            self.id,
            group:            group.id(),
            group_size:       group.size(),
            stops_visited:    group.visited(),
            avg_satisfaction: satisfaction,
            avg_cohesion:     cohesion,
            avg_fatigue:      fatigue,
            degraded,
        }, ctx);
        info!(
            guide = %self.id,
            group = %group.id(),
            stops = group.visited(),
            satisfaction,
            degraded,
            "tour completed"
        );

        self.timers.cancel_all(ctx);
        self.dynamics.reset();
        self.itinerary = None;
        self.convergence = None;
        self.ready.clear();
        self.votes = None;
        self.break_agreed = false;
        self.last_break_at = None;
        self.cohesion_hold = false;
        self.cohesion_retries = 0;
        self.completed += 1;
        self.phase = TourPhase::CoolingDown;
    }
}

impl Actor for GuideController {
    fn on_start(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.register(Capability::Guide);
        self.join_pool(0, ctx);
    }

    fn on_message(&mut self, from: Address, msg: Message, ctx: &mut ActorContext<'_>) {
        let touring = self.group.is_some();
        match msg {
            // ── From the dispatcher ──
            Message::RegistrationAck => debug!(guide = %self.id, "registered"),
            Message::AssignVisitors { group, visitors, .. } => self.on_assign(from, group, visitors, ctx),
            Message::GuideAvailable => match self.phase {
                TourPhase::CoolingDown => {
                    debug!(guide = %self.id, "back in the pool");
                    self.phase = TourPhase::Idle;
                }
                TourPhase::Idle => {}
                _ => self.mismatch(from, &Message::GuideAvailable),
            },
            Message::Emergency { location, .. } => self.on_emergency(location, ctx),
            Message::EmergencyResolved { location } => self.on_emergency_resolved(location, ctx),
            Message::Advisory { location, level } => {
                self.congested.insert(location, level);
            }
            Message::AdvisoryCleared { location } => {
                self.congested.remove(&location);
            }
            Message::RerouteSuggested { location } => self.on_reroute_suggested(location, ctx),

            // ── From group members ──
            Message::VisitorReady { visitor, location } if touring => self.on_ready(visitor, location, ctx),
            Message::StatusUpdate { visitor, satisfaction, fatigue, cohesion } if touring => {
                self.dynamics.ingest_all(visitor, MemberMetrics { satisfaction, fatigue, cohesion });
            }
            Message::Question { visitor, text } if touring && self.is_member(visitor) => {
                self.on_question(visitor, &text, ctx);
            }
            Message::BreakResponse { visitor, accept } if touring => {
                self.on_break_response(visitor, accept, ctx);
            }

            // ── From the event loop ──
            Message::Undeliverable { to: Address::Visitor(v), .. } => self.drop_member(v, ctx),
            Message::Undeliverable { to, original } => {
                Fault::Unreachable { peer: to, detail: original.kind() }.report(self.address());
            }

            other => self.mismatch(from, &other),
        }
    }

    fn on_timer(&mut self, timer: Timer, ctx: &mut ActorContext<'_>) {
        match timer {
            Timer::ConvergenceTimeout { attempt } => self.on_convergence_timeout(attempt, ctx),
            Timer::PresentationDone(location) => self.on_presentation_done(location, ctx),
            Timer::CohesionCheck => self.on_cohesion_check(ctx),
            Timer::StatusReport => {
                self.timers.status = None;
                if self.group.is_some() {
                    self.send_status_report(ctx);
                    self.timers.status = Some(ctx.schedule(self.config.status_interval_ticks, Timer::StatusReport));
                }
            }
            Timer::BreakVoteTimeout => {
                self.timers.break_vote = None;
                self.close_vote(ctx);
            }
            Timer::BreakOver => {
                self.timers.break_over = None;
                if self.phase == TourPhase::Pausing(PauseReason::Break) {
                    debug!(guide = %self.id, "break over");
                    self.advance(ctx);
                }
            }
            Timer::ReopenWait => self.on_reopen_wait(ctx),
            Timer::LookupRetry { attempt } => self.join_pool(attempt, ctx),
            other => debug!(guide = %self.id, ?other, "ignoring foreign timer"),
        }
    }
}
