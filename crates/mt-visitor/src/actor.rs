//! `VisitorActor` — the visitor's side of the tour protocol.

use tracing::{debug, info, trace};

use mt_actor::{Actor, ActorContext, Address, Capability, Fault, Message, Timer};
use mt_core::{GroupId, GuideId, LocationId, Theme, TimerId, TourConfig, VisitorId};
use mt_group::Formation;

use crate::{VisitorModel, VisitorProfile};

/// Where a visitor stands with respect to the tour system.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Membership {
    /// Not (yet) acknowledged by the dispatcher.
    Unassigned,
    /// In the wait queue.
    Waiting,
    /// Following a guide.
    InGroup,
}

/// The slice of [`TourConfig`] a visitor consults.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VisitorTuning {
    pub tick_interval:      u64,
    pub question_budget:    u32,
    pub lookup_retry_limit: u32,
    pub lookup_retry_ticks: u64,
}

impl From<&TourConfig> for VisitorTuning {
    fn from(c: &TourConfig) -> Self {
        Self {
            tick_interval:      c.visitor_tick_interval,
            question_budget:    c.question_budget,
            lookup_retry_limit: c.lookup_retry_limit,
            lookup_retry_ticks: c.lookup_retry_ticks,
        }
    }
}

impl Default for VisitorTuning {
    fn default() -> Self {
        Self::from(&TourConfig::default())
    }
}

/// Read-only view of one visitor.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitorSnapshot {
    pub id:           VisitorId,
    pub membership:   Membership,
    pub guide:        Option<GuideId>,
    pub satisfaction: f64,
    pub fatigue:      f64,
    pub interest:     f64,
    pub experience:   f64,
    pub tours_taken:  u32,
}

pub struct VisitorActor {
    id:          VisitorId,
    model:       VisitorModel,
    tuning:      VisitorTuning,
    membership:  Membership,
    guide:       Option<GuideId>,
    group:       Option<GroupId>,
    formation:   Formation,
    /// Theme of the last narration heard, for questions on invitation.
    last_theme:  Option<Theme>,
    ready_timer: Option<TimerId>,
}

impl VisitorActor {
    pub fn new(id: VisitorId, profile: VisitorProfile, tuning: VisitorTuning) -> Self {
        Self {
            id,
            model: VisitorModel::new(profile),
            tuning,
            membership: Membership::Unassigned,
            guide: None,
            group: None,
            formation: Formation::default(),
            last_theme: None,
            ready_timer: None,
        }
    }

    pub fn id(&self) -> VisitorId {
        self.id
    }

    pub fn address(&self) -> Address {
        Address::Visitor(self.id)
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }

    pub fn guide(&self) -> Option<GuideId> {
        self.guide
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn model(&self) -> &VisitorModel {
        &self.model
    }

    pub fn snapshot(&self) -> VisitorSnapshot {
        VisitorSnapshot {
            id:           self.id,
            membership:   self.membership,
            guide:        self.guide,
            satisfaction: self.model.satisfaction(),
            fatigue:      self.model.fatigue(),
            interest:     self.model.interest(),
            experience:   self.model.experience(),
            tours_taken:  self.model.tours_taken(),
        }
    }

    // ── Protocol steps ────────────────────────────────────────────────────

    /// Ask the dispatcher for a place in line, retrying a bounded number of
    /// times if none is registered yet.
    fn join_queue(&mut self, attempt: u32, ctx: &mut ActorContext<'_>) {
        self.leave_group(ctx);
        self.membership = Membership::Unassigned;
        if let Some(dispatcher) = ctx.lookup_one(Capability::Dispatcher) {
            ctx.send(dispatcher, Message::RegisterVisitor);
            return;
        }

        let attempts = attempt + 1;
        let fault = Fault::LookupFailure { capability: Capability::Dispatcher, attempts };
        fault.report(self.address());
        if attempts < self.tuning.lookup_retry_limit {
            ctx.schedule(self.tuning.lookup_retry_ticks, Timer::LookupRetry { attempt: attempts });
        } else {
            info!(visitor = %self.id, "giving up on the tour desk, leaving");
            ctx.stop();
        }
    }

    fn leave_group(&mut self, ctx: &mut ActorContext<'_>) {
        if let Some(id) = self.ready_timer.take() {
            ctx.cancel(id);
        }
        self.guide = None;
        self.group = None;
        self.formation = Formation::default();
        self.last_theme = None;
    }

    fn is_my_guide(&self, from: Address) -> bool {
        self.membership == Membership::InGroup
            && self.guide.is_some()
            && from.as_guide() == self.guide
    }

    fn ask(&self, text: Option<String>, ctx: &mut ActorContext<'_>) {
        let (Some(text), Some(guide)) = (text, self.guide) else {
            return;
        };
        trace!(visitor = %self.id, %guide, "asks a question");
        ctx.send(Address::Guide(guide), Message::Question { visitor: self.id, text });
    }

    fn on_move(&mut self, destination: LocationId, ctx: &mut ActorContext<'_>) {
        let delay = self.model.on_move(ctx.rng());
        if let Some(old) = self.ready_timer.take() {
            ctx.cancel(old);
        }
        self.ready_timer = Some(ctx.schedule(delay, Timer::VisitorReady(destination)));
    }

    fn on_farewell(&mut self, ctx: &mut ActorContext<'_>) {
        let outcome = self.model.on_tour_end(ctx.rng());
        info!(
            visitor = %self.id,
            satisfaction = outcome.final_satisfaction,
            requeue = outcome.requeue,
            "tour over"
        );
        if outcome.requeue {
            self.join_queue(0, ctx);
            return;
        }
        self.leave_group(ctx);
        self.membership = Membership::Unassigned;
        if let Some(dispatcher) = ctx.lookup_one(Capability::Dispatcher) {
            ctx.send(dispatcher, Message::Depart { visitor: self.id });
        }
        ctx.stop();
    }

    fn mismatch(&self, from: Address, msg: &Message) {
        let phase = match self.membership {
            Membership::Unassigned => "unassigned",
            Membership::Waiting    => "waiting",
            Membership::InGroup    => "in a group",
        };
        Fault::ProtocolMismatch { from, message: msg.kind(), phase }.report(self.address());
    }
}

impl Actor for VisitorActor {
    fn on_start(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.register(Capability::Visitor);
        ctx.schedule(self.tuning.tick_interval, Timer::VisitorTick);
        self.join_queue(0, ctx);
    }

    fn on_message(&mut self, from: Address, msg: Message, ctx: &mut ActorContext<'_>) {
        match msg {
            Message::RegistrationAck if from == Address::Dispatcher => {
                if self.membership == Membership::InGroup {
                    debug!(visitor = %self.id, "assignment fell through, back in line");
                    self.leave_group(ctx);
                }
                self.membership = Membership::Waiting;
            }
            Message::Assigned { guide, group } if from == Address::Dispatcher => {
                self.membership = Membership::InGroup;
                self.guide = Some(guide);
                self.group = Some(group);
                self.model.begin_tour(self.tuning.question_budget);
            }
            Message::Welcome { group, specialization } => match from.as_guide() {
                Some(guide) if self.guide.is_none() || self.guide == Some(guide) => {
                    if self.membership != Membership::InGroup {
                        self.model.begin_tour(self.tuning.question_budget);
                    }
                    self.membership = Membership::InGroup;
                    self.guide = Some(guide);
                    self.group = Some(group);
                    self.model.on_welcome(specialization);
                }
                _ => self.mismatch(from, &Message::Welcome { group, specialization }),
            },
            msg if !self.is_my_guide(from) && from != Address::Dispatcher => {
                match msg {
                    Message::Undeliverable { .. } => {}
                    other => self.mismatch(from, &other),
                }
            }
            Message::Move { destination } => self.on_move(destination, ctx),
            Message::Narration { theme, text, .. } => {
                self.last_theme = Some(theme);
                let question = self.model.on_narration(theme, &text, ctx.rng());
                self.ask(question, ctx);
            }
            Message::InviteQuestions => {
                let Some(theme) = self.last_theme else {
                    return;
                };
                let question = self.model.on_invite(theme, ctx.rng());
                self.ask(question, ctx);
            }
            Message::Answer { asker, quality, .. } => {
                self.model.on_answer(asker == self.id, quality);
            }
            Message::BreakProposal { duration } => {
                let accept = self.model.on_break_proposal();
                trace!(visitor = %self.id, duration, accept, "break vote");
                ctx.send(from, Message::BreakResponse { visitor: self.id, accept });
            }
            Message::Regroup { formation } => self.formation = formation,
            Message::Farewell { .. } => self.on_farewell(ctx),
            Message::Undeliverable { to, original } => match to {
                Address::Dispatcher => self.join_queue(0, ctx),
                Address::Guide(_) => {
                    debug!(visitor = %self.id, lost = original.kind(), "guide gone");
                    self.join_queue(0, ctx);
                }
                _ => {}
            },
            other => self.mismatch(from, &other),
        }
    }

    fn on_timer(&mut self, timer: Timer, ctx: &mut ActorContext<'_>) {
        match timer {
            Timer::VisitorTick => {
                let touring = self.membership == Membership::InGroup;
                if let Some(event) = self.model.drift(touring, ctx.rng()) {
                    trace!(visitor = %self.id, ?event, "social");
                }
                if let (true, Some(guide)) = (touring, self.guide) {
                    ctx.send(Address::Guide(guide), Message::StatusUpdate {
                        visitor:      self.id,
                        satisfaction: self.model.satisfaction(),
                        fatigue:      self.model.fatigue(),
                        cohesion:     self.model.cohesion_estimate(self.formation),
                    });
                }
                ctx.schedule(self.tuning.tick_interval, Timer::VisitorTick);
            }
            Timer::VisitorReady(location) => {
                self.ready_timer = None;
                if let (Membership::InGroup, Some(guide)) = (self.membership, self.guide) {
                    ctx.send(Address::Guide(guide), Message::VisitorReady { visitor: self.id, location });
                }
            }
            Timer::LookupRetry { attempt } => self.join_queue(attempt, ctx),
            other => debug!(visitor = %self.id, ?other, "ignoring foreign timer"),
        }
    }
}
