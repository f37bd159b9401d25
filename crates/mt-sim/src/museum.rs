//! The `Museum` struct and its tick loop.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, trace};

use mt_actor::{Actor, ActorContext, Address, Directory, Effect, EmergencyKind, Message, Timer};
use mt_core::{
    ActorRng, Availability, GuideId, LocationId, SimClock, SimConfig, Tick, TourConfig, VisitorId,
};
use mt_dispatch::{Dispatcher, DispatcherSnapshot};
use mt_guide::{GuideController, GuideSnapshot};
use mt_schedule::{MuseumLayout, TimerQueue};
use mt_visitor::{VisitorActor, VisitorFactory, VisitorSnapshot};

use crate::{ArrivalPlan, Letter, PostOffice, SimError, SimObserver, SimResult, TickSummary, TourRecord};

#[cfg(feature = "fx-hash")]
type RngTable = rustc_hash::FxHashMap<Address, ActorRng>;
#[cfg(not(feature = "fx-hash"))]
type RngTable = std::collections::HashMap<Address, ActorRng>;

/// Running totals over the whole run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimStats {
    pub arrivals:     usize,
    pub delivered:    u64,
    pub bounced:      u64,
    /// Letters nobody could take: to `External`, bounces of bounces.
    pub dropped:      u64,
    pub timers_fired: u64,
    pub retired:      usize,
}

/// Read-only view of every actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MuseumSnapshot {
    pub tick:       Tick,
    pub dispatcher: DispatcherSnapshot,
    pub guides:     Vec<GuideSnapshot>,
    pub visitors:   Vec<VisitorSnapshot>,
}

/// The main simulation runner.
///
/// Owns every actor, the registry, the post office and the timer queue.
/// Actors never see each other; the museum routes their effects.
///
/// Create via [`MuseumBuilder`][crate::MuseumBuilder].
pub struct Museum {
    /// Clock, seed, latency.
    pub config: SimConfig,

    pub tour_config: TourConfig,

    /// Simulation clock, advanced once per processed tick.
    pub clock: SimClock,

    pub(crate) layout:     Arc<MuseumLayout>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) guides:     BTreeMap<GuideId, GuideController>,
    pub(crate) visitors:   BTreeMap<VisitorId, VisitorActor>,
    pub(crate) factory:    VisitorFactory,
    pub(crate) arrivals:   Option<ArrivalPlan>,

    rngs:       RngTable,
    directory:  Directory,
    timers:     TimerQueue<Address, Timer>,
    post:       PostOffice,
    /// Next `TimerId`, shared by every actor so ids never repeat.
    next_timer: u64,
    stats:      SimStats,
}

impl Museum {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config:      SimConfig,
        tour_config: TourConfig,
        layout:      Arc<MuseumLayout>,
        dispatcher:  Dispatcher,
        guides:      BTreeMap<GuideId, GuideController>,
        visitors:    BTreeMap<VisitorId, VisitorActor>,
        factory:     VisitorFactory,
        arrivals:    Option<ArrivalPlan>,
    ) -> Self {
        Self {
            clock: config.make_clock(),
            config,
            tour_config,
            layout,
            dispatcher,
            guides,
            visitors,
            factory,
            arrivals,
            rngs: RngTable::default(),
            directory: Directory::new(),
            timers: TimerQueue::new(),
            post: PostOffice::new(),
            next_timer: 0,
            stats: SimStats::default(),
        }
    }

    /// Run `on_start` for every actor, dispatcher first so it is registered
    /// before anyone looks it up.
    pub(crate) fn start(&mut self) {
        let now = self.clock.current_tick;
        self.start_actor(now, Address::Dispatcher);
        let guides: Vec<GuideId> = self.guides.keys().copied().collect();
        for g in guides {
            self.start_actor(now, Address::Guide(g));
        }
        let visitors: Vec<VisitorId> = self.visitors.keys().copied().collect();
        for v in visitors {
            self.start_actor(now, Address::Visitor(v));
        }
        info!(
            guides = self.guides.len(),
            visitors = self.visitors.len(),
            locations = self.layout.len(),
            "museum open"
        );
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        info!(tick = %self.clock.current_tick, stats = ?self.stats, "museum closed");
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// The tick the next `step` will process.
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    /// Post `msg` from outside the museum to the dispatcher.
    pub fn inject(&mut self, msg: Message) {
        let now = self.clock.current_tick;
        self.post_letter(now, Address::External, Address::Dispatcher, msg);
    }

    /// Raise an emergency at `location`.
    pub fn emergency(&mut self, kind: EmergencyKind, location: LocationId) {
        self.inject(Message::Emergency { kind, location });
    }

    /// Bring a fresh visitor in through the front door.
    pub fn add_visitor(&mut self) -> VisitorId {
        let visitor = self.factory.spawn();
        let id = visitor.id();
        self.admit(visitor);
        id
    }

    /// Admit a visitor built elsewhere.
    pub fn insert_visitor(&mut self, visitor: VisitorActor) -> SimResult<VisitorId> {
        let id = visitor.id();
        if self.visitors.contains_key(&id) {
            return Err(SimError::DuplicateVisitor(id));
        }
        self.admit(visitor);
        Ok(id)
    }

    /// Make `visitor` vanish without a goodbye, as if it became unreachable.
    pub fn remove_visitor(&mut self, visitor: VisitorId) -> SimResult<()> {
        if !self.visitors.contains_key(&visitor) {
            return Err(SimError::UnknownVisitor(visitor));
        }
        self.retire(Address::Visitor(visitor));
        Ok(())
    }

    pub fn layout(&self) -> &MuseumLayout {
        &self.layout
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn guide(&self, id: GuideId) -> Option<&GuideController> {
        self.guides.get(&id)
    }

    pub fn guides(&self) -> impl Iterator<Item = &GuideController> {
        self.guides.values()
    }

    pub fn visitor(&self, id: VisitorId) -> Option<&VisitorActor> {
        self.visitors.get(&id)
    }

    pub fn visitors(&self) -> impl Iterator<Item = &VisitorActor> {
        self.visitors.values()
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Live timers owned by `owner`.
    pub fn pending_timers(&self, owner: Address) -> usize {
        self.timers.pending_for(owner)
    }

    /// Letters in flight to `to`.
    pub fn pending_mail(&self, to: Address) -> usize {
        self.post.pending_for(to)
    }

    pub fn snapshot(&self) -> MuseumSnapshot {
        MuseumSnapshot {
            tick:       self.clock.current_tick,
            dispatcher: self.dispatcher.snapshot(),
            guides:     self.guides.values().map(GuideController::snapshot).collect(),
            visitors:   self.visitors.values().map(VisitorActor::snapshot).collect(),
        }
    }

    /// Check the structural invariants that must hold between ticks.
    pub fn validate(&self) -> SimResult<()> {
        let tick = self.clock.current_tick;
        let fail = |detail: String| Err(SimError::Invariant { tick, detail });
        let (min, max) = (self.tour_config.min_group_size, self.tour_config.max_group_size);

        // Dispatcher's view of the pool.
        let (available, busy, cooling) = self.dispatcher.pool().counts();
        if available + busy + cooling != self.dispatcher.pool().len() {
            return fail("guide pool does not add up".into());
        }
        for rec in self.dispatcher.pool().iter() {
            if (rec.availability == Availability::Busy) != rec.group.is_some() {
                return fail(format!("{} is {:?} with group {:?}", rec.id, rec.availability, rec.group));
            }
            if rec.group.is_some() && !(min..=max).contains(&rec.visitors.len()) {
                return fail(format!("{} leads {} visitors", rec.id, rec.visitors.len()));
            }
            if !self.guides.contains_key(&rec.id) {
                return fail(format!("{} is pooled but does not exist", rec.id));
            }
        }

        // Guides' own view.
        let mut rostered = BTreeSet::new();
        for guide in self.guides.values() {
            let busy = guide.phase().availability() == Availability::Busy;
            if busy != guide.group().is_some() {
                return fail(format!("{} is {} with group {:?}", guide.id(), guide.phase(), guide.group().map(|g| g.id())));
            }
            if let Some(group) = guide.group() {
                if group.size() > max {
                    return fail(format!("{} leads {} visitors", guide.id(), group.size()));
                }
                for &v in group.members() {
                    if !rostered.insert(v) {
                        return fail(format!("{v} is in more than one group"));
                    }
                }
            }
        }

        // Queue.
        let mut queued = BTreeSet::new();
        for v in self.dispatcher.queue().iter() {
            if !queued.insert(v) {
                return fail(format!("{v} is queued twice"));
            }
            if self.dispatcher.placement(v).is_some() {
                return fail(format!("{v} is both queued and placed"));
            }
        }
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let summary = self.process_tick(now, observer);
        observer.on_tick_end(&summary);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(&self.snapshot());
        }
        self.clock.advance();
        Ok(())
    }

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> TickSummary {
        let mut summary = TickSummary { tick: now, ..TickSummary::default() };

        // ── Phase 1: arrivals ─────────────────────────────────────────────
        if let Some(plan) = self.arrivals {
            let due = plan.due(now, self.stats.arrivals);
            for _ in 0..due {
                let id = self.add_visitor();
                trace!(visitor = %id, "arrived");
            }
            self.stats.arrivals += due;
            summary.arrivals = due;
        }

        // ── Phase 2: mail ─────────────────────────────────────────────────
        while let Some(letter) = self.post.pop_tick(now) {
            if self.deliver(now, letter, observer) {
                summary.delivered += 1;
            } else {
                summary.bounced += 1;
            }
        }

        // ── Phase 3: timers ───────────────────────────────────────────────
        while let Some(fired) = self.timers.pop_tick(now) {
            let timer = fired.payload;
            if let Some(effects) = self.invoke(now, fired.owner, |actor, ctx| actor.on_timer(timer, ctx)) {
                self.apply(now, fired.owner, effects);
            }
            summary.timers_fired += 1;
        }

        self.stats.delivered += summary.delivered as u64;
        self.stats.timers_fired += summary.timers_fired as u64;

        let (available, busy, cooling) = self.dispatcher.pool().counts();
        summary.waiting = self.dispatcher.queue().len();
        summary.guides_available = available;
        summary.guides_busy = busy;
        summary.guides_cooling = cooling;
        summary.visitors_present = self.visitors.len();
        summary
    }

    /// Hand `letter` to its recipient.  Returns `false` if it bounced.
    fn deliver<O: SimObserver>(&mut self, now: Tick, letter: Letter, observer: &mut O) -> bool {
        let Letter { from, to, msg } = letter;
        if !self.is_alive(to) {
            self.bounce(now, from, to, msg);
            return false;
        }
        if let (Address::Dispatcher, Message::TourCompleted {
            guide, group, group_size, stops_visited, avg_satisfaction, avg_cohesion, avg_fatigue, degraded,
        }) = (to, &msg)
        {
            observer.on_tour_completed(&TourRecord {
                tick: now,
                guide: *guide,
                group: *group,
                group_size: *group_size,
                stops_visited: *stops_visited,
                avg_satisfaction: *avg_satisfaction,
                avg_cohesion: *avg_cohesion,
                avg_fatigue: *avg_fatigue,
                degraded: *degraded,
            });
        }
        trace!(%from, %to, kind = msg.kind(), "deliver");
        if let Some(effects) = self.invoke(now, to, |actor, ctx| actor.on_message(from, msg, ctx)) {
            self.apply(now, to, effects);
        }
        true
    }

    /// Return `msg` to `from` as undeliverable, unless it already is a
    /// bounce or nobody is there to take it.
    fn bounce(&mut self, now: Tick, from: Address, to: Address, msg: Message) {
        if matches!(msg, Message::Undeliverable { .. }) || !self.is_alive(from) {
            trace!(%from, %to, kind = msg.kind(), "dropped");
            self.stats.dropped += 1;
            return;
        }
        trace!(%from, %to, kind = msg.kind(), "bounced");
        self.stats.bounced += 1;
        let returned = Message::Undeliverable { to, original: Box::new(msg) };
        self.post_letter(now, to, from, returned);
    }

    fn post_letter(&mut self, now: Tick, from: Address, to: Address, msg: Message) {
        if to == Address::External {
            self.stats.dropped += 1;
            return;
        }
        let at = now.offset(self.config.message_latency_ticks.max(1));
        self.post.post(at, Letter { from, to, msg });
    }

    fn is_alive(&self, address: Address) -> bool {
        match address {
            Address::Dispatcher => true,
            Address::Guide(g) => self.guides.contains_key(&g),
            Address::Visitor(v) => self.visitors.contains_key(&v),
            Address::External => false,
        }
    }

    // ── Actor plumbing ────────────────────────────────────────────────────

    /// Run one handler against the actor at `address` with a fresh context.
    /// Returns `None` if no such actor exists.
    fn invoke<F>(&mut self, now: Tick, address: Address, handler: F) -> Option<Vec<Effect>>
    where
        F: FnOnce(&mut dyn Actor, &mut ActorContext<'_>),
    {
        let seed = self.config.seed;
        let actor: &mut dyn Actor = match address {
            Address::Dispatcher => &mut self.dispatcher,
            Address::Guide(g) => self.guides.get_mut(&g)?,
            Address::Visitor(v) => self.visitors.get_mut(&v)?,
            Address::External => return None,
        };
        let rng = self
            .rngs
            .entry(address)
            .or_insert_with(|| ActorRng::new(seed, address.stream()));
        let mut ctx = ActorContext::new(now, address, rng, &self.directory, &mut self.next_timer);
        handler(actor, &mut ctx);
        Some(ctx.into_effects())
    }

    /// Apply one handler's effects in order.
    fn apply(&mut self, now: Tick, owner: Address, effects: Vec<Effect>) {
        let mut stop = false;
        for effect in effects {
            match effect {
                Effect::Send { to, msg } => self.post_letter(now, owner, to, msg),
                Effect::Schedule { id, delay, timer } => {
                    self.timers.push(now.offset(delay.max(1)), id, owner, timer);
                }
                Effect::Cancel(id) => {
                    self.timers.cancel(id);
                }
                Effect::Register(capability) => {
                    self.directory.register(owner, capability);
                }
                Effect::Stop => stop = true,
            }
        }
        if stop {
            self.retire(owner);
        }
    }

    fn start_actor(&mut self, now: Tick, address: Address) {
        if let Some(effects) = self.invoke(now, address, |actor, ctx| actor.on_start(ctx)) {
            self.apply(now, address, effects);
        }
    }

    fn admit(&mut self, visitor: VisitorActor) {
        let address = visitor.address();
        self.visitors.insert(visitor.id(), visitor);
        self.start_actor(self.clock.current_tick, address);
    }

    /// Take an actor out of the world.  Mail already posted to it bounces on
    /// delivery.
    fn retire(&mut self, address: Address) {
        let removed = match address {
            Address::Visitor(v) => self.visitors.remove(&v).is_some(),
            Address::Guide(g) => self.guides.remove(&g).is_some(),
            Address::Dispatcher | Address::External => false,
        };
        if !removed {
            return;
        }
        self.directory.deregister(address);
        let cancelled = self.timers.cancel_owner(address);
        self.rngs.remove(&address);
        self.stats.retired += 1;
        debug!(actor = %address, cancelled, "retired");
    }
}
