//! `Dispatcher` — the museum's single tour desk.
//!
//! # Timers
//!
//! | Timer              | Armed by                  | Effect on fire                          |
//! |--------------------|---------------------------|-----------------------------------------|
//! | `Formation`        | start (periodic)          | match waiting visitors with guides      |
//! | `CongestionScan`   | start (periodic)          | clear advisories that fell below warn   |
//! | `WorkloadScan`     | start (periodic)          | balancing alert on uneven tour counts   |
//! | `Cooldown(g)`      | tour completed / refused  | guide back to `Available`               |
//! | `EmergencyResolve` | emergency received        | reopen the location                     |

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use mt_actor::{Actor, ActorContext, AdvisoryLevel, Address, Capability, EmergencyKind, Fault, Message, Timer};
use mt_core::{GroupId, GuideId, LocationId, Theme, TourConfig, VisitorId};
use mt_schedule::MuseumLayout;

use crate::{AdvisoryChange, Closure, EmergencyBook, GuidePool, GuideRecord, OccupancyBoard, ScoreWeights, WaitQueue};

/// Running totals kept by the dispatcher.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchStats {
    pub groups_formed:     u64,
    pub visitors_assigned: u64,
    pub tours_completed:   u64,
    pub degraded_tours:    u64,
    pub refusals:          u64,
    pub requeued:          u64,
    pub departures:        u64,
    pub advisories:        u64,
    pub emergencies:       u64,
    pub balancing_alerts:  u64,
    /// Status reports that left a location over capacity.
    pub capacity_breaches: u64,
}

/// Read-only view of the dispatcher.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatcherSnapshot {
    pub queue:      Vec<VisitorId>,
    pub guides:     Vec<GuideRecord>,
    pub occupancy:  BTreeMap<LocationId, usize>,
    pub advisories: BTreeMap<LocationId, AdvisoryLevel>,
    pub closed:     Vec<LocationId>,
    /// Visitor → guide for every visitor handed to a guide and not yet back.
    pub placed:     BTreeMap<VisitorId, GuideId>,
    pub stats:      DispatchStats,
}

pub struct Dispatcher {
    config:      TourConfig,
    layout:      Arc<MuseumLayout>,
    queue:       WaitQueue,
    pool:        GuidePool,
    board:       OccupancyBoard,
    emergencies: EmergencyBook,
    placed:      BTreeMap<VisitorId, GuideId>,
    next_group:  u32,
    stats:       DispatchStats,
}

impl Dispatcher {
    pub fn new(config: TourConfig, layout: Arc<MuseumLayout>) -> Self {
        let weights = ScoreWeights::from(&config);
        Self {
            config,
            layout,
            queue: WaitQueue::new(),
            pool: GuidePool::new(weights),
            board: OccupancyBoard::new(),
            emergencies: EmergencyBook::new(),
            placed: BTreeMap::new(),
            next_group: 0,
            stats: DispatchStats::default(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn queue(&self) -> &WaitQueue {
        &self.queue
    }

    pub fn pool(&self) -> &GuidePool {
        &self.pool
    }

    pub fn board(&self) -> &OccupancyBoard {
        &self.board
    }

    pub fn emergencies(&self) -> &EmergencyBook {
        &self.emergencies
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn placement(&self, visitor: VisitorId) -> Option<GuideId> {
        self.placed.get(&visitor).copied()
    }

    pub fn snapshot(&self) -> DispatcherSnapshot {
        DispatcherSnapshot {
            queue:      self.queue.iter().collect(),
            guides:     self.pool.iter().cloned().collect(),
            occupancy:  self.board.by_location(),
            advisories: self.board.advisories().clone(),
            closed:     self.emergencies.closed().collect(),
            placed:     self.placed.clone(),
            stats:      self.stats,
        }
    }

    fn mismatch(&self, from: Address, msg: &Message) {
        Fault::ProtocolMismatch { from, message: msg.kind(), phase: "dispatching" }
            .report(Address::Dispatcher);
    }

    fn guides(ctx: &ActorContext<'_>) -> Vec<Address> {
        ctx.lookup(Capability::Guide)
    }

    // ── Registration ──────────────────────────────────────────────────────

    fn on_register_guide(&mut self, guide: GuideId, specialization: Theme, ctx: &mut ActorContext<'_>) {
        if self.pool.register(guide, specialization) {
            info!(%guide, %specialization, "guide joined the pool");
        } else {
            debug!(%guide, "guide re-registered");
        }
        ctx.send(Address::Guide(guide), Message::RegistrationAck);
        // Catch the guide up on what is already in force.
        for (location, closure) in self.emergencies.iter() {
            ctx.send(Address::Guide(guide), Message::Emergency { kind: closure.kind, location });
        }
        for (&location, &level) in self.board.advisories() {
            ctx.send(Address::Guide(guide), Message::Advisory { location, level });
        }
    }

    fn on_register_visitor(&mut self, visitor: VisitorId, ctx: &mut ActorContext<'_>) {
        self.placed.remove(&visitor);
        if self.queue.push_back(visitor) {
            trace!(%visitor, waiting = self.queue.len(), "visitor queued");
        }
        ctx.send(Address::Visitor(visitor), Message::RegistrationAck);
    }

    fn on_depart(&mut self, visitor: VisitorId) {
        self.queue.remove(visitor);
        self.placed.remove(&visitor);
        self.stats.departures += 1;
        trace!(%visitor, "visitor left the museum");
    }

    // ── Group formation ───────────────────────────────────────────────────

    fn form_groups(&mut self, ctx: &mut ActorContext<'_>) {
        let mut skipped = BTreeSet::new();
        while self.queue.len() >= self.config.min_group_size {
            let Some(guide) = self.pool.best_available(|g| !skipped.contains(&g)) else {
                break;
            };
            if !ctx.is_registered(Address::Guide(guide)) {
                skipped.insert(guide);
                if self.pool.note_failure(guide, self.config.lookup_retry_limit) {
                    Fault::Unreachable { peer: Address::Guide(guide), detail: "dropped from the pool" }
                        .report(Address::Dispatcher);
                }
                continue;
            }
            let visitors = self.queue.pop_front_n(self.config.max_group_size);
            let group = GroupId(self.next_group);
            self.next_group += 1;

            for &v in &visitors {
                self.placed.insert(v, guide);
                ctx.send(Address::Visitor(v), Message::Assigned { guide, group });
            }
            self.stats.groups_formed += 1;
            self.stats.visitors_assigned += visitors.len() as u64;
            info!(%guide, %group, size = visitors.len(), waiting = self.queue.len(), "group formed");
            ctx.send(
                Address::Guide(guide),
                Message::AssignVisitors { group, guide, visitors: visitors.clone() },
            );
            self.pool.assign(guide, group, visitors);
        }
    }

    /// Put `visitors` back at the head of the queue and tell them they are
    /// waiting again.  Visitors no longer placed with `guide` are left alone.
    fn requeue(&mut self, guide: GuideId, visitors: &[VisitorId], ctx: &mut ActorContext<'_>) {
        let back: Vec<VisitorId> = visitors
            .iter()
            .copied()
            .filter(|v| self.placed.get(v) == Some(&guide))
            .collect();
        for v in &back {
            self.placed.remove(v);
        }
        let inserted = self.queue.push_front_many(&back);
        self.stats.requeued += inserted as u64;
        for &v in &back {
            ctx.send(Address::Visitor(v), Message::RegistrationAck);
        }
    }

    fn start_cooldown(&mut self, guide: GuideId, ctx: &mut ActorContext<'_>) {
        let id = ctx.schedule(self.config.cooldown_ticks, Timer::Cooldown(guide));
        let old = self.pool.get_mut(guide).and_then(|rec| rec.cooldown_timer.replace(id));
        if let Some(old) = old {
            ctx.cancel(old);
        }
    }

    fn on_refused(&mut self, guide: GuideId, group: GroupId, visitors: &[VisitorId], ctx: &mut ActorContext<'_>) {
        let holds = self.pool.get(guide).is_some_and(|r| r.group == Some(group));
        if !holds {
            debug!(%guide, %group, "stale refusal");
            return;
        }
        Fault::Unavailable { resource: guide.to_string(), detail: "assignment refused" }
            .report(Address::Dispatcher);
        self.stats.refusals += 1;
        self.pool.cool_down(guide);
        self.requeue(guide, visitors, ctx);
        self.start_cooldown(guide, ctx);
    }

    // ── Tour lifecycle ────────────────────────────────────────────────────

    fn on_tour_completed(
        &mut self,
        guide:        GuideId,
        group:        GroupId,
        satisfaction: f64,
        fatigue:      f64,
        degraded:     bool,
        ctx:          &mut ActorContext<'_>,
    ) {
        let current = self.pool.get(guide).is_some_and(|r| r.group == Some(group));
        if !current {
            debug!(%guide, %group, "duplicate or stale completion");
            return;
        }
        let roster = self.pool.complete(guide, satisfaction, fatigue);
        for v in roster {
            if self.placed.get(&v) == Some(&guide) {
                self.placed.remove(&v);
            }
        }
        self.board.clear(guide);
        self.stats.tours_completed += 1;
        if degraded {
            self.stats.degraded_tours += 1;
        }
        info!(%guide, %group, satisfaction, degraded, "tour completed");
        self.start_cooldown(guide, ctx);
    }

    fn on_cooldown(&mut self, guide: GuideId, ctx: &mut ActorContext<'_>) {
        if self.pool.release(guide) {
            debug!(%guide, "cool-down over");
            ctx.send(Address::Guide(guide), Message::GuideAvailable);
        }
    }

    // ── Congestion ────────────────────────────────────────────────────────

    fn on_status_report(&mut self, guide: GuideId, location: LocationId, group_size: usize, ctx: &mut ActorContext<'_>) {
        let Some(capacity) = self.layout.get(location).map(|l| l.capacity) else {
            Fault::Unavailable { resource: location.to_string(), detail: "status report for unknown location" }
                .report(Address::Dispatcher);
            return;
        };
        self.board.report(guide, location, group_size);
        let occupancy = self.board.occupancy(location);
        if occupancy > capacity {
            Fault::CapacityExceeded { location, occupancy, capacity }.report(Address::Dispatcher);
            self.stats.capacity_breaches += 1;
        }
        let change = self.board.escalate(
            location,
            capacity,
            self.config.congestion_warn_ratio,
            self.config.congestion_critical_ratio,
        );
        let Some(AdvisoryChange::Raised(level)) = change else {
            // Advisory already out; a guide walking into a critical room is
            // still told to move on.
            if self.board.advisory(location) == Some(AdvisoryLevel::Critical) {
                ctx.send(Address::Guide(guide), Message::RerouteSuggested { location });
            }
            return;
        };
        info!(%location, occupancy, capacity, ?level, "advisory raised");
        self.stats.advisories += 1;

        let present: Vec<Address> = self.board.guides_at(location).into_iter().map(Address::Guide).collect();
        let elsewhere: Vec<Address> = Self::guides(ctx).into_iter().filter(|a| !present.contains(a)).collect();
        ctx.broadcast(elsewhere, &Message::Advisory { location, level });
        if level == AdvisoryLevel::Critical {
            ctx.broadcast(present, &Message::RerouteSuggested { location });
        }
    }

    fn on_congestion_scan(&mut self, ctx: &mut ActorContext<'_>) {
        let layout = Arc::clone(&self.layout);
        let cleared = self.board.scan(
            self.config.congestion_warn_ratio,
            self.config.congestion_critical_ratio,
            |loc| layout.get(loc).map(|l| l.capacity),
        );
        if cleared.is_empty() {
            return;
        }
        let guides = Self::guides(ctx);
        for location in cleared {
            debug!(%location, "advisory cleared");
            ctx.broadcast(guides.iter().copied(), &Message::AdvisoryCleared { location });
        }
    }

    fn on_workload_scan(&mut self) {
        let spread = self.pool.workload_spread();
        let (available, busy, cooling) = self.pool.counts();
        debug!(available, busy, cooling, waiting = self.queue.len(), spread, "pool status");
        if spread > self.config.workload_spread_threshold {
            warn!(spread, threshold = self.config.workload_spread_threshold, "guide workload imbalance");
            self.stats.balancing_alerts += 1;
        }
    }

    // ── Emergencies ───────────────────────────────────────────────────────

    fn on_emergency(&mut self, kind: EmergencyKind, location: LocationId, ctx: &mut ActorContext<'_>) {
        if self.layout.get(location).is_none() {
            Fault::Unavailable { resource: location.to_string(), detail: "emergency at unknown location" }
                .report(Address::Dispatcher);
            return;
        }
        let delay = ctx.rng().gen_range(
            self.config.emergency_resolve_min_ticks..=self.config.emergency_resolve_max_ticks,
        );
        let timer = ctx.schedule(delay, Timer::EmergencyResolve(location));
        let closure = Closure { kind, since: ctx.now(), timer };
        if let Some(old) = self.emergencies.close(location, closure) {
            ctx.cancel(old);
        }
        self.stats.emergencies += 1;
        warn!(%kind, %location, resolve_in = delay, "location closed");
        let guides = Self::guides(ctx);
        ctx.broadcast(guides, &Message::Emergency { kind, location });
    }

    fn on_emergency_resolve(&mut self, location: LocationId, ctx: &mut ActorContext<'_>) {
        if let Some(closure) = self.emergencies.reopen(location) {
            info!(%location, kind = %closure.kind, "location reopened");
            let guides = Self::guides(ctx);
            ctx.broadcast(guides, &Message::EmergencyResolved { location });
        }
    }

    // ── Bounced mail ──────────────────────────────────────────────────────

    fn on_undeliverable(&mut self, to: Address, original: Message, ctx: &mut ActorContext<'_>) {
        match (to, original) {
            (Address::Guide(guide), Message::AssignVisitors { group, visitors, .. }) => {
                Fault::Unreachable { peer: to, detail: "assignment bounced" }.report(Address::Dispatcher);
                let holds = self.pool.get(guide).is_some_and(|r| r.group == Some(group));
                if holds {
                    self.pool.cool_down(guide);
                    self.start_cooldown(guide, ctx);
                }
                self.requeue(guide, &visitors, ctx);
                self.pool.note_failure(guide, self.config.lookup_retry_limit);
            }
            (Address::Guide(guide), original) => {
                Fault::Unreachable { peer: to, detail: original.kind() }.report(Address::Dispatcher);
                self.pool.note_failure(guide, self.config.lookup_retry_limit);
            }
            (Address::Visitor(visitor), _) => {
                trace!(%visitor, "visitor gone");
                self.queue.remove(visitor);
                self.placed.remove(&visitor);
            }
            (peer, original) => {
                Fault::Unreachable { peer, detail: original.kind() }.report(Address::Dispatcher);
            }
        }
    }
}

impl Actor for Dispatcher {
    fn on_start(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.register(Capability::Dispatcher);
        ctx.schedule(self.config.formation_interval_ticks, Timer::Formation);
        ctx.schedule(self.config.congestion_interval_ticks, Timer::CongestionScan);
        ctx.schedule(self.config.workload_interval_ticks, Timer::WorkloadScan);
    }

    fn on_message(&mut self, from: Address, msg: Message, ctx: &mut ActorContext<'_>) {
        match (from, msg) {
            (Address::Guide(g), Message::RegisterGuide { specialization }) => {
                self.on_register_guide(g, specialization, ctx);
            }
            (Address::Visitor(v), Message::RegisterVisitor) => self.on_register_visitor(v, ctx),
            (_, Message::Depart { visitor }) => self.on_depart(visitor),

            (Address::Guide(g), Message::AssignmentRefused { group, visitors, reason }) => {
                debug!(guide = %g, ?reason, "refusal");
                self.on_refused(g, group, &visitors, ctx);
            }
            (_, Message::StatusReport { guide, location, group_size, .. }) => {
                self.on_status_report(guide, location, group_size, ctx);
            }
            (_, Message::TourCompleted { guide, group, avg_satisfaction, avg_fatigue, degraded, .. }) => {
                self.on_tour_completed(guide, group, avg_satisfaction, avg_fatigue, degraded, ctx);
            }

            (_, Message::Emergency { kind, location }) => self.on_emergency(kind, location, ctx),
            (_, Message::Undeliverable { to, original }) => self.on_undeliverable(to, *original, ctx),

            (from, other) => self.mismatch(from, &other),
        }
    }

    fn on_timer(&mut self, timer: Timer, ctx: &mut ActorContext<'_>) {
        match timer {
            Timer::Formation => {
                self.form_groups(ctx);
                ctx.schedule(self.config.formation_interval_ticks, Timer::Formation);
            }
            Timer::CongestionScan => {
                self.on_congestion_scan(ctx);
                ctx.schedule(self.config.congestion_interval_ticks, Timer::CongestionScan);
            }
            Timer::WorkloadScan => {
                self.on_workload_scan();
                ctx.schedule(self.config.workload_interval_ticks, Timer::WorkloadScan);
            }
            Timer::Cooldown(guide) => self.on_cooldown(guide, ctx),
            Timer::EmergencyResolve(location) => self.on_emergency_resolve(location, ctx),
            other => debug!(?other, "ignoring foreign timer"),
        }
    }
}
