//! Per-handler view of the world.

use mt_core::{ActorRng, Tick, TimerId};

use crate::{Address, Capability, Effect, Message, Registry, Timer};

/// Everything an actor may touch while handling one message or timer.
///
/// Built by the event loop for a single handler call and consumed right after
/// with [`into_effects`][Self::into_effects].  Reads (clock, registry) are
/// immediate; writes are recorded as [`Effect`]s and applied by the loop once
/// the handler returns, so a handler always sees the world as it was when it
/// started.
///
/// # Lifetimes
///
/// The RNG and timer-id counter are borrowed mutably from the loop's tables;
/// the registry is borrowed shared.  None of them outlive the handler call.
pub struct ActorContext<'a> {
    now:        Tick,
    me:         Address,
    rng:        &'a mut ActorRng,
    registry:   &'a dyn Registry,
    next_timer: &'a mut u64,
    effects:    Vec<Effect>,
}

impl<'a> ActorContext<'a> {
    pub fn new(
        now:        Tick,
        me:         Address,
        rng:        &'a mut ActorRng,
        registry:   &'a dyn Registry,
        next_timer: &'a mut u64,
    ) -> Self {
        Self { now, me, rng, registry, next_timer, effects: Vec::new() }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    #[inline]
    pub fn me(&self) -> Address {
        self.me
    }

    /// This actor's private random stream.
    #[inline]
    pub fn rng(&mut self) -> &mut ActorRng {
        &mut *self.rng
    }

    pub fn lookup(&self, capability: Capability) -> Vec<Address> {
        self.registry.lookup(capability)
    }

    /// The lowest-addressed actor registered with `capability`.
    pub fn lookup_one(&self, capability: Capability) -> Option<Address> {
        self.registry.lookup(capability).into_iter().next()
    }

    pub fn is_registered(&self, address: Address) -> bool {
        self.registry.is_registered(address)
    }

    // ── Writes ────────────────────────────────────────────────────────────

    pub fn send(&mut self, to: Address, msg: Message) {
        self.effects.push(Effect::Send { to, msg });
    }

    /// Send a copy of `msg` to every address in `to`, in iteration order.
    pub fn broadcast<I>(&mut self, to: I, msg: &Message)
    where
        I: IntoIterator<Item = Address>,
    {
        for addr in to {
            self.send(addr, msg.clone());
        }
    }

    /// Schedule `timer` to fire back at this actor after `delay` ticks.
    ///
    /// Delays below one tick are raised to one.
    pub fn schedule(&mut self, delay: u64, timer: Timer) -> TimerId {
        let id = TimerId(*self.next_timer);
        *self.next_timer += 1;
        self.effects.push(Effect::Schedule { id, delay: delay.max(1), timer });
        id
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.effects.push(Effect::Cancel(id));
    }

    pub fn register(&mut self, capability: Capability) {
        self.effects.push(Effect::Register(capability));
    }

    /// Leave the simulation once this handler returns.
    pub fn stop(&mut self) {
        self.effects.push(Effect::Stop);
    }

    // ── Hand-off ──────────────────────────────────────────────────────────

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}
