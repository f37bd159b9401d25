//! Unit tests for mt-actor.

use mt_core::{ActorRng, GuideId, LocationId, Tick, TimerId, VisitorId};

use crate::{
    Actor, ActorContext, Address, Capability, Directory, Effect, Fault, Message, Registry,
    Timer,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn directory() -> Directory {
    let mut d = Directory::new();
    d.register(Address::Dispatcher, Capability::Dispatcher);
    d.register(Address::Guide(GuideId(1)), Capability::Guide);
    d.register(Address::Guide(GuideId(0)), Capability::Guide);
    d.register(Address::Visitor(VisitorId(4)), Capability::Visitor);
    d
}

/// Counts messages and re-arms a periodic timer.
#[derive(Default)]
struct Echo {
    seen:  usize,
    fired: usize,
}

impl Actor for Echo {
    fn on_start(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.register(Capability::Visitor);
        ctx.schedule(5, Timer::VisitorTick);
    }

    fn on_message(&mut self, from: Address, msg: Message, ctx: &mut ActorContext<'_>) {
        self.seen += 1;
        ctx.send(from, msg);
    }

    fn on_timer(&mut self, timer: Timer, ctx: &mut ActorContext<'_>) {
        self.fired += 1;
        ctx.schedule(5, timer);
    }
}

// ── Address ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod address {
    use super::*;

    #[test]
    fn streams_are_distinct_across_kinds() {
        let a = Address::Guide(GuideId(7)).stream();
        let b = Address::Visitor(VisitorId(7)).stream();
        assert_ne!(a, b);
        assert_ne!(Address::Dispatcher.stream(), Address::External.stream());
    }

    #[test]
    fn accessors() {
        assert_eq!(Address::Guide(GuideId(2)).as_guide(), Some(GuideId(2)));
        assert_eq!(Address::Guide(GuideId(2)).as_visitor(), None);
        assert_eq!(Address::Visitor(VisitorId(3)).as_visitor(), Some(VisitorId(3)));
    }

    #[test]
    fn display() {
        assert_eq!(Address::Guide(GuideId(2)).to_string(), "GuideId(2)");
        assert_eq!(Address::Dispatcher.to_string(), "Dispatcher");
    }
}

// ── Directory ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod directory {
    use super::*;

    #[test]
    fn lookup_is_sorted_and_filtered() {
        let d = directory();
        assert_eq!(
            d.lookup(Capability::Guide),
            vec![Address::Guide(GuideId(0)), Address::Guide(GuideId(1))]
        );
        assert_eq!(d.lookup(Capability::Dispatcher), vec![Address::Dispatcher]);
    }

    #[test]
    fn register_twice_replaces() {
        let mut d = Directory::new();
        assert!(d.register(Address::External, Capability::Guide));
        assert!(!d.register(Address::External, Capability::Visitor));
        assert_eq!(d.capability_of(Address::External), Some(Capability::Visitor));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn deregister_removes_from_lookup() {
        let mut d = directory();
        assert!(d.deregister(Address::Guide(GuideId(0))));
        assert!(!d.is_registered(Address::Guide(GuideId(0))));
        assert_eq!(d.lookup(Capability::Guide).len(), 1);
        assert!(!d.deregister(Address::Guide(GuideId(0))));
    }
}

// ── ActorContext ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod context {
    use super::*;

    #[test]
    fn records_effects_in_order() {
        let d = directory();
        let mut rng = ActorRng::new(1, 0);
        let mut next = 10;
        let mut ctx = ActorContext::new(Tick(3), Address::Dispatcher, &mut rng, &d, &mut next);

        ctx.send(Address::Guide(GuideId(0)), Message::GuideAvailable);
        let id = ctx.schedule(0, Timer::Formation);
        ctx.cancel(id);
        ctx.stop();

        assert_eq!(id, TimerId(10));
        let effects = ctx.into_effects();
        assert_eq!(
            effects,
            vec![
                Effect::Send { to: Address::Guide(GuideId(0)), msg: Message::GuideAvailable },
                Effect::Schedule { id: TimerId(10), delay: 1, timer: Timer::Formation },
                Effect::Cancel(TimerId(10)),
                Effect::Stop,
            ]
        );
        assert_eq!(next, 11);
    }

    #[test]
    fn broadcast_clones_per_recipient() {
        let d = directory();
        let mut rng = ActorRng::new(1, 0);
        let mut next = 0;
        let mut ctx = ActorContext::new(Tick(0), Address::Dispatcher, &mut rng, &d, &mut next);
        let guides = ctx.lookup(Capability::Guide);
        ctx.broadcast(guides, &Message::AdvisoryCleared { location: LocationId(2) });
        assert_eq!(ctx.effects().len(), 2);
    }

    #[test]
    fn lookup_one_picks_lowest() {
        let d = directory();
        let mut rng = ActorRng::new(1, 0);
        let mut next = 0;
        let ctx = ActorContext::new(Tick(0), Address::External, &mut rng, &d, &mut next);
        assert_eq!(ctx.lookup_one(Capability::Guide), Some(Address::Guide(GuideId(0))));
        assert!(ctx.is_registered(Address::Visitor(VisitorId(4))));
        assert!(!ctx.is_registered(Address::Visitor(VisitorId(5))));
    }
}

// ── Actor ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod actor {
    use super::*;

    #[test]
    fn handlers_only_record_effects() {
        let d = Directory::new();
        let mut rng = ActorRng::new(9, 9);
        let mut next = 0;
        let mut echo = Echo::default();

        let mut ctx = ActorContext::new(Tick(0), Address::Visitor(VisitorId(0)), &mut rng, &d, &mut next);
        echo.on_start(&mut ctx);
        echo.on_message(Address::Dispatcher, Message::RegistrationAck, &mut ctx);
        echo.on_timer(Timer::VisitorTick, &mut ctx);
        let effects = ctx.into_effects();

        assert_eq!(echo.seen, 1);
        assert_eq!(echo.fired, 1);
        assert_eq!(effects.len(), 4);
        assert!(matches!(effects[0], Effect::Register(Capability::Visitor)));
        assert!(d.is_empty(), "registration is deferred to the event loop");
    }
}

// ── Message / Fault ───────────────────────────────────────────────────────────

#[cfg(test)]
mod message {
    use super::*;

    #[test]
    fn kind_names_variant() {
        assert_eq!(Message::RegisterVisitor.kind(), "RegisterVisitor");
        let bounced = Message::Undeliverable {
            to:       Address::Visitor(VisitorId(1)),
            original: Box::new(Message::InviteQuestions),
        };
        assert_eq!(bounced.kind(), "Undeliverable");
    }

    #[test]
    fn fault_messages_are_readable() {
        let f = Fault::ConvergenceTimeout { ready: 2, expected: 5, attempts: 3 };
        assert_eq!(f.to_string(), "only 2/5 members ready after 3 attempt(s)");
        let f = Fault::LookupFailure { capability: Capability::Dispatcher, attempts: 3 };
        assert_eq!(f.to_string(), "no dispatcher reachable after 3 attempt(s)");
    }
}
