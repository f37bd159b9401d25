//! The `Actor` trait.

use crate::{ActorContext, Address, Message, Timer};

/// A single-threaded, run-to-completion participant in the simulation.
///
/// The event loop calls exactly one handler at a time per actor, so the
/// implementor's own state needs no synchronisation.  Handlers must not
/// block: anything that takes time is a [`Timer`] scheduled through the
/// context.
///
/// Only [`on_message`][Self::on_message] is required.
pub trait Actor {
    /// Called once, the tick the actor is added to the simulation.
    fn on_start(&mut self, _ctx: &mut ActorContext<'_>) {}

    /// Called for each message addressed to this actor.
    fn on_message(&mut self, from: Address, msg: Message, ctx: &mut ActorContext<'_>);

    /// Called when a timer this actor scheduled comes due.
    fn on_timer(&mut self, _timer: Timer, _ctx: &mut ActorContext<'_>) {}
}
