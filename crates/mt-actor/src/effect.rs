//! Effects: what a handler asks the event loop to do once it returns.

use mt_core::TimerId;

use crate::{Address, Capability, Message, Timer};

/// One side effect recorded by an [`ActorContext`][crate::ActorContext].
///
/// Effects are applied in the order they were recorded, immediately after the
/// handler that produced them returns.
#[derive(Clone, PartialEq, Debug)]
pub enum Effect {
    /// Post `msg` to `to`, delivered after the configured latency.
    Send { to: Address, msg: Message },

    /// Fire `timer` back at the sender `delay` ticks from now (`delay >= 1`).
    Schedule { id: TimerId, delay: u64, timer: Timer },

    /// Cancel a pending timer.  Unknown or already-fired ids are ignored.
    Cancel(TimerId),

    /// Register the sender under `Capability`.
    Register(Capability),

    /// Remove the sender: deregister it, cancel its timers, bounce its mail.
    Stop,
}
