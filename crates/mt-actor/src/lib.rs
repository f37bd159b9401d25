//! `mt-actor` — the contract every simulated actor is written against.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`address`]  | `Address`, `Capability`                                         |
//! | [`message`]  | `Message` — the closed union of everything actors say           |
//! | [`timer`]    | `Timer` — every scheduled callback an actor can ask for         |
//! | [`registry`] | `Registry` trait, in-memory `Directory`                         |
//! | [`effect`]   | `Effect` — what a handler asks the event loop to do             |
//! | [`context`]  | `ActorContext<'a>` — per-handler view of the world              |
//! | [`actor`]    | `Actor` trait                                                   |
//! | [`fault`]    | `Fault` — recoverable failures, logged and never propagated     |
//!
//! # Design notes
//!
//! Handlers run in two phases, exactly like a tick of the event loop:
//!
//! 1. **Intent phase**: the loop calls `on_message` / `on_timer` with an
//!    `ActorContext`.  The handler mutates only its own actor and records
//!    [`Effect`]s (`send`, `schedule`, `cancel`, `register`, `stop`).
//!
//! 2. **Apply phase**: as soon as the handler returns, the loop applies the
//!    effects in order: mail is posted, timers are queued, registrations
//!    land in the directory.
//!
//! An actor therefore never holds a reference to another actor, to the timer
//! queue or to the mailbox.  Everything crossing an actor boundary is a
//! [`Message`].

pub mod actor;
pub mod address;
pub mod context;
pub mod effect;
pub mod fault;
pub mod message;
pub mod registry;
pub mod timer;

#[cfg(test)]
mod tests;

pub use actor::Actor;
pub use address::{Address, Capability};
pub use context::ActorContext;
pub use effect::Effect;
pub use fault::Fault;
pub use message::{AdvisoryLevel, EmergencyKind, Message, RefusalReason};
pub use registry::{Directory, Registry};
pub use timer::Timer;
