//! `mt-visitor` — one museum guest.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`personality`] | `Personality` traits, `Origin`, `VisitorProfile`             |
//! | [`model`]       | `VisitorModel` — mood metrics and reactions, no messaging    |
//! | [`actor`]       | `VisitorActor` — wires the model to the message protocol     |
//! | [`population`]  | `VisitorFactory` — seeded profiles and sequential ids        |
//!
//! The model is deliberately separate from the actor: every reaction is a
//! plain method taking the stimulus (and an RNG where chance is involved) and
//! returning what the visitor wants to say back, so it can be unit tested
//! without an event loop.

pub mod actor;
pub mod model;
pub mod personality;
pub mod population;


pub use actor::{Membership, VisitorActor, VisitorSnapshot, VisitorTuning};
pub use model::{SocialEvent, TourOutcome, VisitorModel};
pub use personality::{Origin, Personality, VisitorProfile};
pub use population::VisitorFactory;
