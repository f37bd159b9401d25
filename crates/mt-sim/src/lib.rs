//! `mt-sim` — the discrete-event loop that runs a museum.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Arrivals — the ArrivalPlan spawns new visitors; each runs on_start.
//!   ② Mail     — letters due this tick are delivered in posting order.
//!                Mail for an actor that is gone is bounced to the sender
//!                as Message::Undeliverable (never twice).
//!   ③ Timers   — timers due this tick fire in scheduling order; one
//!                cancelled by an earlier handler this tick does not fire.
//! ```
//!
//! Each handler's effects are applied as soon as it returns: letters are
//! posted `message_latency_ticks` ahead, timers queued, registrations made.
//! A `Stop` effect retires the actor: it is deregistered, its timers are
//! cancelled, and mail still addressed to it bounces.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | `run_replications` runs seeds on Rayon's thread pool.   |
//! | `fx-hash`  | FxHash for the per-actor RNG table.                     |
//! | `serde`    | Serialize summaries, records and snapshots.             |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mt_core::{SimConfig, TourConfig};
//! use mt_sim::{ArrivalPlan, MuseumBuilder, NoopObserver};
//!
//! let mut museum = MuseumBuilder::new(SimConfig::default(), TourConfig::default())
//!     .random_guides(3)
//!     .visitors(12)
//!     .arrivals(ArrivalPlan::every(60, 4))
//!     .build()?;
//! museum.run(&mut NoopObserver)?;
//! ```

pub mod arrivals;
pub mod batch;
pub mod builder;
pub mod error;
pub mod museum;
pub mod observer;
pub mod post;

#[cfg(test)]
mod tests;

pub use arrivals::ArrivalPlan;
pub use batch::{ReplicationSummary, run_replications};
pub use builder::MuseumBuilder;
pub use error::{SimError, SimResult};
pub use museum::{Museum, MuseumSnapshot, SimStats};
pub use observer::{NoopObserver, SimObserver, TickSummary, TourLog, TourRecord};
pub use post::{Letter, PostOffice};
