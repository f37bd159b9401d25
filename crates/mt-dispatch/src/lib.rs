//! `mt-dispatch` — the museum's tour desk.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`queue`]       | `WaitQueue` — FIFO with head insertion and no duplicates     |
//! | [`pool`]        | `GuidePool`, `GuideRecord`, `ScoreWeights` — who leads next  |
//! | [`occupancy`]   | `OccupancyBoard` — last-write occupancy, advisory levels     |
//! | [`emergency`]   | `EmergencyBook` — closed locations and their reopen timers   |
//! | [`dispatcher`]  | `Dispatcher` actor, `DispatcherSnapshot`, `DispatchStats`    |
//!
//! The dispatcher is the single writer of shared museum state: guide
//! availability, location occupancy and closures.  Guides learn about it only
//! through messages.

pub mod dispatcher;
pub mod emergency;
pub mod occupancy;
pub mod pool;
pub mod queue;


pub use dispatcher::{DispatchStats, Dispatcher, DispatcherSnapshot};
pub use emergency::{Closure, EmergencyBook};
pub use occupancy::{AdvisoryChange, OccupancyBoard};
pub use pool::{GuidePool, GuideRecord, ScoreWeights};
pub use queue::WaitQueue;
