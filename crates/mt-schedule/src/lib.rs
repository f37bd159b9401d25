//! `mt-schedule` — timers, museum layout, and itineraries.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`timer_queue`] | `TimerQueue` (`BTreeMap<Tick, Vec<entry>>` + cancellation) |
//! | [`layout`]      | `Location`, `LocationKind`, `MuseumLayout`                |
//! | [`itinerary`]   | `Itinerary`, `NextStop` — ordered stops with rerouting    |
//! | [`loader`]      | `load_layout_csv`, `load_layout_reader`                   |
//! | [`error`]       | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Timer model (summary)
//!
//! Every delayed or periodic behavior in the simulator is a timer entry:
//!
//! ```text
//! schedule(delay) → push(now + delay, id, owner, payload)
//! each tick       → drain_tick(now) yields live entries in scheduling order
//! teardown        → cancel_owner(owner) drops everything the actor left behind
//! ```

pub mod error;
pub mod itinerary;
pub mod layout;
pub mod loader;
pub mod timer_queue;


pub use error::{ScheduleError, ScheduleResult};
pub use itinerary::{Itinerary, NextStop};
pub use layout::{Location, LocationKind, MuseumLayout};
pub use loader::{load_layout_csv, load_layout_reader};
pub use timer_queue::{FiredTimer, TimerQueue};
