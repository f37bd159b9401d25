//! `mt-core` — foundational types for the museum-tours simulator.
//!
//! Every other `mt-*` crate depends on this one.  It has no `mt-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `VisitorId`, `GuideId`, `GroupId`, `LocationId`, `TimerId` |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                           |
//! | [`config`]      | `TourConfig` — every coordination constant in one place   |
//! | [`theme`]       | `Theme` — exhibit themes, preferences, specializations    |
//! | [`availability`]| `Availability` — a guide's standing in the pool           |
//! | [`metric`]      | `Metric`, unit-interval helpers                           |
//! | [`rng`]         | `ActorRng` (per-actor), `SimRng` (global)                 |
//! | [`error`]       | `MtError`, `MtResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod availability;
pub mod config;
pub mod error;
pub mod ids;
pub mod metric;
pub mod rng;
pub mod theme;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use availability::Availability;
pub use config::TourConfig;
pub use error::{MtError, MtResult};
pub use ids::{GroupId, GuideId, LocationId, TimerId, VisitorId};
pub use metric::{Metric, ema, unit};
pub use rng::{ActorRng, SimRng};
pub use theme::Theme;
pub use time::{SimClock, SimConfig, Tick};
