//! `mt-guide` — one tour guide.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                       |
//! |----------------|----------------------------------------------------------------|
//! | [`profile`]    | `GuideProfile` — specialization and skills                     |
//! | [`state`]      | `TourPhase`, `PauseReason`                                     |
//! | [`narration`]  | Narration and answer text, adapted to the group                |
//! | [`controller`] | `GuideController` — the actor, `GuideSnapshot`                 |
//!
//! # Tour lifecycle
//!
//! ```text
//! Idle ──AssignVisitors──▶ Forming ──all ready──▶ Moving ──all ready──▶ Presenting
//!   ▲                                               ▲   │                    │
//!   │                                               │   └─ closed stop ──────┤
//!   │                                               └──── PresentationDone ◀─┘
//!   │                                        Pausing{Break, CohesionHold, AwaitingReopen}
//!   │
//! CoolingDown ◀── Completing ◀── no stops left / roster below viable size
//!   └──GuideAvailable──▶ Idle
//! ```

pub mod controller;
pub mod narration;
pub mod profile;
pub mod state;

#[cfg(test)]
mod tests;

pub use controller::{GuideController, GuideSnapshot};
pub use narration::{answer, narrate};
pub use profile::GuideProfile;
pub use state::{PauseReason, TourPhase};
