//! `mt-group` — what a guide knows about the group it is leading.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`aggregator`] | `GroupDynamics` — per-visitor metrics rolled up into averages |
//! | [`formation`]  | `Formation` — Line / Cluster / Circle, tighten and loosen     |
//! | [`group`]      | `TourGroup` — the ephemeral roster a guide is leading         |
//!
//! Nothing here sends messages.  The guide controller owns one
//! `GroupDynamics` and at most one `TourGroup`, feeds them from inbound
//! status updates and reads them back when deciding what to do next.

pub mod aggregator;
pub mod formation;
pub mod group;


pub use aggregator::{GroupDynamics, MemberMetrics};
pub use formation::Formation;
pub use group::TourGroup;
