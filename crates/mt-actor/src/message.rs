//! The closed set of messages actors exchange.
//!
//! Every payload is a typed variant; there is no string protocol to parse
//! and so no malformed-message case beyond "a valid message that arrived in
//! the wrong phase", which receivers log as [`Fault::ProtocolMismatch`].
//!
//! [`Fault::ProtocolMismatch`]: crate::Fault::ProtocolMismatch

use std::fmt;

use mt_core::{GroupId, GuideId, LocationId, Theme, VisitorId};
use mt_group::Formation;

use crate::Address;

/// Why a guide turned an assignment down.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefusalReason {
    /// The guide is not idle.
    Busy,
    /// The roster is outside the allowed group size.
    GroupSize,
}

/// How badly a location is congested.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdvisoryLevel {
    /// Above the warn ratio: avoid if possible.
    Congested,
    /// Above the critical ratio: the guides there are asked to move on.
    Critical,
}

/// What closed a location.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmergencyKind {
    Maintenance,
    Medical,
    Security,
}

impl fmt::Display for EmergencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmergencyKind::Maintenance => "MAINTENANCE",
            EmergencyKind::Medical     => "MEDICAL",
            EmergencyKind::Security    => "SECURITY",
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    // ── Registration ──────────────────────────────────────────────────────
    /// Guide → Dispatcher: add me to the pool.
    RegisterGuide { specialization: Theme },
    /// Visitor → Dispatcher: put me in the wait queue.
    RegisterVisitor,
    /// Dispatcher → Visitor or Guide: you are queued / pooled.
    RegistrationAck,

    // ── Assignment ────────────────────────────────────────────────────────
    /// Dispatcher → Guide: lead these visitors.
    AssignVisitors {
        group:    GroupId,
        guide:    GuideId,
        visitors: Vec<VisitorId>,
    },
    /// Dispatcher → Visitor: you have been placed with `guide`.
    Assigned { guide: GuideId, group: GroupId },
    /// Guide → Dispatcher: assignment declined; the visitors go back in line.
    AssignmentRefused {
        group:    GroupId,
        visitors: Vec<VisitorId>,
        reason:   RefusalReason,
    },
    /// Guide → Visitor: first contact after accepting.
    Welcome { group: GroupId, specialization: Theme },

    // ── Touring ───────────────────────────────────────────────────────────
    /// Guide → group: walk to `destination`.
    Move { destination: LocationId },
    /// Visitor → Guide: arrived at `location` and ready.
    VisitorReady { visitor: VisitorId, location: LocationId },
    /// Guide → group: commentary for the current stop.
    Narration {
        location: LocationId,
        theme:    Theme,
        text:     String,
    },
    /// Visitor → Guide.
    Question { visitor: VisitorId, text: String },
    /// Guide → group: the reply goes to everyone, `asker` included.
    Answer {
        asker:   VisitorId,
        text:    String,
        quality: f64,
    },
    /// Guide → group: questions welcome.
    InviteQuestions,
    /// Guide → group: shall we rest for `duration` ticks?
    BreakProposal { duration: u64 },
    BreakResponse { visitor: VisitorId, accept: bool },
    /// Guide → group: change formation.
    Regroup { formation: Formation },
    /// Visitor → Guide: current mood.
    StatusUpdate {
        visitor:      VisitorId,
        satisfaction: f64,
        fatigue:      f64,
        cohesion:     f64,
    },

    // ── Reporting ─────────────────────────────────────────────────────────
    /// Guide → Dispatcher: where the group is and how it is doing.
    StatusReport {
        guide:            GuideId,
        location:         LocationId,
        group_size:       usize,
        itinerary_index:  usize,
        avg_satisfaction: f64,
        avg_fatigue:      f64,
    },
    /// Guide → Dispatcher: tour over (possibly aborted early).
    TourCompleted {
        guide:            GuideId,
        group:            GroupId,
        group_size:       usize,
        stops_visited:    usize,
        avg_satisfaction: f64,
        avg_cohesion:     f64,
        avg_fatigue:      f64,
        degraded:         bool,
    },
    /// Dispatcher → Guide: cooldown over, you are back in the pool.
    GuideAvailable,
    /// Guide → group: final metrics; the tour is over for you.
    Farewell { satisfaction: f64, cohesion: f64 },

    // ── Museum state ──────────────────────────────────────────────────────
    /// Dispatcher → Guides: `location` is congested.
    Advisory { location: LocationId, level: AdvisoryLevel },
    /// Dispatcher → Guides: congestion at `location` has eased.
    AdvisoryCleared { location: LocationId },
    /// Dispatcher → Guides at `location`: move on when you can.
    RerouteSuggested { location: LocationId },
    /// External → Dispatcher, then Dispatcher → Guides: `location` is closed.
    Emergency { kind: EmergencyKind, location: LocationId },
    EmergencyResolved { location: LocationId },

    // ── Lifecycle ─────────────────────────────────────────────────────────
    /// Visitor → Dispatcher: leaving the museum.
    Depart { visitor: VisitorId },
    /// Event loop → sender: `to` no longer exists.
    Undeliverable { to: Address, original: Box<Message> },
}

impl Message {
    /// Short variant name for logs and fault reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::RegisterGuide { .. }     => "RegisterGuide",
            Message::RegisterVisitor          => "RegisterVisitor",
            Message::RegistrationAck          => "RegistrationAck",
            Message::AssignVisitors { .. }    => "AssignVisitors",
            Message::Assigned { .. }          => "Assigned",
            Message::AssignmentRefused { .. } => "AssignmentRefused",
            Message::Welcome { .. }           => "Welcome",
            Message::Move { .. }              => "Move",
            Message::VisitorReady { .. }      => "VisitorReady",
            Message::Narration { .. }         => "Narration",
            Message::Question { .. }          => "Question",
            Message::Answer { .. }            => "Answer",
            Message::InviteQuestions          => "InviteQuestions",
            Message::BreakProposal { .. }     => "BreakProposal",
            Message::BreakResponse { .. }     => "BreakResponse",
            Message::Regroup { .. }           => "Regroup",
            Message::StatusUpdate { .. }      => "StatusUpdate",
            Message::StatusReport { .. }      => "StatusReport",
            Message::TourCompleted { .. }     => "TourCompleted",
            Message::GuideAvailable           => "GuideAvailable",
            Message::Farewell { .. }          => "Farewell",
            Message::Advisory { .. }          => "Advisory",
            Message::AdvisoryCleared { .. }   => "AdvisoryCleared",
            Message::RerouteSuggested { .. }  => "RerouteSuggested",
            Message::Emergency { .. }         => "Emergency",
            Message::EmergencyResolved { .. } => "EmergencyResolved",
            Message::Depart { .. }            => "Depart",
            Message::Undeliverable { .. }     => "Undeliverable",
        }
    }
}
