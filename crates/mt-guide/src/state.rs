//! Tour phases.

use std::fmt;

use mt_core::{Availability, LocationId};

/// Why a touring group is standing still.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PauseReason {
    /// Agreed rest stop.
    Break,
    /// Waiting for cohesion to recover under a tighter formation.
    CohesionHold,
    /// Every remaining stop is closed; waiting for one to reopen.
    AwaitingReopen,
}

/// Where a guide is in its lifecycle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TourPhase {
    #[default]
    Idle,
    /// Gathering the new group at the entrance.
    Forming,
    Moving { destination: LocationId },
    Presenting { location: LocationId },
    Pausing(PauseReason),
    Completing,
    CoolingDown,
}

impl TourPhase {
    /// The pool availability this phase corresponds to.
    pub fn availability(self) -> Availability {
        match self {
            TourPhase::Idle        => Availability::Available,
            TourPhase::CoolingDown => Availability::CoolingDown,
            _                      => Availability::Busy,
        }
    }

    /// `true` while a group is attached.
    pub fn is_touring(self) -> bool {
        self.availability() == Availability::Busy
    }

    pub fn name(self) -> &'static str {
        match self {
            TourPhase::Idle                                 => "idle",
            TourPhase::Forming                              => "forming",
            TourPhase::Moving { .. }                        => "moving",
            TourPhase::Presenting { .. }                    => "presenting",
            TourPhase::Pausing(PauseReason::Break)          => "on a break",
            TourPhase::Pausing(PauseReason::CohesionHold)   => "holding for cohesion",
            TourPhase::Pausing(PauseReason::AwaitingReopen) => "waiting for a reopening",
            TourPhase::Completing                           => "completing",
            TourPhase::CoolingDown                          => "cooling down",
        }
    }
}

impl fmt::Display for TourPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourPhase::Moving { destination } => write!(f, "moving to {destination}"),
            TourPhase::Presenting { location } => write!(f, "presenting {location}"),
            other => f.write_str(other.name()),
        }
    }
}
