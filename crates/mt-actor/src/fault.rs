//! Recoverable faults.
//!
//! A fault is something that went wrong inside one actor and was handled
//! there: a busy guide, a registry miss, a message that arrived in the wrong
//! phase.  Faults are logged at `warn` and never cross an actor boundary;
//! the other side learns about the consequence through an ordinary message.

use thiserror::Error;
use tracing::warn;

use mt_core::LocationId;

use crate::{Address, Capability};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Fault {
    /// A guide was busy or a location was closed; the caller requeued or
    /// rerouted.
    #[error("{resource} unavailable: {detail}")]
    Unavailable { resource: String, detail: &'static str },

    /// A registry lookup came back empty.
    #[error("no {capability} reachable after {attempts} attempt(s)")]
    LookupFailure { capability: Capability, attempts: u32 },

    /// A peer vanished between lookup and delivery.
    #[error("{peer} unreachable: {detail}")]
    Unreachable { peer: Address, detail: &'static str },

    /// A valid message that makes no sense in the receiver's current phase.
    #[error("unexpected {message} from {from} while {phase}")]
    ProtocolMismatch {
        from:    Address,
        message: &'static str,
        phase:   &'static str,
    },

    /// Not every member signalled readiness in time; the group moved on.
    #[error("only {ready}/{expected} members ready after {attempts} attempt(s)")]
    ConvergenceTimeout { ready: usize, expected: usize, attempts: u32 },

    /// Occupancy crossed a congestion threshold.
    #[error("{location} holds {occupancy} against capacity {capacity}")]
    CapacityExceeded {
        location:  LocationId,
        occupancy: usize,
        capacity:  usize,
    },
}

impl Fault {
    /// Log this fault against the actor that handled it.
    pub fn report(&self, at: Address) {
        warn!(actor = %at, fault = %self, "recovered");
    }
}
