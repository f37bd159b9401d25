//! Scheduled callbacks.
//!
//! A timer is delivered only to the actor that scheduled it.  Periodic
//! behavior is a timer whose handler schedules the next one.

use mt_core::{GuideId, LocationId};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timer {
    // ── Dispatcher ────────────────────────────────────────────────────────
    /// Match the wait queue against the pool.
    Formation,
    CongestionScan,
    WorkloadScan,
    /// `guide` has finished its cooldown.
    Cooldown(GuideId),
    /// Reopen a location closed by an emergency.
    EmergencyResolve(LocationId),

    // ── Guide ─────────────────────────────────────────────────────────────
    /// One readiness-convergence attempt has run out of time.
    ConvergenceTimeout { attempt: u32 },
    /// The presentation at `location` is over.
    PresentationDone(LocationId),
    CohesionCheck,
    StatusReport,
    BreakVoteTimeout,
    BreakOver,
    /// Stop waiting for closed stops to reopen.
    ReopenWait,

    // ── Visitor ───────────────────────────────────────────────────────────
    /// Done walking to `location`; tell the guide.
    VisitorReady(LocationId),
    VisitorTick,
    /// Try to find the dispatcher again.
    LookupRetry { attempt: u32 },
}
