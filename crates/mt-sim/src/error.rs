use mt_core::{MtError, Tick, VisitorId};
use mt_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] MtError),

    #[error("layout error: {0}")]
    Layout(#[from] ScheduleError),

    #[error("visitor {0} is already in the museum")]
    DuplicateVisitor(VisitorId),

    #[error("no visitor {0} in the museum")]
    UnknownVisitor(VisitorId),

    #[error("invariant violated at {tick}: {detail}")]
    Invariant { tick: Tick, detail: String },
}

pub type SimResult<T> = Result<T, SimError>;
