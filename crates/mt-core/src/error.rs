//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `MtError` as one variant
//! where they need to surface core failures (configuration, unknown ids).

use thiserror::Error;

use crate::{GuideId, LocationId, VisitorId};

/// The top-level error type for `mt-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum MtError {
    #[error("visitor {0} not found")]
    VisitorNotFound(VisitorId),

    #[error("guide {0} not found")]
    GuideNotFound(GuideId),

    #[error("location {0} not found")]
    LocationNotFound(LocationId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `mt-*` crates.
pub type MtResult<T> = Result<T, MtError>;
