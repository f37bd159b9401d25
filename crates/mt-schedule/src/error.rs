use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("layout parse error: {0}")]
    Parse(String),

    #[error("invalid layout: {0}")]
    Layout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
