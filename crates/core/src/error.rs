/// Error raised by a rejected write to a progress reporter.
///
/// Every variant is a local validation failure. The reporter that raised it
/// keeps the state it had before the offending call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("{what} must be between {min} and {max}, got {value}")]
    OutOfRange {
        what: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProgressError {
    pub(crate) fn progress_above_maximum(value: u64, maximum: u64) -> Self {
        Self::OutOfRange {
            what: "progress",
            value,
            min: 0,
            max: maximum,
        }
    }

    pub(crate) fn not_positive(what: &'static str) -> Self {
        Self::OutOfRange {
            what,
            value: 0,
            min: 1,
            max: u64::MAX,
        }
    }
}

/// Error from a progress-reporting helper operation.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("Progress error: {0}")]
    Progress(#[from] ProgressError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
