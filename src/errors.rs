use std::collections::TryReserveError;

/// Errors that can occur when operating on a sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeqError {
    /// An argument can never be valid, e.g. position 0.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Position past the end, value without a match, or no cycle to report.
    #[error("not found")]
    NotFound,

    /// The node store could not grow.
    #[error("node allocation failed")]
    AllocationFailure,

    /// The handle does not name a live node of this sequence.
    #[error("invalid handle")]
    InvalidHandle,

    /// The chain loops back on itself; the operation needs a terminating tail.
    #[error("sequence contains a cycle")]
    Cyclic,
}

impl From<TryReserveError> for SeqError {
    fn from(_: TryReserveError) -> Self {
        SeqError::AllocationFailure
    }
}
