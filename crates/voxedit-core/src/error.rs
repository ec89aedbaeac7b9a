//! Edit error types.

use thiserror::Error;
use voxedit_buffer::BufferError;

/// Failures that stop an edit or one of its operations.
///
/// Writes refused by a mask or outside the world's bounds are not errors;
/// they report [`crate::WriteStatus::Rejected`].
#[derive(Debug, Error)]
pub enum EditError {
    /// The session's change budget is exhausted.
    #[error("change limit of {limit} blocks reached")]
    ChangeLimitReached { limit: usize },

    /// The run context asked the operation to stop.
    #[error("operation cancelled")]
    Cancelled,

    /// The host world failed to store or load data.
    #[error("storage error: {0}")]
    Storage(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A staging buffer was driven into an invalid state.
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),
}

impl EditError {
    #[must_use]
    pub const fn is_limit(&self) -> bool {
        matches!(self, Self::ChangeLimitReached { .. })
    }
}

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;
