//! Buffer error types.

use thiserror::Error;

/// A rejected buffer operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A relative `put` found no room before the limit.
    #[error("buffer overflow: need {needed} slots, {remaining} remaining")]
    Overflow { needed: usize, remaining: usize },

    /// A relative `get` found nothing before the limit.
    #[error("buffer underflow: need {needed} elements, {remaining} remaining")]
    Underflow { needed: usize, remaining: usize },

    /// An absolute index was not below the limit.
    #[error("index {index} out of bounds for limit {limit}")]
    IndexOutOfBounds { index: usize, limit: usize },

    /// A new position was greater than the limit.
    #[error("position {position} exceeds limit {limit}")]
    InvalidPosition { position: usize, limit: usize },

    /// A new limit was greater than the capacity.
    #[error("limit {limit} exceeds capacity {capacity}")]
    InvalidLimit { limit: usize, capacity: usize },

    /// `reset` was called without a mark.
    #[error("mark is not set")]
    InvalidMark,

    /// A mutating operation was attempted on a read-only view.
    #[error("buffer is read-only")]
    ReadOnly,

    /// A slot below the limit was read before anything was written to it.
    #[error("slot {0} has never been written")]
    Uninitialized(usize),

    /// A buffer was asked to copy from a view of its own slots.
    #[error("source and destination share the same slots")]
    SelfCopy,
}

/// Result type for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;
