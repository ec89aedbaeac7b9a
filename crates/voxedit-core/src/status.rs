//! Outcome of a single write.

use crate::error::{EditError, EditResult};

/// What happened to a block or biome write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WriteStatus {
    /// The stored value probably changed.
    Changed,
    /// Accepted, but the stored value was already equal.
    Unchanged,
    /// Refused by a mask, the world's bounds, or policy.
    Rejected,
    /// Refused because the change budget of `limit` writes is spent.
    LimitReached { limit: usize },
}

impl WriteStatus {
    /// Best-effort "did anything change" hint. Callers may use it for
    /// approximate counting only.
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Changed)
    }

    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Changed | Self::Unchanged)
    }

    #[must_use]
    pub const fn from_changed(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::Unchanged }
    }

    /// Turn a spent budget into an error so an operation chain stops;
    /// otherwise yield the change hint.
    pub fn into_result(self) -> EditResult<bool> {
        match self {
            Self::LimitReached { limit } => Err(EditError::ChangeLimitReached { limit }),
            other => Ok(other.changed()),
        }
    }
}
