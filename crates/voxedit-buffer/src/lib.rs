//! Staging buffers for batched world writes.
//!
//! Producers (extents that defer writes) and consumers (arrangers that drain
//! batches into the next layer) share one cursor vocabulary, borrowed from
//! byte-stream buffers:
//!
//! ```text
//!  0 <= mark <= position <= limit <= capacity
//!  ┌──────────────┬──────────────────┬──────────────┐
//!  │  consumed    │    remaining     │  past limit  │
//!  └──────────────┴──────────────────┴──────────────┘
//!  0          position            limit       capacity
//! ```
//!
//! - `clear()` prepares for writing (position = 0, limit = capacity)
//! - `flip()` switches from writing to reading (limit = position, position = 0)
//! - `rewind()` re-reads (position = 0, limit untouched)
//!
//! Every cursor violation is reported as a [`BufferError`]; nothing is
//! silently clamped or wrapped.

mod buffer;
mod error;

pub use buffer::ActionBuffer;
pub use error::{BufferError, BufferResult};
