//! Undo/redo history.
//!
//! [`ChangeSetExtent`] records a [`Change`] for every accepted write into a
//! [`ChangeSet`]; [`ChangeSetExecutor`] replays a set backwards (undo) or
//! forwards (redo) against any extent.

mod change;
mod change_set;
mod executor;
mod extent;

pub use change::{Change, TrackedEntity, UndoContext};
pub use change_set::{ArrayListHistory, BlockOptimizedHistory, ChangeSet, NullChangeSet};
pub use executor::{ChangeSetExecutor, Direction};
pub use extent::ChangeSetExtent;
