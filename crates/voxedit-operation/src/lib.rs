//! Cooperative scheduling for edits too large to apply in one go.
//!
//! An [`Operation`] does a slice of work each time it is resumed and hands
//! back its continuation, or `None` when finished. A [`RunContext`] tells it
//! when the slice is over. Nothing here spawns threads: the host calls
//! [`OperationDriver::tick`] (or [`OperationScheduler::tick`]) once per
//! simulation tick and each call stays within the configured budget.

mod counter;
mod driver;
mod operation;
mod operations;
mod run_context;

pub use counter::Counter;
pub use driver::{DriveStatus, JobHandle, JobState, OperationDriver, OperationScheduler};
pub use operation::{DelegateOperation, Operation, OperationQueue};
pub use operations::Operations;
pub use run_context::{CancelToken, RunContext, TimedRunContext, Unbounded};
