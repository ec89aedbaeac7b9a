//! Per-tick drivers used by the host scheduler.

use core::fmt;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use voxedit_core::{EditConfig, EditResult};

use crate::operation::Operation;
use crate::operations::Operations;
use crate::run_context::{CancelToken, TimedRunContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveStatus {
    /// More work remains; tick again.
    Pending,
    Finished,
}

/// Drives one outstanding operation, a budgeted slice per tick.
pub struct OperationDriver {
    operation: Option<Box<dyn Operation>>,
    budget: Duration,
    cancel: CancelToken,
    ticks: u64,
}

impl OperationDriver {
    #[must_use]
    pub fn new(operation: Option<Box<dyn Operation>>, budget: Duration) -> Self {
        Self {
            operation,
            budget,
            cancel: CancelToken::new(),
            ticks: 0,
        }
    }

    #[must_use]
    pub fn from_config(operation: Option<Box<dyn Operation>>, config: &EditConfig) -> Self {
        Self::new(operation, config.tick_budget())
    }

    /// A token that stops the operation at the start of the next resume.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one budgeted slice.
    ///
    /// On error the operation is dropped and later ticks report
    /// [`DriveStatus::Finished`].
    pub fn tick(&mut self) -> EditResult<DriveStatus> {
        let Some(operation) = self.operation.take() else {
            return Ok(DriveStatus::Finished);
        };
        self.ticks += 1;
        let run = TimedRunContext::new(self.budget).with_cancel(self.cancel.clone());
        self.operation = Operations::resume_until(Some(operation), &run)?;
        if self.operation.is_some() {
            tracing::trace!(ticks = self.ticks, "operation continues next tick");
            Ok(DriveStatus::Pending)
        } else {
            tracing::debug!(ticks = self.ticks, "operation finished");
            Ok(DriveStatus::Finished)
        }
    }

    /// Stop now, releasing the outstanding operation.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if let Some(mut operation) = self.operation.take() {
            operation.cancel();
        }
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.operation.is_none()
    }

    /// Ticks spent so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn status(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if let Some(operation) = &self.operation {
            operation.status(&mut messages);
        }
        messages
    }
}

impl fmt::Debug for OperationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDriver")
            .field("budget", &self.budget)
            .field("ticks", &self.ticks)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a job submitted to an [`OperationScheduler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    /// Ran out of budget at least once and is waiting for the next tick.
    Delayed,
    Finished,
    Failed(String),
    Cancelled,
}

impl JobState {
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed(_) | Self::Cancelled)
    }
}

/// Caller's view of a scheduled job.
#[derive(Clone, Debug)]
pub struct JobHandle(Rc<RefCell<JobState>>);

impl JobHandle {
    fn new() -> Self {
        Self(Rc::new(RefCell::new(JobState::Queued)))
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        self.0.borrow().clone()
    }

    /// Mark the job cancelled. A job that is already done is left alone.
    /// Returns whether the job was cancelled by this call.
    pub fn cancel(&self) -> bool {
        let mut state = self.0.borrow_mut();
        if state.is_done() {
            return false;
        }
        *state = JobState::Cancelled;
        true
    }

    fn set(&self, state: JobState) {
        *self.0.borrow_mut() = state;
    }
}

/// A deck of jobs sharing one per-tick budget.
///
/// The front job runs first. One that does not finish within the tick goes
/// back to the front so it keeps priority next tick.
pub struct OperationScheduler {
    jobs: VecDeque<(JobHandle, Box<dyn Operation>)>,
    budget: Duration,
}

impl OperationScheduler {
    #[must_use]
    pub const fn new(budget: Duration) -> Self {
        Self {
            jobs: VecDeque::new(),
            budget,
        }
    }

    pub fn submit(&mut self, operation: Box<dyn Operation>) -> JobHandle {
        let handle = JobHandle::new();
        self.jobs.push_back((handle.clone(), operation));
        handle
    }

    /// Run as many jobs as fit in one budget. Returns the number still pending.
    pub fn tick(&mut self) -> usize {
        let run = TimedRunContext::new(self.budget);
        while let Some((handle, mut operation)) = self.jobs.pop_front() {
            if handle.state() == JobState::Cancelled {
                operation.cancel();
                continue;
            }
            handle.set(JobState::Running);
            match Operations::resume_until(Some(operation), &run) {
                Ok(None) => handle.set(JobState::Finished),
                Ok(Some(rest)) => {
                    handle.set(JobState::Delayed);
                    self.jobs.push_front((handle, rest));
                    tracing::info!(pending = self.jobs.len(), "performing long operation");
                    break;
                }
                Err(err) => {
                    tracing::warn!(%err, "scheduled operation failed");
                    handle.set(JobState::Failed(err.to_string()));
                }
            }
        }
        self.jobs.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl fmt::Debug for OperationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationScheduler")
            .field("jobs", &self.jobs.len())
            .field("budget", &self.budget)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use voxedit_core::EditError;

    use super::*;
    use crate::run_context::RunContext;

    /// Finishes once the shared step count reaches `until`; resumes while
    /// the budget is spent are no-ops.
    struct Ticker {
        steps: Rc<Cell<usize>>,
        until: usize,
    }

    impl Operation for Ticker {
        fn resume(self: Box<Self>, _run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
            self.steps.set(self.steps.get() + 1);
            if self.steps.get() >= self.until { Ok(None) } else { Ok(Some(self)) }
        }

        fn cancel(&mut self) {
            self.steps.set(usize::MAX);
        }
    }

    fn ticker(until: usize) -> (Rc<Cell<usize>>, Box<dyn Operation>) {
        let steps = Rc::new(Cell::new(0));
        let op = Box::new(Ticker {
            steps: Rc::clone(&steps),
            until,
        });
        (steps, op)
    }

    #[test]
    fn test_zero_budget_never_progresses() {
        let (steps, op) = ticker(3);
        let mut driver = OperationDriver::new(Some(op), Duration::ZERO);
        assert_eq!(driver.tick().unwrap(), DriveStatus::Pending);
        assert_eq!(steps.get(), 0);
    }

    #[test]
    fn test_driver_finishes_within_generous_budget() {
        let (steps, op) = ticker(10);
        let mut driver = OperationDriver::new(Some(op), Duration::from_secs(10));
        assert_eq!(driver.tick().unwrap(), DriveStatus::Finished);
        assert_eq!(steps.get(), 10);
        assert!(driver.is_finished());
        assert_eq!(driver.tick().unwrap(), DriveStatus::Finished);
    }

    #[test]
    fn test_cancel_token_stops_next_tick() {
        let (steps, op) = ticker(10);
        let mut driver = OperationDriver::new(Some(op), Duration::from_secs(10));
        driver.cancel_token().cancel();
        assert!(matches!(driver.tick(), Err(EditError::Cancelled)));
        assert_eq!(steps.get(), usize::MAX);
    }

    #[test]
    fn test_scheduler_runs_jobs_in_order() {
        let mut scheduler = OperationScheduler::new(Duration::from_secs(10));
        let (_, first) = ticker(2);
        let (second_steps, second) = ticker(1);
        let a = scheduler.submit(first);
        let b = scheduler.submit(second);
        assert!(b.cancel());

        assert_eq!(scheduler.tick(), 0);
        assert_eq!(a.state(), JobState::Finished);
        assert_eq!(b.state(), JobState::Cancelled);
        assert_eq!(second_steps.get(), usize::MAX);
        assert!(!a.cancel());
    }

    #[test]
    fn test_scheduler_keeps_unfinished_job_at_front() {
        let mut scheduler = OperationScheduler::new(Duration::ZERO);
        let (_, op) = ticker(2);
        let handle = scheduler.submit(op);
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(handle.state(), JobState::Delayed);
    }
}
