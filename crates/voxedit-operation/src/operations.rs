//! Entry points for driving operations.

use eyre::WrapErr;
use voxedit_core::{EditError, EditResult};

use crate::operation::{Operation, OperationQueue};
use crate::run_context::{RunContext, Unbounded};

/// Helpers for completing and composing operations.
pub struct Operations;

impl Operations {
    /// Drive an operation to completion without a time budget.
    ///
    /// Errors come back with their exact type, so callers can tell a
    /// [`EditError::ChangeLimitReached`] apart from a host failure.
    pub fn complete(operation: Option<Box<dyn Operation>>) -> EditResult<()> {
        Self::complete_with(operation, &Unbounded)
    }

    /// Drive an operation to completion, resuming it with `run` each time.
    ///
    /// A slice ending does not stop the loop; only cancellation does.
    pub fn complete_with(mut operation: Option<Box<dyn Operation>>, run: &dyn RunContext) -> EditResult<()> {
        while let Some(mut current) = operation {
            if run.is_cancelled() {
                current.cancel();
                tracing::debug!("operation cancelled");
                return Err(EditError::Cancelled);
            }
            operation = current.resume(run)?;
        }
        Ok(())
    }

    /// Drive an operation to completion, for call sites with no typed error
    /// channel.
    pub fn complete_blindly(operation: Option<Box<dyn Operation>>) -> eyre::Result<()> {
        Self::complete(operation).wrap_err("failed to complete operation")
    }

    /// Resume an operation until it finishes or `run` says the slice is
    /// over, returning what is left.
    ///
    /// Cancellation is checked before every resume; a cancelled operation
    /// has [`Operation::cancel`] called and yields [`EditError::Cancelled`].
    pub fn resume_until(
        mut operation: Option<Box<dyn Operation>>,
        run: &dyn RunContext,
    ) -> EditResult<Option<Box<dyn Operation>>> {
        while let Some(mut current) = operation {
            if run.is_cancelled() {
                current.cancel();
                tracing::debug!("operation cancelled");
                return Err(EditError::Cancelled);
            }
            if !run.should_continue() {
                return Ok(Some(current));
            }
            operation = current.resume(run)?;
        }
        Ok(None)
    }

    /// Combine operations into one that runs them in order. Absent entries
    /// are skipped.
    #[must_use]
    pub fn sequence(
        operations: impl IntoIterator<Item = Option<Box<dyn Operation>>>,
    ) -> Option<Box<dyn Operation>> {
        let mut operations: Vec<_> = operations.into_iter().flatten().collect();
        match operations.len() {
            0 => None,
            1 => operations.pop(),
            _ => Some(Box::new(OperationQueue::new(operations))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::run_context::{CancelToken, TimedRunContext};

    struct Countdown {
        left: usize,
        resumed: Rc<Cell<usize>>,
    }

    impl Operation for Countdown {
        fn resume(mut self: Box<Self>, _run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
            self.resumed.set(self.resumed.get() + 1);
            self.left -= 1;
            if self.left == 0 { Ok(None) } else { Ok(Some(self)) }
        }

        fn cancel(&mut self) {}
    }

    struct Fails;

    impl Operation for Fails {
        fn resume(self: Box<Self>, _run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
            Err(EditError::ChangeLimitReached { limit: 1 })
        }

        fn cancel(&mut self) {}
    }

    fn countdown(left: usize, resumed: &Rc<Cell<usize>>) -> Option<Box<dyn Operation>> {
        Some(Box::new(Countdown {
            left,
            resumed: Rc::clone(resumed),
        }))
    }

    #[test]
    fn test_complete_runs_every_step() {
        let resumed = Rc::new(Cell::new(0));
        Operations::complete(countdown(5, &resumed)).unwrap();
        assert_eq!(resumed.get(), 5);
    }

    #[test]
    fn test_limit_error_keeps_its_type() {
        let err = Operations::complete(Some(Box::new(Fails))).unwrap_err();
        assert!(err.is_limit());
        assert!(Operations::complete_blindly(Some(Box::new(Fails))).is_err());
    }

    #[test]
    fn test_exhausted_budget_returns_the_rest() {
        let resumed = Rc::new(Cell::new(0));
        let rest = Operations::resume_until(countdown(3, &resumed), &TimedRunContext::new(Duration::ZERO)).unwrap();
        assert!(rest.is_some());
        assert_eq!(resumed.get(), 0);
    }

    #[test]
    fn test_complete_with_ignores_slice_end() {
        let resumed = Rc::new(Cell::new(0));
        Operations::complete_with(countdown(4, &resumed), &TimedRunContext::new(Duration::ZERO)).unwrap();
        assert_eq!(resumed.get(), 4);
    }

    #[test]
    fn test_cancelled_before_resume() {
        let resumed = Rc::new(Cell::new(0));
        let token = CancelToken::new();
        token.cancel();
        let run = TimedRunContext::new(Duration::from_secs(5)).with_cancel(token);
        let result = Operations::resume_until(countdown(3, &resumed), &run);
        assert!(matches!(result, Err(EditError::Cancelled)));
        assert_eq!(resumed.get(), 0);
    }

    #[test]
    fn test_sequence_shapes() {
        let resumed = Rc::new(Cell::new(0));
        assert!(Operations::sequence([None, None]).is_none());

        let single = Operations::sequence([None, countdown(1, &resumed)]);
        Operations::complete(single).unwrap();
        assert_eq!(resumed.get(), 1);

        let many = Operations::sequence([countdown(2, &resumed), None, countdown(1, &resumed)]);
        Operations::complete(many).unwrap();
        assert_eq!(resumed.get(), 4);
    }
}
