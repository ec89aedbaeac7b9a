//! The operation trait and its two combinators.

use std::collections::VecDeque;

use voxedit_core::{EditError, EditResult};

use crate::run_context::RunContext;

/// A resumable, cancellable unit of work.
///
/// `resume` consumes the operation and returns what should run next time:
/// `None` when finished, otherwise a continuation (itself, or a different
/// operation entirely). A failed resume drops the operation.
pub trait Operation {
    fn resume(self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>>;

    /// Abandon the work and release what it holds. Called at most once;
    /// the operation is never resumed afterwards.
    fn cancel(&mut self);

    /// Append human-readable progress lines.
    fn status(&self, messages: &mut Vec<String>) {
        let _ = messages;
    }
}

/// Runs a nested operation to completion, then hands control back to the
/// original.
pub struct DelegateOperation {
    original: Box<dyn Operation>,
    delegate: Option<Box<dyn Operation>>,
}

impl DelegateOperation {
    #[must_use]
    pub fn new(original: Box<dyn Operation>, delegate: Box<dyn Operation>) -> Self {
        Self {
            original,
            delegate: Some(delegate),
        }
    }
}

impl Operation for DelegateOperation {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            self.cancel();
            return Err(EditError::Cancelled);
        }
        let Some(delegate) = self.delegate.take() else {
            return Ok(Some(self.original));
        };
        self.delegate = delegate.resume(run)?;
        if self.delegate.is_some() {
            Ok(Some(self))
        } else {
            Ok(Some(self.original))
        }
    }

    fn cancel(&mut self) {
        if let Some(delegate) = &mut self.delegate {
            delegate.cancel();
        }
        self.original.cancel();
    }

    fn status(&self, messages: &mut Vec<String>) {
        self.original.status(messages);
        if let Some(delegate) = &self.delegate {
            delegate.status(messages);
        }
    }
}

/// Runs operations one after another, each to completion before the next
/// starts.
#[derive(Default)]
pub struct OperationQueue {
    queue: VecDeque<Box<dyn Operation>>,
    current: Option<Box<dyn Operation>>,
}

impl OperationQueue {
    #[must_use]
    pub fn new(operations: impl IntoIterator<Item = Box<dyn Operation>>) -> Self {
        Self {
            queue: operations.into_iter().collect(),
            current: None,
        }
    }

    /// Append an operation to the end of the queue.
    pub fn offer(&mut self, operation: Box<dyn Operation>) {
        self.queue.push_back(operation);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Operation for OperationQueue {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            self.cancel();
            return Err(EditError::Cancelled);
        }

        if self.current.is_none() {
            self.current = self.queue.pop_front();
        }

        if let Some(current) = self.current.take() {
            self.current = current.resume(run)?;
            if self.current.is_none() {
                self.current = self.queue.pop_front();
            }
        }

        if self.current.is_some() {
            Ok(Some(self))
        } else {
            Ok(None)
        }
    }

    fn cancel(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.cancel();
        }
        for mut operation in self.queue.drain(..) {
            operation.cancel();
        }
    }

    fn status(&self, messages: &mut Vec<String>) {
        if let Some(current) = &self.current {
            current.status(messages);
        }
        if !self.queue.is_empty() {
            messages.push(format!("{} operation(s) queued", self.queue.len()));
        }
    }
}

impl core::fmt::Debug for OperationQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OperationQueue")
            .field("queued", &self.queue.len())
            .field("running", &self.current.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::run_context::{CancelToken, TimedRunContext, Unbounded};

    type Log = Rc<RefCell<Vec<String>>>;

    /// Logs `name:step` on each resume and finishes after `steps` resumes.
    struct Steps {
        name: &'static str,
        step: usize,
        steps: usize,
        log: Log,
    }

    impl Steps {
        fn boxed(name: &'static str, steps: usize, log: &Log) -> Box<dyn Operation> {
            Box::new(Self {
                name,
                step: 0,
                steps,
                log: Rc::clone(log),
            })
        }
    }

    impl Operation for Steps {
        fn resume(mut self: Box<Self>, _run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
            self.step += 1;
            self.log.borrow_mut().push(format!("{}:{}", self.name, self.step));
            if self.step < self.steps { Ok(Some(self)) } else { Ok(None) }
        }

        fn cancel(&mut self) {
            self.log.borrow_mut().push(format!("{}:cancel", self.name));
        }
    }

    fn drive(mut op: Option<Box<dyn Operation>>) -> EditResult<()> {
        while let Some(current) = op {
            op = current.resume(&Unbounded)?;
        }
        Ok(())
    }

    #[test]
    fn test_queue_runs_in_order() {
        let log = Log::default();
        let queue = OperationQueue::new([Steps::boxed("a", 2, &log), Steps::boxed("b", 1, &log)]);
        drive(Some(Box::new(queue))).unwrap();
        assert_eq!(*log.borrow(), ["a:1", "a:2", "b:1"]);
    }

    #[test]
    fn test_empty_queue_finishes() {
        let queue: Box<dyn Operation> = Box::new(OperationQueue::default());
        assert!(queue.resume(&Unbounded).unwrap().is_none());
    }

    #[test]
    fn test_delegate_returns_to_original() {
        let log = Log::default();
        let op = DelegateOperation::new(Steps::boxed("outer", 1, &log), Steps::boxed("inner", 2, &log));
        drive(Some(Box::new(op))).unwrap();
        assert_eq!(*log.borrow(), ["inner:1", "inner:2", "outer:1"]);
    }

    #[test]
    fn test_cancelled_delegate_releases_both_sides() {
        let log = Log::default();
        let op = DelegateOperation::new(Steps::boxed("outer", 1, &log), Steps::boxed("inner", 3, &log));
        let next = Box::new(op).resume(&Unbounded).unwrap();

        let token = CancelToken::new();
        token.cancel();
        let run = TimedRunContext::new(std::time::Duration::from_secs(1)).with_cancel(token);
        let result = next.unwrap().resume(&run);

        assert!(matches!(result, Err(EditError::Cancelled)));
        assert_eq!(*log.borrow(), ["inner:1", "inner:cancel", "outer:cancel"]);
    }

    #[test]
    fn test_cancel_reaches_every_queued_operation() {
        let log = Log::default();
        let mut queue = OperationQueue::new([Steps::boxed("a", 3, &log), Steps::boxed("b", 1, &log)]);
        queue.offer(Steps::boxed("c", 1, &log));
        let next = Box::new(queue).resume(&Unbounded).unwrap();

        let token = CancelToken::new();
        token.cancel();
        let run = TimedRunContext::new(std::time::Duration::from_secs(1)).with_cancel(token);
        let result = next.unwrap().resume(&run);

        assert!(matches!(result, Err(EditError::Cancelled)));
        assert_eq!(*log.borrow(), ["a:1", "a:cancel", "b:cancel", "c:cancel"]);
    }
}
