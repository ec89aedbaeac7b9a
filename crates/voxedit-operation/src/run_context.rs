//! Budget and cancellation signals handed to every resume.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What an operation consults while it works.
pub trait RunContext {
    /// Whether the current slice may keep going.
    fn should_continue(&self) -> bool;

    /// Whether the work has been abandoned. A cancelled operation must not
    /// apply further mutations.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// No deadline and never cancelled.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl RunContext for Unbounded {
    fn should_continue(&self) -> bool {
        true
    }
}

/// A flag shared between the thread that wants to stop an edit and the
/// thread driving it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A fixed wall-clock deadline, optionally tied to a [`CancelToken`].
#[derive(Clone, Debug)]
pub struct TimedRunContext {
    deadline: Instant,
    cancel: Option<CancelToken>,
}

impl TimedRunContext {
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Time left before the deadline.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

impl RunContext for TimedRunContext {
    fn should_continue(&self) -> bool {
        !self.is_cancelled() && Instant::now() < self.deadline
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_stops_immediately() {
        let run = TimedRunContext::new(Duration::ZERO);
        assert!(!run.should_continue());
        assert!(!run.is_cancelled());
    }

    #[test]
    fn test_cancel_stops_a_generous_budget() {
        let token = CancelToken::new();
        let run = TimedRunContext::new(Duration::from_secs(60)).with_cancel(token.clone());
        assert!(run.should_continue());

        token.cancel();
        assert!(run.is_cancelled());
        assert!(!run.should_continue());
    }
}
