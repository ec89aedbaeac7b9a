use core::fmt;
use std::cell::Cell;
use std::rc::Rc;

/// A progress count shared between an operation and the sub-operations it
/// hands control to.
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> usize {
        self.0.get()
    }

    pub fn increment(&self) {
        self.add(1);
    }

    pub fn add(&self, n: usize) {
        self.0.set(self.0.get() + n);
    }

    /// Current value, resetting to zero.
    pub fn take(&self) -> usize {
        self.0.replace(0)
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Counter").field(&self.get()).finish()
    }
}
