//! Reordering a batch of deferred writes before it is applied.

use std::ops::Range;

/// A batch being rearranged, and the groups marked in it.
#[derive(Debug)]
pub struct ArrangerContext<A> {
    actions: Vec<A>,
    groups: Vec<Range<usize>>,
}

impl<A> ArrangerContext<A> {
    #[must_use]
    pub const fn new(actions: Vec<A>) -> Self {
        Self {
            actions,
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// The batch, for reordering in place or inserting actions.
    pub const fn actions_mut(&mut self) -> &mut Vec<A> {
        &mut self.actions
    }

    /// Mark `len` actions from `start` as a group that must be applied
    /// together.
    pub fn mark_group(&mut self, start: usize, len: usize) {
        self.groups.push(start..start + len);
    }

    #[must_use]
    pub fn groups(&self) -> &[Range<usize>] {
        &self.groups
    }

    #[must_use]
    pub fn into_actions(self) -> Vec<A> {
        self.actions
    }
}

/// Decides the order a batch of actions is applied in.
pub trait Arranger<A> {
    fn rearrange(&self, context: &mut ArrangerContext<A>);
}

/// Keeps insertion order.
#[derive(Clone, Copy, Debug, Default)]
pub struct InsertionOrder;

impl<A> Arranger<A> for InsertionOrder {
    fn rearrange(&self, context: &mut ArrangerContext<A>) {
        let count = context.action_count();
        context.mark_group(0, count);
    }
}
