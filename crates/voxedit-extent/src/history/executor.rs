use voxedit_core::{EditError, EditResult};
use voxedit_operation::{Operation, RunContext};

use super::change::{Change, UndoContext};
use super::change_set::ChangeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// Replays a change set against an extent.
///
/// The changes are captured when the executor is created, so the set may be
/// borrowed again (or keep recording) while the executor runs. A single
/// resume applies everything.
pub struct ChangeSetExecutor {
    changes: std::vec::IntoIter<Change>,
    direction: Direction,
    context: UndoContext,
    applied: usize,
}

impl ChangeSetExecutor {
    #[must_use]
    pub fn new(change_set: &dyn ChangeSet, direction: Direction, context: UndoContext) -> Self {
        let changes: Vec<Change> = match direction {
            Direction::Undo => change_set.backward().collect(),
            Direction::Redo => change_set.forward().collect(),
        };
        Self {
            changes: changes.into_iter(),
            direction,
            context,
            applied: 0,
        }
    }

    #[must_use]
    pub fn create_undo(change_set: &dyn ChangeSet, context: UndoContext) -> Self {
        Self::new(change_set, Direction::Undo, context)
    }

    #[must_use]
    pub fn create_redo(change_set: &dyn ChangeSet, context: UndoContext) -> Self {
        Self::new(change_set, Direction::Redo, context)
    }
}

impl Operation for ChangeSetExecutor {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        for change in self.changes.by_ref() {
            match self.direction {
                Direction::Undo => change.undo(&self.context)?,
                Direction::Redo => change.redo(&self.context)?,
            }
            self.applied += 1;
        }
        tracing::debug!(direction = ?self.direction, applied = self.applied, "replayed change set");
        Ok(None)
    }

    fn cancel(&mut self) {
        self.changes = Vec::new().into_iter();
    }

    fn status(&self, messages: &mut Vec<String>) {
        messages.push(format!("{:?}: {} changes applied", self.direction, self.applied));
    }
}
