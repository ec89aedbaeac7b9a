use voxedit_core::{LocatedBlock, LocatedBlockList};

use super::change::Change;

/// An append-only, chronological log of changes.
pub trait ChangeSet {
    /// Record a change. Ignored while not recording.
    fn add(&mut self, change: Change);

    fn is_recording(&self) -> bool;

    fn set_recording(&mut self, recording: bool);

    /// Number of recorded changes.
    fn size(&self) -> usize;

    /// Changes in the order they happened.
    fn forward(&self) -> Box<dyn Iterator<Item = Change> + '_>;

    /// Changes newest first.
    fn backward(&self) -> Box<dyn Iterator<Item = Change> + '_>;
}

/// Stores every change in one list.
#[derive(Debug)]
pub struct ArrayListHistory {
    changes: Vec<Change>,
    recording: bool,
}

impl ArrayListHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
            recording: true,
        }
    }
}

impl Default for ArrayListHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeSet for ArrayListHistory {
    fn add(&mut self, change: Change) {
        if self.recording {
            self.changes.push(change);
        }
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    fn size(&self) -> usize {
        self.changes.len()
    }

    fn forward(&self) -> Box<dyn Iterator<Item = Change> + '_> {
        Box::new(self.changes.iter().cloned())
    }

    fn backward(&self) -> Box<dyn Iterator<Item = Change> + '_> {
        Box::new(self.changes.iter().rev().cloned())
    }
}

/// Keeps block changes in two parallel position/block lists and everything
/// else in an [`ArrayListHistory`].
///
/// Non-block changes replay first in either direction, then block changes.
#[derive(Debug, Default)]
pub struct BlockOptimizedHistory {
    previous: LocatedBlockList,
    current: LocatedBlockList,
    others: ArrayListHistory,
}

impl BlockOptimizedHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn block_change(previous: &LocatedBlock, current: &LocatedBlock) -> Change {
        Change::Block {
            pos: previous.pos,
            previous: previous.block.clone(),
            current: current.block.clone(),
        }
    }
}

impl ChangeSet for BlockOptimizedHistory {
    fn add(&mut self, change: Change) {
        if !self.others.is_recording() {
            return;
        }
        match change {
            Change::Block { pos, previous, current } => {
                self.previous.push(pos, previous);
                self.current.push(pos, current);
            }
            other => self.others.add(other),
        }
    }

    fn is_recording(&self) -> bool {
        self.others.is_recording()
    }

    fn set_recording(&mut self, recording: bool) {
        self.others.set_recording(recording);
    }

    fn size(&self) -> usize {
        self.previous.len() + self.others.size()
    }

    fn forward(&self) -> Box<dyn Iterator<Item = Change> + '_> {
        let blocks = self
            .previous
            .iter()
            .zip(self.current.iter())
            .map(|(previous, current)| Self::block_change(previous, current));
        Box::new(self.others.forward().chain(blocks))
    }

    fn backward(&self) -> Box<dyn Iterator<Item = Change> + '_> {
        let blocks = self
            .previous
            .iter()
            .rev()
            .zip(self.current.iter().rev())
            .map(|(previous, current)| Self::block_change(previous, current));
        Box::new(self.others.backward().chain(blocks))
    }
}

/// Records nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullChangeSet;

impl ChangeSet for NullChangeSet {
    fn add(&mut self, _change: Change) {}

    fn is_recording(&self) -> bool {
        false
    }

    fn set_recording(&mut self, _recording: bool) {}

    fn size(&self) -> usize {
        0
    }

    fn forward(&self) -> Box<dyn Iterator<Item = Change> + '_> {
        Box::new(std::iter::empty())
    }

    fn backward(&self) -> Box<dyn Iterator<Item = Change> + '_> {
        Box::new(std::iter::empty())
    }
}

#[cfg(test)]
mod tests {
    use voxedit_core::{BaseBlock, BaseEntity, BlockPos, BlockType, EntityId, Location};

    use super::*;
    use crate::history::TrackedEntity;

    fn block(pos: BlockPos, previous: BlockType, current: BlockType) -> Change {
        Change::Block {
            pos,
            previous: BaseBlock::from(previous),
            current: BaseBlock::from(current),
        }
    }

    fn positions(changes: impl Iterator<Item = Change>) -> Vec<i32> {
        changes
            .filter_map(|change| match change {
                Change::Block { pos, .. } => Some(pos.x),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_block_optimized_directions() {
        let mut history = BlockOptimizedHistory::new();
        for x in 0..3 {
            history.add(block(BlockPos::new(x, 0, 0), BlockType::AIR, BlockType::STONE));
        }
        history.add(Change::EntityCreate {
            entity: TrackedEntity::new(EntityId(7)),
            location: Location::default(),
            state: BaseEntity::new("minecraft:pig"),
        });

        assert_eq!(history.size(), 4);
        assert_eq!(positions(history.forward()), [0, 1, 2]);
        assert_eq!(positions(history.backward()), [2, 1, 0]);
        assert!(matches!(history.backward().next(), Some(Change::EntityCreate { .. })));
    }

    #[test]
    fn test_not_recording_drops_changes() {
        let mut history = ArrayListHistory::new();
        history.set_recording(false);
        history.add(block(BlockPos::ZERO, BlockType::AIR, BlockType::STONE));
        assert_eq!(history.size(), 0);

        let mut null = NullChangeSet;
        null.add(block(BlockPos::ZERO, BlockType::AIR, BlockType::STONE));
        assert_eq!(null.forward().count(), 0);
    }
}
