//! Fast mode: write without engine updates, repair afterwards.

use std::collections::BTreeSet;

use voxedit_core::{BaseBlock, BiomeType, BlockMap, BlockPos, BlockState, ChunkPos, EditError, EditResult, WriteStatus};
use voxedit_operation::{Operation, RunContext};

use crate::extent::{Extent, ExtentHandle};
use crate::world::WorldHandle;

/// Tracks what a fast-mode edit touched so commit can relight the touched
/// chunks and notify each changed position once.
///
/// The layers below write with lighting and neighbor updates switched off;
/// this layer only remembers where.
pub struct FastModeExtent {
    inner: ExtentHandle,
    world: WorldHandle,
    enabled: bool,
    dirty_chunks: BTreeSet<ChunkPos>,
    previous: BlockMap<BlockState>,
    order: Vec<BlockPos>,
}

impl FastModeExtent {
    #[must_use]
    pub fn new(inner: ExtentHandle, world: WorldHandle, enabled: bool) -> Self {
        Self {
            inner,
            world,
            enabled,
            dirty_chunks: BTreeSet::new(),
            previous: BlockMap::new(),
            order: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Chunks written since the last commit.
    pub fn dirty_chunks(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.dirty_chunks.iter().copied()
    }
}

impl Extent for FastModeExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        if !self.enabled {
            return self.inner.borrow_mut().set_block(pos, block);
        }
        let previous = (!self.previous.contains(pos)).then(|| self.inner.borrow().get_block(pos));
        let status = self.inner.borrow_mut().set_block(pos, block)?;
        if status.is_accepted() {
            self.dirty_chunks.insert(pos.chunk());
            if let Some(previous) = previous {
                self.previous.insert(pos, previous);
                self.order.push(pos);
            }
        }
        Ok(status)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        let status = self.inner.borrow_mut().set_biome(pos, biome)?;
        if self.enabled && status.is_accepted() {
            self.dirty_chunks.insert(pos.chunk());
        }
        Ok(status)
    }

    fn commit_required(&self) -> bool {
        self.enabled || self.inner.borrow().commit_required()
    }

    fn commit_after(&mut self) -> Option<Box<dyn Operation>> {
        if self.dirty_chunks.is_empty() {
            return None;
        }
        let chunks: Vec<ChunkPos> = std::mem::take(&mut self.dirty_chunks).into_iter().collect();
        let mut previous = std::mem::take(&mut self.previous);
        let positions: Vec<(BlockPos, BlockState)> = std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|pos| previous.remove(pos).map(|state| (pos, state)))
            .collect();
        tracing::debug!(chunks = chunks.len(), positions = positions.len(), "repairing after fast mode");
        Some(Box::new(FastModeRepair {
            world: self.world.clone(),
            chunks: Some(chunks),
            positions: positions.into_iter(),
        }))
    }
}

/// Relights the dirty chunks, then notifies positions a slice at a time.
struct FastModeRepair {
    world: WorldHandle,
    chunks: Option<Vec<ChunkPos>>,
    positions: std::vec::IntoIter<(BlockPos, BlockState)>,
}

impl Operation for FastModeRepair {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        if let Some(chunks) = self.chunks.take() {
            self.world.borrow_mut().fix_after_fast_mode(&chunks);
            if !run.should_continue() {
                return Ok(Some(self));
            }
        }
        while let Some((pos, previous)) = self.positions.next() {
            self.world.borrow_mut().notify_and_light_block(pos, &previous)?;
            if !run.should_continue() {
                return Ok(Some(self));
            }
        }
        Ok(None)
    }

    fn cancel(&mut self) {
        self.chunks = None;
        self.positions = Vec::new().into_iter();
    }
}

#[cfg(test)]
mod tests {
    use voxedit_core::{BlockType, SideEffectSet};
    use voxedit_operation::Operations;

    use super::*;
    use crate::extent::shared;
    use crate::layer::WorldApplyingExtent;
    use crate::memory::{HostCall, MemoryWorld};

    #[test]
    fn test_repair_runs_after_writes() {
        let world = shared(MemoryWorld::new("w"));
        let applying = shared(WorldApplyingExtent::new(world.clone(), SideEffectSet::none()));
        let fast = shared(FastModeExtent::new(applying, world.clone(), true));

        fast.borrow_mut().set_block(BlockPos::new(0, 0, 0), BlockType::STONE.into()).unwrap();
        fast.borrow_mut().set_block(BlockPos::new(0, 0, 0), BlockType::ICE.into()).unwrap();
        fast.borrow_mut().set_block(BlockPos::new(40, 0, 0), BlockType::STONE.into()).unwrap();
        assert_eq!(fast.borrow().dirty_chunks().count(), 2);

        world.borrow_mut().take_calls();
        let commit = fast.borrow_mut().commit();
        Operations::complete(commit).unwrap();

        let calls = world.borrow_mut().take_calls();
        assert_eq!(
            calls,
            vec![
                HostCall::FixAfterFastMode(vec![ChunkPos::new(0, 0), ChunkPos::new(2, 0)]),
                HostCall::NotifyAndLight(BlockPos::new(0, 0, 0)),
                HostCall::NotifyAndLight(BlockPos::new(40, 0, 0)),
            ]
        );
        assert_eq!(fast.borrow().dirty_chunks().count(), 0);
    }

    #[test]
    fn test_disabled_does_nothing_at_commit() {
        let world = shared(MemoryWorld::new("w"));
        let mut fast = FastModeExtent::new(world.clone(), world, false);
        fast.set_block(BlockPos::ZERO, BlockType::STONE.into()).unwrap();
        assert!(!fast.commit_required());
        assert!(fast.commit().is_none());
    }
}
