//! Chunk residency and chunk-ordered batching.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::rc::Rc;

use rayon::slice::ParallelSliceMut;
use voxedit_core::{
    BaseBlock, BaseEntity, BiomeType, BlockMap, BlockPos, BlockState, BlockStateHolder, EditResult, EntityId,
    LocatedBlock, LocatedBlockList, Location, WriteStatus,
};
use voxedit_operation::Operation;

use crate::extent::{Extent, ExtentHandle};
use crate::function::SetLocatedBlocks;
use crate::world::WorldHandle;

/// Asks the world to load a chunk before anything is written into it.
pub struct ChunkLoadingExtent {
    inner: ExtentHandle,
    world: WorldHandle,
    enabled: bool,
}

impl ChunkLoadingExtent {
    #[must_use]
    pub const fn new(inner: ExtentHandle, world: WorldHandle) -> Self {
        Self {
            inner,
            world,
            enabled: true,
        }
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn load(&self, pos: BlockPos) {
        if self.enabled {
            self.world.borrow_mut().check_loaded_chunk(pos);
        }
    }
}

impl Extent for ChunkLoadingExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        self.load(pos);
        self.inner.borrow_mut().set_block(pos, block)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        self.load(pos);
        self.inner.borrow_mut().set_biome(pos, biome)
    }

    fn create_entity(&mut self, location: Location, entity: BaseEntity) -> EditResult<Option<EntityId>> {
        self.load(location.position.to_block_pos());
        self.inner.borrow_mut().create_entity(location, entity)
    }
}

/// Batches larger than this are sorted on the rayon pool.
const PARALLEL_SORT_THRESHOLD: usize = 200_000;

/// Storage order: region file, then chunk, then top to bottom.
fn region_order(pos: BlockPos) -> (i32, i32, i32, i32, Reverse<i32>, i32, i32) {
    let chunk = pos.chunk();
    let (region_x, region_z) = chunk.region();
    (region_x, region_z, chunk.x, chunk.z, Reverse(pos.y), pos.x, pos.z)
}

/// Sort blocks so each chunk, and each region file, is written in one run.
pub fn sort_for_storage(blocks: &mut [LocatedBlock]) {
    if blocks.len() > PARALLEL_SORT_THRESHOLD {
        blocks.par_sort_unstable_by_key(|block| region_order(block.pos));
    } else {
        blocks.sort_unstable_by_key(|block| region_order(block.pos));
    }
}

/// Holds block writes until commit, then writes them grouped by chunk.
///
/// Reads see a buffered write until it reaches the next layer. Only the last
/// write to a position survives. Writes outside the next layer's height, as
/// well as biomes and entities, pass straight through.
///
/// Blocks a failed or cancelled commit did not write stay buffered for the
/// next commit.
pub struct ChunkBatchingExtent {
    inner: ExtentHandle,
    buffer: Rc<RefCell<BlockMap<BaseBlock>>>,
    enabled: bool,
}

impl ChunkBatchingExtent {
    #[must_use]
    pub fn new(inner: ExtentHandle, enabled: bool) -> Self {
        Self {
            inner,
            buffer: Rc::default(),
            enabled,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling keeps what is already buffered until the next commit.
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.borrow().len()
    }

    fn in_height(&self, pos: BlockPos) -> bool {
        let inner = self.inner.borrow();
        (inner.minimum_point().y..=inner.maximum_point().y).contains(&pos.y)
    }
}

impl Extent for ChunkBatchingExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn get_block(&self, pos: BlockPos) -> BlockState {
        if let Some(block) = self.buffer.borrow().get(pos) {
            return block.to_state();
        }
        self.inner.borrow().get_block(pos)
    }

    fn get_full_block(&self, pos: BlockPos) -> BaseBlock {
        if let Some(block) = self.buffer.borrow().get(pos) {
            return block.clone();
        }
        self.inner.borrow().get_full_block(pos)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        if !self.enabled || !self.in_height(pos) {
            return self.inner.borrow_mut().set_block(pos, block);
        }
        let status = WriteStatus::from_changed(!self.get_block(pos).equals_fuzzy(&block.to_state()));
        self.buffer.borrow_mut().insert(pos, block);
        Ok(status)
    }

    fn commit_required(&self) -> bool {
        self.enabled || !self.buffer.borrow().is_empty() || self.inner.borrow().commit_required()
    }

    fn commit_before(&mut self) -> Option<Box<dyn Operation>> {
        let mut blocks: Vec<LocatedBlock> = self
            .buffer
            .borrow()
            .iter()
            .map(|(pos, block)| LocatedBlock::new(pos, block.clone()))
            .collect();
        if blocks.is_empty() {
            return None;
        }
        sort_for_storage(&mut blocks);
        tracing::debug!(blocks = blocks.len(), "flushing chunk batch");
        let list: LocatedBlockList = blocks.into_iter().collect();
        let flush = SetLocatedBlocks::new(self.inner.clone(), list).settling(Rc::clone(&self.buffer));
        Some(Box::new(flush))
    }
}
