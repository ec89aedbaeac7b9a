//! Copying blocks and biomes between extents.

use std::sync::Arc;

use voxedit_core::{BlockPos, EditResult, Transform};

use super::RegionFunction;
use crate::extent::ExtentHandle;

/// Where a source position lands: `to + transform(pos - from)`.
fn destination_of(pos: BlockPos, from: BlockPos, to: BlockPos, transform: &dyn Transform) -> BlockPos {
    transform.apply((pos - from).to_vec3()).to_block_pos() + to
}

/// Copies the full block at each position from one extent into another.
pub struct ExtentBlockCopy {
    source: ExtentHandle,
    from: BlockPos,
    destination: ExtentHandle,
    to: BlockPos,
    transform: Arc<dyn Transform>,
}

impl ExtentBlockCopy {
    #[must_use]
    pub fn new(
        source: ExtentHandle,
        from: BlockPos,
        destination: ExtentHandle,
        to: BlockPos,
        transform: Arc<dyn Transform>,
    ) -> Self {
        Self {
            source,
            from,
            destination,
            to,
            transform,
        }
    }
}

impl RegionFunction for ExtentBlockCopy {
    fn apply(&mut self, pos: BlockPos) -> EditResult<bool> {
        let block = self.source.borrow().get_full_block(pos);
        let target = destination_of(pos, self.from, self.to, &*self.transform);
        self.destination.borrow_mut().set_block(target, block)?.into_result()
    }
}

/// Copies the biome at each position from one extent into another.
pub struct ExtentBiomeCopy {
    source: ExtentHandle,
    from: BlockPos,
    destination: ExtentHandle,
    to: BlockPos,
    transform: Arc<dyn Transform>,
}

impl ExtentBiomeCopy {
    #[must_use]
    pub fn new(
        source: ExtentHandle,
        from: BlockPos,
        destination: ExtentHandle,
        to: BlockPos,
        transform: Arc<dyn Transform>,
    ) -> Self {
        Self {
            source,
            from,
            destination,
            to,
            transform,
        }
    }
}

impl RegionFunction for ExtentBiomeCopy {
    fn apply(&mut self, pos: BlockPos) -> EditResult<bool> {
        let biome = self.source.borrow().get_biome(pos);
        let target = destination_of(pos, self.from, self.to, &*self.transform);
        self.destination.borrow_mut().set_biome(target, biome)?.into_result()
    }
}
