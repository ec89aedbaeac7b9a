use voxedit_core::{BaseBlock, BiomeType, BlockPos, EditResult, Mask, Masks, WriteStatus};

use crate::extent::{Extent, ExtentHandle};

/// Rejects writes at positions that fail a mask, without consulting the
/// layers below.
pub struct MaskingExtent {
    inner: ExtentHandle,
    mask: Box<dyn Mask>,
}

impl MaskingExtent {
    #[must_use]
    pub fn new(inner: ExtentHandle, mask: Box<dyn Mask>) -> Self {
        Self { inner, mask }
    }

    /// A mask that lets everything through.
    #[must_use]
    pub fn permissive(inner: ExtentHandle) -> Self {
        Self::new(inner, Masks::always_true())
    }

    pub fn set_mask(&mut self, mask: Box<dyn Mask>) {
        self.mask = mask;
    }
}

impl Extent for MaskingExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        if !self.mask.test(pos) {
            return Ok(WriteStatus::Rejected);
        }
        self.inner.borrow_mut().set_block(pos, block)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        if !self.mask.test(pos) {
            return Ok(WriteStatus::Rejected);
        }
        self.inner.borrow_mut().set_biome(pos, biome)
    }
}

/// Passes positions where an extent holds something other than air.
///
/// Reads the extent on every test, so it must not mask writes into that
/// same extent layer.
pub struct ExistingBlockMask {
    extent: ExtentHandle,
}

impl ExistingBlockMask {
    #[must_use]
    pub const fn new(extent: ExtentHandle) -> Self {
        Self { extent }
    }
}

impl Mask for ExistingBlockMask {
    fn test(&self, pos: BlockPos) -> bool {
        !self.extent.borrow().get_block(pos).is_air()
    }
}

#[cfg(test)]
mod tests {
    use voxedit_core::BlockType;

    use super::*;
    use crate::extent::shared;
    use crate::memory::MemoryWorld;

    #[test]
    fn test_mask_blocks_writes() {
        let world = shared(MemoryWorld::new("w"));
        let mut masked = MaskingExtent::new(world.clone(), Box::new(|pos: BlockPos| pos.x >= 0));

        let status = masked.set_block(BlockPos::new(-1, 0, 0), BlockType::STONE.into()).unwrap();
        assert_eq!(status, WriteStatus::Rejected);
        let status = masked.set_block(BlockPos::new(1, 0, 0), BlockType::STONE.into()).unwrap();
        assert!(status.is_accepted());
        assert_eq!(world.borrow().block_count(), 1);
    }

    #[test]
    fn test_existing_block_mask() {
        let world = shared(MemoryWorld::new("w"));
        world.borrow_mut().set_block(BlockPos::ZERO, BlockType::STONE.into()).unwrap();
        let mask = ExistingBlockMask::new(world);
        assert!(mask.test(BlockPos::ZERO));
        assert!(!mask.test(BlockPos::new(0, 1, 0)));
    }
}
