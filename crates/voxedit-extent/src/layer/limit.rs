use voxedit_core::{BaseBlock, BiomeType, BlockPos, EditResult, WriteStatus};

use crate::extent::{Extent, ExtentHandle};

/// Caps the number of block and biome writes an edit may attempt.
pub struct ChangeLimitExtent {
    inner: ExtentHandle,
    limit: Option<usize>,
    count: usize,
    warned: bool,
}

impl ChangeLimitExtent {
    /// `None` means unlimited.
    #[must_use]
    pub const fn new(inner: ExtentHandle, limit: Option<usize>) -> Self {
        Self {
            inner,
            limit,
            count: 0,
            warned: false,
        }
    }

    /// Writes attempted so far, including refused ones below this layer.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub const fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
        self.warned = false;
    }

    fn admit(&mut self, pos: BlockPos) -> Option<WriteStatus> {
        if let Some(limit) = self.limit
            && self.count >= limit
        {
            if !self.warned {
                self.warned = true;
                tracing::warn!(limit, ?pos, "change limit reached");
            }
            return Some(WriteStatus::LimitReached { limit });
        }
        self.count += 1;
        None
    }
}

impl Extent for ChangeLimitExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        if let Some(refused) = self.admit(pos) {
            return Ok(refused);
        }
        self.inner.borrow_mut().set_block(pos, block)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        if let Some(refused) = self.admit(pos) {
            return Ok(refused);
        }
        self.inner.borrow_mut().set_biome(pos, biome)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use voxedit_core::BlockType;

    use super::*;
    use crate::extent::shared;
    use crate::memory::MemoryWorld;

    #[test]
    fn test_writes_past_limit_are_refused() {
        let world = shared(MemoryWorld::new("w"));
        let mut limited = ChangeLimitExtent::new(world.clone(), Some(2));

        for x in 0..2 {
            let status = limited.set_block(BlockPos::new(x, 0, 0), BlockType::STONE.into()).unwrap();
            assert!(status.is_accepted());
        }
        for x in 2..4 {
            let status = limited.set_block(BlockPos::new(x, 0, 0), BlockType::STONE.into()).unwrap();
            assert_eq!(status, WriteStatus::LimitReached { limit: 2 });
        }
        assert_eq!(world.borrow().block_count(), 2);
        assert_eq!(Rc::strong_count(&world), 2);
    }

    #[test]
    fn test_unlimited() {
        let world = shared(MemoryWorld::new("w"));
        let mut limited = ChangeLimitExtent::new(world, None);
        for x in 0..100 {
            limited.set_block(BlockPos::new(x, 0, 0), BlockType::STONE.into()).unwrap();
        }
        assert_eq!(limited.count(), 100);
    }
}
