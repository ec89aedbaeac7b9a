//! Edits made the way a player in survival would make them.

use voxedit_core::{BaseBlock, BlockPos, EditResult, WriteStatus};

use crate::extent::{Extent, ExtentHandle};
use crate::world::WorldHandle;

/// Mines instead of clearing when `tool_use` is set, and strips metadata
/// from placed blocks when `strip_nbt` is set.
pub struct SurvivalModeExtent {
    inner: ExtentHandle,
    world: WorldHandle,
    tool_use: bool,
    strip_nbt: bool,
}

impl SurvivalModeExtent {
    #[must_use]
    pub const fn new(inner: ExtentHandle, world: WorldHandle) -> Self {
        Self {
            inner,
            world,
            tool_use: false,
            strip_nbt: false,
        }
    }

    pub const fn set_tool_use(&mut self, tool_use: bool) {
        self.tool_use = tool_use;
    }

    pub const fn set_strip_nbt(&mut self, strip_nbt: bool) {
        self.strip_nbt = strip_nbt;
    }
}

impl Extent for SurvivalModeExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        if self.tool_use && block.is_air() {
            let mined = self.world.borrow_mut().simulate_block_mine(pos)?;
            return Ok(WriteStatus::from_changed(mined));
        }
        let block = if self.strip_nbt { block.without_tag() } else { block };
        self.inner.borrow_mut().set_block(pos, block)
    }
}

#[cfg(test)]
mod tests {
    use voxedit_core::{BlockState, BlockType, TagCompound};

    use super::*;
    use crate::extent::shared;
    use crate::memory::{HostCall, MemoryWorld};

    #[test]
    fn test_tool_use_mines_air_writes() {
        let world = shared(MemoryWorld::new("w"));
        world.borrow_mut().set_block(BlockPos::ZERO, BlockType::STONE.into()).unwrap();
        let mut survival = SurvivalModeExtent::new(world.clone(), world.clone());
        survival.set_tool_use(true);

        let status = survival.set_block(BlockPos::ZERO, BaseBlock::air()).unwrap();
        assert_eq!(status, WriteStatus::Changed);
        assert!(world.borrow().calls().contains(&HostCall::SimulateBlockMine(BlockPos::ZERO)));
        assert!(world.borrow().get_block(BlockPos::ZERO).is_air());
    }

    #[test]
    fn test_strip_nbt() {
        let world = shared(MemoryWorld::new("w"));
        let mut survival = SurvivalModeExtent::new(world.clone(), world.clone());
        survival.set_strip_nbt(true);

        let chest = BlockState::new(BlockType::CHEST).with_tag(TagCompound::new());
        survival.set_block(BlockPos::ZERO, chest).unwrap();
        assert!(!world.borrow().get_full_block(BlockPos::ZERO).has_tag());
    }
}
