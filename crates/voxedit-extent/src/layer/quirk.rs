//! Engine quirks that must be dealt with before a write lands.

use voxedit_core::{BaseBlock, BiomeType, BlockPos, BlockStateHolder, BlockType, EditResult, SideEffectSet, WriteStatus};

use crate::extent::{Extent, ExtentHandle};
use crate::world::WorldHandle;

/// Stops replaced blocks from dropping their contents.
///
/// Containers are emptied first. Ice is removed without updates first, as
/// breaking it with updates would leave water behind.
pub struct BlockQuirkExtent {
    inner: ExtentHandle,
    world: WorldHandle,
}

impl BlockQuirkExtent {
    #[must_use]
    pub const fn new(inner: ExtentHandle, world: WorldHandle) -> Self {
        Self { inner, world }
    }
}

impl Extent for BlockQuirkExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        let state = self.world.borrow().get_block(pos);
        let existing = state.block_type();
        if existing.has_container() {
            self.world.borrow_mut().clear_container_block_contents(pos);
        } else if *existing == BlockType::ICE {
            self.world.borrow_mut().set_block_with(pos, BaseBlock::air(), SideEffectSet::none())?;
        }
        self.inner.borrow_mut().set_block(pos, block)
    }
}

/// Collapses biome writes to `y = 0` on worlds that store one biome per
/// column.
pub struct BiomeQuirkExtent {
    inner: ExtentHandle,
    world: WorldHandle,
}

impl BiomeQuirkExtent {
    #[must_use]
    pub const fn new(inner: ExtentHandle, world: WorldHandle) -> Self {
        Self { inner, world }
    }
}

impl Extent for BiomeQuirkExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        let pos = if self.world.borrow().fully_supports_3d_biomes() {
            pos
        } else {
            pos.with_y(0)
        };
        self.inner.borrow_mut().set_biome(pos, biome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::shared;
    use crate::memory::{HostCall, MemoryWorld};

    #[test]
    fn test_container_is_emptied_before_replacement() {
        let world = shared(MemoryWorld::new("w"));
        let pos = BlockPos::new(3, 4, 5);
        world.borrow_mut().set_block(pos, BlockType::CHEST.into()).unwrap();
        world.borrow_mut().take_calls();

        let mut quirk = BlockQuirkExtent::new(world.clone(), world.clone());
        quirk.set_block(pos, BlockType::STONE.into()).unwrap();

        let calls = world.borrow_mut().take_calls();
        assert_eq!(calls[0], HostCall::ClearContainer(pos));
        assert_eq!(world.borrow().get_block(pos).block_type(), &BlockType::STONE);
    }

    #[test]
    fn test_ice_is_removed_silently() {
        let world = shared(MemoryWorld::new("w"));
        let pos = BlockPos::new(0, 1, 0);
        world.borrow_mut().set_block(pos, BlockType::ICE.into()).unwrap();
        world.borrow_mut().take_calls();

        let mut quirk = BlockQuirkExtent::new(world.clone(), world.clone());
        quirk.set_block(pos, BlockType::STONE.into()).unwrap();

        let calls = world.borrow_mut().take_calls();
        assert_eq!(
            calls[0],
            HostCall::SetBlock {
                pos,
                side_effects: SideEffectSet::none()
            }
        );
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_biomes_collapse_on_2d_worlds() {
        let world = shared(MemoryWorld::new("w").with_2d_biomes());
        let mut quirk = BiomeQuirkExtent::new(world.clone(), world.clone());
        quirk.set_biome(BlockPos::new(1, 80, 1), BiomeType::DESERT).unwrap();
        assert_eq!(world.borrow().get_biome(BlockPos::new(1, 0, 1)), BiomeType::DESERT);
    }
}
