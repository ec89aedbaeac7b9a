//! Keep the host's watchdog fed during long edits.

use std::rc::Rc;

use voxedit_core::{BaseBlock, BaseEntity, BiomeType, BlockPos, EditResult, EntityId, Location, WriteStatus};

use crate::extent::{Extent, ExtentHandle};
use crate::world::Watchdog;

/// Ticks a [`Watchdog`] before every mutation that reaches it.
pub struct WatchdogTickingExtent {
    inner: ExtentHandle,
    watchdog: Rc<dyn Watchdog>,
    enabled: bool,
}

impl WatchdogTickingExtent {
    #[must_use]
    pub fn new(inner: ExtentHandle, watchdog: Rc<dyn Watchdog>) -> Self {
        Self {
            inner,
            watchdog,
            enabled: true,
        }
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn tick(&self) {
        if self.enabled {
            self.watchdog.tick();
        }
    }
}

impl Extent for WatchdogTickingExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        self.tick();
        self.inner.borrow_mut().set_block(pos, block)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        self.tick();
        self.inner.borrow_mut().set_biome(pos, biome)
    }

    fn create_entity(&mut self, location: Location, entity: BaseEntity) -> EditResult<Option<EntityId>> {
        self.tick();
        self.inner.borrow_mut().create_entity(location, entity)
    }

    fn remove_entity(&mut self, id: EntityId) -> EditResult<bool> {
        self.tick();
        self.inner.borrow_mut().remove_entity(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use voxedit_core::BlockType;

    use super::*;
    use crate::extent::shared;
    use crate::memory::MemoryWorld;

    #[derive(Default)]
    struct CountingWatchdog(Cell<usize>);

    impl Watchdog for CountingWatchdog {
        fn tick(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_ticks_on_every_mutation() {
        let dog = Rc::new(CountingWatchdog::default());
        let world = shared(MemoryWorld::new("w"));
        let mut extent = WatchdogTickingExtent::new(world, dog.clone());

        extent.set_block(BlockPos::ZERO, BlockType::STONE.into()).unwrap();
        extent.set_biome(BlockPos::ZERO, BiomeType::DESERT).unwrap();
        let _ = extent.get_block(BlockPos::ZERO);
        assert_eq!(dog.0.get(), 2);

        extent.set_enabled(false);
        extent.set_block(BlockPos::ONE, BlockType::STONE.into()).unwrap();
        assert_eq!(dog.0.get(), 2);
    }
}
