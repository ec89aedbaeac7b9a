//! Writing into the host world, and deferring the engine's reactions.

use hashbrown::HashSet;
use rustc_hash::FxBuildHasher;
use voxedit_core::{
    BaseBlock, BaseEntity, BiomeType, BlockPos, BlockState, EditError, EditResult, Entity, EntityId, Location, Region,
    SideEffectApplier, SideEffectSet, WriteStatus,
};
use voxedit_operation::{Operation, RunContext};

use crate::extent::{Extent, ExtentHandle};
use crate::world::WorldHandle;

/// The bottom of a chain: writes into the world with a fixed side-effect set.
pub struct WorldApplyingExtent {
    world: WorldHandle,
    side_effects: SideEffectSet,
}

impl WorldApplyingExtent {
    #[must_use]
    pub const fn new(world: WorldHandle, side_effects: SideEffectSet) -> Self {
        Self { world, side_effects }
    }

    #[must_use]
    pub const fn side_effects(&self) -> SideEffectSet {
        self.side_effects
    }
}

impl Extent for WorldApplyingExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        None
    }

    fn minimum_point(&self) -> BlockPos {
        self.world.borrow().minimum_point()
    }

    fn maximum_point(&self) -> BlockPos {
        self.world.borrow().maximum_point()
    }

    fn get_block(&self, pos: BlockPos) -> BlockState {
        self.world.borrow().get_block(pos)
    }

    fn get_full_block(&self, pos: BlockPos) -> BaseBlock {
        self.world.borrow().get_full_block(pos)
    }

    fn get_biome(&self, pos: BlockPos) -> BiomeType {
        self.world.borrow().get_biome(pos)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        self.world.borrow_mut().set_block_with(pos, block, self.side_effects)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        self.world.borrow_mut().set_biome(pos, biome)
    }

    fn entities(&self) -> Vec<Entity> {
        self.world.borrow().entities()
    }

    fn entities_in(&self, region: &dyn Region) -> Vec<Entity> {
        self.world.borrow().entities_in(region)
    }

    fn create_entity(&mut self, location: Location, entity: BaseEntity) -> EditResult<Option<EntityId>> {
        self.world.borrow_mut().create_entity(location, entity)
    }

    fn remove_entity(&mut self, id: EntityId) -> EditResult<bool> {
        self.world.borrow_mut().remove_entity(id)
    }
}

/// Remembers what each position held before the edit so `Delayed` side
/// effects can be applied once, at commit.
pub struct SideEffectExtent {
    inner: ExtentHandle,
    world: WorldHandle,
    side_effects: SideEffectSet,
    previous: Vec<(BlockPos, BlockState)>,
    seen: HashSet<BlockPos, FxBuildHasher>,
}

impl SideEffectExtent {
    #[must_use]
    pub fn new(inner: ExtentHandle, world: WorldHandle, side_effects: SideEffectSet) -> Self {
        Self {
            inner,
            world,
            side_effects,
            previous: Vec::new(),
            seen: HashSet::with_hasher(FxBuildHasher),
        }
    }

    /// Whether there is anything left for commit to apply.
    fn post_edit_simulation(&self) -> bool {
        self.side_effects.has_delayed()
    }
}

impl Extent for SideEffectExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        if self.post_edit_simulation() && !self.seen.contains(&pos) {
            let previous = self.inner.borrow().get_block(pos);
            let status = self.inner.borrow_mut().set_block(pos, block)?;
            if status.is_accepted() {
                self.seen.insert(pos);
                self.previous.push((pos, previous));
            }
            return Ok(status);
        }
        self.inner.borrow_mut().set_block(pos, block)
    }

    fn commit_required(&self) -> bool {
        self.post_edit_simulation() || self.inner.borrow().commit_required()
    }

    fn commit_before(&mut self) -> Option<Box<dyn Operation>> {
        if self.previous.is_empty() {
            return None;
        }
        self.seen.clear();
        let positions = std::mem::take(&mut self.previous);
        tracing::debug!(positions = positions.len(), "applying delayed side effects");
        Some(Box::new(ApplySideEffects {
            world: self.world.clone(),
            applier: SideEffectApplier::deferred(self.side_effects),
            positions: positions.into_iter(),
        }))
    }
}

struct ApplySideEffects {
    world: WorldHandle,
    applier: SideEffectApplier,
    positions: std::vec::IntoIter<(BlockPos, BlockState)>,
}

impl Operation for ApplySideEffects {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        loop {
            let Some((pos, previous)) = self.positions.next() else {
                return Ok(None);
            };
            self.world.borrow_mut().apply_side_effects(pos, &previous, self.applier)?;
            if !run.should_continue() {
                return Ok(Some(self));
            }
        }
    }

    fn cancel(&mut self) {
        self.positions = Vec::new().into_iter();
    }

    fn status(&self, messages: &mut Vec<String>) {
        messages.push(format!("{} positions awaiting side effects", self.positions.len()));
    }
}
