//! The extent capability and its delegate chain.
//!
//! Every decorator names the next layer through [`Extent::delegate`]; the
//! default method bodies forward to it. A layer with no delegate behaves as
//! an empty void: reads yield air and the default biome, writes are
//! rejected.

use std::cell::RefCell;
use std::rc::Rc;

use voxedit_core::{
    BaseBlock, BaseEntity, BiomeType, BlockPos, BlockState, EditResult, Entity, EntityId, Location, Region,
    WriteStatus,
};
use voxedit_operation::{Operation, Operations, RunContext};

/// A shared, single-threaded reference to one layer of a chain.
pub type ExtentHandle = Rc<RefCell<dyn Extent>>;

/// Wrap an extent so it can be shared between layers and commit operations.
pub fn shared<E: Extent + 'static>(extent: E) -> Rc<RefCell<E>> {
    Rc::new(RefCell::new(extent))
}

/// A readable, writable view of voxels, biomes and entities.
///
/// Reads never fail: positions outside the extent read as air. Writes
/// return a [`WriteStatus`] hint; only host failures and similar are errors.
pub trait Extent {
    /// The next layer down, if any.
    fn delegate(&self) -> Option<&ExtentHandle>;

    fn minimum_point(&self) -> BlockPos {
        self.delegate().map_or(BlockPos::ZERO, |next| next.borrow().minimum_point())
    }

    fn maximum_point(&self) -> BlockPos {
        self.delegate().map_or(BlockPos::ZERO, |next| next.borrow().maximum_point())
    }

    fn get_block(&self, pos: BlockPos) -> BlockState {
        self.delegate().map_or_else(BlockState::air, |next| next.borrow().get_block(pos))
    }

    /// The block including its metadata.
    fn get_full_block(&self, pos: BlockPos) -> BaseBlock {
        self.delegate().map_or_else(BaseBlock::air, |next| next.borrow().get_full_block(pos))
    }

    fn get_biome(&self, pos: BlockPos) -> BiomeType {
        self.delegate().map_or_else(BiomeType::default, |next| next.borrow().get_biome(pos))
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        match self.delegate() {
            Some(next) => next.borrow_mut().set_block(pos, block),
            None => Ok(WriteStatus::Rejected),
        }
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        match self.delegate() {
            Some(next) => next.borrow_mut().set_biome(pos, biome),
            None => Ok(WriteStatus::Rejected),
        }
    }

    fn entities(&self) -> Vec<Entity> {
        self.delegate().map_or_else(Vec::new, |next| next.borrow().entities())
    }

    /// Entities whose location lies inside `region`.
    fn entities_in(&self, region: &dyn Region) -> Vec<Entity> {
        self.delegate()
            .map_or_else(Vec::new, |next| next.borrow().entities_in(region))
    }

    /// Spawn an entity. `None` when this extent cannot hold entities.
    fn create_entity(&mut self, location: Location, entity: BaseEntity) -> EditResult<Option<EntityId>> {
        match self.delegate() {
            Some(next) => next.borrow_mut().create_entity(location, entity),
            None => Ok(None),
        }
    }

    fn remove_entity(&mut self, id: EntityId) -> EditResult<bool> {
        match self.delegate() {
            Some(next) => next.borrow_mut().remove_entity(id),
            None => Ok(false),
        }
    }

    /// Whether [`Extent::commit`] has work to do for this layer or any layer
    /// below it.
    ///
    /// Answered from configuration, never from buffered contents: outer
    /// layers may flush into this one after the commit chain is built.
    fn commit_required(&self) -> bool {
        self.delegate().is_some_and(|next| next.borrow().commit_required())
    }

    /// Work this layer must do before the layers below commit.
    fn commit_before(&mut self) -> Option<Box<dyn Operation>> {
        None
    }

    /// Work this layer must do after the layers below have committed.
    fn commit_after(&mut self) -> Option<Box<dyn Operation>> {
        None
    }

    /// Build the operation that makes every buffered or deferred effect of
    /// this chain durable, or `None` when nothing is pending.
    ///
    /// The delegate's own commit is only built once this layer's
    /// `commit_before` step has finished, so anything flushed into it is
    /// included.
    fn commit(&mut self) -> Option<Box<dyn Operation>> {
        let before = self.commit_before();
        let below = self
            .delegate()
            .filter(|next| next.borrow().commit_required())
            .map(|next| DeferredCommit::boxed(Rc::clone(next)));
        let after = self.commit_after();
        Operations::sequence([before, below, after])
    }
}

/// Commits a layer when first resumed rather than when built.
struct DeferredCommit {
    target: ExtentHandle,
}

impl DeferredCommit {
    fn boxed(target: ExtentHandle) -> Box<dyn Operation> {
        Box::new(Self { target })
    }
}

impl Operation for DeferredCommit {
    fn resume(self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        let commit = self.target.borrow_mut().commit();
        match commit {
            Some(operation) => operation.resume(run),
            None => Ok(None),
        }
    }

    fn cancel(&mut self) {}
}

/// An extent with nothing in it that rejects every write.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullExtent;

impl Extent for NullExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        None
    }
}
