use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use voxedit_core::{BaseBlock, BaseEntity, BiomeType, BlockPos, EditResult, EntityId, Location, WriteStatus};

use super::change::{Change, TrackedEntity};
use super::change_set::ChangeSet;
use crate::extent::{Extent, ExtentHandle};

/// Records every accepted write below it into a change set.
pub struct ChangeSetExtent {
    inner: ExtentHandle,
    change_set: Rc<RefCell<dyn ChangeSet>>,
    tracked: HashMap<EntityId, TrackedEntity, FxBuildHasher>,
}

impl ChangeSetExtent {
    #[must_use]
    pub fn new(inner: ExtentHandle, change_set: Rc<RefCell<dyn ChangeSet>>) -> Self {
        Self {
            inner,
            change_set,
            tracked: HashMap::with_hasher(FxBuildHasher),
        }
    }

    fn recording(&self) -> bool {
        self.change_set.borrow().is_recording()
    }

    fn record(&self, change: Change) {
        self.change_set.borrow_mut().add(change);
    }

    /// The shared live id for an entity, so a create and a later remove of
    /// the same entity replay consistently.
    fn track(&mut self, id: EntityId) -> TrackedEntity {
        self.tracked
            .entry(id)
            .or_insert_with(|| TrackedEntity::new(id))
            .clone()
    }
}

impl Extent for ChangeSetExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        if !self.recording() {
            return self.inner.borrow_mut().set_block(pos, block);
        }
        let previous = self.inner.borrow().get_full_block(pos);
        let status = self.inner.borrow_mut().set_block(pos, block.clone())?;
        if status.is_accepted() {
            self.record(Change::Block {
                pos,
                previous,
                current: block,
            });
        }
        Ok(status)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        if !self.recording() {
            return self.inner.borrow_mut().set_biome(pos, biome);
        }
        let previous = self.inner.borrow().get_biome(pos);
        let status = self.inner.borrow_mut().set_biome(pos, biome.clone())?;
        if status.is_accepted() {
            self.record(Change::Biome {
                pos,
                previous,
                current: biome,
            });
        }
        Ok(status)
    }

    fn create_entity(&mut self, location: Location, entity: BaseEntity) -> EditResult<Option<EntityId>> {
        let created = self.inner.borrow_mut().create_entity(location, entity.clone())?;
        if let Some(id) = created
            && self.recording()
        {
            let tracked = self.track(id);
            self.record(Change::EntityCreate {
                entity: tracked,
                location,
                state: entity,
            });
        }
        Ok(created)
    }

    fn remove_entity(&mut self, id: EntityId) -> EditResult<bool> {
        let snapshot = if self.recording() {
            self.inner.borrow().entities().into_iter().find(|entity| entity.id == id)
        } else {
            None
        };
        let removed = self.inner.borrow_mut().remove_entity(id)?;
        if removed && let Some(snapshot) = snapshot {
            let tracked = self.track(id);
            self.record(Change::EntityRemove {
                entity: tracked,
                location: snapshot.location,
                state: snapshot.state,
            });
        }
        Ok(removed)
    }
}
