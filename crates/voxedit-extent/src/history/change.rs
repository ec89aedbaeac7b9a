use core::fmt;
use std::cell::Cell;
use std::rc::Rc;

use voxedit_core::{BaseBlock, BaseEntity, BiomeType, BlockPos, EditResult, EntityId, Location};

use crate::extent::ExtentHandle;

/// Where undo and redo are applied.
#[derive(Clone)]
pub struct UndoContext {
    extent: ExtentHandle,
}

impl UndoContext {
    #[must_use]
    pub const fn new(extent: ExtentHandle) -> Self {
        Self { extent }
    }

    #[must_use]
    pub const fn extent(&self) -> &ExtentHandle {
        &self.extent
    }
}

impl fmt::Debug for UndoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoContext").finish_non_exhaustive()
    }
}

/// The live id of an entity touched by an edit.
///
/// Undoing a removal spawns a new entity with a new id; every change that
/// refers to the same entity shares this cell so later replays find it.
#[derive(Clone, Default)]
pub struct TrackedEntity(Rc<Cell<Option<EntityId>>>);

impl TrackedEntity {
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self(Rc::new(Cell::new(Some(id))))
    }

    /// `None` while the entity does not exist.
    #[must_use]
    pub fn id(&self) -> Option<EntityId> {
        self.0.get()
    }

    fn set(&self, id: Option<EntityId>) {
        self.0.set(id);
    }
}

impl fmt::Debug for TrackedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "TrackedEntity({id:?})"),
            None => f.write_str("TrackedEntity(gone)"),
        }
    }
}

/// One reversible mutation.
#[derive(Clone, Debug)]
pub enum Change {
    Block {
        pos: BlockPos,
        previous: BaseBlock,
        current: BaseBlock,
    },
    Biome {
        pos: BlockPos,
        previous: BiomeType,
        current: BiomeType,
    },
    EntityCreate {
        entity: TrackedEntity,
        location: Location,
        state: BaseEntity,
    },
    EntityRemove {
        entity: TrackedEntity,
        location: Location,
        state: BaseEntity,
    },
}

impl Change {
    /// Put the world back the way it was before this change.
    pub fn undo(&self, context: &UndoContext) -> EditResult<()> {
        let mut extent = context.extent().borrow_mut();
        match self {
            Self::Block { pos, previous, .. } => {
                extent.set_block(*pos, previous.clone())?;
            }
            Self::Biome { pos, previous, .. } => {
                extent.set_biome(*pos, previous.clone())?;
            }
            Self::EntityCreate { entity, .. } => {
                if let Some(id) = entity.id()
                    && extent.remove_entity(id)?
                {
                    entity.set(None);
                }
            }
            Self::EntityRemove { entity, location, state } => {
                let id = extent.create_entity(*location, state.clone())?;
                entity.set(id);
            }
        }
        Ok(())
    }

    /// Apply this change again after an undo.
    pub fn redo(&self, context: &UndoContext) -> EditResult<()> {
        let mut extent = context.extent().borrow_mut();
        match self {
            Self::Block { pos, current, .. } => {
                extent.set_block(*pos, current.clone())?;
            }
            Self::Biome { pos, current, .. } => {
                extent.set_biome(*pos, current.clone())?;
            }
            Self::EntityCreate { entity, location, state } => {
                let id = extent.create_entity(*location, state.clone())?;
                entity.set(id);
            }
            Self::EntityRemove { entity, .. } => {
                if let Some(id) = entity.id()
                    && extent.remove_entity(id)?
                {
                    entity.set(None);
                }
            }
        }
        Ok(())
    }
}
