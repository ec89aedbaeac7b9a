//! Copying entities between extents.

use std::sync::Arc;

use voxedit_core::{BaseEntity, BlockPos, EditResult, Entity, Location, Tag, TagCompound, Transform, Transforms, Vec3};

use super::EntityFunction;
use crate::extent::ExtentHandle;

const CENTER: Vec3 = Vec3::new(0.5, 0.5, 0.5);

const DOWN: Vec3 = Vec3::new(0.0, -1.0, 0.0);
const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const NORTH: Vec3 = Vec3::new(0.0, 0.0, -1.0);
const SOUTH: Vec3 = Vec3::new(0.0, 0.0, 1.0);
const WEST: Vec3 = Vec3::new(-1.0, 0.0, 0.0);
const EAST: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// `Facing` values of hanging entities, indexed by data value.
const HANGING_FACINGS: [Vec3; 6] = [DOWN, UP, NORTH, SOUTH, WEST, EAST];

/// Paintings only hang on walls and number their facings differently.
const PAINTING_FACINGS: [Vec3; 4] = [SOUTH, WEST, NORTH, EAST];

/// Integer `(X, Y, Z)` stored under three keys of a compound.
fn tile_position(tag: &TagCompound, keys: [&str; 3]) -> Option<Vec3> {
    let [x, y, z] = keys.map(|key| tag.get(key).and_then(Tag::as_i64));
    Some(Vec3::new(x? as f64, y? as f64, z? as f64))
}

fn put_tile_position(tag: &mut TagCompound, keys: [&str; 3], pos: BlockPos) {
    tag.insert(keys[0], pos.x);
    tag.insert(keys[1], pos.y);
    tag.insert(keys[2], pos.z);
}

/// Copies entities into a destination, moving them the way
/// [`super::ExtentBlockCopy`] moves blocks.
///
/// Entity positions pivot on block centers. Hanging entities (`TileX/Y/Z`)
/// and leash knots (`Leash.X/Y/Z`) have their stored block positions moved
/// as well, and a hanging entity's `Facing` snaps to the nearest face after
/// the transform.
pub struct ExtentEntityCopy {
    source: ExtentHandle,
    from: Vec3,
    destination: ExtentHandle,
    to: Vec3,
    transform: Arc<dyn Transform>,
    removing: bool,
}

impl ExtentEntityCopy {
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
            from: from.to_vec3(),
            destination,
            to: to.to_vec3(),
            transform,
            removing: false,
        }
    }

    /// Remove each source entity once its copy exists.
    #[must_use]
    pub const fn removing(mut self, removing: bool) -> Self {
        self.removing = removing;
        self
    }

    fn move_block(&self, pos: Vec3) -> BlockPos {
        (self.transform.apply(pos - self.from) + self.to).to_block_pos()
    }

    fn transform_tag(&self, state: BaseEntity) -> BaseEntity {
        let Some(mut tag) = state.tag.clone() else {
            return state;
        };
        if let Some(leash) = tag.get("Leash").and_then(Tag::as_compound)
            && let Some(knot) = tile_position(leash, ["X", "Y", "Z"])
        {
            let mut leash = leash.clone();
            put_tile_position(&mut leash, ["X", "Y", "Z"], self.move_block(knot));
            tag.insert("Leash", leash);
            return state.with_tag(tag);
        }
        if let Some(tile) = tile_position(&tag, ["TileX", "TileY", "TileZ"]) {
            put_tile_position(&mut tag, ["TileX", "TileY", "TileZ"], self.move_block(tile));
            let facings: &[Vec3] = if state.type_id == "minecraft:painting" {
                &PAINTING_FACINGS
            } else {
                &HANGING_FACINGS
            };
            if let Some(facing) = tag.get("Facing").and_then(Tag::as_i64)
                && let Some(rotated) = self.rotate_facing(facing, facings)
            {
                tag.insert("Facing", rotated);
            }
            return state.with_tag(tag);
        }
        state
    }

    /// The facing closest to `facing` once transformed. `None` for an unknown
    /// value or a transform that flattens the direction.
    fn rotate_facing(&self, facing: i64, facings: &[Vec3]) -> Option<i8> {
        let direction = *facings.get(usize::try_from(facing).ok()?)?;
        let moved = Transforms::apply_direction(&*self.transform, direction);
        let (closest, alignment) = facings
            .iter()
            .map(|candidate| candidate.dot(moved))
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        if alignment <= 0.0 {
            return None;
        }
        i8::try_from(closest).ok()
    }
}

impl EntityFunction for ExtentEntityCopy {
    fn apply(&mut self, entity: &Entity) -> EditResult<bool> {
        let tile = entity
            .state
            .tag
            .as_ref()
            .and_then(|tag| tile_position(tag, ["TileX", "TileY", "TileZ"]));
        let position = tile.map_or(entity.location.position, |tile| tile + CENTER);

        let pivot = self.from + CENTER;
        let moved = self.transform.apply(position - pivot);
        let moved = if tile.is_some() { moved - CENTER } else { moved };
        let location = Location {
            position: moved + self.to + CENTER,
            ..entity.location
        };
        let location = if self.transform.is_identity() {
            location
        } else {
            location.facing(Transforms::apply_direction(&*self.transform, entity.location.direction()))
        };

        let state = self.transform_tag(entity.state.clone());
        let created = self.destination.borrow_mut().create_entity(location, state)?.is_some();
        if created && self.removing {
            self.source.borrow_mut().remove_entity(entity.id)?;
        }
        Ok(created)
    }
}
