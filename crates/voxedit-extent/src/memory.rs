//! An in-memory world.
//!
//! Useful as a clipboard and as the host in tests: besides storing blocks,
//! biomes and entities it records every engine hook it receives.

use std::collections::BTreeMap;

use hashbrown::HashSet;
use rustc_hash::FxBuildHasher;
use voxedit_core::{
    BaseBlock, BaseEntity, BiomeType, BlockMap, BlockPos, BlockState, BlockStateHolder, ChunkPos, EditResult, Entity,
    EntityId, Location, Region, SideEffectApplier, SideEffectSet, WriteStatus,
};

use crate::extent::{Extent, ExtentHandle};
use crate::world::World;

/// An engine hook received by a [`MemoryWorld`].
#[derive(Clone, Debug, PartialEq)]
pub enum HostCall {
    SetBlock { pos: BlockPos, side_effects: SideEffectSet },
    CheckLoadedChunk(ChunkPos),
    FixAfterFastMode(Vec<ChunkPos>),
    NotifyAndLight(BlockPos),
    SimulateBlockMine(BlockPos),
    ClearContainer(BlockPos),
    ApplySideEffects { pos: BlockPos, applier: SideEffectApplier },
}

#[derive(Debug)]
pub struct MemoryWorld {
    name: String,
    min_y: i32,
    max_y: i32,
    biomes_3d: bool,
    blocks: BlockMap<BaseBlock>,
    biomes: BlockMap<BiomeType>,
    entities: BTreeMap<EntityId, Entity>,
    next_entity: u64,
    loaded: HashSet<ChunkPos, FxBuildHasher>,
    calls: Vec<HostCall>,
}

impl MemoryWorld {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_y: -64,
            max_y: 319,
            biomes_3d: true,
            blocks: BlockMap::new(),
            biomes: BlockMap::new(),
            entities: BTreeMap::new(),
            next_entity: 1,
            loaded: HashSet::with_hasher(FxBuildHasher),
            calls: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_height(mut self, min_y: i32, max_y: i32) -> Self {
        self.min_y = min_y;
        self.max_y = max_y;
        self
    }

    /// Store one biome per column, as older engines do.
    #[must_use]
    pub const fn with_2d_biomes(mut self) -> Self {
        self.biomes_3d = false;
        self
    }

    /// Every non-air block, ordered by position.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<BlockPos, BaseBlock> {
        self.blocks.iter().map(|(pos, block)| (pos, block.clone())).collect()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    #[must_use]
    pub fn is_loaded(&self, chunk: ChunkPos) -> bool {
        self.loaded.contains(&chunk)
    }

    const fn in_height(&self, pos: BlockPos) -> bool {
        pos.y >= self.min_y && pos.y <= self.max_y
    }

    fn biome_key(&self, pos: BlockPos) -> BlockPos {
        if self.biomes_3d { pos } else { pos.with_y(0) }
    }
}

impl Extent for MemoryWorld {
    fn delegate(&self) -> Option<&ExtentHandle> {
        None
    }

    fn minimum_point(&self) -> BlockPos {
        BlockPos::new(-30_000_000, self.min_y, -30_000_000)
    }

    fn maximum_point(&self) -> BlockPos {
        BlockPos::new(30_000_000, self.max_y, 30_000_000)
    }

    fn get_block(&self, pos: BlockPos) -> BlockState {
        self.blocks.get(pos).map_or_else(BlockState::air, BlockStateHolder::to_state)
    }

    fn get_full_block(&self, pos: BlockPos) -> BaseBlock {
        self.blocks.get(pos).cloned().unwrap_or_default()
    }

    fn get_biome(&self, pos: BlockPos) -> BiomeType {
        self.biomes.get(self.biome_key(pos)).cloned().unwrap_or_default()
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        self.set_block_with(pos, block, SideEffectSet::defaults())
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        if !self.in_height(pos) {
            return Ok(WriteStatus::Rejected);
        }
        let key = self.biome_key(pos);
        let previous = self.biomes.insert(key, biome.clone());
        Ok(WriteStatus::from_changed(previous.unwrap_or_default() != biome))
    }

    fn entities(&self) -> Vec<Entity> {
        self.entities.values().cloned().collect()
    }

    fn entities_in(&self, region: &dyn Region) -> Vec<Entity> {
        self.entities
            .values()
            .filter(|entity| region.contains(entity.location.position.to_block_pos()))
            .cloned()
            .collect()
    }

    fn create_entity(&mut self, location: Location, entity: BaseEntity) -> EditResult<Option<EntityId>> {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        let pasteable = entity.type_id != "minecraft:player";
        self.entities.insert(
            id,
            Entity {
                id,
                location,
                state: entity,
                pasteable,
            },
        );
        Ok(Some(id))
    }

    fn remove_entity(&mut self, id: EntityId) -> EditResult<bool> {
        Ok(self.entities.remove(&id).is_some())
    }
}

impl World for MemoryWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }

    fn max_y(&self) -> i32 {
        self.max_y
    }

    fn set_block_with(&mut self, pos: BlockPos, block: BaseBlock, side_effects: SideEffectSet) -> EditResult<WriteStatus> {
        if !self.in_height(pos) {
            return Ok(WriteStatus::Rejected);
        }
        self.calls.push(HostCall::SetBlock { pos, side_effects });
        let previous = if block.is_air() && !block.has_tag() {
            self.blocks.remove(pos)
        } else {
            self.blocks.insert(pos, block.clone())
        };
        Ok(WriteStatus::from_changed(previous.unwrap_or_default() != block))
    }

    fn check_loaded_chunk(&mut self, pos: BlockPos) {
        let chunk = pos.chunk();
        if self.loaded.insert(chunk) {
            self.calls.push(HostCall::CheckLoadedChunk(chunk));
        }
    }

    fn fix_after_fast_mode(&mut self, chunks: &[ChunkPos]) {
        self.calls.push(HostCall::FixAfterFastMode(chunks.to_vec()));
    }

    fn notify_and_light_block(&mut self, pos: BlockPos, _previous: &BlockState) -> EditResult<()> {
        self.calls.push(HostCall::NotifyAndLight(pos));
        Ok(())
    }

    fn simulate_block_mine(&mut self, pos: BlockPos) -> EditResult<bool> {
        self.calls.push(HostCall::SimulateBlockMine(pos));
        Ok(self.blocks.remove(pos).is_some())
    }

    fn clear_container_block_contents(&mut self, pos: BlockPos) -> bool {
        self.calls.push(HostCall::ClearContainer(pos));
        let Some(block) = self.blocks.get(pos) else {
            return false;
        };
        if !block.block_type().has_container() {
            return false;
        }
        let cleared = block.clone().without_tag();
        self.blocks.insert(pos, cleared);
        true
    }

    fn apply_side_effects(&mut self, pos: BlockPos, _previous: &BlockState, applier: SideEffectApplier) -> EditResult<()> {
        self.calls.push(HostCall::ApplySideEffects { pos, applier });
        Ok(())
    }

    fn fully_supports_3d_biomes(&self) -> bool {
        self.biomes_3d
    }
}
