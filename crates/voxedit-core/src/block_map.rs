//! Position-keyed block storage.

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::block::BaseBlock;
use crate::pos::BlockPos;

/// A map keyed by block position, using the Fx hasher like every other
/// hot-path map in the workspace.
#[derive(Clone, Debug)]
pub struct BlockMap<V = BaseBlock> {
    entries: HashMap<BlockPos, V, FxBuildHasher>,
}

impl<V> BlockMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_hasher(FxBuildHasher),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, pos: BlockPos, value: V) -> Option<V> {
        self.entries.insert(pos, value)
    }

    #[must_use]
    pub fn get(&self, pos: BlockPos) -> Option<&V> {
        self.entries.get(&pos)
    }

    pub fn get_mut(&mut self, pos: BlockPos) -> Option<&mut V> {
        self.entries.get_mut(&pos)
    }

    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        self.entries.contains_key(&pos)
    }

    pub fn remove(&mut self, pos: BlockPos) -> Option<V> {
        self.entries.remove(&pos)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockPos, &V)> {
        self.entries.iter().map(|(pos, v)| (*pos, v))
    }

    pub fn positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.entries.keys().copied()
    }

    /// Remove every entry, leaving the allocation in place.
    pub fn drain(&mut self) -> impl Iterator<Item = (BlockPos, V)> + '_ {
        self.entries.drain()
    }
}

impl<V> Default for BlockMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(BlockPos, V)> for BlockMap<V> {
    fn from_iter<I: IntoIterator<Item = (BlockPos, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.entries.extend(iter);
        map
    }
}

/// A block paired with where it goes.
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedBlock {
    pub pos: BlockPos,
    pub block: BaseBlock,
}

impl LocatedBlock {
    #[must_use]
    pub const fn new(pos: BlockPos, block: BaseBlock) -> Self {
        Self { pos, block }
    }
}

/// An insertion-ordered list of located blocks. Duplicate positions are kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocatedBlockList {
    blocks: Vec<LocatedBlock>,
}

impl LocatedBlockList {
    #[must_use]
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn push(&mut self, pos: BlockPos, block: BaseBlock) {
        self.blocks.push(LocatedBlock::new(pos, block));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn iter(&self) -> core::slice::Iter<'_, LocatedBlock> {
        self.blocks.iter()
    }

    /// Sort in place by a derived key, keeping equal keys in insertion order.
    pub fn sort_by_key<K: Ord>(&mut self, key: impl FnMut(&LocatedBlock) -> K) {
        self.blocks.sort_by_key(key);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, LocatedBlock> {
        self.blocks.drain(..)
    }
}

impl<'a> IntoIterator for &'a LocatedBlockList {
    type Item = &'a LocatedBlock;
    type IntoIter = core::slice::Iter<'a, LocatedBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl IntoIterator for LocatedBlockList {
    type Item = LocatedBlock;
    type IntoIter = std::vec::IntoIter<LocatedBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}

impl FromIterator<LocatedBlock> for LocatedBlockList {
    fn from_iter<I: IntoIterator<Item = LocatedBlock>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}
