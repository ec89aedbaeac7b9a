//! Block types, states and full blocks.
//!
//! `BlockState` is the light, metadata-free value. `BaseBlock` adds an
//! optional tag compound (container contents, sign text, ...). Converting a
//! `BaseBlock` to a `BlockState` drops the tag; the reverse is lossless.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::tag::TagCompound;

/// A namespaced block type id such as `minecraft:stone`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockType {
    id: Cow<'static, str>,
}

/// Block types that hold an inventory.
const CONTAINERS: &[&str] = &[
    "minecraft:chest",
    "minecraft:trapped_chest",
    "minecraft:barrel",
    "minecraft:furnace",
    "minecraft:blast_furnace",
    "minecraft:smoker",
    "minecraft:hopper",
    "minecraft:dispenser",
    "minecraft:dropper",
    "minecraft:brewing_stand",
    "minecraft:chiseled_bookshelf",
];

impl BlockType {
    pub const AIR: Self = Self::from_static("minecraft:air");
    pub const CAVE_AIR: Self = Self::from_static("minecraft:cave_air");
    pub const VOID_AIR: Self = Self::from_static("minecraft:void_air");
    pub const STONE: Self = Self::from_static("minecraft:stone");
    pub const ICE: Self = Self::from_static("minecraft:ice");
    pub const WATER: Self = Self::from_static("minecraft:water");
    pub const CHEST: Self = Self::from_static("minecraft:chest");

    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self {
            id: Cow::Borrowed(id),
        }
    }

    /// Create a type from an id, adding the `minecraft:` namespace if absent.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = if id.contains(':') {
            id
        } else {
            format!("minecraft:{id}")
        };
        Self { id: Cow::Owned(id) }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The id without its namespace.
    #[must_use]
    pub fn path(&self) -> &str {
        self.id.split_once(':').map_or(&*self.id, |(_, path)| path)
    }

    #[must_use]
    pub fn is_air(&self) -> bool {
        matches!(
            &*self.id,
            "minecraft:air" | "minecraft:cave_air" | "minecraft:void_air"
        )
    }

    /// Whether blocks of this type keep an inventory that drops when broken.
    #[must_use]
    pub fn has_container(&self) -> bool {
        CONTAINERS.contains(&&*self.id) || self.path().ends_with("shulker_box")
    }

    #[must_use]
    pub fn default_state(&self) -> BlockState {
        BlockState::new(self.clone())
    }
}

/// A block type plus its property values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockState {
    block_type: BlockType,
    properties: BTreeMap<String, String>,
}

impl BlockState {
    #[must_use]
    pub const fn new(block_type: BlockType) -> Self {
        Self {
            block_type,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn air() -> Self {
        Self::new(BlockType::AIR)
    }

    #[must_use]
    pub fn is_air(&self) -> bool {
        self.block_type.is_air()
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attach a tag, producing a full block.
    #[must_use]
    pub fn with_tag(self, tag: TagCompound) -> BaseBlock {
        BaseBlock {
            state: self,
            tag: Some(tag),
        }
    }
}

impl Default for BlockState {
    fn default() -> Self {
        Self::air()
    }
}

/// A block state with optional attached metadata.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct BaseBlock {
    state: BlockState,
    tag: Option<TagCompound>,
}

impl BaseBlock {
    #[must_use]
    pub const fn new(state: BlockState, tag: Option<TagCompound>) -> Self {
        Self { state, tag }
    }

    #[must_use]
    pub const fn air() -> Self {
        Self::new(BlockState::air(), None)
    }

    #[must_use]
    pub const fn state(&self) -> &BlockState {
        &self.state
    }

    #[must_use]
    pub const fn tag(&self) -> Option<&TagCompound> {
        self.tag.as_ref()
    }

    #[must_use]
    pub const fn has_tag(&self) -> bool {
        self.tag.is_some()
    }

    /// The same block with its metadata removed.
    #[must_use]
    pub fn without_tag(self) -> Self {
        Self {
            state: self.state,
            tag: None,
        }
    }

    #[must_use]
    pub fn is_air(&self) -> bool {
        self.state.block_type.is_air()
    }
}

impl From<BlockState> for BaseBlock {
    fn from(state: BlockState) -> Self {
        Self::new(state, None)
    }
}

impl From<BlockType> for BaseBlock {
    fn from(block_type: BlockType) -> Self {
        Self::new(BlockState::new(block_type), None)
    }
}

/// Anything describing the occupant of a voxel.
pub trait BlockStateHolder {
    fn block_type(&self) -> &BlockType;

    /// Lossy for full blocks: the tag is dropped.
    fn to_state(&self) -> BlockState;

    fn to_base_block(&self) -> BaseBlock;

    /// Same type, and every property set on `other` has the same value here.
    fn equals_fuzzy<B: BlockStateHolder + ?Sized>(&self, other: &B) -> bool
    where
        Self: Sized,
    {
        let ours = self.to_state();
        let theirs = other.to_state();
        ours.block_type == theirs.block_type
            && theirs
                .properties()
                .all(|(key, value)| ours.property(key) == Some(value))
    }
}

impl BlockStateHolder for BlockState {
    fn block_type(&self) -> &BlockType {
        &self.block_type
    }

    fn to_state(&self) -> BlockState {
        self.clone()
    }

    fn to_base_block(&self) -> BaseBlock {
        BaseBlock::from(self.clone())
    }
}

impl BlockStateHolder for BaseBlock {
    fn block_type(&self) -> &BlockType {
        &self.state.block_type
    }

    fn to_state(&self) -> BlockState {
        self.state.clone()
    }

    fn to_base_block(&self) -> BaseBlock {
        self.clone()
    }
}
