//! Deferred writes held by the arranging extents.

use voxedit_buffer::ActionBuffer;
use voxedit_core::{BaseBlock, BiomeType, BlockPos, BlockState, EditResult, WriteStatus};

use super::multi_stage::{PlacementPriority, placement_priority};
use crate::extent::Extent;

/// A block write, with the state it replaces.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockPlacement {
    pub pos: BlockPos,
    pub old: BlockState,
    pub block: BaseBlock,
}

impl BlockPlacement {
    #[must_use]
    pub const fn new(pos: BlockPos, old: BlockState, block: BaseBlock) -> Self {
        Self { pos, old, block }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BiomePlacement {
    pub pos: BlockPos,
    pub biome: BiomeType,
}

/// Any deferred write.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldAction {
    Block(BlockPlacement),
    Biome(BiomePlacement),
}

impl WorldAction {
    #[must_use]
    pub const fn pos(&self) -> BlockPos {
        match self {
            Self::Block(placement) => placement.pos,
            Self::Biome(placement) => placement.pos,
        }
    }
}

/// The position and value an action leaves behind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Written<'a> {
    Block(BlockPos, &'a BaseBlock),
    Biome(BlockPos, &'a BiomeType),
}

pub type PlacementBuffer = ActionBuffer<BlockPlacement>;
pub type WorldActionBuffer = ActionBuffer<WorldAction>;

/// What an arranging extent needs from the actions it buffers.
pub trait Action: Clone + 'static {
    fn from_block(placement: BlockPlacement) -> Self;

    /// `None` when biome writes are not buffered as this action type.
    fn from_biome(placement: BiomePlacement) -> Option<Self>;

    /// Stage of this action. `None` sorts before every stage.
    fn priority(&self) -> Option<PlacementPriority>;

    /// A write clearing what this action replaces, when the replaced block
    /// would otherwise break or fall while the stages run.
    fn clear_action(&self) -> Option<(PlacementPriority, Self)>;

    fn written(&self) -> Written<'_>;

    fn apply(self, target: &mut dyn Extent) -> EditResult<WriteStatus>;
}

impl BlockPlacement {
    fn clear(&self) -> Option<(PlacementPriority, Self)> {
        let stage = match placement_priority(&self.old) {
            PlacementPriority::Final => PlacementPriority::ClearFinal,
            PlacementPriority::Physics => PlacementPriority::ClearPhysics,
            PlacementPriority::BlockDependent => PlacementPriority::ClearBlockDependent,
            _ => return None,
        };
        let replacement = if self.block.is_air() {
            self.block.clone()
        } else {
            BaseBlock::air()
        };
        Some((stage, Self::new(self.pos, self.old.clone(), replacement)))
    }
}

impl Action for BlockPlacement {
    fn from_block(placement: BlockPlacement) -> Self {
        placement
    }

    fn from_biome(_: BiomePlacement) -> Option<Self> {
        None
    }

    fn priority(&self) -> Option<PlacementPriority> {
        Some(placement_priority(self.block.state()))
    }

    fn clear_action(&self) -> Option<(PlacementPriority, Self)> {
        self.clear()
    }

    fn written(&self) -> Written<'_> {
        Written::Block(self.pos, &self.block)
    }

    fn apply(self, target: &mut dyn Extent) -> EditResult<WriteStatus> {
        target.set_block(self.pos, self.block)
    }
}

impl Action for WorldAction {
    fn from_block(placement: BlockPlacement) -> Self {
        Self::Block(placement)
    }

    fn from_biome(placement: BiomePlacement) -> Option<Self> {
        Some(Self::Biome(placement))
    }

    fn priority(&self) -> Option<PlacementPriority> {
        match self {
            Self::Block(placement) => placement.priority(),
            Self::Biome(_) => None,
        }
    }

    fn clear_action(&self) -> Option<(PlacementPriority, Self)> {
        match self {
            Self::Block(placement) => placement.clear().map(|(stage, clear)| (stage, Self::Block(clear))),
            Self::Biome(_) => None,
        }
    }

    fn written(&self) -> Written<'_> {
        match self {
            Self::Block(placement) => placement.written(),
            Self::Biome(placement) => Written::Biome(placement.pos, &placement.biome),
        }
    }

    fn apply(self, target: &mut dyn Extent) -> EditResult<WriteStatus> {
        match self {
            Self::Block(placement) => target.set_block(placement.pos, placement.block),
            Self::Biome(placement) => target.set_biome(placement.pos, placement.biome),
        }
    }
}
