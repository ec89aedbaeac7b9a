//! Value types shared by every layer of the edit pipeline.
//!
//! Nothing in this crate talks to a world. It defines *what* flows through
//! the extent chain (positions, blocks, biomes, entities) and the policies
//! attached to those writes (masks, transforms, side effects), plus the
//! error and configuration types used across the workspace.

pub mod biome;
pub mod block;
pub mod block_map;
pub mod config;
pub mod entity;
pub mod error;
pub mod mask;
pub mod pos;
pub mod region;
pub mod side_effect;
pub mod status;
pub mod tag;
pub mod transform;

pub use biome::BiomeType;
pub use block::{BaseBlock, BlockState, BlockStateHolder, BlockType};
pub use block_map::{BlockMap, LocatedBlock, LocatedBlockList};
pub use config::{ConfigError, EditConfig, ReorderMode};
pub use entity::{BaseEntity, Entity, EntityId, Location};
pub use error::{EditError, EditResult};
pub use mask::{Mask, Masks, NegatedMask, RegionMask};
pub use pos::{BlockPos, ChunkPos, Vec3};
pub use region::{CuboidRegion, Region, RegionIter};
pub use side_effect::{SideEffect, SideEffectApplier, SideEffectSet, SideEffectState};
pub use status::WriteStatus;
pub use tag::{Tag, TagCompound};
pub use transform::{AffineTransform, CombinedTransform, Identity, Transform, Transforms};
