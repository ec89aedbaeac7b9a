//! What the edit pipeline needs from the host.

use std::cell::RefCell;
use std::rc::Rc;

use voxedit_core::{BaseBlock, BlockPos, BlockState, ChunkPos, EditResult, SideEffectApplier, SideEffectSet, WriteStatus};

use crate::extent::Extent;

/// A shared reference to the host world.
pub type WorldHandle = Rc<RefCell<dyn World>>;

/// The host's world storage and engine hooks.
///
/// Plain [`Extent::set_block`] on a world applies the engine's default side
/// effects; [`World::set_block_with`] lets a layer choose.
pub trait World: Extent {
    fn name(&self) -> &str;

    /// Lowest writable Y.
    fn min_y(&self) -> i32;

    /// Highest writable Y.
    fn max_y(&self) -> i32;

    /// Write a block, applying the `On` entries of `side_effects` now.
    /// Writes outside `min_y..=max_y` are [`WriteStatus::Rejected`].
    fn set_block_with(&mut self, pos: BlockPos, block: BaseBlock, side_effects: SideEffectSet) -> EditResult<WriteStatus>;

    /// Make sure the chunk holding `pos` is resident.
    fn check_loaded_chunk(&mut self, pos: BlockPos);

    /// Recompute lighting and heightmaps for chunks written with side
    /// effects disabled.
    fn fix_after_fast_mode(&mut self, chunks: &[ChunkPos]);

    /// Send neighbor updates and relight one position.
    fn notify_and_light_block(&mut self, pos: BlockPos, previous: &BlockState) -> EditResult<()>;

    /// Break the block as a player with a tool would, dropping items.
    fn simulate_block_mine(&mut self, pos: BlockPos) -> EditResult<bool>;

    /// Empty a container's inventory so replacing it drops nothing.
    fn clear_container_block_contents(&mut self, pos: BlockPos) -> bool;

    /// Apply the side effects `applier` selects for a change at `pos`.
    fn apply_side_effects(&mut self, pos: BlockPos, previous: &BlockState, applier: SideEffectApplier) -> EditResult<()>;

    /// Whether biomes vary with Y. When they don't, biomes are stored per column.
    fn fully_supports_3d_biomes(&self) -> bool {
        true
    }
}

/// Keeps a host liveness monitor informed during long edits.
pub trait Watchdog {
    fn tick(&self);
}
