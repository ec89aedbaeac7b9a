//! Extent chains, edit history and region copy for bulk world edits.
//!
//! Every read and write of an edit flows through a chain of [`Extent`]
//! decorators, each adding one policy. An [`EditSession`] builds the usual
//! chain over a host [`World`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ChangeLimitExtent  →  MaskingExtent  →  ChangeSetExtent      │  bypass none
//! ├──────────────────────────────────────────────────────────────┤
//! │  WatchdogTicking  →  ChunkBatching  →  Arranger / FastMode    │  bypass history
//! ├──────────────────────────────────────────────────────────────┤
//! │  BiomeQuirk → BlockQuirk → ChunkLoading → SurvivalMode        │  bypass reorder
//! │  → WatchdogTicking → SideEffect → WorldApplying → World       │  and history
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Layers that hold writes back hand them on from [`Extent::commit`], which
//! yields one [`Operation`](voxedit_operation::Operation) for the whole
//! chain. Drive it with [`Operations::complete`](voxedit_operation::Operations::complete)
//! or a tick at a time with an
//! [`OperationDriver`](voxedit_operation::OperationDriver).
//!
//! # Usage
//!
//! ```ignore
//! use voxedit_extent::{EditSession, MemoryWorld, shared};
//!
//! let world = shared(MemoryWorld::new("world"));
//! let mut session = EditSession::builder(world.clone()).build();
//! session.set_block(BlockPos::new(0, 64, 0), BlockType::STONE)?;
//! session.flush_session()?;
//!
//! // Undo into a fresh session over the same world.
//! let mut undo = EditSession::builder(world).build();
//! session.undo(&mut undo)?;
//! ```

pub mod extent;
pub mod function;
pub mod history;
pub mod layer;
pub mod memory;
pub mod reorder;
pub mod session;
pub mod world;

pub use extent::{Extent, ExtentHandle, NullExtent, shared};
pub use function::{
    BlockReplace, CombinedRegionFunction, CopyProgress, EntityFunction, EntityVisitor, ExtentBiomeCopy,
    ExtentBlockCopy, ExtentEntityCopy, ForwardExtentCopy, RegionFunction, RegionMaskingFilter, RegionVisitor,
    SetLocatedBlocks,
};
pub use history::{
    ArrayListHistory, BlockOptimizedHistory, Change, ChangeSet, ChangeSetExecutor, ChangeSetExtent, Direction,
    NullChangeSet, TrackedEntity, UndoContext,
};
pub use layer::{
    BiomeQuirkExtent, BlockQuirkExtent, ChangeLimitExtent, ChunkBatchingExtent, ChunkLoadingExtent, ExistingBlockMask,
    FastModeExtent, MaskingExtent, SideEffectExtent, SurvivalModeExtent, TraceAction, TracingExtent,
    WatchdogTickingExtent, WorldApplyingExtent, sort_for_storage,
};
pub use memory::{HostCall, MemoryWorld};
pub use reorder::{
    Action, Arranger, ArrangerBufferExtent, ArrangerContext, ArrangerExtent, BiomePlacement, BlockPlacement,
    InsertionOrder, MultiStageReorderArranger, PlacementBuffer, PlacementPriority, WorldAction, WorldActionBuffer,
    Written,
};
pub use session::{EditSession, EditSessionBuilder, Stage, TraceReport};
pub use world::{Watchdog, World, WorldHandle};
