//! Decorators that make up an edit session's chain.

mod chunk;
mod fast_mode;
mod limit;
mod masking;
mod quirk;
mod side_effect;
mod survival;
mod trace;
mod watchdog;

pub use chunk::{ChunkBatchingExtent, ChunkLoadingExtent, sort_for_storage};
pub use fast_mode::FastModeExtent;
pub use limit::ChangeLimitExtent;
pub use masking::{ExistingBlockMask, MaskingExtent};
pub use quirk::{BiomeQuirkExtent, BlockQuirkExtent};
pub use side_effect::{SideEffectExtent, WorldApplyingExtent};
pub use survival::SurvivalModeExtent;
pub use trace::{TraceAction, TracingExtent};
pub use watchdog::WatchdogTickingExtent;
