//! Holding writes back and applying them in a better order.

mod action;
mod arranger;
mod extent;
mod multi_stage;

pub use action::{Action, BiomePlacement, BlockPlacement, PlacementBuffer, WorldAction, WorldActionBuffer, Written};
pub use arranger::{Arranger, ArrangerContext, InsertionOrder};
pub use extent::{ArrangerBufferExtent, ArrangerExtent};
pub use multi_stage::{MultiStageReorderArranger, PlacementPriority, placement_priority};
