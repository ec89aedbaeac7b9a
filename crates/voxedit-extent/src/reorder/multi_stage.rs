//! Staged placement so attached and falling blocks survive a large edit.

use voxedit_core::{BlockState, BlockStateHolder};

use super::action::Action;
use super::arranger::{Arranger, ArrangerContext};

/// Stages of a multi-stage placement, in application order.
///
/// Clearing stages remove blocks that would otherwise break or fall once
/// their neighbors change. Then solid blocks go down, then blocks affected
/// by physics, then blocks that need a supporting block, and finally blocks
/// that span several positions or need everything else in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlacementPriority {
    ClearFinal,
    ClearBlockDependent,
    ClearPhysics,
    Static,
    Physics,
    BlockDependent,
    Final,
}

const PHYSICS: &[&str] = &["water", "lava", "sand", "red_sand", "gravel"];

const FINAL: &[&str] = &["cactus", "sugar_cane", "piston_head", "moving_piston"];
const FINAL_SUFFIXES: &[&str] = &["_door", "_banner", "_sign"];

const BLOCK_DEPENDENT: &[&str] = &[
    "flower_pot",
    "anvil",
    "chipped_anvil",
    "damaged_anvil",
    "rail",
    "powered_rail",
    "detector_rail",
    "activator_rail",
    "dandelion",
    "poppy",
    "blue_orchid",
    "allium",
    "azure_bluet",
    "oxeye_daisy",
    "cornflower",
    "lily_of_the_valley",
    "sunflower",
    "lilac",
    "rose_bush",
    "peony",
    "grass",
    "short_grass",
    "tall_grass",
    "fern",
    "large_fern",
    "dead_bush",
    "brown_mushroom",
    "red_mushroom",
    "torch",
    "wall_torch",
    "redstone_torch",
    "redstone_wall_torch",
    "soul_torch",
    "soul_wall_torch",
    "fire",
    "soul_fire",
    "redstone_wire",
    "wheat",
    "carrots",
    "potatoes",
    "beetroots",
    "melon_stem",
    "pumpkin_stem",
    "ladder",
    "lever",
    "snow",
    "nether_portal",
    "end_portal",
    "repeater",
    "vine",
    "lily_pad",
    "nether_wart",
    "piston",
    "sticky_piston",
    "tripwire",
    "tripwire_hook",
    "comparator",
    "daylight_detector",
    "cake",
];
const BLOCK_DEPENDENT_SUFFIXES: &[&str] = &[
    "_sapling",
    "_button",
    "_pressure_plate",
    "_carpet",
    "_bed",
    "_tulip",
    "_trapdoor",
];

/// The stage a block is placed in.
#[must_use]
pub fn placement_priority(block: &BlockState) -> PlacementPriority {
    let path = block.block_type().path();
    if path.starts_with("potted_") {
        return PlacementPriority::BlockDependent;
    }
    if PHYSICS.contains(&path) {
        PlacementPriority::Physics
    } else if FINAL.contains(&path) || FINAL_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
        PlacementPriority::Final
    } else if BLOCK_DEPENDENT.contains(&path) || BLOCK_DEPENDENT_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
        PlacementPriority::BlockDependent
    } else {
        PlacementPriority::Static
    }
}

/// Orders a batch by [`PlacementPriority`], inserting a clearing write
/// ahead of everything else for each non-static block being replaced.
///
/// Actions without a stage (biomes) run first among the placements; within
/// a stage, insertion order is kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiStageReorderArranger;

impl<A: Action> Arranger<A> for MultiStageReorderArranger {
    fn rearrange(&self, context: &mut ArrangerContext<A>) {
        let actions = std::mem::take(context.actions_mut());
        let mut staged: Vec<(bool, Option<PlacementPriority>, A)> = Vec::with_capacity(actions.len());
        for action in actions {
            if let Some((stage, clear)) = action.clear_action() {
                staged.push((false, Some(stage), clear));
            }
            staged.push((true, action.priority(), action));
        }
        staged.sort_by_key(|(placing, stage, _)| (*placing, *stage));

        let arranged = context.actions_mut();
        arranged.extend(staged.into_iter().map(|(_, _, action)| action));
        let count = arranged.len();
        context.mark_group(0, count);
    }
}
