//! Integration tests for voxedit-extent

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::Arc;

use voxedit_buffer::BufferError;
use voxedit_core::{
    AffineTransform, BaseBlock, BaseEntity, BiomeType, BlockPos, BlockStateHolder, BlockType, CuboidRegion, EditConfig,
    EditError, Location, Masks, ReorderMode, SideEffect, SideEffectSet, SideEffectState, Transform, Transforms, Vec3,
};
use voxedit_extent::{
    ArrayListHistory, BlockPlacement, ChangeSet, ChangeSetExecutor, ChangeSetExtent, EditSession, Extent,
    ForwardExtentCopy, HostCall, MaskingExtent, MemoryWorld, PlacementBuffer, UndoContext, shared,
};
use voxedit_operation::{DriveStatus, JobState, OperationDriver, OperationScheduler, Operations};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn stone() -> BaseBlock {
    BlockType::STONE.into()
}

fn fill(world: &Rc<RefCell<MemoryWorld>>, min: BlockPos, max: BlockPos, block: &BaseBlock) {
    for x in min.x..=max.x {
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                world.borrow_mut().set_block(BlockPos::new(x, y, z), block.clone()).unwrap();
            }
        }
    }
}

// ============================================================================
// Commit Chain
// ============================================================================

#[test]
fn test_commit_applies_every_buffered_write_once() {
    init_tracing();
    let world = shared(MemoryWorld::new("world"));
    let config = EditConfig {
        side_effects: SideEffectSet::defaults().with(SideEffect::Lighting, SideEffectState::Delayed),
        ..EditConfig::default()
    };
    let mut session = EditSession::builder(world.clone()).config(config).build();

    let positions: Vec<BlockPos> = (0..40).map(|i| BlockPos::new(i * 7, i % 5, -i * 3)).collect();
    for pos in &positions {
        session.set_block(*pos, stone()).unwrap();
    }
    assert_eq!(world.borrow().block_count(), 0, "writes are held until commit");

    session.flush_session().unwrap();

    let calls = world.borrow_mut().take_calls();
    let mut writes: BTreeMap<BlockPos, usize> = BTreeMap::new();
    for call in &calls {
        if let HostCall::SetBlock { pos, .. } = call {
            *writes.entry(*pos).or_default() += 1;
        }
    }
    assert_eq!(writes.len(), positions.len());
    assert!(writes.values().all(|count| *count == 1));

    // Delayed side effects run after the buffered writes reached the world.
    let last_write = calls.iter().rposition(|call| matches!(call, HostCall::SetBlock { .. }));
    let first_effect = calls.iter().position(|call| matches!(call, HostCall::ApplySideEffects { .. }));
    assert!(last_write.unwrap() < first_effect.unwrap());

    // Nothing is left to apply.
    session.flush_session().unwrap();
    assert!(world.borrow().calls().is_empty());
}

#[test]
fn test_driver_finishes_commit_over_ticks() {
    let world = shared(MemoryWorld::new("world"));
    let mut session = EditSession::builder(world.clone()).build();
    fill_session(&mut session, 2000);

    let mut driver = session.driver();
    let mut ticks = 0;
    while driver.tick().unwrap() == DriveStatus::Pending {
        ticks += 1;
        assert!(ticks < 10_000, "commit never finished");
    }
    assert!(driver.is_finished());
    assert_eq!(world.borrow().block_count(), 2000);
}

fn fill_session(session: &mut EditSession, count: i32) {
    for i in 0..count {
        session.set_block(BlockPos::new(i % 50, 0, i / 50), stone()).unwrap();
    }
}

// ============================================================================
// Masking
// ============================================================================

#[test]
fn test_rejecting_mask_leaves_inner_untouched() {
    let world = shared(MemoryWorld::new("world"));
    fill(&world, BlockPos::ZERO, BlockPos::new(2, 2, 2), &BlockType::ICE.into());
    let before = world.borrow().snapshot();
    let calls_before = world.borrow().calls().len();

    let mut masking = MaskingExtent::new(world.clone(), Masks::always_false());
    for x in -3..6 {
        for y in [-100, 0, 1, 400] {
            let pos = BlockPos::new(x, y, x);
            assert!(!masking.set_block(pos, stone()).unwrap().is_accepted());
            assert!(!masking.set_block(pos, BaseBlock::air()).unwrap().is_accepted());
            assert!(!masking.set_biome(pos, BiomeType::DESERT).unwrap().is_accepted());
        }
    }

    assert_eq!(world.borrow().snapshot(), before);
    assert_eq!(world.borrow().calls().len(), calls_before);
    assert_eq!(world.borrow().get_biome(BlockPos::ZERO), BiomeType::default());
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_undo_then_redo_round_trips() -> eyre::Result<()> {
    init_tracing();
    let world = shared(MemoryWorld::new("world"));
    fill(&world, BlockPos::ZERO, BlockPos::new(3, 0, 3), &stone());
    let before = world.borrow().snapshot();

    let mut session = EditSession::builder(world.clone()).build();
    for x in 0..4 {
        session.set_block(BlockPos::new(x, 0, 0), BlockType::ICE)?;
        session.set_block(BlockPos::new(x, 1, 0), BlockType::WATER)?;
        session.set_block(BlockPos::new(x, 0, 3), BaseBlock::air())?;
    }
    session.set_biome(BlockPos::new(0, 5, 0), BiomeType::DESERT)?;
    session.flush_session()?;
    let after = world.borrow().snapshot();
    assert_ne!(before, after);

    let mut undo = EditSession::builder(world.clone()).build();
    session.undo(&mut undo)?;
    assert_eq!(world.borrow().snapshot(), before);
    assert_eq!(world.borrow().get_biome(BlockPos::new(0, 5, 0)), BiomeType::default());
    assert_eq!(undo.change_count(), 0, "undo is not itself recorded");

    let mut redo = EditSession::builder(world.clone()).build();
    session.redo(&mut redo)?;
    assert_eq!(world.borrow().snapshot(), after);
    assert_eq!(world.borrow().get_biome(BlockPos::new(0, 5, 0)), BiomeType::DESERT);
    Ok(())
}

#[test]
fn test_undo_restores_first_value_after_repeated_writes() {
    let world = shared(MemoryWorld::new("world"));
    let pos = BlockPos::new(4, 4, 4);
    world.borrow_mut().set_block(pos, BlockType::CHEST.into()).unwrap();

    let history = Rc::new(RefCell::new(ArrayListHistory::new()));
    let mut extent = ChangeSetExtent::new(world.clone(), history.clone());
    for id in ["stone", "ice", "water", "gravel", "sand"] {
        extent.set_block(pos, BlockType::new(id).into()).unwrap();
    }
    assert_eq!(history.borrow().size(), 5);

    let undo = ChangeSetExecutor::create_undo(&*history.borrow(), UndoContext::new(world.clone()));
    Operations::complete(Some(Box::new(undo))).unwrap();
    assert_eq!(world.borrow().get_block(pos).block_type(), &BlockType::CHEST);
}

#[test]
fn test_entity_history_follows_new_ids() {
    let world = shared(MemoryWorld::new("world"));
    let mut session = EditSession::builder(world.clone()).build();
    let spot = Location::at(Vec3::new(0.5, 1.0, 0.5));
    let id = session.create_entity(spot, BaseEntity::new("minecraft:cow")).unwrap();
    assert!(id.is_some());
    session.flush_session().unwrap();

    let mut undo = EditSession::builder(world.clone()).build();
    session.undo(&mut undo).unwrap();
    assert!(world.borrow().entities().is_empty());

    let mut redo = EditSession::builder(world.clone()).build();
    session.redo(&mut redo).unwrap();
    assert_eq!(world.borrow().entities().len(), 1);

    // The recreated cow has a new id; undoing again must still find it.
    let mut again = EditSession::builder(world.clone()).build();
    session.undo(&mut again).unwrap();
    assert!(world.borrow().entities().is_empty());
}

// ============================================================================
// Region Copy
// ============================================================================

#[test]
fn test_repeated_copy_composes_transform() {
    let world = shared(MemoryWorld::new("world"));
    fill(&world, BlockPos::ZERO, BlockPos::ONE, &stone());

    let region = CuboidRegion::shared(BlockPos::ZERO, BlockPos::ONE);
    let shift = AffineTransform::new().translate(Vec3::new(10.0, 0.0, 0.0));
    let copy = ForwardExtentCopy::with_origin(world.clone(), region, BlockPos::ZERO, world.clone(), BlockPos::ZERO)
        .transform(Arc::new(shift))
        .repetitions(2);
    let progress = copy.progress();
    Operations::complete(Some(Box::new(copy))).unwrap();

    assert_eq!(progress.blocks(), 16);
    let xs: BTreeSet<i32> = world.borrow().snapshot().keys().map(|pos| pos.x).collect();
    assert_eq!(xs, BTreeSet::from([0, 1, 10, 11, 20, 21]));
    assert_eq!(world.borrow().block_count(), 24);
}

#[test]
fn test_repetitions_match_sequential_copies() {
    let source = shared(MemoryWorld::new("source"));
    fill(&source, BlockPos::ZERO, BlockPos::new(1, 2, 0), &stone());
    let region = CuboidRegion::shared(BlockPos::ZERO, BlockPos::new(1, 2, 0));
    let step: Arc<dyn Transform> = Arc::new(
        AffineTransform::new()
            .scale(Vec3::new(1.0, 1.0, -1.0))
            .translate(Vec3::new(4.0, 0.0, 0.0)),
    );

    let repeated = shared(MemoryWorld::new("repeated"));
    let copy = ForwardExtentCopy::with_origin(source.clone(), region.clone(), BlockPos::ZERO, repeated.clone(), BlockPos::ZERO)
        .transform(step.clone())
        .repetitions(3);
    Operations::complete(Some(Box::new(copy))).unwrap();

    let sequential = shared(MemoryWorld::new("sequential"));
    let mut composed = step.clone();
    for _ in 0..3 {
        let copy = ForwardExtentCopy::with_origin(
            source.clone(),
            region.clone(),
            BlockPos::ZERO,
            sequential.clone(),
            BlockPos::ZERO,
        )
        .transform(composed.clone());
        Operations::complete(Some(Box::new(copy))).unwrap();
        composed = Transforms::combine(&composed, &step);
    }

    let repeated: BTreeSet<BlockPos> = repeated.borrow().snapshot().into_keys().collect();
    let sequential: BTreeSet<BlockPos> = sequential.borrow().snapshot().into_keys().collect();
    assert_eq!(repeated.len(), 18);
    assert_eq!(repeated, sequential);
}

#[test]
fn test_change_limit_aborts_copy() {
    let world = shared(MemoryWorld::new("world"));
    fill(&world, BlockPos::ZERO, BlockPos::ONE, &stone());
    let config = EditConfig::default().with_limit(5);
    let mut session = EditSession::builder(world.clone()).config(config).build();

    let region = CuboidRegion::shared(BlockPos::ZERO, BlockPos::ONE);
    let copy = ForwardExtentCopy::new(world.clone(), region, session.extent(), BlockPos::new(0, 20, 0));
    let err = Operations::complete(Some(Box::new(copy))).unwrap_err();
    assert!(matches!(err, EditError::ChangeLimitReached { limit: 5 }));

    // What was accepted before the limit still lands.
    session.flush_session().unwrap();
    let copied = world.borrow().snapshot().keys().filter(|pos| pos.y >= 20).count();
    assert_eq!(copied, 5);
}

// ============================================================================
// Buffers
// ============================================================================

fn placement(x: i32) -> BlockPlacement {
    BlockPlacement::new(BlockPos::new(x, 0, 0), BlockType::AIR.default_state(), stone())
}

fn assert_cursors(buffer: &PlacementBuffer) {
    assert!(buffer.position() <= buffer.limit());
    assert!(buffer.limit() <= buffer.capacity());
    assert_eq!(buffer.capacity(), 4);
}

#[test]
fn test_buffer_cursor_invariants() {
    let mut buffer = PlacementBuffer::allocate(4);
    assert_cursors(&buffer);

    for x in 0..4 {
        buffer.put(placement(x)).unwrap();
        assert_cursors(&buffer);
    }
    assert!(matches!(buffer.put(placement(9)), Err(BufferError::Overflow { .. })));
    assert_cursors(&buffer);

    buffer.flip();
    assert_cursors(&buffer);
    assert_eq!(buffer.get().unwrap().pos.x, 0);
    let mut view = buffer.slice();
    assert_eq!(view.remaining(), 3);
    assert_eq!(view.get().unwrap().pos.x, 1);
    assert_eq!(buffer.position(), 1);

    buffer.rewind();
    assert_cursors(&buffer);
    assert_eq!(buffer.limit(), 4);

    let mut read_only = buffer.as_read_only();
    assert!(read_only.put(placement(5)).is_err());

    buffer.clear();
    assert_cursors(&buffer);
    assert_eq!(buffer.limit(), 4);
    assert_eq!(buffer.position(), 0);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_fast_mode_session_from_json() {
    init_tracing();
    let config = EditConfig::from_json_str(r#"{ "reorder": "fast", "chunk_batching": false }"#).unwrap();
    assert_eq!(config.reorder, ReorderMode::Fast);

    let world = shared(MemoryWorld::new("world"));
    let mut session = EditSession::builder(world.clone()).config(config).build();
    session.set_block(BlockPos::new(3, 3, 3), stone()).unwrap();
    assert_eq!(world.borrow().block_count(), 1, "fast mode writes through");

    let calls = world.borrow_mut().take_calls();
    let written_with = calls.iter().find_map(|call| match call {
        HostCall::SetBlock { side_effects, .. } => Some(*side_effects),
        _ => None,
    });
    let written_with = written_with.unwrap();
    assert!(!written_with.should_apply(SideEffect::Lighting));
    assert!(!written_with.should_apply(SideEffect::Neighbors));

    session.flush_session().unwrap();
    let calls = world.borrow_mut().take_calls();
    assert!(calls.iter().any(|call| matches!(call, HostCall::FixAfterFastMode(_))));
    assert!(calls.contains(&HostCall::NotifyAndLight(BlockPos::new(3, 3, 3))));
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_scheduler_runs_copy_and_commit() {
    let world = shared(MemoryWorld::new("world"));
    fill(&world, BlockPos::ZERO, BlockPos::new(3, 3, 3), &stone());
    let mut session = EditSession::builder(world.clone()).build();

    let region = CuboidRegion::shared(BlockPos::ZERO, BlockPos::new(3, 3, 3));
    let copy = ForwardExtentCopy::new(world.clone(), region, session.extent(), BlockPos::new(0, 10, 0));

    let mut scheduler = OperationScheduler::new(std::time::Duration::from_millis(50));
    let job = scheduler.submit(Box::new(copy));
    let mut ticks = 0;
    while scheduler.tick() > 0 {
        ticks += 1;
        assert!(ticks < 10_000);
    }
    assert_eq!(job.state(), JobState::Finished);

    let commit = scheduler.submit(session.commit().unwrap());
    while scheduler.tick() > 0 {}
    assert_eq!(commit.state(), JobState::Finished);
    assert_eq!(world.borrow().block_count(), 128);
}

#[test]
fn test_cancelled_driver_stops_commit() {
    let world = shared(MemoryWorld::new("world"));
    let mut session = EditSession::builder(world.clone()).build();
    fill_session(&mut session, 100);

    let commit = session.commit();
    let mut driver = OperationDriver::new(commit, std::time::Duration::from_millis(50));
    driver.cancel();
    assert!(driver.is_finished());
    assert_eq!(world.borrow().block_count(), 0);
}
