//! An edit session: the standard extent chain over a world, with history.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use voxedit_core::{
    BaseBlock, BaseEntity, BiomeType, BlockPos, BlockState, EditConfig, EditResult, Entity, EntityId, Location, Mask,
    Masks, Region, ReorderMode, SideEffect, SideEffectSet, SideEffectState, WriteStatus,
};
use voxedit_operation::{Operation, OperationDriver, Operations};

use crate::extent::{ExtentHandle, shared};
use crate::history::{BlockOptimizedHistory, ChangeSet, ChangeSetExecutor, ChangeSetExtent, UndoContext};
use crate::layer::{
    BiomeQuirkExtent, BlockQuirkExtent, ChangeLimitExtent, ChunkBatchingExtent, ChunkLoadingExtent, FastModeExtent,
    MaskingExtent, SideEffectExtent, SurvivalModeExtent, TraceAction, TracingExtent, WatchdogTickingExtent,
    WorldApplyingExtent,
};
use crate::reorder::{ArrangerBufferExtent, MultiStageReorderArranger};
use crate::world::{Watchdog, WorldHandle};

/// Where in the chain a write enters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    /// The top of the chain: limit, mask and history apply.
    #[default]
    BeforeChange,
    /// Below history: the write is not recorded but is still reordered.
    BeforeHistory,
    /// Below reordering and history: the write goes straight to the quirk
    /// and chunk layers.
    BeforeReorder,
}

/// The layer a rejected write was stopped at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceReport {
    pub pos: BlockPos,
    pub layer: &'static str,
    pub actions: Vec<TraceAction>,
}

/// Wraps each layer in a [`TracingExtent`] when enabled.
struct Tracer {
    enabled: bool,
    layers: Vec<Rc<RefCell<TracingExtent>>>,
}

impl Tracer {
    fn wrap(&mut self, layer: ExtentHandle, label: &'static str) -> ExtentHandle {
        if !self.enabled {
            return layer;
        }
        let traced = shared(TracingExtent::new(layer, label));
        self.layers.push(Rc::clone(&traced));
        traced
    }
}

/// Builds an [`EditSession`].
pub struct EditSessionBuilder {
    world: WorldHandle,
    config: EditConfig,
    watchdog: Option<Rc<dyn Watchdog>>,
    change_set: Option<Rc<RefCell<dyn ChangeSet>>>,
}

impl EditSessionBuilder {
    #[must_use]
    pub fn new(world: WorldHandle) -> Self {
        Self {
            world,
            config: EditConfig::default(),
            watchdog: None,
            change_set: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: EditConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn watchdog(mut self, watchdog: Rc<dyn Watchdog>) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    /// Record into `change_set` instead of a fresh [`BlockOptimizedHistory`].
    #[must_use]
    pub fn change_set(mut self, change_set: Rc<RefCell<dyn ChangeSet>>) -> Self {
        self.change_set = Some(change_set);
        self
    }

    #[must_use]
    pub fn build(self) -> EditSession {
        let Self {
            world,
            config,
            watchdog,
            change_set,
        } = self;
        let change_set = change_set.unwrap_or_else(|| Rc::new(RefCell::new(BlockOptimizedHistory::new())));
        let mut tracer = Tracer {
            enabled: config.trace_failures,
            layers: Vec::new(),
        };

        let side_effects = effective_side_effects(&config);

        let mut extent = tracer.wrap(shared(WorldApplyingExtent::new(world.clone(), side_effects)), "world");
        extent = tracer.wrap(
            shared(SideEffectExtent::new(extent, world.clone(), side_effects)),
            "side_effects",
        );
        if let Some(watchdog) = &watchdog {
            extent = tracer.wrap(shared(WatchdogTickingExtent::new(extent, Rc::clone(watchdog))), "watchdog");
        }
        let mut survival = SurvivalModeExtent::new(extent, world.clone());
        survival.set_tool_use(config.tool_use);
        survival.set_strip_nbt(config.strip_nbt);
        extent = tracer.wrap(shared(survival), "survival");
        extent = tracer.wrap(shared(ChunkLoadingExtent::new(extent, world.clone())), "chunk_loading");
        extent = tracer.wrap(shared(BlockQuirkExtent::new(extent, world.clone())), "block_quirks");
        extent = tracer.wrap(shared(BiomeQuirkExtent::new(extent, world.clone())), "biome_quirks");
        let bypass_reorder_history = Rc::clone(&extent);

        extent = match config.reorder {
            ReorderMode::Fast => tracer.wrap(shared(FastModeExtent::new(extent, world.clone(), true)), "fast_mode"),
            ReorderMode::MultiStage => tracer.wrap(
                shared(ArrangerBufferExtent::new(
                    extent,
                    Box::new(MultiStageReorderArranger),
                    config.buffer_capacity,
                )),
                "reorder",
            ),
            ReorderMode::None => extent,
        };
        if config.chunk_batching {
            extent = tracer.wrap(shared(ChunkBatchingExtent::new(extent, true)), "chunk_batching");
        }
        if let Some(watchdog) = &watchdog {
            // Buffers above may hold every change until commit.
            extent = tracer.wrap(
                shared(WatchdogTickingExtent::new(extent, Rc::clone(watchdog))),
                "watchdog_buffered",
            );
        }
        let bypass_history = Rc::clone(&extent);

        extent = tracer.wrap(shared(ChangeSetExtent::new(extent, Rc::clone(&change_set))), "history");
        let masking = shared(MaskingExtent::permissive(extent));
        extent = tracer.wrap(masking.clone(), "masking");
        let limit = shared(ChangeLimitExtent::new(extent, config.max_changed_blocks));
        let bypass_none = tracer.wrap(limit.clone(), "limit");

        tracing::debug!(
            world = world.borrow().name(),
            reorder = ?config.reorder,
            chunk_batching = config.chunk_batching,
            traced = tracer.layers.len(),
            "edit session created"
        );
        EditSession {
            world,
            config,
            change_set,
            bypass_reorder_history,
            bypass_history,
            bypass_none,
            masking,
            limit,
            traced: tracer.layers,
        }
    }
}

/// One user's edit: writes enter at the top of the chain, flow through
/// limit, mask, history, batching, reordering and quirk handling, and reach
/// the world no later than [`EditSession::flush_session`].
pub struct EditSession {
    world: WorldHandle,
    config: EditConfig,
    change_set: Rc<RefCell<dyn ChangeSet>>,
    bypass_reorder_history: ExtentHandle,
    bypass_history: ExtentHandle,
    bypass_none: ExtentHandle,
    masking: Rc<RefCell<MaskingExtent>>,
    limit: Rc<RefCell<ChangeLimitExtent>>,
    /// Innermost first.
    traced: Vec<Rc<RefCell<TracingExtent>>>,
}

impl EditSession {
    #[must_use]
    pub fn builder(world: WorldHandle) -> EditSessionBuilder {
        EditSessionBuilder::new(world)
    }

    #[must_use]
    pub const fn config(&self) -> &EditConfig {
        &self.config
    }

    #[must_use]
    pub fn world(&self) -> WorldHandle {
        Rc::clone(&self.world)
    }

    /// The top of the chain, for functions and operations that write
    /// through this session.
    #[must_use]
    pub fn extent(&self) -> ExtentHandle {
        Rc::clone(&self.bypass_none)
    }

    fn stage(&self, stage: Stage) -> &ExtentHandle {
        match stage {
            Stage::BeforeChange => &self.bypass_none,
            Stage::BeforeHistory => &self.bypass_history,
            Stage::BeforeReorder => &self.bypass_reorder_history,
        }
    }

    pub fn set_block(&mut self, pos: BlockPos, block: impl Into<BaseBlock>) -> EditResult<WriteStatus> {
        self.set_block_at(pos, block, Stage::BeforeChange)
    }

    /// Write at a given stage of the chain, skipping the layers above it.
    pub fn set_block_at(&mut self, pos: BlockPos, block: impl Into<BaseBlock>, stage: Stage) -> EditResult<WriteStatus> {
        self.stage(stage).borrow_mut().set_block(pos, block.into())
    }

    #[must_use]
    pub fn get_block(&self, pos: BlockPos) -> BlockState {
        self.bypass_none.borrow().get_block(pos)
    }

    #[must_use]
    pub fn get_full_block(&self, pos: BlockPos) -> BaseBlock {
        self.bypass_none.borrow().get_full_block(pos)
    }

    pub fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        self.bypass_none.borrow_mut().set_biome(pos, biome)
    }

    #[must_use]
    pub fn get_biome(&self, pos: BlockPos) -> BiomeType {
        self.bypass_none.borrow().get_biome(pos)
    }

    pub fn create_entity(&mut self, location: Location, entity: BaseEntity) -> EditResult<Option<EntityId>> {
        self.bypass_none.borrow_mut().create_entity(location, entity)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> EditResult<bool> {
        self.bypass_none.borrow_mut().remove_entity(id)
    }

    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.bypass_none.borrow().entities()
    }

    #[must_use]
    pub fn entities_in(&self, region: &dyn Region) -> Vec<Entity> {
        self.bypass_none.borrow().entities_in(region)
    }

    /// Restrict writes to positions passing `mask`; `None` lifts the
    /// restriction.
    pub fn set_mask(&mut self, mask: Option<Box<dyn Mask>>) {
        self.masking.borrow_mut().set_mask(mask.unwrap_or_else(Masks::always_true));
    }

    /// Changes recorded into the history so far.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.change_set.borrow().size()
    }

    /// Writes attempted against the change limit so far.
    #[must_use]
    pub fn attempted_changes(&self) -> usize {
        self.limit.borrow().count()
    }

    #[must_use]
    pub fn change_set(&self) -> Rc<RefCell<dyn ChangeSet>> {
        Rc::clone(&self.change_set)
    }

    #[must_use]
    pub fn is_tracking_history(&self) -> bool {
        self.change_set.borrow().is_recording()
    }

    pub fn set_tracking_history(&mut self, tracking: bool) {
        self.change_set.borrow_mut().set_recording(tracking);
    }

    /// The operation that makes every buffered write of this session land.
    pub fn commit(&mut self) -> Option<Box<dyn Operation>> {
        self.bypass_none.borrow_mut().commit()
    }

    /// Drive the commit a tick at a time under the configured budget.
    pub fn driver(&mut self) -> OperationDriver {
        let commit = self.commit();
        OperationDriver::from_config(commit, &self.config)
    }

    /// Apply everything buffered now.
    pub fn flush_session(&mut self) -> EditResult<()> {
        let commit = self.commit();
        Operations::complete(commit)?;
        if self.config.trace_failures {
            for report in self.trace_failures() {
                tracing::warn!(pos = ?report.pos, layer = report.layer, actions = ?report.actions, "write failed");
            }
        }
        Ok(())
    }

    /// Reverse this session's history in `target`, then flush it.
    pub fn undo(&self, target: &mut Self) -> EditResult<()> {
        let context = UndoContext::new(Rc::clone(&target.bypass_history));
        let executor = ChangeSetExecutor::create_undo(&*self.change_set.borrow(), context);
        Operations::complete(Some(Box::new(executor)))?;
        target.flush_session()
    }

    /// Replay this session's history in `target`, then flush it.
    pub fn redo(&self, target: &mut Self) -> EditResult<()> {
        let context = UndoContext::new(Rc::clone(&target.bypass_history));
        let executor = ChangeSetExecutor::create_redo(&*self.change_set.borrow(), context);
        Operations::complete(Some(Box::new(executor)))?;
        target.flush_session()
    }

    /// For each position with a failed write, the innermost layer it failed
    /// at. Empty unless the session traces failures.
    #[must_use]
    pub fn trace_failures(&self) -> Vec<TraceReport> {
        let mut reports: BTreeMap<BlockPos, TraceReport> = BTreeMap::new();
        for layer in &self.traced {
            let layer = layer.borrow();
            for (pos, actions) in layer.failures() {
                reports.entry(pos).or_insert_with(|| TraceReport {
                    pos,
                    layer: layer.label(),
                    actions: actions.to_vec(),
                });
            }
        }
        reports.into_values().collect()
    }
}

/// Fast mode leaves lighting and neighbor updates to the repair pass.
fn effective_side_effects(config: &EditConfig) -> SideEffectSet {
    if config.reorder == ReorderMode::Fast {
        config
            .side_effects
            .with(SideEffect::Lighting, SideEffectState::Off)
            .with(SideEffect::Neighbors, SideEffectState::Off)
            .with(SideEffect::Update, SideEffectState::Off)
    } else {
        config.side_effects
    }
}
