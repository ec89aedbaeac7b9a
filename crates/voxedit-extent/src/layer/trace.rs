//! Find out which layer swallowed a write.

use hashbrown::HashSet;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use voxedit_core::{BaseBlock, BaseEntity, BiomeType, BlockMap, BlockPos, EditResult, EntityId, Location, WriteStatus};

use crate::extent::{Extent, ExtentHandle};

/// The kind of write a [`TracingExtent`] saw fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceAction {
    SetBlock,
    SetBiome,
    CreateEntity,
}

/// Records every position written through it and which of those writes
/// were rejected below.
pub struct TracingExtent {
    inner: ExtentHandle,
    label: &'static str,
    touched: HashSet<BlockPos, FxBuildHasher>,
    failed: BlockMap<SmallVec<[TraceAction; 3]>>,
}

impl TracingExtent {
    #[must_use]
    pub fn new(inner: ExtentHandle, label: &'static str) -> Self {
        Self {
            inner,
            label,
            touched: HashSet::with_hasher(FxBuildHasher),
            failed: BlockMap::new(),
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    #[must_use]
    pub fn touched(&self, pos: BlockPos) -> bool {
        self.touched.contains(&pos)
    }

    /// Failed writes at `pos`, oldest first.
    #[must_use]
    pub fn failed_actions(&self, pos: BlockPos) -> &[TraceAction] {
        self.failed.get(pos).map(SmallVec::as_slice).unwrap_or_default()
    }

    /// Every position with a failed write, with what failed there.
    pub fn failures(&self) -> impl Iterator<Item = (BlockPos, &[TraceAction])> {
        self.failed.iter().map(|(pos, actions)| (pos, actions.as_slice()))
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.iter().map(|(_, actions)| actions.len()).sum()
    }

    fn record(&mut self, pos: BlockPos, action: TraceAction, status: WriteStatus) {
        self.touched.insert(pos);
        if matches!(status, WriteStatus::Rejected | WriteStatus::LimitReached { .. }) {
            tracing::trace!(layer = self.label, ?pos, ?action, ?status, "write failed");
            match self.failed.get_mut(pos) {
                Some(actions) => actions.push(action),
                None => {
                    self.failed.insert(pos, SmallVec::from_elem(action, 1));
                }
            }
        }
    }
}

impl Extent for TracingExtent {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        let status = self.inner.borrow_mut().set_block(pos, block)?;
        self.record(pos, TraceAction::SetBlock, status);
        Ok(status)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        let status = self.inner.borrow_mut().set_biome(pos, biome)?;
        self.record(pos, TraceAction::SetBiome, status);
        Ok(status)
    }

    fn create_entity(&mut self, location: Location, entity: BaseEntity) -> EditResult<Option<EntityId>> {
        let created = self.inner.borrow_mut().create_entity(location, entity)?;
        let status = if created.is_some() { WriteStatus::Changed } else { WriteStatus::Rejected };
        self.record(location.position.to_block_pos(), TraceAction::CreateEntity, status);
        Ok(created)
    }
}
