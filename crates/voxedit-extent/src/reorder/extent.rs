//! Extents that hold writes back and apply them in arranged order.

use std::cell::RefCell;
use std::rc::Rc;

use voxedit_buffer::ActionBuffer;
use voxedit_core::{
    BaseBlock, BiomeType, BlockMap, BlockPos, BlockState, BlockStateHolder, EditError, EditResult, WriteStatus,
};
use voxedit_operation::{Operation, RunContext};

use super::action::{Action, BiomePlacement, BlockPlacement, WorldAction, Written};
use super::arranger::{Arranger, ArrangerContext};
use crate::extent::{Extent, ExtentHandle};

/// Buffered values reads see until the action writing them is applied.
#[derive(Default)]
struct Overlay {
    blocks: BlockMap<BaseBlock>,
    biomes: BlockMap<BiomeType>,
}

impl Overlay {
    /// Forget what `action` writes, unless a later write has replaced it.
    fn settle<A: Action>(&mut self, action: &A) {
        match action.written() {
            Written::Block(pos, block) => {
                if self.blocks.get(pos) == Some(block) {
                    self.blocks.remove(pos);
                }
            }
            Written::Biome(pos, biome) => {
                if self.biomes.get(pos) == Some(biome) {
                    self.biomes.remove(pos);
                }
            }
        }
    }
}

/// Apply one arranged action. When it fails, the rest of the batch is
/// dropped and settled so reads stop showing it.
fn apply_settled<A: Action>(
    action: A,
    rest: &mut std::vec::IntoIter<A>,
    overlay: &RefCell<Overlay>,
    target: &mut dyn Extent,
) -> EditResult<()> {
    overlay.borrow_mut().settle(&action);
    if let Err(error) = action.apply(target) {
        let dropped = rest.len();
        let mut overlay = overlay.borrow_mut();
        for action in rest {
            overlay.settle(&action);
        }
        tracing::warn!(%error, dropped, "arranged write failed, dropping the rest of the batch");
        return Err(error);
    }
    Ok(())
}

/// Buffers writes as actions of type `A`, applying them through an
/// [`Arranger`] when the buffer fills and at commit.
///
/// Reads see buffered writes until each one reaches the next layer. Block
/// writes outside the next layer's height are not buffered.
pub struct ArrangerExtent<A: Action = BlockPlacement> {
    inner: ExtentHandle,
    arranger: Box<dyn Arranger<A>>,
    buffer: ActionBuffer<A>,
    overlay: Rc<RefCell<Overlay>>,
    enabled: bool,
}

/// Buffers block and biome writes together.
pub type ArrangerBufferExtent = ArrangerExtent<WorldAction>;

impl<A: Action> ArrangerExtent<A> {
    #[must_use]
    pub fn new(inner: ExtentHandle, arranger: Box<dyn Arranger<A>>, capacity: usize) -> Self {
        Self {
            inner,
            arranger,
            buffer: ActionBuffer::allocate(capacity.max(1)),
            overlay: Rc::default(),
            enabled: true,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turning buffering off does not flush; commit still applies what is
    /// held.
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Actions held back.
    #[must_use]
    pub const fn buffered(&self) -> usize {
        self.buffer.position()
    }

    /// Blocks outside this height go straight to the next layer.
    fn in_height(&self, pos: BlockPos) -> bool {
        let inner = self.inner.borrow();
        (inner.minimum_point().y..=inner.maximum_point().y).contains(&pos.y)
    }

    /// Empty the buffer in arranged order. The overlay keeps every value
    /// until its action is applied.
    fn take_arranged(&mut self) -> EditResult<Vec<A>> {
        self.buffer.flip();
        let actions = self.buffer.get_slice(self.buffer.remaining())?;
        self.buffer.clear();

        let mut context = ArrangerContext::new(actions);
        self.arranger.rearrange(&mut context);
        Ok(context.into_actions())
    }

    fn stage(&mut self, action: A) -> EditResult<()> {
        if !self.buffer.has_remaining() {
            let mut actions = self.take_arranged()?.into_iter();
            tracing::trace!(actions = actions.len(), "buffer full, flushing");
            let mut inner = self.inner.borrow_mut();
            while let Some(pending) = actions.next() {
                apply_settled(pending, &mut actions, &self.overlay, &mut *inner)?;
            }
        }
        self.buffer.put(action)?;
        Ok(())
    }
}

impl<A: Action> Extent for ArrangerExtent<A> {
    fn delegate(&self) -> Option<&ExtentHandle> {
        Some(&self.inner)
    }

    fn get_block(&self, pos: BlockPos) -> BlockState {
        if let Some(block) = self.overlay.borrow().blocks.get(pos) {
            return block.to_state();
        }
        self.inner.borrow().get_block(pos)
    }

    fn get_full_block(&self, pos: BlockPos) -> BaseBlock {
        if let Some(block) = self.overlay.borrow().blocks.get(pos) {
            return block.clone();
        }
        self.inner.borrow().get_full_block(pos)
    }

    fn get_biome(&self, pos: BlockPos) -> BiomeType {
        if let Some(biome) = self.overlay.borrow().biomes.get(pos) {
            return biome.clone();
        }
        self.inner.borrow().get_biome(pos)
    }

    fn set_block(&mut self, pos: BlockPos, block: BaseBlock) -> EditResult<WriteStatus> {
        if !self.enabled || !self.in_height(pos) {
            return self.inner.borrow_mut().set_block(pos, block);
        }
        let old = self.get_block(pos);
        let status = WriteStatus::from_changed(!old.equals_fuzzy(&block.to_state()));
        self.stage(A::from_block(BlockPlacement::new(pos, old, block.clone())))?;
        self.overlay.borrow_mut().blocks.insert(pos, block);
        Ok(status)
    }

    fn set_biome(&mut self, pos: BlockPos, biome: BiomeType) -> EditResult<WriteStatus> {
        if !self.enabled {
            return self.inner.borrow_mut().set_biome(pos, biome);
        }
        let Some(action) = A::from_biome(BiomePlacement {
            pos,
            biome: biome.clone(),
        }) else {
            return self.inner.borrow_mut().set_biome(pos, biome);
        };
        let status = WriteStatus::from_changed(self.get_biome(pos) != biome);
        self.stage(action)?;
        self.overlay.borrow_mut().biomes.insert(pos, biome);
        Ok(status)
    }

    fn commit_required(&self) -> bool {
        true
    }

    fn commit_before(&mut self) -> Option<Box<dyn Operation>> {
        if self.buffer.position() == 0 {
            return None;
        }
        let actions = match self.take_arranged() {
            Ok(actions) => actions,
            Err(error) => return Some(Box::new(Failed(Some(error)))),
        };
        tracing::debug!(actions = actions.len(), "applying arranged writes");
        Some(Box::new(ApplyActions {
            target: self.inner.clone(),
            overlay: Rc::clone(&self.overlay),
            actions: actions.into_iter(),
        }))
    }
}

/// Writes arranged actions into the next layer, a slice at a time.
struct ApplyActions<A> {
    target: ExtentHandle,
    overlay: Rc<RefCell<Overlay>>,
    actions: std::vec::IntoIter<A>,
}

impl<A: Action> Operation for ApplyActions<A> {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        let this = &mut *self;
        while let Some(action) = this.actions.next() {
            apply_settled(action, &mut this.actions, &this.overlay, &mut *this.target.borrow_mut())?;
            if !run.should_continue() {
                return Ok(Some(self));
            }
        }
        Ok(None)
    }

    /// Unapplied actions are dropped, and reads go back to the next layer.
    fn cancel(&mut self) {
        let mut overlay = self.overlay.borrow_mut();
        for action in self.actions.by_ref() {
            overlay.settle(&action);
        }
    }

    fn status(&self, messages: &mut Vec<String>) {
        messages.push(format!("{} arranged writes remaining", self.actions.len()));
    }
}

/// Reports an error raised while building a commit.
struct Failed(Option<EditError>);

impl Operation for Failed {
    fn resume(mut self: Box<Self>, _run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        match self.0.take() {
            Some(error) => Err(error),
            None => Ok(None),
        }
    }

    fn cancel(&mut self) {
        self.0 = None;
    }
}
