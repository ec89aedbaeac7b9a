//! Writing a list of blocks in order.

use std::cell::RefCell;
use std::rc::Rc;

use voxedit_core::{BaseBlock, BlockMap, EditError, EditResult, LocatedBlock, LocatedBlockList};
use voxedit_operation::{Operation, RunContext};

use crate::extent::ExtentHandle;

/// Writes a list of located blocks into an extent, in list order, a slice
/// at a time.
pub struct SetLocatedBlocks {
    target: ExtentHandle,
    blocks: std::vec::IntoIter<LocatedBlock>,
    settles: Option<Rc<RefCell<BlockMap<BaseBlock>>>>,
    written: usize,
}

impl SetLocatedBlocks {
    #[must_use]
    pub fn new(target: ExtentHandle, blocks: LocatedBlockList) -> Self {
        Self {
            target,
            blocks: blocks.into_iter(),
            settles: None,
            written: 0,
        }
    }

    /// Remove each block from `pending` once it is written, unless `pending`
    /// holds a newer value for that position by then.
    #[must_use]
    pub fn settling(mut self, pending: Rc<RefCell<BlockMap<BaseBlock>>>) -> Self {
        self.settles = Some(pending);
        self
    }

    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }
}

impl Operation for SetLocatedBlocks {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        loop {
            let Some(LocatedBlock { pos, block }) = self.blocks.next() else {
                return Ok(None);
            };
            let settles = self
                .settles
                .as_ref()
                .filter(|pending| pending.borrow().get(pos) == Some(&block))
                .cloned();
            self.target.borrow_mut().set_block(pos, block)?.into_result()?;
            if let Some(pending) = settles {
                pending.borrow_mut().remove(pos);
            }
            self.written += 1;
            if !run.should_continue() {
                return Ok(Some(self));
            }
        }
    }

    fn cancel(&mut self) {
        self.blocks = Vec::new().into_iter();
    }

    fn status(&self, messages: &mut Vec<String>) {
        messages.push(format!(
            "{} blocks placed, {} remaining",
            self.written,
            self.blocks.len()
        ));
    }
}
