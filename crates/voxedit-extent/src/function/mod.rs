//! Functions applied per position or per entity, and the operations that
//! drive them over a region.

mod block;
mod copy;
mod entity;
mod located;
mod visitor;

use std::cell::RefCell;
use std::rc::Rc;

use voxedit_core::{BaseBlock, BlockPos, EditResult, Entity, Mask};

pub use block::{ExtentBiomeCopy, ExtentBlockCopy};
pub use copy::{CopyProgress, ForwardExtentCopy};
pub use entity::ExtentEntityCopy;
pub use located::SetLocatedBlocks;
pub use visitor::{EntityVisitor, RegionVisitor};

use crate::extent::ExtentHandle;

/// Something done at one position. Returns whether anything was affected.
pub trait RegionFunction {
    fn apply(&mut self, pos: BlockPos) -> EditResult<bool>;
}

impl<F: RegionFunction + ?Sized> RegionFunction for Box<F> {
    fn apply(&mut self, pos: BlockPos) -> EditResult<bool> {
        (**self).apply(pos)
    }
}

/// Shared so one function can be reused by several visitors in turn.
impl<F: RegionFunction + ?Sized> RegionFunction for Rc<RefCell<F>> {
    fn apply(&mut self, pos: BlockPos) -> EditResult<bool> {
        self.borrow_mut().apply(pos)
    }
}

/// Something done to one entity. Returns whether anything was affected.
pub trait EntityFunction {
    fn apply(&mut self, entity: &Entity) -> EditResult<bool>;
}

/// Applies a function only where a mask passes.
pub struct RegionMaskingFilter<F> {
    mask: Rc<dyn Mask>,
    function: F,
}

impl<F: RegionFunction> RegionMaskingFilter<F> {
    #[must_use]
    pub fn new(mask: Rc<dyn Mask>, function: F) -> Self {
        Self { mask, function }
    }
}

impl<F: RegionFunction> RegionFunction for RegionMaskingFilter<F> {
    fn apply(&mut self, pos: BlockPos) -> EditResult<bool> {
        if self.mask.test(pos) {
            self.function.apply(pos)
        } else {
            Ok(false)
        }
    }
}

/// Applies every function in turn; affected if any of them was.
#[derive(Default)]
pub struct CombinedRegionFunction {
    functions: Vec<Box<dyn RegionFunction>>,
}

impl CombinedRegionFunction {
    #[must_use]
    pub fn new(functions: Vec<Box<dyn RegionFunction>>) -> Self {
        Self { functions }
    }

    #[must_use]
    pub fn and(mut self, function: impl RegionFunction + 'static) -> Self {
        self.functions.push(Box::new(function));
        self
    }
}

impl RegionFunction for CombinedRegionFunction {
    fn apply(&mut self, pos: BlockPos) -> EditResult<bool> {
        let mut affected = false;
        for function in &mut self.functions {
            affected |= function.apply(pos)?;
        }
        Ok(affected)
    }
}

/// Sets every visited position to one block.
pub struct BlockReplace {
    extent: ExtentHandle,
    block: BaseBlock,
}

impl BlockReplace {
    #[must_use]
    pub const fn new(extent: ExtentHandle, block: BaseBlock) -> Self {
        Self { extent, block }
    }
}

impl RegionFunction for BlockReplace {
    fn apply(&mut self, pos: BlockPos) -> EditResult<bool> {
        self.extent.borrow_mut().set_block(pos, self.block.clone())?.into_result()
    }
}
