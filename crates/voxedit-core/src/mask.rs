//! Position predicates used to restrict where writes land.

use core::fmt;
use std::sync::Arc;

use crate::pos::BlockPos;
use crate::region::Region;

/// A test for whether a position may be affected.
pub trait Mask {
    fn test(&self, pos: BlockPos) -> bool;
}

impl<F> Mask for F
where
    F: Fn(BlockPos) -> bool,
{
    fn test(&self, pos: BlockPos) -> bool {
        self(pos)
    }
}

/// Constant masks.
pub struct Masks;

impl Masks {
    #[must_use]
    pub fn always_true() -> Box<dyn Mask> {
        Box::new(|_: BlockPos| true)
    }

    #[must_use]
    pub fn always_false() -> Box<dyn Mask> {
        Box::new(|_: BlockPos| false)
    }
}

/// Passes positions inside a region.
#[derive(Clone)]
pub struct RegionMask {
    region: Arc<dyn Region>,
}

impl RegionMask {
    #[must_use]
    pub fn new(region: Arc<dyn Region>) -> Self {
        Self { region }
    }
}

impl Mask for RegionMask {
    fn test(&self, pos: BlockPos) -> bool {
        self.region.contains(pos)
    }
}

impl fmt::Debug for RegionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionMask")
            .field("region", &self.region)
            .finish()
    }
}

/// Inverts another mask.
pub struct NegatedMask {
    inner: Box<dyn Mask>,
}

impl NegatedMask {
    pub fn new(inner: impl Mask + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Mask for NegatedMask {
    fn test(&self, pos: BlockPos) -> bool {
        !self.inner.test(pos)
    }
}
