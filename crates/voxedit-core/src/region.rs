//! Bounded sets of positions.

use core::fmt;
use std::sync::Arc;

use crate::pos::{BlockPos, Vec3};

/// An immutable, bounded set of positions.
pub trait Region: fmt::Debug + Send + Sync {
    fn minimum_point(&self) -> BlockPos;

    fn maximum_point(&self) -> BlockPos;

    fn contains(&self, pos: BlockPos) -> bool;

    /// Midpoint of the bounding box.
    fn center(&self) -> Vec3 {
        let min = self.minimum_point().to_vec3();
        let max = self.maximum_point().to_vec3();
        Vec3::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }

    /// Number of positions in the region.
    fn volume(&self) -> u64 {
        let min = self.minimum_point();
        let max = self.maximum_point();
        let mut count = 0;
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    if self.contains(BlockPos::new(x, y, z)) {
                        count += 1;
                    }
                }
            }
        }
        count
    }
}

/// An axis-aligned box between two corners, both inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CuboidRegion {
    min: BlockPos,
    max: BlockPos,
}

impl CuboidRegion {
    /// Create a region from any two opposite corners.
    #[must_use]
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[must_use]
    pub fn shared(a: BlockPos, b: BlockPos) -> Arc<dyn Region> {
        Arc::new(Self::new(a, b))
    }

    /// Edge lengths along each axis. Wide enough for a region spanning
    /// the whole `i32` range.
    #[must_use]
    pub fn dimensions(&self) -> [u64; 3] {
        [
            u64::from(self.max.x.abs_diff(self.min.x)) + 1,
            u64::from(self.max.y.abs_diff(self.min.y)) + 1,
            u64::from(self.max.z.abs_diff(self.min.z)) + 1,
        ]
    }
}

impl Region for CuboidRegion {
    fn minimum_point(&self) -> BlockPos {
        self.min
    }

    fn maximum_point(&self) -> BlockPos {
        self.max
    }

    fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    fn volume(&self) -> u64 {
        let [x, y, z] = self.dimensions();
        x.saturating_mul(y).saturating_mul(z)
    }
}

/// Owned iterator over a region's positions, x fastest, then y, then z.
///
/// Owning the region lets a visitor keep its place across many resumes.
#[derive(Debug, Clone)]
pub struct RegionIter {
    region: Arc<dyn Region>,
    min: BlockPos,
    max: BlockPos,
    next: Option<BlockPos>,
}

impl RegionIter {
    #[must_use]
    pub fn new(region: Arc<dyn Region>) -> Self {
        let min = region.minimum_point();
        let max = region.maximum_point();
        Self {
            region,
            min,
            max,
            next: Some(min),
        }
    }

    /// The position after `current`, or `None` past the last one. Bounds at
    /// `i32::MAX` end the walk instead of overflowing.
    fn advance(&self, current: BlockPos) -> Option<BlockPos> {
        if let Some(x) = current.x.checked_add(1).filter(|x| *x <= self.max.x) {
            return Some(BlockPos { x, ..current });
        }
        if let Some(y) = current.y.checked_add(1).filter(|y| *y <= self.max.y) {
            return Some(BlockPos::new(self.min.x, y, current.z));
        }
        let z = current.z.checked_add(1).filter(|z| *z <= self.max.z)?;
        Some(BlockPos::new(self.min.x, self.min.y, z))
    }
}

impl Iterator for RegionIter {
    type Item = BlockPos;

    fn next(&mut self) -> Option<BlockPos> {
        while let Some(current) = self.next {
            self.next = self.advance(current);
            if self.region.contains(current) {
                return Some(current);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_are_normalized() {
        let region = CuboidRegion::new(BlockPos::new(5, 0, -2), BlockPos::new(1, 3, 2));
        assert_eq!(region.minimum_point(), BlockPos::new(1, 0, -2));
        assert_eq!(region.maximum_point(), BlockPos::new(5, 3, 2));
        assert_eq!(region.volume(), 5 * 4 * 5);
    }

    #[test]
    fn test_iter_visits_every_position_once() {
        let region = CuboidRegion::shared(BlockPos::ZERO, BlockPos::new(2, 1, 3));
        let positions: Vec<_> = RegionIter::new(Arc::clone(&region)).collect();
        assert_eq!(positions.len() as u64, region.volume());
        assert_eq!(positions[0], BlockPos::ZERO);
        assert_eq!(positions[1], BlockPos::new(1, 0, 0));
        assert_eq!(*positions.last().unwrap(), BlockPos::new(2, 1, 3));

        let unique: std::collections::HashSet<_> = positions.iter().collect();
        assert_eq!(unique.len(), positions.len());
    }

    #[test]
    fn test_iter_stops_at_i32_bounds() {
        let region = CuboidRegion::shared(
            BlockPos::new(i32::MAX - 1, i32::MAX - 1, i32::MAX),
            BlockPos::new(i32::MAX, i32::MAX, i32::MAX),
        );
        let positions: Vec<_> = RegionIter::new(region).collect();
        assert_eq!(
            positions,
            vec![
                BlockPos::new(i32::MAX - 1, i32::MAX - 1, i32::MAX),
                BlockPos::new(i32::MAX, i32::MAX - 1, i32::MAX),
                BlockPos::new(i32::MAX - 1, i32::MAX, i32::MAX),
                BlockPos::new(i32::MAX, i32::MAX, i32::MAX),
            ]
        );
    }

    #[test]
    fn test_full_width_dimensions() {
        let region = CuboidRegion::new(BlockPos::new(i32::MIN, 0, 0), BlockPos::new(i32::MAX, 0, 0));
        assert_eq!(region.dimensions(), [1 << 32, 1, 1]);
        assert_eq!(region.volume(), 1 << 32);
    }

    #[test]
    fn test_center() {
        let region = CuboidRegion::new(BlockPos::ZERO, BlockPos::new(2, 4, 6));
        assert_eq!(region.center(), Vec3::new(1.0, 2.0, 3.0));
    }
}
