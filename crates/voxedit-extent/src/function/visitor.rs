//! Time-sliced drivers for region and entity functions.

use std::sync::Arc;

use voxedit_core::{EditError, EditResult, Entity, Region, RegionIter};
use voxedit_operation::{Counter, Operation, RunContext};

use super::{EntityFunction, RegionFunction};

/// Applies a function to every position of a region, a slice per resume.
pub struct RegionVisitor {
    /// `None` once cancelled.
    positions: Option<RegionIter>,
    function: Box<dyn RegionFunction>,
    affected: Counter,
}

impl RegionVisitor {
    #[must_use]
    pub fn new(region: Arc<dyn Region>, function: Box<dyn RegionFunction>) -> Self {
        Self {
            positions: Some(RegionIter::new(region)),
            function,
            affected: Counter::new(),
        }
    }

    /// Positions the function reported as affected, shared with the visitor.
    #[must_use]
    pub fn affected(&self) -> Counter {
        self.affected.clone()
    }
}

impl Operation for RegionVisitor {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        while let Some(pos) = self.positions.as_mut().and_then(Iterator::next) {
            if self.function.apply(pos)? {
                self.affected.increment();
            }
            if !run.should_continue() {
                return Ok(Some(self));
            }
        }
        Ok(None)
    }

    fn cancel(&mut self) {
        self.positions = None;
    }

    fn status(&self, messages: &mut Vec<String>) {
        messages.push(format!("{} blocks affected", self.affected.get()));
    }
}

/// Applies a function to every entity of a snapshot, a slice per resume.
pub struct EntityVisitor {
    entities: std::vec::IntoIter<Entity>,
    function: Box<dyn EntityFunction>,
    affected: Counter,
}

impl EntityVisitor {
    #[must_use]
    pub fn new(entities: Vec<Entity>, function: Box<dyn EntityFunction>) -> Self {
        Self {
            entities: entities.into_iter(),
            function,
            affected: Counter::new(),
        }
    }

    #[must_use]
    pub fn affected(&self) -> Counter {
        self.affected.clone()
    }
}

impl Operation for EntityVisitor {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        while let Some(entity) = self.entities.next() {
            if self.function.apply(&entity)? {
                self.affected.increment();
            }
            if !run.should_continue() {
                return Ok(Some(self));
            }
        }
        Ok(None)
    }

    fn cancel(&mut self) {
        self.entities = Vec::new().into_iter();
    }

    fn status(&self, messages: &mut Vec<String>) {
        messages.push(format!("{} entities affected", self.affected.get()));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use voxedit_core::{BlockPos, CuboidRegion};
    use voxedit_operation::Operations;

    use super::*;

    /// Gives up after every position.
    struct OneAtATime;

    impl RunContext for OneAtATime {
        fn should_continue(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_visits_every_position_across_resumes() {
        let seen = std::rc::Rc::new(Cell::new(0));
        let counter = seen.clone();
        struct Count(std::rc::Rc<Cell<usize>>);
        impl RegionFunction for Count {
            fn apply(&mut self, pos: BlockPos) -> EditResult<bool> {
                self.0.set(self.0.get() + 1);
                Ok(pos.y == 0)
            }
        }

        let region = CuboidRegion::shared(BlockPos::ZERO, BlockPos::new(2, 1, 1));
        let visitor = RegionVisitor::new(region, Box::new(Count(counter)));
        let affected = visitor.affected();

        let mut op: Option<Box<dyn Operation>> = Some(Box::new(visitor));
        let mut resumes = 0;
        while let Some(current) = op {
            op = current.resume(&OneAtATime).unwrap();
            resumes += 1;
        }
        assert_eq!(seen.get(), 12);
        // One resume per position, plus one to observe the end.
        assert_eq!(resumes, 13);
        assert_eq!(affected.get(), 6);
    }

    #[test]
    fn test_cancel_releases_positions() {
        struct Count(std::rc::Rc<Cell<usize>>);
        impl RegionFunction for Count {
            fn apply(&mut self, _: BlockPos) -> EditResult<bool> {
                self.0.set(self.0.get() + 1);
                Ok(true)
            }
        }
        let seen = std::rc::Rc::new(Cell::new(0));
        let region = CuboidRegion::shared(BlockPos::ZERO, BlockPos::new(3, 0, 0));

        let mut visitor = RegionVisitor::new(Arc::clone(&region), Box::new(Count(seen.clone())));
        visitor.cancel();
        assert!(visitor.positions.is_none());

        let token = voxedit_operation::CancelToken::new();
        token.cancel();
        let run = voxedit_operation::TimedRunContext::new(std::time::Duration::from_secs(1)).with_cancel(token);
        let visitor = RegionVisitor::new(region, Box::new(Count(seen.clone())));
        assert!(matches!(Box::new(visitor).resume(&run), Err(EditError::Cancelled)));
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn test_single_position_region() {
        struct Always;
        impl RegionFunction for Always {
            fn apply(&mut self, _: BlockPos) -> EditResult<bool> {
                Ok(true)
            }
        }
        let region = CuboidRegion::shared(BlockPos::ZERO, BlockPos::ZERO);
        let visitor = RegionVisitor::new(region, Box::new(Always));
        let affected = visitor.affected();
        Operations::complete(Some(Box::new(visitor))).unwrap();
        assert_eq!(affected.get(), 1);
    }
}
