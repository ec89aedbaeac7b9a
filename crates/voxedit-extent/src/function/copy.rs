//! Region copy with transform, mask and repetitions.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use voxedit_core::{BlockPos, EditError, EditResult, Mask, Region, Transform, Transforms};
use voxedit_operation::{Counter, DelegateOperation, Operation, OperationQueue, RunContext};

use super::{
    CombinedRegionFunction, EntityVisitor, ExtentBiomeCopy, ExtentBlockCopy, ExtentEntityCopy, RegionFunction,
    RegionMaskingFilter, RegionVisitor,
};
use crate::extent::ExtentHandle;

/// Totals of a [`ForwardExtentCopy`], readable after the operation has been
/// handed off.
#[derive(Clone, Debug, Default)]
pub struct CopyProgress {
    blocks: Counter,
    biomes: Counter,
    entities: Counter,
}

impl CopyProgress {
    #[must_use]
    pub fn blocks(&self) -> usize {
        self.blocks.get()
    }

    #[must_use]
    pub fn biomes(&self) -> usize {
        self.biomes.get()
    }

    #[must_use]
    pub fn entities(&self) -> usize {
        self.entities.get()
    }
}

/// Counters of the visitors run for the repetition in flight.
struct InFlight {
    blocks: Counter,
    biomes: Option<Counter>,
    entities: Option<Counter>,
}

/// Copies a region from one extent to another.
///
/// Each repetition composes the transform once more with itself, so the
/// `n`th copy lands at `to + Tⁿ(pos - from)`. Counts from a repetition are
/// added to the totals only once all of that repetition's visitors have
/// finished.
pub struct ForwardExtentCopy {
    source: ExtentHandle,
    region: Arc<dyn Region>,
    from: BlockPos,
    destination: ExtentHandle,
    to: BlockPos,
    repetitions: usize,
    source_mask: Rc<dyn Mask>,
    source_function: Option<Rc<RefCell<dyn RegionFunction>>>,
    transform: Arc<dyn Transform>,
    current_transform: Option<Arc<dyn Transform>>,
    copying_entities: bool,
    removing_entities: bool,
    copying_biomes: bool,
    in_flight: Option<InFlight>,
    progress: CopyProgress,
}

impl ForwardExtentCopy {
    /// Copy `region`, with its minimum point landing on `to`.
    #[must_use]
    pub fn new(source: ExtentHandle, region: Arc<dyn Region>, destination: ExtentHandle, to: BlockPos) -> Self {
        let from = region.minimum_point();
        Self::with_origin(source, region, from, destination, to)
    }

    /// Copy `region`, with `from` landing on `to`.
    #[must_use]
    pub fn with_origin(
        source: ExtentHandle,
        region: Arc<dyn Region>,
        from: BlockPos,
        destination: ExtentHandle,
        to: BlockPos,
    ) -> Self {
        Self {
            source,
            region,
            from,
            destination,
            to,
            repetitions: 1,
            source_mask: Rc::new(|_: BlockPos| true),
            source_function: None,
            transform: Transforms::identity(),
            current_transform: None,
            copying_entities: true,
            removing_entities: false,
            copying_biomes: false,
            in_flight: None,
            progress: CopyProgress::default(),
        }
    }

    #[must_use]
    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    #[must_use]
    pub fn transform(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transform = transform;
        self
    }

    /// Only source positions passing `mask` are copied.
    #[must_use]
    pub fn source_mask(mut self, mask: impl Mask + 'static) -> Self {
        self.source_mask = Rc::new(mask);
        self
    }

    /// Run `function` over every copied source position, after its block
    /// has been copied.
    #[must_use]
    pub fn source_function(mut self, function: impl RegionFunction + 'static) -> Self {
        self.source_function = Some(Rc::new(RefCell::new(function)));
        self
    }

    #[must_use]
    pub const fn copying_entities(mut self, copying: bool) -> Self {
        self.copying_entities = copying;
        self
    }

    /// Remove source entities once copied.
    #[must_use]
    pub const fn removing_entities(mut self, removing: bool) -> Self {
        self.removing_entities = removing;
        self
    }

    #[must_use]
    pub const fn copying_biomes(mut self, copying: bool) -> Self {
        self.copying_biomes = copying;
        self
    }

    #[must_use]
    pub fn progress(&self) -> CopyProgress {
        self.progress.clone()
    }

    #[must_use]
    pub fn affected_blocks(&self) -> usize {
        self.progress.blocks()
    }

    #[must_use]
    pub fn affected_biomes(&self) -> usize {
        self.progress.biomes()
    }

    #[must_use]
    pub fn affected_entities(&self) -> usize {
        self.progress.entities()
    }

    fn settle(&mut self) {
        let Some(done) = self.in_flight.take() else {
            return;
        };
        self.progress.blocks.add(done.blocks.get());
        if let Some(biomes) = done.biomes {
            self.progress.biomes.add(biomes.get());
        }
        if let Some(entities) = done.entities {
            self.progress.entities.add(entities.get());
        }
    }

    fn next_transform(&mut self) -> Arc<dyn Transform> {
        let next = match &self.current_transform {
            None => Arc::clone(&self.transform),
            Some(current) => Transforms::combine(current, &self.transform),
        };
        self.current_transform = Some(Arc::clone(&next));
        next
    }

    fn block_visitor(&self, transform: &Arc<dyn Transform>) -> RegionVisitor {
        let copy = ExtentBlockCopy::new(
            self.source.clone(),
            self.from,
            self.destination.clone(),
            self.to,
            Arc::clone(transform),
        );
        let function: Box<dyn RegionFunction> = match &self.source_function {
            None => Box::new(RegionMaskingFilter::new(Rc::clone(&self.source_mask), copy)),
            Some(extra) => Box::new(RegionMaskingFilter::new(
                Rc::clone(&self.source_mask),
                CombinedRegionFunction::default().and(copy).and(Rc::clone(extra)),
            )),
        };
        RegionVisitor::new(Arc::clone(&self.region), function)
    }

    fn biome_visitor(&self, transform: &Arc<dyn Transform>) -> RegionVisitor {
        let copy = ExtentBiomeCopy::new(
            self.source.clone(),
            self.from,
            self.destination.clone(),
            self.to,
            Arc::clone(transform),
        );
        // Biomes are only masked when a source function is set.
        let function: Box<dyn RegionFunction> = if self.source_function.is_some() {
            Box::new(RegionMaskingFilter::new(Rc::clone(&self.source_mask), copy))
        } else {
            Box::new(copy)
        };
        RegionVisitor::new(Arc::clone(&self.region), function)
    }

    fn entity_visitor(&self, transform: &Arc<dyn Transform>) -> EntityVisitor {
        let copy = ExtentEntityCopy::new(
            self.source.clone(),
            self.from,
            self.destination.clone(),
            self.to,
            Arc::clone(transform),
        )
        .removing(self.removing_entities);
        let mut entities = self.source.borrow().entities_in(&*self.region);
        entities.retain(|entity| entity.pasteable);
        EntityVisitor::new(entities, Box::new(copy))
    }
}

impl Operation for ForwardExtentCopy {
    fn resume(mut self: Box<Self>, run: &dyn RunContext) -> EditResult<Option<Box<dyn Operation>>> {
        if run.is_cancelled() {
            return Err(EditError::Cancelled);
        }
        self.settle();
        if self.repetitions == 0 {
            return Ok(None);
        }
        self.repetitions -= 1;

        let transform = self.next_transform();
        let blocks = self.block_visitor(&transform);
        let mut in_flight = InFlight {
            blocks: blocks.affected(),
            biomes: None,
            entities: None,
        };

        if !self.copying_biomes && !self.copying_entities {
            self.in_flight = Some(in_flight);
            return Ok(Some(Box::new(DelegateOperation::new(self, Box::new(blocks)))));
        }

        let mut queue = OperationQueue::default();
        queue.offer(Box::new(blocks));
        if self.copying_biomes {
            let biomes = self.biome_visitor(&transform);
            in_flight.biomes = Some(biomes.affected());
            queue.offer(Box::new(biomes));
        }
        if self.copying_entities {
            let entities = self.entity_visitor(&transform);
            in_flight.entities = Some(entities.affected());
            queue.offer(Box::new(entities));
        }
        self.in_flight = Some(in_flight);
        Ok(Some(Box::new(DelegateOperation::new(self, Box::new(queue)))))
    }

    fn cancel(&mut self) {
        self.repetitions = 0;
    }

    fn status(&self, messages: &mut Vec<String>) {
        messages.push(format!("{} blocks changed", self.progress.blocks()));
        messages.push(format!("{} biomes changed", self.progress.biomes()));
        messages.push(format!("{} entities created or moved", self.progress.entities()));
    }
}
