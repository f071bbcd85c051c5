use crate::bounding_volume::Box3;
use crate::math::{Point, Real};
use crate::shape::Triangle;

/// A triangle being sorted into a hierarchy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BuildTriangle {
    /// Stable identifier: the position of the triangle in the input.
    pub id: usize,
    /// Current position of the triangle in the working array.
    ///
    /// Kept up to date by every swap performed on [`BuildTriangles`].
    pub index: usize,
    /// The triangle itself.
    pub triangle: Triangle,
    /// The bounding box of the triangle.
    pub bounds: Box3,
    /// The barycenter of the triangle, used for binning.
    pub center: Point<Real>,
}

/// The working array of the builder.
///
/// Triangles are stored by stable `id` and addressed through a slot
/// permutation that the builder partitions in place. Evaluators holding
/// triangle IDs (e.g. the triangles hit by a sample ray) can therefore find
/// the current slot of any triangle in constant time.
#[derive(Clone, Debug, Default)]
pub struct BuildTriangles {
    triangles: Vec<BuildTriangle>,
    order: Vec<usize>,
}

impl BuildTriangles {
    /// Wraps the given triangles, in order.
    pub fn new(triangles: impl IntoIterator<Item = Triangle>) -> Self {
        let triangles: Vec<_> = triangles
            .into_iter()
            .enumerate()
            .map(|(id, triangle)| BuildTriangle {
                id,
                index: id,
                triangle,
                bounds: triangle.bounds(),
                center: triangle.center(),
            })
            .collect();
        let order = (0..triangles.len()).collect();

        Self { triangles, order }
    }

    /// The number of triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Is this array empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The triangle currently at position `slot`.
    #[inline]
    pub fn at(&self, slot: usize) -> &BuildTriangle {
        &self.triangles[self.order[slot]]
    }

    /// The triangle with the stable identifier `id`.
    #[inline]
    pub fn by_id(&self, id: usize) -> &BuildTriangle {
        &self.triangles[id]
    }

    /// Iterates through the triangles at positions `start..end`.
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = &BuildTriangle> + '_ {
        self.order[start..end].iter().map(|id| &self.triangles[*id])
    }

    /// Exchanges the triangles at positions `a` and `b`.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.order.swap(a, b);
        self.triangles[self.order[a]].index = a;
        self.triangles[self.order[b]].index = b;
    }

    /// Moves every triangle of `start..end` satisfying `pred` to the front
    /// of the range and returns the position of the first one that does not.
    ///
    /// Each slot is inspected once, in order.
    pub fn sweep_partition(
        &mut self,
        start: usize,
        end: usize,
        mut pred: impl FnMut(&BuildTriangle) -> bool,
    ) -> usize {
        let mut part = start;
        for k in start..end {
            if pred(self.at(k)) {
                if part != k {
                    self.swap(part, k);
                }
                part += 1;
            }
        }
        part
    }

    /// The bounding box of the centers of the triangles in `start..end`.
    pub fn centroid_bounds(&self, start: usize, end: usize) -> Box3 {
        Box3::from_points(self.range(start, end).map(|t| t.center))
    }

    /// The bounding box of the triangles in `start..end`.
    pub fn bounds(&self, start: usize, end: usize) -> Box3 {
        self.range(start, end)
            .fold(Box3::EMPTY, |acc, t| acc | t.bounds)
    }

    /// Copies out the triangles in `start..end`, in their current order.
    pub fn triangles(&self, start: usize, end: usize) -> Vec<Triangle> {
        self.range(start, end).map(|t| t.triangle).collect()
    }
}

/// Accumulates per-triangle statistics into a monoid.
///
/// The builder never rescans triangles to summarize a range: it folds the
/// aggregates of the bins instead. `combine` must therefore be associative
/// and `identity` must be its neutral element.
pub trait TriangleAggregator {
    /// The accumulated statistics.
    type Aggregate: Clone;

    /// The neutral element of [`Self::combine`].
    fn identity(&self) -> Self::Aggregate;

    /// Is `aggregate` the aggregate of no triangle at all?
    fn is_identity(&self, aggregate: &Self::Aggregate) -> bool;

    /// The statistics of a single triangle.
    fn value(&self, triangle: &BuildTriangle) -> Self::Aggregate;

    /// Combines two aggregates.
    fn combine(&self, a: &Self::Aggregate, b: &Self::Aggregate) -> Self::Aggregate;

    /// Folds the triangles at positions `start..end`.
    fn roll(&self, triangles: &BuildTriangles, start: usize, end: usize) -> Self::Aggregate {
        triangles
            .range(start, end)
            .fold(self.identity(), |acc, t| self.combine(&acc, &self.value(t)))
    }
}

/// Aggregates exposing a triangle count.
pub trait CountedAggregate {
    /// The number of triangles summarized by this aggregate.
    fn count(&self) -> usize;
}

/// Triangle count and bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundAndCount {
    /// The union of the triangle boxes.
    pub bounds: Box3,
    /// The number of triangles.
    pub count: usize,
}

impl CountedAggregate for BoundAndCount {
    #[inline]
    fn count(&self) -> usize {
        self.count
    }
}

/// The aggregator producing [`BoundAndCount`].
#[derive(Copy, Clone, Debug, Default)]
pub struct BoundsCountAggregator;

impl TriangleAggregator for BoundsCountAggregator {
    type Aggregate = BoundAndCount;

    #[inline]
    fn identity(&self) -> BoundAndCount {
        BoundAndCount {
            bounds: Box3::EMPTY,
            count: 0,
        }
    }

    #[inline]
    fn is_identity(&self, aggregate: &BoundAndCount) -> bool {
        aggregate.count == 0
    }

    #[inline]
    fn value(&self, triangle: &BuildTriangle) -> BoundAndCount {
        BoundAndCount {
            bounds: triangle.bounds,
            count: 1,
        }
    }

    #[inline]
    fn combine(&self, a: &BoundAndCount, b: &BoundAndCount) -> BoundAndCount {
        BoundAndCount {
            bounds: a.bounds | b.bounds,
            count: a.count + b.count,
        }
    }
}
