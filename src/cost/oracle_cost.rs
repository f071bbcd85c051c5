use super::full_cost::first_occluder;
use super::{TraceCost, TraceResult};
use crate::partitioning::bvh::{BvhNodeContent, TriangleLeaf};
use crate::partitioning::{Branch, NodeVisitor, Tree};
use crate::query::Segment;

/// Cost of finding an occluder of a shadow segment for a traversal that
/// always knows which child leads to the cheapest occluder.
pub struct OracleCost<'a> {
    segment: &'a Segment,
}

impl<'a> OracleCost<'a> {
    /// Creates a measure for `segment`.
    pub fn new(segment: &'a Segment) -> Self {
        Self { segment }
    }

    /// Traces `segment` through `tree`.
    pub fn trace<B, L>(tree: &Tree<B, L>, segment: &Segment) -> TraceResult
    where
        B: BvhNodeContent,
        L: TriangleLeaf,
    {
        tree.accept(&mut OracleCost::new(segment))
    }

    /// Traces every segment through `tree` and aggregates the results.
    pub fn total_cost<B: BvhNodeContent, L: TriangleLeaf>(
        tree: &Tree<B, L>,
        segments: &[Segment],
    ) -> OracleTraceResult {
        let mut result = OracleTraceResult::default();

        for segment in segments {
            let traced = Self::trace(tree, segment);
            result.num_rays += 1;
            if traced.hits {
                result.num_hits += 1;
                result.hit += traced.cost;
            } else {
                result.non_hit += traced.cost;
            }
        }

        result
    }
}

impl<B: BvhNodeContent, L: TriangleLeaf> NodeVisitor<B, L> for OracleCost<'_> {
    type Output = TraceResult;

    fn visit_branch(&mut self, branch: &Branch<B, L>) -> TraceResult {
        if !branch.content.bbox().intersects_segment(self.segment) {
            return TraceResult::MISSED_BOX;
        }

        let left = branch.left.accept(self);
        let right = branch.right.accept(self);

        let result = match (left.hits, right.hits) {
            (true, true) => {
                if left.cost.bbox_tests.expected < right.cost.bbox_tests.expected {
                    left
                } else {
                    right
                }
            }
            (true, false) => left,
            (false, true) => right,
            (false, false) => TraceResult::new(false, left.cost + right.cost),
        };

        TraceResult::new(result.hits, result.cost.with_bbox_test())
    }

    fn visit_leaf(&mut self, leaf: &L) -> TraceResult {
        if !leaf.bbox().intersects_segment(self.segment) {
            return TraceResult::MISSED_BOX;
        }

        // The oracle tests the occluding triangle only.
        match first_occluder(leaf, self.segment) {
            (true, _) => TraceResult::new(true, TraceCost::constant(1.0, 1.0)),
            (false, tests) => TraceResult::new(false, TraceCost::constant(1.0, tests as f64)),
        }
    }
}

/// Oracle costs of a batch of shadow segments.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct OracleTraceResult {
    /// The number of traced segments.
    pub num_rays: usize,
    /// The number of occluded segments.
    pub num_hits: usize,
    /// The cost of the occluded segments.
    pub hit: TraceCost,
    /// The cost of the unoccluded segments.
    pub non_hit: TraceCost,
}

impl OracleTraceResult {
    /// The cost of all the segments.
    pub fn total(&self) -> TraceCost {
        self.hit + self.non_hit
    }
}
