use super::{OracleCost, TraceCost, TraceResult};
use crate::partitioning::bvh::{KernelBranch, TriangleLeaf};
use crate::partitioning::{Branch, NodeVisitor, Tree};
use crate::query::{Segment, ShadowQuery};
use core::ops::Add;
use num::Zero;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Expected cost of finding any occluder of a shadow segment, under the
/// traversal kernel carried by each branch.
///
/// Branches with a fixed order stop as soon as their first child finds an
/// occluder. Other kernels yield a mixture of both visiting orders, weighted
/// by the probability of visiting the left child first.
pub struct FullCostMeasure<'a> {
    segment: &'a Segment,
}

impl<'a> FullCostMeasure<'a> {
    /// Creates a measure for `segment`.
    pub fn new(segment: &'a Segment) -> Self {
        Self { segment }
    }

    /// Traces `segment` through `tree`.
    pub fn trace<B, L>(tree: &Tree<B, L>, segment: &Segment) -> TraceResult
    where
        B: KernelBranch,
        L: TriangleLeaf,
    {
        tree.accept(&mut FullCostMeasure::new(segment))
    }

    /// Traces `segment` through `tree`, splitting its cost between the path
    /// to the occluder and the subtrees visited on the way.
    pub fn trace_spine<B, L>(tree: &Tree<B, L>, segment: &Segment) -> SpineSideCost
    where
        B: KernelBranch,
        L: TriangleLeaf,
    {
        tree.accept(&mut SpineSideMeasure { segment })
    }

    /// Traces every query through `tree` and aggregates the results.
    pub fn total_cost<B, L>(tree: &Tree<B, L>, queries: &[ShadowQuery]) -> FullTraceResult
    where
        B: KernelBranch + Sync,
        L: TriangleLeaf + Sync,
    {
        #[cfg(feature = "parallel")]
        let total = queries
            .par_iter()
            .map(|q| FullTraceResult::of_query(tree, q))
            .reduce(FullTraceResult::zero, Add::add);
        #[cfg(not(feature = "parallel"))]
        let total = queries
            .iter()
            .fold(FullTraceResult::zero(), |acc, q| acc + FullTraceResult::of_query(tree, q));

        log::debug!(
            "traced {} shadow rays, {} occluded, {} disagreements",
            total.num_rays,
            total.num_hits,
            total.disagreements
        );
        total
    }
}

/// Primitive tests until the first occluder of `segment`, and whether one
/// was found.
pub(super) fn first_occluder(leaf: &impl TriangleLeaf, segment: &Segment) -> (bool, usize) {
    let mut tests = 0;
    for triangle in leaf.primitives() {
        tests += 1;
        if triangle.intersects_segment(segment) {
            return (true, tests);
        }
    }
    (false, tests)
}

#[inline]
pub(super) fn left_probability<B, L>(branch: &Branch<B, L>, segment: &Segment) -> f64
where
    B: KernelBranch,
    L: TriangleLeaf,
{
    branch
        .content
        .kernel()
        .left_probability(&segment.origin, branch.left.bbox(), branch.right.bbox())
}

impl<B: KernelBranch, L: TriangleLeaf> NodeVisitor<B, L> for FullCostMeasure<'_> {
    type Output = TraceResult;

    fn visit_branch(&mut self, branch: &Branch<B, L>) -> TraceResult {
        if !branch.content.bbox().intersects_segment(self.segment) {
            return TraceResult::MISSED_BOX;
        }

        let p = left_probability(branch, self.segment);

        if p == 1.0 || p == 0.0 {
            let (first, second) = if p == 1.0 {
                (&branch.left, &branch.right)
            } else {
                (&branch.right, &branch.left)
            };

            let first = first.accept(self);
            if first.hits {
                return TraceResult::new(true, first.cost.with_bbox_test());
            }
            let second = second.accept(self);
            return TraceResult::new(second.hits, (first.cost + second.cost).with_bbox_test());
        }

        let left = branch.left.accept(self);
        let right = branch.right.accept(self);
        let both = left.cost + right.cost;

        let (hits, cost) = match (left.hits, right.hits) {
            (true, true) => (true, TraceCost::random_select(p, left.cost, right.cost)),
            (false, true) => (true, TraceCost::random_select(p, both, right.cost)),
            (true, false) => (true, TraceCost::random_select(p, left.cost, both)),
            (false, false) => (false, both),
        };
        TraceResult::new(hits, cost.with_bbox_test())
    }

    fn visit_leaf(&mut self, leaf: &L) -> TraceResult {
        if !leaf.bbox().intersects_segment(self.segment) {
            return TraceResult::MISSED_BOX;
        }

        let (found, tests) = first_occluder(leaf, self.segment);
        TraceResult::new(found, TraceCost::constant(1.0, tests as f64))
    }
}

/// The cost of a traversal split between the path leading to the occluder
/// (the spine) and the subtrees visited without finding it (the side).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SpineSideCost {
    /// Did the traversal find an occluder?
    pub hits: bool,
    /// Cost along the path to the occluder.
    pub spine: TraceCost,
    /// Cost of the subtrees that do not contain the occluder.
    pub side: TraceCost,
}

impl SpineSideCost {
    fn spine(spine: TraceCost) -> Self {
        Self {
            hits: true,
            spine,
            side: TraceCost::zero(),
        }
    }

    fn side(side: TraceCost) -> Self {
        Self {
            hits: false,
            spine: TraceCost::zero(),
            side,
        }
    }

    /// The spine and side costs together.
    #[inline]
    pub fn total(&self) -> TraceCost {
        self.spine + self.side
    }
}

struct SpineSideMeasure<'a> {
    segment: &'a Segment,
}

impl<B: KernelBranch, L: TriangleLeaf> NodeVisitor<B, L> for SpineSideMeasure<'_> {
    type Output = SpineSideCost;

    fn visit_branch(&mut self, branch: &Branch<B, L>) -> SpineSideCost {
        if !branch.content.bbox().intersects_segment(self.segment) {
            return SpineSideCost::side(TraceCost::BBOX_TEST);
        }

        let p = left_probability(branch, self.segment);
        let left = branch.left.accept(self);
        let right = branch.right.accept(self);

        let mut result = match (left.hits, right.hits) {
            (true, true) => SpineSideCost {
                hits: true,
                spine: TraceCost::random_select(p, left.spine, right.spine),
                side: TraceCost::random_select(p, left.side, right.side),
            },
            (true, false) => SpineSideCost {
                hits: true,
                spine: left.spine,
                side: TraceCost::random_select(p, left.side, left.side + right.total()),
            },
            (false, true) => SpineSideCost {
                hits: true,
                spine: right.spine,
                side: TraceCost::random_select(p, right.side + left.total(), right.side),
            },
            (false, false) => SpineSideCost::side(left.total() + right.total()),
        };

        if result.hits {
            result.spine = result.spine.with_bbox_test();
        } else {
            result.side = result.side.with_bbox_test();
        }
        result
    }

    fn visit_leaf(&mut self, leaf: &L) -> SpineSideCost {
        if !leaf.bbox().intersects_segment(self.segment) {
            return SpineSideCost::side(TraceCost::BBOX_TEST);
        }

        let (found, tests) = first_occluder(leaf, self.segment);
        let cost = TraceCost::constant(1.0, tests as f64);
        if found {
            SpineSideCost::spine(cost)
        } else {
            SpineSideCost::side(cost)
        }
    }
}

/// Costs of a batch of shadow queries.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FullTraceResult {
    /// The number of traced queries.
    pub num_rays: usize,
    /// The number of queries for which an occluder was found.
    pub num_hits: usize,
    /// The number of queries whose outcome contradicts their recorded
    /// connectivity.
    pub disagreements: usize,
    /// The cost of all the queries.
    pub cost: TraceCost,
    /// The spine cost of the occluded queries.
    pub spine: TraceCost,
    /// The side cost of the occluded queries.
    pub side: TraceCost,
    /// The cost of the unoccluded queries.
    pub non_hit: TraceCost,
    /// The oracle cost of the occluded queries.
    pub spine_oracle: TraceCost,
}

impl FullTraceResult {
    fn of_query<B: KernelBranch, L: TriangleLeaf>(tree: &Tree<B, L>, query: &ShadowQuery) -> Self {
        let traced = FullCostMeasure::trace(tree, &query.segment);
        let mut result = FullTraceResult {
            num_rays: 1,
            cost: traced.cost,
            disagreements: (traced.hits == query.connected) as usize,
            ..Self::zero()
        };

        if traced.hits {
            let split = FullCostMeasure::trace_spine(tree, &query.segment);
            result.num_hits = 1;
            result.spine = split.spine;
            result.side = split.side;
            result.spine_oracle = OracleCost::trace(tree, &query.segment).cost;
        } else {
            result.non_hit = traced.cost;
        }

        result
    }
}

impl Add for FullTraceResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            num_rays: self.num_rays + rhs.num_rays,
            num_hits: self.num_hits + rhs.num_hits,
            disagreements: self.disagreements + rhs.disagreements,
            cost: self.cost + rhs.cost,
            spine: self.spine + rhs.spine,
            side: self.side + rhs.side,
            non_hit: self.non_hit + rhs.non_hit,
            spine_oracle: self.spine_oracle + rhs.spine_oracle,
        }
    }
}

impl Zero for FullTraceResult {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        self.num_rays == 0 && self.cost.is_zero()
    }
}
