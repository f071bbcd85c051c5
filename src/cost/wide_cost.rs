use super::full_cost::first_occluder;
use super::{TraceCost, TraceResult, TraversalKernel};
use crate::partitioning::bvh::{KernelBranch, TriangleLeaf};
use crate::partitioning::{Branch, Tree, TreeNode};
use crate::query::Segment;
use crate::utils::{Pool, PoolGuard};
use num::Zero;

type Masks = Pool<Vec<bool>>;
type Results = Pool<Vec<TraceResult>>;
type ResultGuard<'p> = PoolGuard<'p, Vec<TraceResult>, fn() -> Vec<TraceResult>>;

/// Computes the same costs as [`FullCostMeasure`](super::FullCostMeasure),
/// pushing up to `width` segments at once through each node.
///
/// Every node visit works on boolean masks selecting the segments that
/// reached it. Masks and per-segment results are recycled through pools.
pub struct WideCostMeasure {
    width: usize,
    masks: Masks,
    results: Results,
}

impl WideCostMeasure {
    /// Creates a measure tracing batches of at most `width` segments.
    ///
    /// Panics if `width` is zero.
    pub fn new(width: usize) -> Self {
        assert!(width > 0, "the batch width must be positive");
        Self {
            width,
            masks: Pool::new(Vec::new as fn() -> Vec<bool>),
            results: Pool::new(Vec::new as fn() -> Vec<TraceResult>),
        }
    }

    /// The maximum number of segments traced together.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of scratch buffers currently checked out.
    pub fn num_buffers_in_use(&self) -> usize {
        self.masks.num_used() + self.results.num_used()
    }

    /// The number of scratch buffers allocated so far.
    pub fn num_buffers_allocated(&self) -> usize {
        self.masks.num_constructed() + self.results.num_constructed()
    }

    /// Traces every segment through `tree`, returning per-segment results.
    pub fn trace<B: KernelBranch, L: TriangleLeaf>(
        &self,
        tree: &Tree<B, L>,
        segments: &[Segment],
    ) -> Vec<TraceResult> {
        let mut traced = Vec::with_capacity(segments.len());
        for batch in segments.chunks(self.width) {
            let results = self.trace_batch(tree, batch);
            traced.extend_from_slice(&results);
        }
        traced
    }

    /// The total cost of tracing every segment through `tree`.
    pub fn total_cost<B: KernelBranch, L: TriangleLeaf>(
        &self,
        tree: &Tree<B, L>,
        segments: &[Segment],
    ) -> TraceCost {
        segments
            .chunks(self.width)
            .fold(TraceCost::zero(), |acc, batch| {
                let results = self.trace_batch(tree, batch);
                results.iter().fold(acc, |acc, r| acc + r.cost)
            })
    }

    fn trace_batch<B: KernelBranch, L: TriangleLeaf>(
        &self,
        tree: &Tree<B, L>,
        segments: &[Segment],
    ) -> ResultGuard<'_> {
        let mut mask = self.masks.checkout();
        mask.resize(segments.len(), true);
        self.visit(&tree.root, segments, &mask)
    }

    fn visit<B: KernelBranch, L: TriangleLeaf>(
        &self,
        node: &TreeNode<B, L>,
        segments: &[Segment],
        mask: &[bool],
    ) -> ResultGuard<'_> {
        match node {
            TreeNode::Branch(branch) => self.visit_branch(branch, segments, mask),
            TreeNode::Leaf(leaf) => self.visit_leaf(leaf, segments, mask),
        }
    }

    fn visit_branch<B: KernelBranch, L: TriangleLeaf>(
        &self,
        branch: &Branch<B, L>,
        segments: &[Segment],
        mask: &[bool],
    ) -> ResultGuard<'_> {
        let bbox = branch.content.bbox();
        let mut entering = self.masks.checkout();
        entering.extend(
            segments
                .iter()
                .zip(mask)
                .map(|(s, m)| *m && bbox.intersects_segment(s)),
        );

        if !entering.contains(&true) {
            let mut results = self.results.checkout();
            results.extend(mask.iter().map(|m| {
                if *m {
                    TraceResult::MISSED_BOX
                } else {
                    TraceResult::default()
                }
            }));
            return results;
        }

        let kernel = branch.content.kernel();
        let mut results = if kernel.is_fixed() {
            let (first, second) = if kernel == TraversalKernel::LeftFirst {
                (&branch.left, &branch.right)
            } else {
                (&branch.right, &branch.left)
            };

            let mut results = self.visit(first, segments, &entering);
            for (e, r) in entering.iter_mut().zip(results.iter()) {
                // Occluded segments never reach the second child.
                *e = *e && !r.hits;
            }

            if entering.contains(&true) {
                let second = self.visit(second, segments, &entering);
                for k in 0..segments.len() {
                    if entering[k] {
                        results[k].hits = second[k].hits;
                        results[k].cost += second[k].cost;
                    }
                }
            }
            results
        } else {
            let (lbox, rbox) = (branch.left.bbox(), branch.right.bbox());
            let mut left = self.visit(&branch.left, segments, &entering);
            let right = self.visit(&branch.right, segments, &entering);

            for k in 0..segments.len() {
                if !entering[k] {
                    continue;
                }

                let p = kernel.left_probability(&segments[k].origin, lbox, rbox);
                let (l, r) = (left[k], right[k]);
                let both = l.cost + r.cost;
                left[k] = match (l.hits, r.hits) {
                    (true, true) => {
                        TraceResult::new(true, TraceCost::random_select(p, l.cost, r.cost))
                    }
                    (false, true) => {
                        TraceResult::new(true, TraceCost::random_select(p, both, r.cost))
                    }
                    (true, false) => {
                        TraceResult::new(true, TraceCost::random_select(p, l.cost, both))
                    }
                    (false, false) => TraceResult::new(false, both),
                };
            }
            left
        };

        for (r, m) in results.iter_mut().zip(mask) {
            if *m {
                r.cost = r.cost.with_bbox_test();
            }
        }
        results
    }

    fn visit_leaf<L: TriangleLeaf>(
        &self,
        leaf: &L,
        segments: &[Segment],
        mask: &[bool],
    ) -> ResultGuard<'_> {
        let mut results = self.results.checkout();
        results.extend(segments.iter().zip(mask).map(|(s, m)| {
            if !*m {
                TraceResult::default()
            } else if !leaf.bbox().intersects_segment(s) {
                TraceResult::MISSED_BOX
            } else {
                let (found, tests) = first_occluder(leaf, s);
                TraceResult::new(found, TraceCost::constant(1.0, tests as f64))
            }
        }));
        results
    }
}
