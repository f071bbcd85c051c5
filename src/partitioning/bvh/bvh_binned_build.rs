use super::{
    BuildTriangles, EvalResult, NodeFactory, SplitCandidate, SplitEvaluator, SplitFilter,
    TriangleAggregator,
};
use crate::bounding_volume::Box3;
use crate::math::{Real, DIM};
use crate::partitioning::tree::{Tree, TreeNode};
use arrayvec::ArrayVec;

/// The largest number of bins used to split a node.
pub const MAX_BINS: usize = 32;
/// The smallest number of bins used to split a node.
pub const MIN_BINS: usize = 4;

/// Parameters of the binned builder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BuildConfig {
    /// Ranges of at most this many triangles always become leaves.
    pub mandatory_leaf_size: usize,
    /// Whether ranges whose triangles all share the same center are split
    /// at their midpoint rather than turned into a single leaf.
    pub split_degenerate_nodes: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            mandatory_leaf_size: 1,
            split_degenerate_nodes: true,
        }
    }
}

/// Error returned when a hierarchy cannot be built.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// A hierarchy must contain at least one triangle.
    #[error("cannot build a hierarchy over zero triangles")]
    EmptyInput,
    /// The mandatory leaf size must be at least 1.
    #[error("invalid mandatory leaf size {0}, must be at least 1")]
    InvalidLeafSize(usize),
}

/// The number of bins used to split a range of `len` triangles.
#[inline]
pub fn num_bins(len: usize) -> usize {
    ((0.05 * len as f64 + 4.0).round() as usize).clamp(MIN_BINS, MAX_BINS)
}

/// Builds a hierarchy over `triangles` with the binned top-down strategy.
///
/// The working array is partitioned in place: on success, the triangles of
/// every leaf occupy a contiguous range of `triangles` and leaves appear in
/// build order. Branch and leaf IDs are assigned in build order, each branch
/// receiving its ID before its children are built.
///
/// # Panics
///
/// Panics if the binning produces a split leaving one side empty, which
/// would indicate a defect of the builder.
pub fn build<A, E, F>(
    triangles: &mut BuildTriangles,
    evaluator: &mut E,
    factory: &F,
    aggregator: &A,
    config: &BuildConfig,
) -> Result<Tree<F::Branch, F::Leaf>, BuildError>
where
    A: TriangleAggregator,
    E: SplitEvaluator<A::Aggregate>,
    F: NodeFactory<A::Aggregate, E::BranchData>,
{
    if triangles.is_empty() {
        return Err(BuildError::EmptyInput);
    }
    if config.mandatory_leaf_size < 1 {
        return Err(BuildError::InvalidLeafSize(config.mandatory_leaf_size));
    }

    let len = triangles.len();
    let aggregate = aggregator.roll(triangles, 0, len);
    let bbox = triangles.bounds(0, len);
    let transition = evaluator.initial_transition();

    let mut builder = BinnedBuilder {
        triangles,
        evaluator,
        factory,
        aggregator,
        config,
        num_branches: 0,
        num_leaves: 0,
    };

    let root = builder.build_range(0, len, aggregate, bbox, transition, 0);
    let (num_branches, num_leaves) = (builder.num_branches, builder.num_leaves);
    assert_eq!(num_branches + 1, num_leaves);

    log::debug!(
        "built a hierarchy over {} triangles: {} branches, {} leaves",
        len,
        num_branches,
        num_leaves
    );

    Ok(Tree::with_counts(root, num_branches))
}

struct BinnedBuilder<'a, A: TriangleAggregator, E, F> {
    triangles: &'a mut BuildTriangles,
    evaluator: &'a mut E,
    factory: &'a F,
    aggregator: &'a A,
    config: &'a BuildConfig,
    num_branches: usize,
    num_leaves: usize,
}

#[derive(Clone, Debug)]
struct Bin<T> {
    aggregate: T,
    bbox: Box3,
}

struct AxisBins<T> {
    bins: ArrayVec<Bin<T>, MAX_BINS>,
    offset: Real,
    factor: Real,
    degenerate: bool,
}

struct ChosenSplit<T, M> {
    result: EvalResult<M>,
    filter: SplitFilter,
    left: Bin<T>,
    right: Bin<T>,
}

enum SplitPlan<T> {
    Pair,
    Degenerate,
    Binned([AxisBins<T>; DIM]),
}

impl<A, E, F> BinnedBuilder<'_, A, E, F>
where
    A: TriangleAggregator,
    E: SplitEvaluator<A::Aggregate>,
    F: NodeFactory<A::Aggregate, E::BranchData>,
{
    fn build_range(
        &mut self,
        start: usize,
        end: usize,
        aggregate: A::Aggregate,
        bbox: Box3,
        transition: E::Transition,
        depth: u32,
    ) -> TreeNode<F::Branch, F::Leaf> {
        let len = end - start;

        if len <= self.config.mandatory_leaf_size {
            return self.make_leaf(start, end, aggregate, bbox, depth);
        }

        let plan = if len == 2 {
            SplitPlan::Pair
        } else {
            let axes = self.bin_range(start, end);
            if axes.iter().all(|a| a.degenerate) {
                if !self.config.split_degenerate_nodes {
                    return self.make_leaf(start, end, aggregate, bbox, depth);
                }
                log::trace!(
                    "forcing a split of {} triangles sharing the same center at depth {}",
                    len,
                    depth
                );
                SplitPlan::Degenerate
            } else {
                SplitPlan::Binned(axes)
            }
        };

        let degenerate = matches!(plan, SplitPlan::Degenerate);
        let state = self.evaluator.begin_evaluations(
            self.triangles,
            start,
            end,
            &bbox,
            transition,
            degenerate,
        );

        let (chosen, mid) = match plan {
            SplitPlan::Pair => (self.positional_split(&state, start, start + 1, end), start + 1),
            SplitPlan::Degenerate => {
                let mid = (start + end) / 2;
                (self.positional_split(&state, start, mid, end), mid)
            }
            SplitPlan::Binned(axes) => {
                let chosen = self.binned_split(&state, axes);
                let filter = chosen.filter;
                let mid = self
                    .triangles
                    .sweep_partition(start, end, |t| filter.is_left(t));
                assert!(
                    mid != start && mid != end,
                    "binned split of {}..{} left one side empty (cut at {})",
                    start,
                    end,
                    mid
                );
                (chosen, mid)
            }
        };

        let ChosenSplit {
            result,
            filter,
            left,
            right,
        } = chosen;
        let candidate = SplitCandidate {
            left: &left.aggregate,
            left_box: &left.bbox,
            right: &right.aggregate,
            right_box: &right.bbox,
            filter,
        };
        let report = self
            .evaluator
            .finish_evaluations(state, self.triangles, result, candidate);

        let id = self.num_branches;
        self.num_branches += 1;

        let next = depth + 1;
        let (left_node, right_node) = if report.build_left_first {
            let l = self.build_range(start, mid, left.aggregate, left.bbox, report.left, next);
            let r = self.build_range(mid, end, right.aggregate, right.bbox, report.right, next);
            (l, r)
        } else {
            let r = self.build_range(mid, end, right.aggregate, right.bbox, report.right, next);
            let l = self.build_range(start, mid, left.aggregate, left.bbox, report.left, next);
            (l, r)
        };

        let content = self
            .factory
            .branch(report.branch, bbox, depth, id, &aggregate);
        TreeNode::branch(content, left_node, right_node)
    }

    fn make_leaf(
        &mut self,
        start: usize,
        end: usize,
        aggregate: A::Aggregate,
        bbox: Box3,
        depth: u32,
    ) -> TreeNode<F::Branch, F::Leaf> {
        let id = self.num_leaves;
        self.num_leaves += 1;
        let primitives = self.triangles.triangles(start, end);
        TreeNode::Leaf(self.factory.leaf(primitives, bbox, depth, id, &aggregate))
    }

    fn bin_range(&self, start: usize, end: usize) -> [AxisBins<A::Aggregate>; DIM] {
        let num_bins = num_bins(end - start);
        let centroids = self.triangles.centroid_bounds(start, end);

        core::array::from_fn(|axis| {
            let range = centroids.axis(axis);
            let offset = range.min;
            let factor = num_bins as Real / range.size();

            let mut bins: ArrayVec<_, MAX_BINS> = (0..num_bins)
                .map(|_| Bin {
                    aggregate: self.aggregator.identity(),
                    bbox: Box3::EMPTY,
                })
                .collect();
            let mut degenerate = true;

            for tri in self.triangles.range(start, end) {
                // NaN (zero-size axis) casts to 0.
                let bucket = (((tri.center[axis] - offset) * factor) as usize).min(num_bins - 1);
                degenerate &= bucket == 0;

                let bin = &mut bins[bucket];
                bin.aggregate = self
                    .aggregator
                    .combine(&bin.aggregate, &self.aggregator.value(tri));
                bin.bbox = bin.bbox | tri.bounds;
            }

            AxisBins {
                bins,
                offset,
                factor,
                degenerate,
            }
        })
    }

    fn merge(&self, a: &Bin<A::Aggregate>, b: &Bin<A::Aggregate>) -> Bin<A::Aggregate> {
        Bin {
            aggregate: self.aggregator.combine(&a.aggregate, &b.aggregate),
            bbox: a.bbox | b.bbox,
        }
    }

    fn evaluate(
        &mut self,
        state: &E::State,
        left: Bin<A::Aggregate>,
        right: Bin<A::Aggregate>,
        filter: SplitFilter,
    ) -> ChosenSplit<A::Aggregate, E::Memo> {
        let candidate = SplitCandidate {
            left: &left.aggregate,
            left_box: &left.bbox,
            right: &right.aggregate,
            right_box: &right.bbox,
            filter,
        };
        let result = self.evaluator.evaluate(state, self.triangles, candidate);
        ChosenSplit {
            result,
            filter,
            left,
            right,
        }
    }

    /// Evaluates the single split placing `start..mid` left and `mid..end` right.
    fn positional_split(
        &mut self,
        state: &E::State,
        start: usize,
        mid: usize,
        end: usize,
    ) -> ChosenSplit<A::Aggregate, E::Memo> {
        let left = Bin {
            aggregate: self.aggregator.roll(self.triangles, start, mid),
            bbox: self.triangles.bounds(start, mid),
        };
        let right = Bin {
            aggregate: self.aggregator.roll(self.triangles, mid, end),
            bbox: self.triangles.bounds(mid, end),
        };
        self.evaluate(state, left, right, SplitFilter::Below { partition: mid })
    }

    /// Scores every cut of every non-degenerate axis and keeps the cheapest.
    fn binned_split(
        &mut self,
        state: &E::State,
        axes: [AxisBins<A::Aggregate>; DIM],
    ) -> ChosenSplit<A::Aggregate, E::Memo> {
        let mut best_per_axis: [Option<ChosenSplit<A::Aggregate, E::Memo>>; DIM] =
            [None, None, None];

        for (axis, bins) in axes.iter().enumerate() {
            if !bins.degenerate {
                best_per_axis[axis] = Some(self.score_axis(state, axis, bins));
            }
        }

        let cost = |s: &Option<ChosenSplit<_, _>>| s.as_ref().map(|s| s.result.cost);
        let [x, y, z] = best_per_axis;
        let (cx, cy, cz) = (cost(&x), cost(&y), cost(&z));

        // Ties favor X over Y over Z.
        let le = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => a <= b,
            (Some(_), None) => true,
            (None, _) => false,
        };

        let chosen = if le(cx, cy) && le(cx, cz) {
            x
        } else if le(cy, cz) {
            y
        } else {
            z
        };

        match chosen {
            Some(chosen) => chosen,
            None => unreachable!("binned split requested with all axes degenerate"),
        }
    }

    fn score_axis(
        &mut self,
        state: &E::State,
        axis: usize,
        axis_bins: &AxisBins<A::Aggregate>,
    ) -> ChosenSplit<A::Aggregate, E::Memo> {
        let bins = &axis_bins.bins;
        let num_bins = bins.len();
        let filter = |threshold: usize| SplitFilter::Axis {
            axis,
            offset: axis_bins.offset,
            factor: axis_bins.factor,
            threshold: threshold as Real,
        };

        // right_merges[k] summarizes bins[k..].
        let mut right_merges = bins.clone();
        for k in (0..num_bins - 1).rev() {
            right_merges[k] = self.merge(&bins[k], &right_merges[k + 1]);
        }

        let mut left_merge = bins[0].clone();
        let mut best = self.evaluate(state, left_merge.clone(), right_merges[1].clone(), filter(1));

        for k in 1..num_bins - 1 {
            if self.aggregator.is_identity(&bins[k].aggregate) {
                continue;
            }
            if self.aggregator.is_identity(&right_merges[k + 1].aggregate) {
                break;
            }

            left_merge = self.merge(&left_merge, &bins[k]);
            let candidate = self.evaluate(
                state,
                left_merge.clone(),
                right_merges[k + 1].clone(),
                filter(k + 1),
            );

            if candidate.result.cost < best.result.cost {
                best = candidate;
            }
        }

        best
    }
}
