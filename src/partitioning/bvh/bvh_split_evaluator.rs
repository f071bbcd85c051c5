use super::{BuildTriangle, BuildTriangles};
use crate::bounding_volume::Box3;
use crate::math::Real;

/// Decides on which side of a candidate split a triangle falls.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SplitFilter {
    /// Binned split along `axis`: the triangle goes left iff its center falls
    /// in a bin strictly below `threshold`.
    Axis {
        /// The split axis.
        axis: usize,
        /// The centroid lower bound along `axis`.
        offset: Real,
        /// The number of bins per unit length along `axis`.
        factor: Real,
        /// The first bin on the right side.
        threshold: Real,
    },
    /// Positional split: the triangle goes left iff its build index is below
    /// `partition`.
    Below {
        /// The first position on the right side.
        partition: usize,
    },
}

impl SplitFilter {
    /// Is `triangle` on the left side of this split?
    #[inline]
    pub fn is_left(&self, triangle: &BuildTriangle) -> bool {
        match *self {
            SplitFilter::Axis {
                axis,
                offset,
                factor,
                threshold,
            } => (triangle.center[axis] - offset) * factor < threshold,
            SplitFilter::Below { partition } => triangle.index < partition,
        }
    }
}

/// The score of a candidate split.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalResult<M> {
    /// The cost of the split. Lower is better.
    pub cost: f64,
    /// Evaluator-specific data about this candidate.
    pub memo: M,
    /// Whether the left child should be built before the right one.
    pub build_left_first: bool,
}

impl<M> EvalResult<M> {
    /// Creates a new evaluation result.
    pub fn new(cost: f64, memo: M, build_left_first: bool) -> Self {
        Self {
            cost,
            memo,
            build_left_first,
        }
    }
}

/// The outcome of the evaluations of a node, once its split is chosen.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildReport<T, D> {
    /// Data to store in the branch payload.
    pub branch: D,
    /// Whether the left child is built before the right one.
    pub build_left_first: bool,
    /// The evaluator transition handed to the left child.
    pub left: T,
    /// The evaluator transition handed to the right child.
    pub right: T,
}

/// The inputs of one split candidate, as seen by an evaluator.
#[derive(Copy, Clone, Debug)]
pub struct SplitCandidate<'a, A> {
    /// The aggregate of the triangles on the left side.
    pub left: &'a A,
    /// The bounding box of the triangles on the left side.
    pub left_box: &'a Box3,
    /// The aggregate of the triangles on the right side.
    pub right: &'a A,
    /// The bounding box of the triangles on the right side.
    pub right_box: &'a Box3,
    /// Sorts triangles of the current range to their side.
    pub filter: SplitFilter,
}

/// A cost model scoring candidate splits for the builder.
///
/// For every node, the builder calls [`Self::begin_evaluations`] once,
/// [`Self::evaluate`] once per candidate split, and
/// [`Self::finish_evaluations`] once with the winning candidate before
/// recursing. The transition returned for each child is passed back to
/// `begin_evaluations` when that child is processed, which lets stateful
/// evaluators narrow their sample sets as the recursion deepens.
pub trait SplitEvaluator<A> {
    /// Per-node state threaded from a parent to its children.
    type Transition;
    /// Per-node state valid between `begin_evaluations` and `finish_evaluations`.
    type State;
    /// Per-candidate auxiliary data.
    type Memo;
    /// Data stored in the branch payload.
    type BranchData;

    /// The transition of the root node.
    fn initial_transition(&self) -> Self::Transition;

    /// Prepares the evaluations for the range `start..end` bounded by `bbox`.
    ///
    /// `degenerate` is set when all triangles of the range share the same
    /// center and the split will be positional.
    fn begin_evaluations(
        &mut self,
        triangles: &BuildTriangles,
        start: usize,
        end: usize,
        bbox: &Box3,
        transition: Self::Transition,
        degenerate: bool,
    ) -> Self::State;

    /// Scores one candidate split.
    fn evaluate(
        &mut self,
        state: &Self::State,
        triangles: &BuildTriangles,
        candidate: SplitCandidate<'_, A>,
    ) -> EvalResult<Self::Memo>;

    /// Commits to the selected candidate and produces the child transitions.
    fn finish_evaluations(
        &mut self,
        state: Self::State,
        triangles: &BuildTriangles,
        selected: EvalResult<Self::Memo>,
        candidate: SplitCandidate<'_, A>,
    ) -> BuildReport<Self::Transition, Self::BranchData>;
}
