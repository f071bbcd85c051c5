use crate::bounding_volume::Box3;
use crate::partitioning::bvh::{
    BuildReport, BuildTriangles, CountedAggregate, EvalResult, SplitCandidate, SplitEvaluator,
};

/// The exponent applied to triangle counts by default.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// How a side's triangle count enters the surface area heuristic.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum CountWeighting {
    /// `count`.
    #[default]
    Count,
    /// `count - 1`: a single triangle costs nothing beyond its box test.
    CountMinusOne,
    /// `(count + 3) >> 2`: the number of 4-wide primitive packets.
    PacketBlocks,
}

impl CountWeighting {
    /// The weight of a side holding `count` triangles.
    #[inline]
    pub fn weight(self, count: usize) -> f64 {
        match self {
            CountWeighting::Count => count as f64,
            CountWeighting::CountMinusOne => count.saturating_sub(1) as f64,
            CountWeighting::PacketBlocks => ((count + 3) >> 2) as f64,
        }
    }
}

/// The stateless surface area heuristic.
///
/// A split costs `w(left)^α · area(left) + w(right)^α · area(right)` where
/// `w` is the [`CountWeighting`] of each side's triangle count.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SahEvaluator {
    /// The exponent applied to the weighted counts.
    pub alpha: f64,
    /// How counts are weighted.
    pub weighting: CountWeighting,
}

impl Default for SahEvaluator {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            weighting: CountWeighting::Count,
        }
    }
}

impl SahEvaluator {
    /// A heuristic with the given exponent and weighting.
    pub fn new(alpha: f64, weighting: CountWeighting) -> Self {
        Self { alpha, weighting }
    }

    /// The cost of a side holding `count` triangles bounded by `bbox`.
    #[inline]
    pub fn side_cost(&self, count: usize, bbox: &Box3) -> f64 {
        self.weighting.weight(count).powf(self.alpha) * bbox.surface_area() as f64
    }
}

impl<A: CountedAggregate> SplitEvaluator<A> for SahEvaluator {
    type Transition = ();
    type State = ();
    type Memo = ();
    type BranchData = ();

    fn initial_transition(&self) {}

    fn begin_evaluations(
        &mut self,
        _: &BuildTriangles,
        _: usize,
        _: usize,
        _: &Box3,
        _: (),
        _: bool,
    ) {
    }

    fn evaluate(
        &mut self,
        _: &(),
        _: &BuildTriangles,
        candidate: SplitCandidate<'_, A>,
    ) -> EvalResult<()> {
        let cost = self.side_cost(candidate.left.count(), candidate.left_box)
            + self.side_cost(candidate.right.count(), candidate.right_box);
        EvalResult::new(cost, (), true)
    }

    fn finish_evaluations(
        &mut self,
        _: (),
        _: &BuildTriangles,
        selected: EvalResult<()>,
        _: SplitCandidate<'_, A>,
    ) -> BuildReport<(), ()> {
        BuildReport {
            branch: (),
            build_left_first: selected.build_left_first,
            left: (),
            right: (),
        }
    }
}
