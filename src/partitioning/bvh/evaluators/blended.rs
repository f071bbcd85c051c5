use super::ray_cost::{count_factor, RaySamples, RayWindow};
use crate::bounding_volume::Box3;
use crate::partitioning::bvh::{
    BuildReport, BuildTriangles, CountedAggregate, EvalResult, SplitCandidate, SplitEvaluator,
};

/// The default weight of the ray-derived proportion.
pub const DEFAULT_BLEND_WEIGHT: f64 = 0.5;

/// Active samples and the surface area of the node being split.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BlendedState {
    /// The active prefixes of the sample buffers.
    pub window: RayWindow,
    /// The surface area of the node.
    pub parent_area: f64,
}

/// Mixes the ray-crossing proportion of each child with its surface area
/// proportion.
///
/// With `p_ray = crossing / active` (or 1 without active samples) and
/// `p_area = area(child) / area(parent)`, each side contributes
/// `(weight·p_ray + (1 - weight)·p_area)·(count - 1)^α`.
#[derive(Clone, Debug)]
pub struct BlendedEvaluator {
    samples: RaySamples,
    /// The exponent applied to the triangle counts.
    pub alpha: f64,
    /// The weight of the ray-derived proportion, in `[0, 1]`.
    pub weight: f64,
}

impl BlendedEvaluator {
    /// A blended evaluator over `samples`.
    pub fn new(samples: RaySamples, alpha: f64, weight: f64) -> Self {
        Self {
            samples,
            alpha,
            weight,
        }
    }

    /// Gives back the sample set.
    pub fn into_samples(self) -> RaySamples {
        self.samples
    }

    fn proportion(&self, state: &BlendedState, bbox: &Box3) -> f64 {
        let active = state.window.len();
        let ray = if active == 0 {
            1.0
        } else {
            self.samples.count_crossing(state.window, bbox) as f64 / active as f64
        };
        let area = bbox.surface_area() as f64 / state.parent_area;
        ray * self.weight + area * (1.0 - self.weight)
    }
}

impl<A: CountedAggregate> SplitEvaluator<A> for BlendedEvaluator {
    type Transition = RayWindow;
    type State = BlendedState;
    type Memo = ();
    type BranchData = ();

    fn initial_transition(&self) -> RayWindow {
        self.samples.full_window()
    }

    fn begin_evaluations(
        &mut self,
        _: &BuildTriangles,
        _: usize,
        _: usize,
        bbox: &Box3,
        parent: RayWindow,
        _: bool,
    ) -> BlendedState {
        BlendedState {
            window: self.samples.narrow(parent, bbox),
            parent_area: bbox.surface_area() as f64,
        }
    }

    fn evaluate(
        &mut self,
        state: &BlendedState,
        _: &BuildTriangles,
        candidate: SplitCandidate<'_, A>,
    ) -> EvalResult<()> {
        let cost = self.proportion(state, candidate.left_box)
            * count_factor(candidate.left.count(), self.alpha)
            + self.proportion(state, candidate.right_box)
                * count_factor(candidate.right.count(), self.alpha);
        EvalResult::new(cost, (), true)
    }

    fn finish_evaluations(
        &mut self,
        state: BlendedState,
        _: &BuildTriangles,
        selected: EvalResult<()>,
        _: SplitCandidate<'_, A>,
    ) -> BuildReport<RayWindow, ()> {
        BuildReport {
            branch: (),
            build_left_first: selected.build_left_first,
            left: state.window,
            right: state.window,
        }
    }
}
