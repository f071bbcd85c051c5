use super::sweep_partition;
use crate::bounding_volume::Box3;
use crate::partitioning::bvh::{
    BuildReport, BuildTriangles, CountedAggregate, EvalResult, SplitCandidate, SplitEvaluator,
};
use crate::query::{Ray, Segment};

/// Sample rays traced against a reference scene.
///
/// Rays that found a hit are stored as the segment from their origin to the
/// hit point. Rays that escaped the scene are kept as infinite rays.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RaySamples {
    /// Segments from origin to the first hit.
    pub hits: Vec<Segment>,
    /// Rays that hit nothing.
    pub misses: Vec<Ray>,
}

impl RaySamples {
    /// The total number of samples.
    pub fn len(&self) -> usize {
        self.hits.len() + self.misses.len()
    }

    /// Is this sample set empty?
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty() && self.misses.is_empty()
    }

    /// The window covering every sample.
    pub fn full_window(&self) -> RayWindow {
        RayWindow {
            hits: self.hits.len(),
            misses: self.misses.len(),
        }
    }

    /// Moves the samples of `window` crossing `bbox` to the front of the
    /// buffers and returns the window covering them.
    pub fn narrow(&mut self, window: RayWindow, bbox: &Box3) -> RayWindow {
        RayWindow {
            hits: sweep_partition(&mut self.hits[..window.hits], |s| {
                bbox.intersects_segment(s)
            }),
            misses: sweep_partition(&mut self.misses[..window.misses], |r| {
                bbox.intersects_ray(r)
            }),
        }
    }

    /// The number of samples of `window` crossing `bbox`.
    pub fn count_crossing(&self, window: RayWindow, bbox: &Box3) -> usize {
        let hits = self.hits[..window.hits]
            .iter()
            .filter(|s| bbox.intersects_segment(s))
            .count();
        let misses = self.misses[..window.misses]
            .iter()
            .filter(|r| bbox.intersects_ray(r))
            .count();
        hits + misses
    }
}

/// The prefixes of the sample buffers relevant to the node being split.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RayWindow {
    /// Number of active hit segments.
    pub hits: usize,
    /// Number of active miss rays.
    pub misses: usize,
}

impl RayWindow {
    /// The number of active samples.
    pub fn len(&self) -> usize {
        self.hits + self.misses
    }

    /// Is this window empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scores splits by the number of sample rays crossing each child.
///
/// A split costs `crossing(left)·(count(left) - 1)^α + crossing(right)·(count(right) - 1)^α`.
#[derive(Clone, Debug)]
pub struct RayCostEvaluator {
    samples: RaySamples,
    /// The exponent applied to the triangle counts.
    pub alpha: f64,
}

impl RayCostEvaluator {
    /// An evaluator scoring against `samples`.
    pub fn new(samples: RaySamples, alpha: f64) -> Self {
        Self { samples, alpha }
    }

    /// The sample set, in its current order.
    pub fn samples(&self) -> &RaySamples {
        &self.samples
    }

    /// Gives back the sample set.
    pub fn into_samples(self) -> RaySamples {
        self.samples
    }
}

pub(super) fn count_factor(count: usize, alpha: f64) -> f64 {
    (count as f64 - 1.0).powf(alpha)
}

impl<A: CountedAggregate> SplitEvaluator<A> for RayCostEvaluator {
    type Transition = RayWindow;
    type State = RayWindow;
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
    ) -> RayWindow {
        self.samples.narrow(parent, bbox)
    }

    fn evaluate(
        &mut self,
        window: &RayWindow,
        _: &BuildTriangles,
        candidate: SplitCandidate<'_, A>,
    ) -> EvalResult<()> {
        let left = self.samples.count_crossing(*window, candidate.left_box) as f64;
        let right = self.samples.count_crossing(*window, candidate.right_box) as f64;
        let cost = left * count_factor(candidate.left.count(), self.alpha)
            + right * count_factor(candidate.right.count(), self.alpha);
        EvalResult::new(cost, (), true)
    }

    fn finish_evaluations(
        &mut self,
        window: RayWindow,
        _: &BuildTriangles,
        selected: EvalResult<()>,
        _: SplitCandidate<'_, A>,
    ) -> BuildReport<RayWindow, ()> {
        BuildReport {
            branch: (),
            build_left_first: selected.build_left_first,
            left: window,
            right: window,
        }
    }
}
