use super::sweep_partition;
use crate::bounding_volume::Box3;
use crate::cost::{left_is_closer, KernelFlags, TraversalKernel};
use crate::partitioning::bvh::{
    BuildReport, BuildTriangles, CountedAggregate, EvalResult, SplitCandidate, SplitEvaluator,
    SplitFilter,
};
use crate::query::Segment;

/// A shadow ray occluded by at least one triangle of the scene.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BrokenRay {
    /// The shadow segment.
    pub segment: Segment,
    /// The IDs of the triangles crossing the segment.
    hits: Vec<usize>,
    /// `hits[..active]` are the triangles inside the node being split.
    active: usize,
}

impl BrokenRay {
    /// A broken ray occluded by the triangles with the given IDs.
    pub fn new(segment: Segment, hits: Vec<usize>) -> Self {
        let active = hits.len();
        Self {
            segment,
            hits,
            active,
        }
    }

    /// The IDs of every triangle crossing the segment.
    pub fn hits(&self) -> &[usize] {
        &self.hits
    }

    /// The IDs of the crossing triangles inside the node being split.
    pub fn active_hits(&self) -> &[usize] {
        &self.hits[..self.active]
    }

    /// Moves the hits whose triangle currently sits in `start..end` to the front.
    fn activate(&mut self, triangles: &BuildTriangles, start: usize, end: usize) {
        self.active = sweep_partition(&mut self.hits, |id| {
            (start..end).contains(&triangles.by_id(*id).index)
        });
    }

    fn has_hit_on(&self, triangles: &BuildTriangles, filter: &SplitFilter, left: bool) -> bool {
        self.active_hits()
            .iter()
            .any(|id| filter.is_left(triangles.by_id(*id)) == left)
    }

    fn interaction(&self, triangles: &BuildTriangles, filter: &SplitFilter) -> Interaction {
        let mut sides = self
            .active_hits()
            .iter()
            .map(|id| filter.is_left(triangles.by_id(*id)));

        match sides.next() {
            None => Interaction::Neither,
            Some(true) if sides.all(|l| l) => Interaction::OnlyLeft,
            Some(false) if sides.all(|l| !l) => Interaction::OnlyRight,
            Some(_) => Interaction::Both,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Interaction {
    Neither,
    Both,
    OnlyLeft,
    OnlyRight,
}

/// The outcome of shadow rays traced against a reference scene.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ShadowSamples {
    /// Segments that reached their target: every box they cross is visited.
    pub connected: Vec<Segment>,
    /// Segments occluded by known triangles.
    pub broken: Vec<BrokenRay>,
}

impl ShadowSamples {
    /// The window covering every sample.
    pub fn full_window(&self) -> SrdhWindow {
        SrdhWindow {
            connected: self.connected.len(),
            broken: self.broken.len(),
        }
    }
}

/// The prefixes of the shadow sample buffers relevant to the node being split.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SrdhWindow {
    /// Number of active connected segments.
    pub connected: usize,
    /// Number of active broken rays.
    pub broken: usize,
}

/// Parameters of the [`SrdhEvaluator`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SrdhConfig {
    /// The exponent applied to the triangle counts.
    pub alpha: f64,
    /// The kernels a branch may be assigned.
    ///
    /// Only the fixed and distance-driven kernels are candidates. An empty
    /// set behaves as [`KernelFlags::FIXED`].
    pub kernels: KernelFlags,
}

impl Default for SrdhConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            kernels: KernelFlags::SRDH,
        }
    }
}

/// The shadow-ray-driven heuristic.
///
/// Connected rays must visit every box they cross. A broken ray only needs
/// to visit a child whose triangles occlude it, so traversing first the side
/// holding its occluder saves the visit of the other side. The evaluator
/// prices every enabled kernel and tags the branch with the cheapest one.
#[derive(Clone, Debug)]
pub struct SrdhEvaluator {
    samples: ShadowSamples,
    config: SrdhConfig,
}

impl SrdhEvaluator {
    /// An evaluator scoring against `samples`.
    pub fn new(samples: ShadowSamples, config: SrdhConfig) -> Self {
        Self { samples, config }
    }

    /// The configuration of this evaluator.
    pub fn config(&self) -> &SrdhConfig {
        &self.config
    }

    /// Gives back the sample set.
    pub fn into_samples(self) -> ShadowSamples {
        self.samples
    }

    fn candidates(&self) -> KernelFlags {
        let enabled = self.config.kernels & KernelFlags::SRDH;
        if enabled.is_empty() {
            KernelFlags::FIXED
        } else {
            enabled
        }
    }
}

#[derive(Default)]
struct TraversalCounts {
    left_sure: usize,
    right_sure: usize,
    left_maybe: usize,
    right_maybe: usize,
    front_to_back: f64,
    back_to_front: f64,
}

impl<A: CountedAggregate> SplitEvaluator<A> for SrdhEvaluator {
    type Transition = SrdhWindow;
    type State = SrdhWindow;
    type Memo = TraversalKernel;
    type BranchData = TraversalKernel;

    fn initial_transition(&self) -> SrdhWindow {
        self.samples.full_window()
    }

    fn begin_evaluations(
        &mut self,
        triangles: &BuildTriangles,
        start: usize,
        end: usize,
        bbox: &Box3,
        parent: SrdhWindow,
        _: bool,
    ) -> SrdhWindow {
        let connected = sweep_partition(&mut self.samples.connected[..parent.connected], |s| {
            bbox.intersects_segment(s)
        });
        let broken = sweep_partition(&mut self.samples.broken[..parent.broken], |r| {
            bbox.intersects_segment(&r.segment)
        });

        for ray in &mut self.samples.broken[..broken] {
            ray.activate(triangles, start, end);
        }

        SrdhWindow { connected, broken }
    }

    fn evaluate(
        &mut self,
        window: &SrdhWindow,
        triangles: &BuildTriangles,
        candidate: SplitCandidate<'_, A>,
    ) -> EvalResult<TraversalKernel> {
        let (lbox, rbox) = (candidate.left_box, candidate.right_box);
        let lf = (candidate.left.count() as f64).powf(self.config.alpha);
        let rf = (candidate.right.count() as f64).powf(self.config.alpha);
        let (lcenter, rcenter) = (lbox.center(), rbox.center());

        let mut counts = TraversalCounts::default();

        for seg in &self.samples.connected[..window.connected] {
            counts.left_sure += lbox.intersects_segment(seg) as usize;
            counts.right_sure += rbox.intersects_segment(seg) as usize;
        }

        for ray in &self.samples.broken[..window.broken] {
            let seg = &ray.segment;
            let (left_maybe, right_maybe) = match ray.interaction(triangles, &candidate.filter) {
                Interaction::Neither => {
                    counts.left_sure += lbox.intersects_segment(seg) as usize;
                    counts.right_sure += rbox.intersects_segment(seg) as usize;
                    (false, false)
                }
                Interaction::Both => (true, true),
                Interaction::OnlyLeft => {
                    counts.left_sure += 1;
                    (false, rbox.intersects_segment(seg))
                }
                Interaction::OnlyRight => {
                    counts.right_sure += 1;
                    (lbox.intersects_segment(seg), false)
                }
            };

            counts.left_maybe += left_maybe as usize;
            counts.right_maybe += right_maybe as usize;

            let first_paid = |left_first: bool| {
                if left_first {
                    left_maybe as usize as f64 * lf
                } else {
                    right_maybe as usize as f64 * rf
                }
            };
            let closer = left_is_closer(&seg.origin, &lcenter, &rcenter);
            counts.front_to_back += first_paid(closer);
            counts.back_to_front += first_paid(!closer);
        }

        let unavoidable = counts.left_sure as f64 * lf + counts.right_sure as f64 * rf;
        let priced = [
            (
                TraversalKernel::RightFirst,
                unavoidable + counts.right_maybe as f64 * rf,
            ),
            (
                TraversalKernel::LeftFirst,
                unavoidable + counts.left_maybe as f64 * lf,
            ),
            (TraversalKernel::FrontToBack, unavoidable + counts.front_to_back),
            (TraversalKernel::BackToFront, unavoidable + counts.back_to_front),
        ];

        let candidates = self.candidates();
        let mut best: Option<(f64, TraversalKernel)> = None;
        for (kernel, cost) in priced {
            if candidates.contains(kernel.flag()) && best.map_or(true, |(c, _)| cost < c) {
                best = Some((cost, kernel));
            }
        }

        let (cost, kernel) = match best {
            Some(best) => best,
            None => unreachable!("the candidate kernel set is never empty"),
        };

        // A fixed order builds the side visited second first: the rays it
        // keeps are a subset of those of the first side, so shuffling them
        // leaves the other side's window intact.
        EvalResult::new(cost, kernel, kernel != TraversalKernel::LeftFirst)
    }

    fn finish_evaluations(
        &mut self,
        window: SrdhWindow,
        triangles: &BuildTriangles,
        selected: EvalResult<TraversalKernel>,
        candidate: SplitCandidate<'_, A>,
    ) -> BuildReport<SrdhWindow, TraversalKernel> {
        let kernel = selected.memo;
        let first_is_left = match kernel {
            TraversalKernel::LeftFirst => true,
            TraversalKernel::RightFirst => false,
            _ => {
                return BuildReport {
                    branch: kernel,
                    build_left_first: selected.build_left_first,
                    left: window,
                    right: window,
                }
            }
        };

        // Rays occluded on the side visited first never reach the other one.
        let filter = candidate.filter;
        let part = sweep_partition(&mut self.samples.broken[..window.broken], |r| {
            !r.has_hit_on(triangles, &filter, first_is_left)
        });
        let second = SrdhWindow {
            connected: window.connected,
            broken: part,
        };

        let (left, right) = if first_is_left {
            (window, second)
        } else {
            (second, window)
        };

        BuildReport {
            branch: kernel,
            build_left_first: selected.build_left_first,
            left,
            right,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{BrokenRay, ShadowSamples, SrdhConfig, SrdhEvaluator};
    use crate::cost::{KernelFlags, TraversalKernel};
    use crate::math::{Point, Vector};
    use crate::partitioning::bvh::{
        self, BoundsCountAggregator, BuildConfig, BuildTriangles, BvhNodeFactory, KernelBranch,
    };
    use crate::query::Segment;
    use crate::shape::Triangle;

    fn two_walls() -> Vec<Triangle> {
        // Two small walls facing +X at x = 0 and x = 10.
        let wall = |x: f32| {
            Triangle::new(
                Point::new(x, -1.0, -1.0),
                Point::new(x, 1.0, -1.0),
                Point::new(x, 0.0, 1.0),
            )
        };
        vec![wall(0.0), wall(10.0)]
    }

    #[test]
    fn occluders_pick_the_visiting_order() {
        let triangles = two_walls();
        // Shadow rays crossing both walls but stopped by the first one.
        let broken = (0..8)
            .map(|_| {
                let seg = Segment::new(Point::new(-5.0, 0.0, 0.0), Vector::new(20.0, 0.0, 0.0));
                BrokenRay::new(seg, vec![0])
            })
            .collect();
        let samples = ShadowSamples {
            connected: vec![],
            broken,
        };

        let mut tris = BuildTriangles::new(triangles);
        let config = SrdhConfig {
            alpha: 1.0,
            kernels: KernelFlags::FIXED,
        };
        let mut evaluator = SrdhEvaluator::new(samples, config);
        let tree = bvh::build(
            &mut tris,
            &mut evaluator,
            &BvhNodeFactory::default(),
            &BoundsCountAggregator,
            &BuildConfig::default(),
        )
        .unwrap();

        let root = tree.root.as_branch().unwrap();
        let left_holds_near_wall = root.left.bbox().x().max < 5.0;
        let expected = if left_holds_near_wall {
            TraversalKernel::LeftFirst
        } else {
            TraversalKernel::RightFirst
        };
        assert_eq!(root.content.kernel(), expected);
    }

    #[test]
    fn active_hits_follow_the_node_range() {
        let tris = BuildTriangles::new(two_walls());
        let seg = Segment::new(Point::new(-5.0, 0.0, 0.0), Vector::new(20.0, 0.0, 0.0));
        let mut ray = BrokenRay::new(seg, vec![0, 1]);

        ray.activate(&tris, 1, 2);
        assert_eq!(ray.active_hits(), &[1]);
        ray.activate(&tris, 0, 2);
        assert_eq!(ray.active_hits().len(), 2);
        assert_eq!(ray.hits().len(), 2);
    }
}
