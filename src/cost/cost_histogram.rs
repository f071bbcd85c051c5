use super::TraversalKernel;
use crate::partitioning::bvh::{KernelBranch, TriangleLeaf};
use crate::partitioning::{Branch, NodeVisitor, Tree};
use crate::query::{Segment, ShadowQuery};

/// The number of bins of a [`CostHistogram`].
pub const NUM_COST_BINS: usize = 250;

/// The seed of the coin flipped by [`TraversalKernel::UniformRandom`] branches.
pub const HISTOGRAM_SEED: u64 = 328472378;

/// Distribution of the number of box tests of individual shadow rays.
///
/// Bin `k` counts the rays that needed exactly `k` box tests. Rays needing
/// [`NUM_COST_BINS`] tests or more are only counted by the out-of-range
/// counters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CostHistogram {
    /// Occluded rays.
    pub hits: Vec<usize>,
    /// Unoccluded rays.
    pub misses: Vec<usize>,
    /// All the rays.
    pub both: Vec<usize>,
    /// Occluded rays beyond the last bin.
    pub out_of_range_hits: usize,
    /// Unoccluded rays beyond the last bin.
    pub out_of_range_misses: usize,
    /// All the rays beyond the last bin.
    pub out_of_range_both: usize,
}

impl Default for CostHistogram {
    fn default() -> Self {
        Self {
            hits: vec![0; NUM_COST_BINS],
            misses: vec![0; NUM_COST_BINS],
            both: vec![0; NUM_COST_BINS],
            out_of_range_hits: 0,
            out_of_range_misses: 0,
            out_of_range_both: 0,
        }
    }
}

impl CostHistogram {
    /// Traces every query through `tree` with an actual traversal, flipping a
    /// seeded coin at uniformly random branches.
    pub fn measure<B, L>(tree: &Tree<B, L>, queries: &[ShadowQuery]) -> Self
    where
        B: KernelBranch,
        L: TriangleLeaf,
    {
        let mut histogram = Self::default();
        let mut rng = oorandom::Rand32::new(HISTOGRAM_SEED);

        for query in queries {
            let mut visitor = CountingTraversal {
                segment: &query.segment,
                rng: &mut rng,
            };
            let (hits, tests) = tree.accept(&mut visitor);
            histogram.record(hits, tests);
        }

        histogram
    }

    /// Counts one ray that needed `tests` box tests.
    pub fn record(&mut self, hits: bool, tests: usize) {
        let (bins, out_of_range) = if hits {
            (&mut self.hits, &mut self.out_of_range_hits)
        } else {
            (&mut self.misses, &mut self.out_of_range_misses)
        };

        if tests >= NUM_COST_BINS {
            *out_of_range += 1;
            self.out_of_range_both += 1;
        } else {
            bins[tests] += 1;
            self.both[tests] += 1;
        }
    }

    /// The number of recorded rays.
    pub fn num_rays(&self) -> usize {
        self.both.iter().sum::<usize>() + self.out_of_range_both
    }
}

struct CountingTraversal<'a> {
    segment: &'a Segment,
    rng: &'a mut oorandom::Rand32,
}

impl<B: KernelBranch, L: TriangleLeaf> NodeVisitor<B, L> for CountingTraversal<'_> {
    type Output = (bool, usize);

    fn visit_branch(&mut self, branch: &Branch<B, L>) -> (bool, usize) {
        if !branch.content.bbox().intersects_segment(self.segment) {
            return (false, 1);
        }

        let left_first = match branch.content.kernel() {
            TraversalKernel::UniformRandom => self.rng.rand_float() < 0.5,
            kernel => {
                let (lbox, rbox) = (branch.left.bbox(), branch.right.bbox());
                kernel.left_probability(&self.segment.origin, lbox, rbox) == 1.0
            }
        };
        let (first, second) = if left_first {
            (&branch.left, &branch.right)
        } else {
            (&branch.right, &branch.left)
        };

        let (hits, tests) = first.accept(self);
        if hits {
            return (true, tests + 1);
        }
        let (hits, more) = second.accept(self);
        (hits, tests + more + 1)
    }

    fn visit_leaf(&mut self, leaf: &L) -> (bool, usize) {
        if !leaf.bbox().intersects_segment(self.segment) {
            return (false, 1);
        }
        let hits = leaf
            .primitives()
            .iter()
            .any(|t| t.intersects_segment(self.segment));
        (hits, 1)
    }
}
