use crate::partitioning::bvh::{
    BrokenRay, BuildTriangles, BvhNodeContent, FirstHitTraversal, RayOrder, RaySamples,
    ShadowSamples, TriangleLeaf,
};
use crate::partitioning::{Branch, NodeVisitor, Tree};
use crate::query::{RaySet, Segment, ShadowQuery};

/// Resolves recorded cast queries against a reference tree.
pub struct RayCompiler;

impl RayCompiler {
    /// Casts every first-hit query of `set` through `tree`.
    ///
    /// A ray that hits becomes the segment from its origin to the hit point,
    /// whatever its recorded outcome; other rays are kept as rays.
    pub fn compile<B, L>(set: &RaySet, tree: &Tree<B, L>) -> RaySamples
    where
        B: BvhNodeContent,
        L: TriangleLeaf,
    {
        let mut samples = RaySamples::default();

        for query in set.cast_queries() {
            let ray = query.ray();
            match RayOrder.first_hit(tree, &ray) {
                Some(hit) => samples.hits.push(Segment::new(ray.origin, ray.dir * hit.t)),
                None => samples.misses.push(ray),
            }
        }

        log::debug!(
            "compiled {} hits and {} misses",
            samples.hits.len(),
            samples.misses.len()
        );
        samples
    }
}

/// Resolves shadow queries against a reference tree, producing the input of
/// the shadow-ray-driven builder.
pub struct ShadowRayCompiler;

/// The triangles of a reference tree and the shadow segments classified
/// against them.
pub struct CompiledShadowRays {
    /// The triangles of the reference tree, numbered in leaf prefix order.
    pub triangles: BuildTriangles,
    /// The classified segments. Broken rays refer to `triangles` by ID.
    pub samples: ShadowSamples,
}

impl ShadowRayCompiler {
    /// Classifies every segment as connected (crossing no triangle of `tree`)
    /// or broken (with the IDs of every crossing triangle).
    ///
    /// Only the segment geometry of the queries is used, not their recorded
    /// connectivity.
    pub fn compile<'q, B, L>(
        queries: impl IntoIterator<Item = &'q ShadowQuery>,
        tree: &Tree<B, L>,
    ) -> CompiledShadowRays
    where
        B: BvhNodeContent,
        L: TriangleLeaf,
    {
        // Triangle IDs follow the prefix order of the leaves, whatever their
        // own IDs.
        let mut first_ids = vec![0; tree.num_leaves()];
        let mut triangles = Vec::new();
        for leaf in tree.leaves() {
            first_ids[leaf.id()] = triangles.len();
            triangles.extend_from_slice(leaf.primitives());
        }

        let mut samples = ShadowSamples::default();
        for query in queries {
            let mut collector = OccluderCollector {
                segment: &query.segment,
                first_ids: &first_ids,
                hits: Vec::new(),
            };
            tree.accept(&mut collector);

            if collector.hits.is_empty() {
                samples.connected.push(query.segment);
            } else {
                samples
                    .broken
                    .push(BrokenRay::new(query.segment, collector.hits));
            }
        }

        log::debug!(
            "compiled {} connected and {} broken shadow rays over {} triangles",
            samples.connected.len(),
            samples.broken.len(),
            triangles.len()
        );

        CompiledShadowRays {
            triangles: BuildTriangles::new(triangles),
            samples,
        }
    }
}

struct OccluderCollector<'a> {
    segment: &'a Segment,
    first_ids: &'a [usize],
    hits: Vec<usize>,
}

impl<B: BvhNodeContent, L: TriangleLeaf> NodeVisitor<B, L> for OccluderCollector<'_> {
    type Output = ();

    fn visit_branch(&mut self, branch: &Branch<B, L>) {
        if branch.content.bbox().intersects_segment(self.segment) {
            branch.left.accept(self);
            branch.right.accept(self);
        }
    }

    fn visit_leaf(&mut self, leaf: &L) {
        if !leaf.bbox().intersects_segment(self.segment) {
            return;
        }

        let first_id = self.first_ids[leaf.id()];
        for (k, triangle) in leaf.primitives().iter().enumerate() {
            if triangle.intersects_segment(self.segment) {
                self.hits.push(first_id + k);
            }
        }
    }
}
