use super::{BvhNodeContent, HitRecord, TriangleLeaf};
use crate::partitioning::tree::{Branch, NodeId, NodeMap, NodeVisitor, Tree, TreeNode};
use crate::query::Ray;
use crate::utils::{ClosedInterval, WeightedValue};
use std::collections::BinaryHeap;

/// Hooks called by the first-hit traversals at every elementary operation.
///
/// Every hook defaults to a no-op, and `()` is the observer that ignores
/// everything.
pub trait TraversalObserver {
    /// A traversal starts for `ray`.
    fn ray_cast(&mut self, _ray: &Ray) {}
    /// The ray is tested against the box of `node`.
    fn bounding_box_test(&mut self, _node: NodeId) {}
    /// The box of `node` was hit.
    fn bounding_box_hit(&mut self, _node: NodeId) {}
    /// The children of the branch `id` are about to be tested.
    fn branch_node_inspection(&mut self, _id: usize) {}
    /// The primitives of the leaf `id` are about to be tested.
    fn primitive_node_inspection(&mut self, _id: usize) {}
    /// A primitive of the leaf `id` was hit.
    fn primitive_node_primitive_hit(&mut self, _id: usize, _hit: &HitRecord) {}
    /// The traversal returns `hit`.
    fn ray_hit_found(&mut self, _hit: &HitRecord) {}
}

impl TraversalObserver for () {}

/// Operation totals over any number of traversals.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct OpCounter {
    /// Traversals started.
    pub rays_cast: usize,
    /// Ray/box tests.
    pub bbox_tests: usize,
    /// Ray/box tests that found an intersection.
    pub bbox_hits: usize,
    /// Branches whose children were tested.
    pub branch_inspections: usize,
    /// Leaves whose primitives were tested.
    pub leaf_inspections: usize,
    /// Leaves that produced a hit.
    pub leaf_primitive_hits: usize,
    /// Traversals that returned a hit.
    pub hits_found: usize,
}

impl TraversalObserver for OpCounter {
    fn ray_cast(&mut self, _: &Ray) {
        self.rays_cast += 1;
    }

    fn bounding_box_test(&mut self, _: NodeId) {
        self.bbox_tests += 1;
    }

    fn bounding_box_hit(&mut self, _: NodeId) {
        self.bbox_hits += 1;
    }

    fn branch_node_inspection(&mut self, _: usize) {
        self.branch_inspections += 1;
    }

    fn primitive_node_inspection(&mut self, _: usize) {
        self.leaf_inspections += 1;
    }

    fn primitive_node_primitive_hit(&mut self, _: usize, _: &HitRecord) {
        self.leaf_primitive_hits += 1;
    }

    fn ray_hit_found(&mut self, _: &HitRecord) {
        self.hits_found += 1;
    }
}

/// Per-node inspection counts.
#[derive(Clone, Debug, PartialEq)]
pub struct InspectionCounter {
    /// How many times each node was inspected.
    pub inspections: NodeMap<usize>,
}

impl InspectionCounter {
    /// Zeroed counters for `tree`.
    pub fn new<B, L>(tree: &Tree<B, L>) -> Self {
        Self {
            inspections: NodeMap::new(tree, 0),
        }
    }
}

impl TraversalObserver for InspectionCounter {
    fn branch_node_inspection(&mut self, id: usize) {
        self.inspections[NodeId::Branch(id)] += 1;
    }

    fn primitive_node_inspection(&mut self, id: usize) {
        self.inspections[NodeId::Leaf(id)] += 1;
    }
}

/// A strategy finding the closest intersection of a ray with a hierarchy.
///
/// All the strategies return the same hit, but visit different nodes.
pub trait FirstHitTraversal {
    /// Finds the closest hit, reporting every operation to `observer`.
    fn first_hit_with<B, L, O>(
        &self,
        tree: &Tree<B, L>,
        ray: &Ray,
        observer: &mut O,
    ) -> Option<HitRecord>
    where
        B: BvhNodeContent,
        L: TriangleLeaf,
        O: TraversalObserver;

    /// Finds the closest hit.
    fn first_hit<B: BvhNodeContent, L: TriangleLeaf>(
        &self,
        tree: &Tree<B, L>,
        ray: &Ray,
    ) -> Option<HitRecord> {
        self.first_hit_with(tree, ray, &mut ())
    }
}

/// Recursive traversal visiting the child with the nearest entry point first
/// and narrowing the search interval as hits are found.
#[derive(Copy, Clone, Debug, Default)]
pub struct OrderedDepthFirst;

/// Best-first traversal driven by a single priority queue of nodes and
/// candidate hits keyed by their distance along the ray.
#[derive(Copy, Clone, Debug, Default)]
pub struct RayOrder;

impl FirstHitTraversal for OrderedDepthFirst {
    fn first_hit_with<B, L, O>(
        &self,
        tree: &Tree<B, L>,
        ray: &Ray,
        observer: &mut O,
    ) -> Option<HitRecord>
    where
        B: BvhNodeContent,
        L: TriangleLeaf,
        O: TraversalObserver,
    {
        observer.ray_cast(ray);
        observer.bounding_box_test(tree.root.node_id());
        if tree.root.bbox().intersect_ray(ray).is_empty() {
            return None;
        }
        observer.bounding_box_hit(tree.root.node_id());

        let mut visitor = DepthFirstVisitor {
            ray,
            bound: ClosedInterval::POSITIVES,
            observer: &mut *observer,
        };
        let result = tree.accept(&mut visitor);

        if let Some(hit) = &result {
            observer.ray_hit_found(hit);
        }
        result
    }
}

struct DepthFirstVisitor<'a, O> {
    ray: &'a Ray,
    bound: ClosedInterval,
    observer: &'a mut O,
}

impl<B, L, O> NodeVisitor<B, L> for DepthFirstVisitor<'_, O>
where
    B: BvhNodeContent,
    L: TriangleLeaf,
    O: TraversalObserver,
{
    type Output = Option<HitRecord>;

    fn visit_branch(&mut self, branch: &Branch<B, L>) -> Option<HitRecord> {
        self.observer.branch_node_inspection(branch.content.id());

        let (left, right) = (&branch.left, &branch.right);
        self.observer.bounding_box_test(left.node_id());
        self.observer.bounding_box_test(right.node_id());

        let origin = &self.ray.origin;
        let dir = &self.ray.dir;
        let lint = left.bbox().intersect_interval(origin, dir, self.bound);
        let rint = right.bbox().intersect_interval(origin, dir, self.bound);

        match (lint.is_empty(), rint.is_empty()) {
            (true, true) => None,
            (true, false) => {
                self.observer.bounding_box_hit(right.node_id());
                right.accept(self)
            }
            (false, true) => {
                self.observer.bounding_box_hit(left.node_id());
                left.accept(self)
            }
            (false, false) => {
                self.observer.bounding_box_hit(left.node_id());
                self.observer.bounding_box_hit(right.node_id());

                let ((near, _), (far, far_interval)) = if lint.min < rint.min {
                    ((left, lint), (right, rint))
                } else {
                    ((right, rint), (left, lint))
                };

                let near_hit = near.accept(self);
                if far_interval.entirely_greater(&self.bound) {
                    return near_hit;
                }

                // Any hit from the far child lies within the narrowed bound.
                far.accept(self).or(near_hit)
            }
        }
    }

    fn visit_leaf(&mut self, leaf: &L) -> Option<HitRecord> {
        self.observer.primitive_node_inspection(leaf.id());
        let hit = leaf.closest_hit(self.ray, self.bound)?;
        self.observer.primitive_node_primitive_hit(leaf.id(), &hit);
        self.bound = ClosedInterval::new(self.bound.min, hit.t);
        Some(hit)
    }
}

enum QueueItem<'a, B, L> {
    Node(&'a TreeNode<B, L>),
    Hit(HitRecord),
}

const NODE_RANK: u8 = 1;
const HIT_RANK: u8 = 0;

impl FirstHitTraversal for RayOrder {
    fn first_hit_with<B, L, O>(
        &self,
        tree: &Tree<B, L>,
        ray: &Ray,
        observer: &mut O,
    ) -> Option<HitRecord>
    where
        B: BvhNodeContent,
        L: TriangleLeaf,
        O: TraversalObserver,
    {
        let mut queue = BinaryHeap::new();
        let mut seq = 0u32;
        let mut push = |queue: &mut BinaryHeap<_>, item, key, rank| {
            queue.push(WeightedValue::new(item, key, rank, seq));
            seq += 1;
        };

        observer.ray_cast(ray);
        observer.bounding_box_test(tree.root.node_id());
        let root = tree.root.bbox().intersect_ray(ray);
        if !root.is_empty() {
            observer.bounding_box_hit(tree.root.node_id());
            push(&mut queue, QueueItem::Node(&tree.root), root.min, NODE_RANK);
        }

        while let Some(entry) = queue.pop() {
            match entry.value {
                QueueItem::Hit(hit) => {
                    // Nothing left in the queue can be closer.
                    observer.ray_hit_found(&hit);
                    return Some(hit);
                }
                QueueItem::Node(TreeNode::Branch(branch)) => {
                    observer.branch_node_inspection(branch.content.id());

                    for child in [&branch.left, &branch.right] {
                        observer.bounding_box_test(child.node_id());
                        let interval = child.bbox().intersect_ray(ray);
                        if !interval.is_empty() {
                            observer.bounding_box_hit(child.node_id());
                            push(&mut queue, QueueItem::Node(child), interval.min, NODE_RANK);
                        }
                    }
                }
                QueueItem::Node(TreeNode::Leaf(leaf)) => {
                    observer.primitive_node_inspection(leaf.id());
                    if let Some(hit) = leaf.closest_hit(ray, ClosedInterval::POSITIVES) {
                        observer.primitive_node_primitive_hit(leaf.id(), &hit);
                        push(&mut queue, QueueItem::Hit(hit), hit.t, HIT_RANK);
                    }
                }
            }
        }

        None
    }
}

impl<B: BvhNodeContent, L: TriangleLeaf> Tree<B, L> {
    /// The closest intersection of `ray` with the triangles of this tree.
    ///
    /// Uses [`OrderedDepthFirst`].
    pub fn first_hit(&self, ray: &Ray) -> Option<HitRecord> {
        OrderedDepthFirst.first_hit(self, ray)
    }
}

#[cfg(test)]
mod test {
    use super::{FirstHitTraversal, InspectionCounter, OpCounter, OrderedDepthFirst, RayOrder};
    use crate::math::{Point, Vector};
    use crate::partitioning::bvh::{self, BoundsCountAggregator, BuildConfig, BuildTriangles};
    use crate::partitioning::bvh::{Bvh, BvhNodeFactory, SahEvaluator};
    use crate::query::Ray;
    use crate::shape::generators;

    fn cube_bvh() -> Bvh {
        let mut tris = BuildTriangles::new(generators::unit_cube());
        bvh::build(
            &mut tris,
            &mut SahEvaluator::default(),
            &BvhNodeFactory::default(),
            &BoundsCountAggregator,
            &BuildConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn both_traversals_find_the_front_face() {
        let tree = cube_bvh();
        let ray = Ray::new(Point::new(0.3, 0.6, -2.0), Vector::z());

        let odf = OrderedDepthFirst.first_hit(&tree, &ray).unwrap();
        let ro = RayOrder.first_hit(&tree, &ray).unwrap();
        assert_relative_eq!(odf.t, 2.0);
        assert_relative_eq!(ro.t, 2.0);
        assert_eq!(odf.leaf_id, ro.leaf_id);
    }

    #[test]
    fn misses_return_nothing() {
        let tree = cube_bvh();
        let away = Ray::new(Point::new(0.3, 0.6, -2.0), -Vector::z());
        let beside = Ray::new(Point::new(3.0, 0.5, 0.5), Vector::y());

        for ray in [away, beside] {
            assert!(OrderedDepthFirst.first_hit(&tree, &ray).is_none());
            assert!(RayOrder.first_hit(&tree, &ray).is_none());
        }
    }

    #[test]
    fn observers_see_every_operation() {
        let tree = cube_bvh();
        let ray = Ray::new(Point::new(0.3, 0.6, -2.0), Vector::z());

        let mut ops = OpCounter::default();
        let mut inspections = InspectionCounter::new(&tree);
        let hit = RayOrder.first_hit_with(&tree, &ray, &mut ops);
        let same = RayOrder.first_hit_with(&tree, &ray, &mut inspections);
        assert!(hit.is_some());
        assert_eq!(hit, same);

        assert_eq!(ops.rays_cast, 1);
        assert_eq!(ops.hits_found, 1);
        assert_eq!(ops.bbox_tests, 1 + 2 * ops.branch_inspections);
        assert!(ops.bbox_hits <= ops.bbox_tests);
        assert_eq!(
            inspections.inspections.branches.iter().sum::<usize>(),
            ops.branch_inspections
        );
        assert_eq!(
            inspections.inspections.leaves.iter().sum::<usize>(),
            ops.leaf_inspections
        );
        // The root is always inspected first.
        assert_eq!(inspections.inspections.branches[0], 1);
    }
}
