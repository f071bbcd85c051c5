use crate::bounding_volume::Box3;
use crate::cost::TraversalKernel;
use crate::math::Real;
use crate::partitioning::tree::{NodeId, Tree, TreeNode};
use crate::query::Ray;
use crate::shape::Triangle;
use crate::utils::ClosedInterval;

/// Hits closer than this to the ray origin are ignored to avoid
/// self-intersections of secondary rays.
pub const MIN_HIT_DISTANCE: Real = 0.001;

/// A bounding volume hierarchy over triangles, with kernel-tagged branches.
pub type Bvh = Tree<BvhBranch, BvhLeaf>;

/// Payload common to every node of a bounding volume hierarchy.
pub trait BvhNodeContent {
    /// The tight bounding box of the node.
    fn bbox(&self) -> &Box3;
    /// The distance of this node from the root.
    fn depth(&self) -> u32;
    /// The dense ID of this node among the nodes of the same kind.
    fn id(&self) -> usize;
}

/// Branch payload carrying a traversal kernel.
pub trait KernelBranch: BvhNodeContent {
    /// The order in which the children of this branch are visited.
    fn kernel(&self) -> TraversalKernel;
}

/// Leaf payload holding triangles.
pub trait TriangleLeaf: BvhNodeContent {
    /// The triangles stored in this leaf.
    fn primitives(&self) -> &[Triangle];

    /// The closest hit of `ray` with a primitive of this leaf, restricted to
    /// the parameter range `range` and to parameters above [`MIN_HIT_DISTANCE`].
    fn closest_hit(&self, ray: &Ray, range: ClosedInterval) -> Option<HitRecord> {
        let mut best: Option<HitRecord> = None;

        for triangle in self.primitives() {
            if let Some(t) = triangle.intersect_line(&ray.origin, &ray.dir) {
                if t > MIN_HIT_DISTANCE
                    && range.contains(t)
                    && best.as_ref().map(|b| t < b.t).unwrap_or(true)
                {
                    best = Some(HitRecord {
                        triangle: *triangle,
                        t,
                        leaf_id: self.id(),
                    });
                }
            }
        }

        best
    }
}

/// The result of a successful ray/triangle intersection.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct HitRecord {
    /// The triangle that was hit.
    pub triangle: Triangle,
    /// The ray parameter of the hit.
    pub t: Real,
    /// The ID of the leaf containing the hit triangle.
    pub leaf_id: usize,
}

/// The payload of a branch of a [`Bvh`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BvhBranch {
    /// The union of the boxes of both children.
    pub bbox: Box3,
    /// The distance from the root.
    pub depth: u32,
    /// The branch ID, in `0..num_branches`.
    pub id: usize,
    /// The traversal order of the children.
    pub kernel: TraversalKernel,
}

/// The payload of a leaf of a [`Bvh`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BvhLeaf {
    /// The bounding box of the primitives.
    pub bbox: Box3,
    /// The distance from the root.
    pub depth: u32,
    /// The leaf ID, in `0..num_leaves`.
    pub id: usize,
    /// The triangles of this leaf.
    pub primitives: Vec<Triangle>,
}

impl BvhNodeContent for BvhBranch {
    #[inline]
    fn bbox(&self) -> &Box3 {
        &self.bbox
    }

    #[inline]
    fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    fn id(&self) -> usize {
        self.id
    }
}

impl KernelBranch for BvhBranch {
    #[inline]
    fn kernel(&self) -> TraversalKernel {
        self.kernel
    }
}

impl BvhNodeContent for BvhLeaf {
    #[inline]
    fn bbox(&self) -> &Box3 {
        &self.bbox
    }

    #[inline]
    fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    fn id(&self) -> usize {
        self.id
    }
}

impl TriangleLeaf for BvhLeaf {
    #[inline]
    fn primitives(&self) -> &[Triangle] {
        &self.primitives
    }
}

impl<B: BvhNodeContent, L: BvhNodeContent> TreeNode<B, L> {
    /// The bounding box of this node.
    #[inline]
    pub fn bbox(&self) -> &Box3 {
        match self {
            TreeNode::Branch(b) => b.content.bbox(),
            TreeNode::Leaf(l) => l.bbox(),
        }
    }

    /// The kind and ID of this node.
    #[inline]
    pub fn node_id(&self) -> NodeId {
        match self {
            TreeNode::Branch(b) => NodeId::Branch(b.content.id()),
            TreeNode::Leaf(l) => NodeId::Leaf(l.id()),
        }
    }
}
