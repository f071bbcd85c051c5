use super::{BvhBranch, BvhLeaf};
use crate::bounding_volume::Box3;
use crate::cost::TraversalKernel;
use crate::shape::Triangle;

/// Materializes the payloads of the nodes produced by the builder.
///
/// `A` is the aggregate type of the triangle aggregator and `D` the branch
/// data produced by the split evaluator.
pub trait NodeFactory<A, D> {
    /// The branch payload.
    type Branch;
    /// The leaf payload.
    type Leaf;

    /// Creates the payload of a branch.
    fn branch(&self, data: D, bbox: Box3, depth: u32, id: usize, aggregate: &A) -> Self::Branch;

    /// Creates the payload of a leaf holding `primitives`.
    fn leaf(
        &self,
        primitives: Vec<Triangle>,
        bbox: Box3,
        depth: u32,
        id: usize,
        aggregate: &A,
    ) -> Self::Leaf;
}

/// Builds [`BvhBranch`] and [`BvhLeaf`] payloads.
///
/// Evaluators that do not pick a traversal kernel produce branches tagged
/// with `default_kernel`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BvhNodeFactory {
    /// The kernel of branches built without kernel information.
    pub default_kernel: TraversalKernel,
}

impl Default for BvhNodeFactory {
    fn default() -> Self {
        Self {
            default_kernel: TraversalKernel::LeftFirst,
        }
    }
}

impl BvhNodeFactory {
    fn make_leaf(primitives: Vec<Triangle>, bbox: Box3, depth: u32, id: usize) -> BvhLeaf {
        BvhLeaf {
            bbox,
            depth,
            id,
            primitives,
        }
    }
}

impl<A> NodeFactory<A, ()> for BvhNodeFactory {
    type Branch = BvhBranch;
    type Leaf = BvhLeaf;

    fn branch(&self, _: (), bbox: Box3, depth: u32, id: usize, _: &A) -> BvhBranch {
        BvhBranch {
            bbox,
            depth,
            id,
            kernel: self.default_kernel,
        }
    }

    fn leaf(&self, primitives: Vec<Triangle>, bbox: Box3, depth: u32, id: usize, _: &A) -> BvhLeaf {
        Self::make_leaf(primitives, bbox, depth, id)
    }
}

impl<A> NodeFactory<A, TraversalKernel> for BvhNodeFactory {
    type Branch = BvhBranch;
    type Leaf = BvhLeaf;

    fn branch(
        &self,
        kernel: TraversalKernel,
        bbox: Box3,
        depth: u32,
        id: usize,
        _: &A,
    ) -> BvhBranch {
        BvhBranch {
            bbox,
            depth,
            id,
            kernel,
        }
    }

    fn leaf(&self, primitives: Vec<Triangle>, bbox: Box3, depth: u32, id: usize, _: &A) -> BvhLeaf {
        Self::make_leaf(primitives, bbox, depth, id)
    }
}
