use super::Tree;
use core::ops::{Index, IndexMut};

/// Identifies a node by kind and dense ID.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// The branch with the given ID.
    Branch(usize),
    /// The leaf with the given ID.
    Leaf(usize),
}

/// A value attached to every node of a tree, stored in two dense arrays
/// indexed by branch and leaf IDs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct NodeMap<T> {
    /// One value per branch, indexed by branch ID.
    pub branches: Vec<T>,
    /// One value per leaf, indexed by leaf ID.
    pub leaves: Vec<T>,
}

impl<T: Clone> NodeMap<T> {
    /// A map sized for `tree`, filled with `value`.
    pub fn new<B, L>(tree: &Tree<B, L>, value: T) -> Self {
        Self::with_counts(tree.num_branches(), value)
    }

    /// A map for a tree with `num_branches` branches, filled with `value`.
    pub fn with_counts(num_branches: usize, value: T) -> Self {
        Self {
            branches: vec![value.clone(); num_branches],
            leaves: vec![value; num_branches + 1],
        }
    }
}

impl<T> Index<NodeId> for NodeMap<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: NodeId) -> &T {
        match id {
            NodeId::Branch(i) => &self.branches[i],
            NodeId::Leaf(i) => &self.leaves[i],
        }
    }
}

impl<T> IndexMut<NodeId> for NodeMap<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match id {
            NodeId::Branch(i) => &mut self.branches[i],
            NodeId::Leaf(i) => &mut self.leaves[i],
        }
    }
}
