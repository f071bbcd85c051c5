use smallvec::SmallVec;

/// A node of a strictly binary [`Tree`].
///
/// Each child is exclusively owned by its parent: the structure is acyclic and
/// nodes are never shared between trees.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum TreeNode<B, L> {
    /// An internal node with exactly two children.
    Branch(Box<Branch<B, L>>),
    /// A terminal node.
    Leaf(L),
}

/// An internal node of a [`Tree`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Branch<B, L> {
    /// The payload of this branch.
    pub content: B,
    /// The left child.
    pub left: TreeNode<B, L>,
    /// The right child.
    pub right: TreeNode<B, L>,
}

/// A strictly binary tree with per-branch payloads `B` and per-leaf payloads `L`.
///
/// A tree with `num_branches` branches always has `num_branches + 1` leaves.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Tree<B, L> {
    /// The root node.
    pub root: TreeNode<B, L>,
    num_branches: usize,
}

/// Double dispatch over the two kinds of tree nodes.
pub trait NodeVisitor<B, L> {
    /// The value produced by a visit.
    type Output;

    /// Visits a branch. Implementors decide whether and in which order to
    /// recurse into the children.
    fn visit_branch(&mut self, branch: &Branch<B, L>) -> Self::Output;

    /// Visits a leaf.
    fn visit_leaf(&mut self, leaf: &L) -> Self::Output;
}

impl<B, L> Branch<B, L> {
    /// Creates a new branch.
    pub fn new(content: B, left: TreeNode<B, L>, right: TreeNode<B, L>) -> Self {
        Self {
            content,
            left,
            right,
        }
    }
}

impl<B, L> TreeNode<B, L> {
    /// Creates a branch node.
    pub fn branch(content: B, left: TreeNode<B, L>, right: TreeNode<B, L>) -> Self {
        TreeNode::Branch(Box::new(Branch::new(content, left, right)))
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }

    /// The branch data, if this node is a branch.
    #[inline]
    pub fn as_branch(&self) -> Option<&Branch<B, L>> {
        match self {
            TreeNode::Branch(b) => Some(b),
            TreeNode::Leaf(_) => None,
        }
    }

    /// The leaf payload, if this node is a leaf.
    #[inline]
    pub fn as_leaf(&self) -> Option<&L> {
        match self {
            TreeNode::Branch(_) => None,
            TreeNode::Leaf(l) => Some(l),
        }
    }

    /// Dispatches this node to `visitor`.
    #[inline]
    pub fn accept<V: NodeVisitor<B, L>>(&self, visitor: &mut V) -> V::Output {
        match self {
            TreeNode::Branch(b) => visitor.visit_branch(b),
            TreeNode::Leaf(l) => visitor.visit_leaf(l),
        }
    }

    /// Applies one of two functions depending on the kind of node.
    #[inline]
    pub fn on_content<T>(&self, branch: impl FnOnce(&B) -> T, leaf: impl FnOnce(&L) -> T) -> T {
        match self {
            TreeNode::Branch(b) => branch(&b.content),
            TreeNode::Leaf(l) => leaf(l),
        }
    }

    /// Iterates through all the nodes of this subtree, parents before children
    /// and left subtrees before right subtrees.
    pub fn prefix_nodes(&self) -> PrefixNodes<'_, B, L> {
        let mut stack = SmallVec::new();
        stack.push(self);
        PrefixNodes { stack }
    }

    /// All the nodes of this subtree, children before parents and left
    /// subtrees before right subtrees.
    pub fn postfix_nodes(&self) -> Vec<&TreeNode<B, L>> {
        // Reversed prefix order of the mirrored tree.
        let mut result = Vec::new();
        let mut stack: SmallVec<[&TreeNode<B, L>; 32]> = SmallVec::new();
        stack.push(self);

        while let Some(node) = stack.pop() {
            result.push(node);
            if let TreeNode::Branch(b) = node {
                stack.push(&b.left);
                stack.push(&b.right);
            }
        }

        result.reverse();
        result
    }

    /// Folds this subtree bottom-up.
    ///
    /// `leaf` maps every leaf to a value, and `branch` combines a branch
    /// payload with the values of its left and right subtrees.
    pub fn roll_up<T>(
        &self,
        branch: &mut impl FnMut(&B, T, T) -> T,
        leaf: &mut impl FnMut(&L) -> T,
    ) -> T {
        match self {
            TreeNode::Branch(b) => {
                let left = b.left.roll_up(branch, leaf);
                let right = b.right.roll_up(branch, leaf);
                branch(&b.content, left, right)
            }
            TreeNode::Leaf(l) => leaf(l),
        }
    }

    fn count_branches(&self) -> usize {
        self.prefix_nodes().filter(|n| !n.is_leaf()).count()
    }
}

/// Iterator returned by [`TreeNode::prefix_nodes`].
pub struct PrefixNodes<'a, B, L> {
    stack: SmallVec<[&'a TreeNode<B, L>; 32]>,
}

impl<'a, B, L> Iterator for PrefixNodes<'a, B, L> {
    type Item = &'a TreeNode<B, L>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let TreeNode::Branch(b) = node {
            self.stack.push(&b.right);
            self.stack.push(&b.left);
        }
        Some(node)
    }
}

impl<B, L> Tree<B, L> {
    /// Wraps a root node into a tree, counting its branches.
    pub fn new(root: TreeNode<B, L>) -> Self {
        let num_branches = root.count_branches();
        Self { root, num_branches }
    }

    /// Wraps a root node whose branch count is already known.
    pub(crate) fn with_counts(root: TreeNode<B, L>, num_branches: usize) -> Self {
        debug_assert_eq!(root.count_branches(), num_branches);
        Self { root, num_branches }
    }

    /// The number of branches of this tree.
    #[inline]
    pub fn num_branches(&self) -> usize {
        self.num_branches
    }

    /// The number of leaves of this tree, always `num_branches() + 1`.
    #[inline]
    pub fn num_leaves(&self) -> usize {
        self.num_branches + 1
    }

    /// Dispatches the root to `visitor`.
    #[inline]
    pub fn accept<V: NodeVisitor<B, L>>(&self, visitor: &mut V) -> V::Output {
        self.root.accept(visitor)
    }

    /// Iterates through all the nodes in prefix order.
    pub fn prefix_nodes(&self) -> PrefixNodes<'_, B, L> {
        self.root.prefix_nodes()
    }

    /// All the nodes in postfix order.
    pub fn postfix_nodes(&self) -> Vec<&TreeNode<B, L>> {
        self.root.postfix_nodes()
    }

    /// Iterates through the branch payloads in prefix order.
    pub fn branches(&self) -> impl Iterator<Item = &Branch<B, L>> {
        self.prefix_nodes().filter_map(|n| n.as_branch())
    }

    /// Iterates through the leaf payloads in prefix order.
    pub fn leaves(&self) -> impl Iterator<Item = &L> {
        self.prefix_nodes().filter_map(|n| n.as_leaf())
    }

    /// Folds this tree bottom-up. See [`TreeNode::roll_up`].
    pub fn roll_up<T>(
        &self,
        mut branch: impl FnMut(&B, T, T) -> T,
        mut leaf: impl FnMut(&L) -> T,
    ) -> T {
        self.root.roll_up(&mut branch, &mut leaf)
    }

    /// Rebuilds this tree bottom-up with new payload types.
    pub fn map<B2, L2>(
        &self,
        mut branch: impl FnMut(&B) -> B2,
        mut leaf: impl FnMut(&L) -> L2,
    ) -> Tree<B2, L2> {
        let root = self.roll_up(
            |b, left, right| TreeNode::branch(branch(b), left, right),
            |l| TreeNode::Leaf(leaf(l)),
        );
        Tree::with_counts(root, self.num_branches)
    }
}
