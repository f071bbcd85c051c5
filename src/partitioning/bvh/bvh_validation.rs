use super::{BvhNodeContent, TriangleLeaf};
use crate::partitioning::tree::{NodeId, Tree, TreeNode};

impl<B: BvhNodeContent, L: TriangleLeaf> Tree<B, L> {
    /// Panics if the tree isn’t well-formed.
    ///
    /// The tree is well-formed if it is topologically correct (branch and leaf
    /// IDs are dense permutations of `0..num_branches()` and `0..num_leaves()`,
    /// depths grow by one from parent to child) and geometrically correct (the
    /// box of a parent contains the boxes of its children, and the box of a
    /// leaf contains all the vertices of its triangles).
    pub fn assert_well_formed(&self) {
        self.assert_well_formed_topology_only();
        self.assert_well_formed_geometry_recurse(&self.root);
    }

    /// Similar to [`Self::assert_well_formed`] but doesn’t check the geometry.
    pub fn assert_well_formed_topology_only(&self) {
        let mut seen_branches = vec![false; self.num_branches()];
        let mut seen_leaves = vec![false; self.num_leaves()];

        for node in self.prefix_nodes() {
            let (seen, id) = match node.node_id() {
                NodeId::Branch(id) => (&mut seen_branches, id),
                NodeId::Leaf(id) => (&mut seen_leaves, id),
            };
            assert!(
                id < seen.len(),
                "{:?} is out of range for {} branches",
                node.node_id(),
                self.num_branches()
            );
            assert!(!seen[id], "{:?} visited twice", node.node_id());
            seen[id] = true;

            if let TreeNode::Branch(b) = node {
                let depth = b.content.depth();
                for child in [&b.left, &b.right] {
                    let child_depth = child.on_content(|c| c.depth(), |c| c.depth());
                    assert_eq!(
                        child_depth,
                        depth + 1,
                        "{:?} is not one level below its parent",
                        child.node_id()
                    );
                }
            }
        }
    }

    fn assert_well_formed_geometry_recurse(&self, node: &TreeNode<B, L>) {
        match node {
            TreeNode::Branch(b) => {
                let bbox = b.content.bbox();
                assert!(
                    bbox.contains_box(b.left.bbox()) && bbox.contains_box(b.right.bbox()),
                    "branch {} does not contain its children",
                    b.content.id()
                );
                self.assert_well_formed_geometry_recurse(&b.left);
                self.assert_well_formed_geometry_recurse(&b.right);
            }
            TreeNode::Leaf(l) => {
                for tri in l.primitives() {
                    for pt in tri.vertices() {
                        assert!(
                            l.bbox().contains_point(&pt),
                            "leaf {} does not contain the vertex {:?}",
                            l.id(),
                            pt
                        );
                    }
                }
            }
        }
    }
}
