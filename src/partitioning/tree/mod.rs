//! Generic strictly binary trees.

pub use self::node_map::{NodeId, NodeMap};
pub use self::tree::{Branch, NodeVisitor, PrefixNodes, Tree, TreeNode};

mod node_map;
mod tree;
