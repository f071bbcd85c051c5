//! Spatial partitioning tools.

pub use self::bvh::Bvh;
pub use self::tree::{Branch, NodeId, NodeMap, NodeVisitor, Tree, TreeNode};

pub mod bvh;
pub mod tree;
