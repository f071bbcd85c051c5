//! Traversal orders chosen from the analytic visibility of the children of
//! every branch.

use super::{visibility_report, TraversalKernel, VisibilityReport};
use crate::partitioning::bvh::{Bvh, BvhBranch, BvhLeaf};
use crate::partitioning::{Tree, TreeNode};

/// Cost of a box test in the ordering recurrence.
pub const TRAVERSAL_COST: f64 = 1.0;
/// Cost of a leaf visit in the ordering recurrence.
pub const PRIMITIVE_COST: f64 = 1.0;

/// Expected behavior of a random line crossing the box of a subtree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SubtreeCost {
    /// Probability that the line crosses the subtree without being stopped.
    pub pass_through: f64,
    /// Expected traversal cost.
    pub cost: f64,
}

impl SubtreeCost {
    /// The cost of a leaf: a line is stopped by any non-empty leaf.
    pub fn leaf(leaf: &BvhLeaf) -> Self {
        Self {
            pass_through: if leaf.primitives.is_empty() { 1.0 } else { 0.0 },
            cost: PRIMITIVE_COST,
        }
    }
}

/// The cheapest fixed order for a branch with the given child costs, and the
/// resulting cost of the branch.
///
/// Ties go to [`TraversalKernel::LeftFirst`].
pub fn rtsah_order(
    p: &VisibilityReport,
    left: SubtreeCost,
    right: SubtreeCost,
) -> (TraversalKernel, SubtreeCost) {
    let pass_through = p.just_left * left.pass_through
        + p.just_right * right.pass_through
        + p.both * left.pass_through * right.pass_through
        + p.neither;

    let left_first = TRAVERSAL_COST
        + p.left * left.cost
        + (p.just_right + p.both * left.pass_through) * (TRAVERSAL_COST + right.cost)
        + p.neither * TRAVERSAL_COST;
    let right_first = TRAVERSAL_COST
        + p.right * right.cost
        + (p.just_left + p.both * right.pass_through) * (TRAVERSAL_COST + left.cost)
        + p.neither * TRAVERSAL_COST;

    let (kernel, cost) = if right_first < left_first {
        (TraversalKernel::RightFirst, right_first)
    } else {
        (TraversalKernel::LeftFirst, left_first)
    };

    (kernel, SubtreeCost { pass_through, cost })
}

/// Copies `tree`, giving every branch the fixed order minimizing its
/// expected cost for random lines.
///
/// Boxes, IDs and primitives are preserved.
pub fn apply_rtsah_ordering(tree: &Bvh) -> Bvh {
    type Rolled = (TreeNode<BvhBranch, BvhLeaf>, SubtreeCost);

    let (root, cost) = tree.roll_up(
        |branch: &BvhBranch, (left, lcost): Rolled, (right, rcost): Rolled| {
            let report = visibility_report(&branch.bbox, left.bbox(), right.bbox());
            let (kernel, cost) = rtsah_order(&report, lcost, rcost);
            let content = BvhBranch { kernel, ..*branch };
            (TreeNode::branch(content, left, right), cost)
        },
        |leaf| (TreeNode::Leaf(leaf.clone()), SubtreeCost::leaf(leaf)),
    );

    log::debug!("ordered {} branches, expected cost {}", tree.num_branches(), cost.cost);
    Tree::new(root)
}
