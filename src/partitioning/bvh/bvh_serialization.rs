use super::{Bvh, BvhBranch, BvhLeaf};
use crate::bounding_volume::Box3;
use crate::cost::TraversalKernel;
use crate::format::{self, FormatError};
use crate::partitioning::tree::{Tree, TreeNode};
use smallvec::SmallVec;
use std::io::{self, Read, Write};

const EXPLICIT_BRANCH: i32 = 0;
const EXPLICIT_LEAF: i32 = 1;
const IMPLICIT_BRANCH: i32 = 2;
const IMPLICIT_LEAF: i32 = 3;

type Node = TreeNode<BvhBranch, BvhLeaf>;

/// Reads a hierarchy from its binary pre-order encoding.
///
/// Every node starts with an `i32` tag:
/// - `0`: branch followed by its box, then its left and right subtrees.
/// - `2`: branch whose box is the union of the boxes of its subtrees.
/// - `1`: leaf followed by its triangle count, its box and its triangles.
/// - `3`: leaf followed by its triangle count and its triangles; its box is
///   the bounding box of the triangles.
///
/// Triangles are 9 `f32` and boxes 6 `f32` (`min_x, max_x, min_y, ...`), all
/// little-endian. The stream ends with [`format::END_SENTINEL`].
///
/// Branch and leaf IDs are assigned in prefix order, and every branch gets
/// the [`TraversalKernel::LeftFirst`] kernel.
pub fn read_bvh(reader: &mut impl Read) -> Result<Bvh, FormatError> {
    let mut parser = Parser {
        reader,
        num_branches: 0,
        num_leaves: 0,
    };
    let root = parser.parse_tree()?;
    format::expect_sentinel(parser.reader)?;

    // Always holds after a complete pre-order parse of binary branches.
    let (branches, leaves) = (parser.num_branches, parser.num_leaves);
    if branches + 1 != leaves {
        return Err(FormatError::BranchLeafMismatch { branches, leaves });
    }

    log::debug!("read a hierarchy with {} branches, {} leaves", branches, leaves);
    Ok(Tree::new(root))
}

/// A branch whose header has been read but whose subtrees are incomplete.
struct OpenBranch {
    explicit: Option<Box3>,
    depth: u32,
    id: usize,
    left: Option<Node>,
}

impl OpenBranch {
    fn close(self, left: Node, right: Node) -> Node {
        let bbox = self.explicit.unwrap_or_else(|| *left.bbox() | *right.bbox());
        let content = BvhBranch {
            bbox,
            depth: self.depth,
            id: self.id,
            kernel: TraversalKernel::LeftFirst,
        };
        TreeNode::branch(content, left, right)
    }
}

struct Parser<'a, R> {
    reader: &'a mut R,
    num_branches: usize,
    num_leaves: usize,
}

impl<R: Read> Parser<'_, R> {
    /// Parses one subtree, keeping the branches still missing a child on an
    /// explicit stack.
    fn parse_tree(&mut self) -> Result<Node, FormatError> {
        let mut open: SmallVec<[OpenBranch; 32]> = SmallVec::new();

        loop {
            let depth = open.len() as u32;
            let mut node = match format::read_i32(self.reader)? {
                tag @ (EXPLICIT_BRANCH | IMPLICIT_BRANCH) => {
                    let explicit = if tag == EXPLICIT_BRANCH {
                        Some(format::read_box(self.reader)?)
                    } else {
                        None
                    };
                    open.push(OpenBranch {
                        explicit,
                        depth,
                        id: self.num_branches,
                        left: None,
                    });
                    self.num_branches += 1;
                    continue;
                }
                tag @ (EXPLICIT_LEAF | IMPLICIT_LEAF) => {
                    self.parse_leaf(tag == EXPLICIT_LEAF, depth)?
                }
                other => return Err(FormatError::UnknownNodeTag(other)),
            };

            // Attach the completed subtree to the innermost open branch,
            // closing every branch that now has both children.
            loop {
                match open.pop() {
                    None => return Ok(node),
                    Some(mut branch) => match branch.left.take() {
                        None => {
                            branch.left = Some(node);
                            open.push(branch);
                            break;
                        }
                        Some(left) => node = branch.close(left, node),
                    },
                }
            }
        }
    }

    fn parse_leaf(&mut self, explicit: bool, depth: u32) -> Result<Node, FormatError> {
        let count = format::read_i32(self.reader)?;
        let count = usize::try_from(count).map_err(|_| FormatError::NegativeCount(count))?;
        let explicit = if explicit {
            Some(format::read_box(self.reader)?)
        } else {
            None
        };

        let primitives = (0..count)
            .map(|_| format::read_triangle(self.reader))
            .collect::<Result<Vec<_>, _>>()?;
        let bbox = explicit.unwrap_or_else(|| {
            primitives
                .iter()
                .fold(Box3::EMPTY, |acc, t| acc | t.bounds())
        });

        let id = self.num_leaves;
        self.num_leaves += 1;

        Ok(TreeNode::Leaf(BvhLeaf {
            bbox,
            depth,
            id,
            primitives,
        }))
    }
}

/// Writes a hierarchy in the binary format read by [`read_bvh`].
///
/// Every node is written with its explicit box, so that boxes which are not
/// tight unions survive the round-trip.
pub fn write_bvh(writer: &mut impl Write, tree: &Bvh) -> Result<(), FormatError> {
    for node in tree.prefix_nodes() {
        match node {
            TreeNode::Branch(b) => {
                format::write_i32(writer, EXPLICIT_BRANCH)?;
                format::write_box(writer, &b.content.bbox)?;
            }
            TreeNode::Leaf(l) => {
                let count = i32::try_from(l.primitives.len()).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "too many triangles in a leaf")
                })?;
                format::write_i32(writer, EXPLICIT_LEAF)?;
                format::write_i32(writer, count)?;
                format::write_box(writer, &l.bbox)?;
                for tri in &l.primitives {
                    format::write_triangle(writer, tri)?;
                }
            }
        }
    }

    format::write_i32(writer, format::END_SENTINEL)?;
    log::debug!(
        "wrote a hierarchy with {} branches, {} leaves",
        tree.num_branches(),
        tree.num_leaves()
    );
    Ok(())
}
