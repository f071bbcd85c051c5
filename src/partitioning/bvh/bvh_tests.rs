use super::{
    build, read_bvh, write_bvh, BoundAndCount, BoundsCountAggregator, BuildConfig, BuildError,
    BuildReport, BuildTriangles, Bvh, BvhBranch, BvhLeaf, BvhNodeContent, BvhNodeFactory,
    EvalResult, SahEvaluator, SplitCandidate, SplitEvaluator,
};
use crate::bounding_volume::Box3;
use crate::math::{Point, Real, Vector};
use crate::partitioning::tree::TreeNode;
use crate::shape::{generators, Triangle};

fn random_soup(len: usize, seed: u64) -> Vec<Triangle> {
    let mut rng = oorandom::Rand32::new(seed);
    let point = |rng: &mut oorandom::Rand32, scale: Real| {
        Vector::new(rng.rand_float(), rng.rand_float(), rng.rand_float()) * scale
    };

    (0..len)
        .map(|_| {
            let base = Point::origin() + point(&mut rng, 10.0);
            Triangle::new(
                base,
                base + point(&mut rng, 0.5),
                base + point(&mut rng, 0.5),
            )
        })
        .collect()
}

fn subtree_leaves(node: &TreeNode<BvhBranch, BvhLeaf>) -> impl Iterator<Item = &BvhLeaf> {
    node.prefix_nodes().filter_map(|n| n.as_leaf())
}

fn sah_build(triangles: Vec<Triangle>, config: &BuildConfig) -> Result<Bvh, BuildError> {
    let mut tris = BuildTriangles::new(triangles);
    build(
        &mut tris,
        &mut SahEvaluator::default(),
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        config,
    )
}

#[test]
fn structure_and_ids() {
    for len in [1, 2, 3, 7, 40, 257] {
        let tree = sah_build(random_soup(len, len as u64), &BuildConfig::default()).unwrap();
        tree.assert_well_formed();

        assert_eq!(tree.num_leaves(), tree.num_branches() + 1);
        assert_eq!(tree.leaves().count(), tree.num_leaves());
        assert_eq!(tree.leaves().map(|l| l.primitives.len()).sum::<usize>(), len);

        // Left-first builds number nodes in prefix order.
        for (k, branch) in tree.branches().enumerate() {
            assert_eq!(branch.content.id, k);
        }
        for (k, leaf) in tree.leaves().enumerate() {
            assert_eq!(leaf.id, k);
        }
    }
}

#[test]
fn branches_are_tight_unions() {
    let tree = sah_build(random_soup(100, 3), &BuildConfig::default()).unwrap();

    for branch in tree.branches() {
        let union = *branch.left.bbox() | *branch.right.bbox();
        assert_eq!(branch.content.bbox, union);
    }
}

#[test]
fn unit_square() {
    let triangles = vec![
        Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
        ),
        Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ),
    ];
    let tree = sah_build(triangles, &BuildConfig::default()).unwrap();

    assert_eq!(tree.num_branches(), 1);
    assert_eq!(tree.num_leaves(), 2);
    assert!(tree.leaves().all(|l| l.primitives.len() == 1));
    assert_eq!(
        *tree.root.bbox(),
        Box3::from_corners(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 0.0))
    );
}

#[test]
fn empty_input_and_invalid_config() {
    assert_eq!(
        sah_build(vec![], &BuildConfig::default()),
        Err(BuildError::EmptyInput)
    );

    let config = BuildConfig {
        mandatory_leaf_size: 0,
        ..BuildConfig::default()
    };
    assert_eq!(
        sah_build(generators::unit_cube(), &config),
        Err(BuildError::InvalidLeafSize(0))
    );
}

#[test]
fn mandatory_leaf_size_is_honored() {
    let config = BuildConfig {
        mandatory_leaf_size: 4,
        ..BuildConfig::default()
    };
    let tree = sah_build(random_soup(200, 11), &config).unwrap();

    for node in tree.prefix_nodes() {
        let count: usize = subtree_leaves(node).map(|l| l.primitives.len()).sum();
        if node.is_leaf() {
            assert!(count <= 4);
        } else {
            assert!(count > 4);
        }
    }
}

#[test]
fn degenerate_ranges() {
    let tri = Triangle::new(
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
    );
    let stack = vec![tri; 9];

    let split = sah_build(stack.clone(), &BuildConfig::default()).unwrap();
    assert_eq!(split.num_leaves(), 9);
    split.assert_well_formed();

    let config = BuildConfig {
        split_degenerate_nodes: false,
        ..BuildConfig::default()
    };
    let kept = sah_build(stack, &config).unwrap();
    assert_eq!(kept.num_leaves(), 1);
    assert_eq!(kept.root.as_leaf().unwrap().primitives.len(), 9);
}

#[test]
fn sah_never_exceeds_the_single_leaf_cost() {
    let triangles = random_soup(300, 5);
    let tree = sah_build(triangles.clone(), &BuildConfig::default()).unwrap();

    let leaf_cost = |area: Real, count: usize| area as f64 * (2.0 * count as f64 - 1.0);
    let root_area = tree.root.bbox().surface_area();
    let split_cost: f64 = tree
        .leaves()
        .map(|l| leaf_cost(l.bbox.surface_area(), l.primitives.len()))
        .sum();

    assert!(split_cost <= leaf_cost(root_area, triangles.len()));
}

#[test]
fn binary_round_trip() {
    let tree = sah_build(generators::sphere(Point::origin(), 2.0, 12, 8), &BuildConfig::default())
        .unwrap();

    let mut bytes = vec![];
    write_bvh(&mut bytes, &tree).unwrap();
    let read = read_bvh(&mut &bytes[..]).unwrap();

    assert_eq!(read.num_branches(), tree.num_branches());
    assert_eq!(read.num_leaves(), tree.num_leaves());
    for (a, b) in tree.prefix_nodes().zip(read.prefix_nodes()) {
        assert_eq!(a.bbox(), b.bbox());
        assert_eq!(
            a.as_leaf().map(|l| &l.primitives),
            b.as_leaf().map(|l| &l.primitives)
        );
    }
}

/// Checks every split made by the builder, and optionally builds right
/// children first.
struct SplitChecker {
    left_first: bool,
    splits: usize,
}

impl SplitEvaluator<BoundAndCount> for SplitChecker {
    type Transition = ();
    type State = (usize, usize);
    type Memo = ();
    type BranchData = ();

    fn initial_transition(&self) {}

    fn begin_evaluations(
        &mut self,
        _: &BuildTriangles,
        start: usize,
        end: usize,
        _: &Box3,
        _: (),
        _: bool,
    ) -> (usize, usize) {
        (start, end)
    }

    fn evaluate(
        &mut self,
        _: &(usize, usize),
        _: &BuildTriangles,
        candidate: SplitCandidate<'_, BoundAndCount>,
    ) -> EvalResult<()> {
        let cost = candidate.left.bounds.surface_area() as f64 * candidate.left.count as f64
            + candidate.right.bounds.surface_area() as f64 * candidate.right.count as f64;
        EvalResult::new(cost, (), self.left_first)
    }

    fn finish_evaluations(
        &mut self,
        (start, end): (usize, usize),
        triangles: &BuildTriangles,
        selected: EvalResult<()>,
        candidate: SplitCandidate<'_, BoundAndCount>,
    ) -> BuildReport<(), ()> {
        let sides: Vec<bool> = triangles
            .range(start, end)
            .map(|t| candidate.filter.is_left(t))
            .collect();
        let cut = sides.iter().take_while(|l| **l).count();

        assert!(cut > 0 && cut < sides.len(), "one side is empty");
        assert!(sides[cut..].iter().all(|l| !l), "the range is not partitioned");
        assert_eq!(cut, candidate.left.count);

        self.splits += 1;
        BuildReport {
            branch: (),
            build_left_first: selected.build_left_first,
            left: (),
            right: (),
        }
    }
}

#[test]
fn ranges_are_partitioned_by_the_winning_split() {
    let mut tris = BuildTriangles::new(random_soup(150, 8));
    let mut checker = SplitChecker {
        left_first: true,
        splits: 0,
    };
    let tree = build(
        &mut tris,
        &mut checker,
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap();
    assert_eq!(checker.splits, tree.num_branches());
}

#[test]
fn ids_follow_the_build_order() {
    let mut tris = BuildTriangles::new(generators::unit_cube());
    let mut checker = SplitChecker {
        left_first: false,
        splits: 0,
    };
    let tree = build(
        &mut tris,
        &mut checker,
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap();
    tree.assert_well_formed();

    // Right subtrees are built, and numbered, first.
    let root = tree.root.as_branch().unwrap();
    assert_eq!(root.content.id(), 0);
    let right_max = subtree_leaves(&root.right).map(|l| l.id).max();
    let left_min = subtree_leaves(&root.left).map(|l| l.id).min();
    assert!(right_max < left_min);
}
