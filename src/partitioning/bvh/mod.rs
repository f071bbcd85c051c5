//! Bounding volume hierarchies over triangles: construction, traversal and
//! serialization.

pub use self::bvh_binned_build::{build, num_bins, BuildConfig, BuildError, MAX_BINS, MIN_BINS};
pub use self::bvh_build_triangles::{
    BoundAndCount, BoundsCountAggregator, BuildTriangle, BuildTriangles, CountedAggregate,
    TriangleAggregator,
};
pub use self::bvh_node_factory::{BvhNodeFactory, NodeFactory};
pub use self::bvh_serialization::{read_bvh, write_bvh};
pub use self::bvh_split_evaluator::{
    BuildReport, EvalResult, SplitCandidate, SplitEvaluator, SplitFilter,
};
pub use self::bvh_traverse::{
    FirstHitTraversal, InspectionCounter, OpCounter, OrderedDepthFirst, RayOrder,
    TraversalObserver,
};
pub use self::bvh_tree::{
    Bvh, BvhBranch, BvhLeaf, BvhNodeContent, HitRecord, KernelBranch, TriangleLeaf,
    MIN_HIT_DISTANCE,
};
pub use self::evaluators::{
    BlendedEvaluator, BlendedState, BrokenRay, CountWeighting, RayCostEvaluator, RaySamples,
    RayWindow, SahEvaluator, ShadowSamples, SrdhConfig, SrdhEvaluator, SrdhWindow,
    DEFAULT_ALPHA, DEFAULT_BLEND_WEIGHT,
};

pub mod evaluators;

mod bvh_binned_build;
mod bvh_build_triangles;
mod bvh_node_factory;
mod bvh_serialization;
mod bvh_split_evaluator;
mod bvh_traverse;
mod bvh_tree;
mod bvh_validation;

#[cfg(test)]
mod bvh_tests;
