use crate::common::{random_shadow_queries, random_soup, sah_build};
use rbvh::cost::{apply_rtsah_ordering, FullCostMeasure, TraversalKernel};

#[test]
fn ordering_is_idempotent() {
    let ordered = apply_rtsah_ordering(&sah_build(random_soup(300, 71)));
    assert_eq!(apply_rtsah_ordering(&ordered), ordered);
    assert!(ordered
        .branches()
        .any(|b| b.content.kernel == TraversalKernel::RightFirst));
}

#[test]
fn ordering_preserves_occlusion() {
    let tree = sah_build(random_soup(300, 72));
    let ordered = apply_rtsah_ordering(&tree);

    for query in random_shadow_queries(500, 73) {
        let a = FullCostMeasure::trace(&tree, &query.segment);
        let b = FullCostMeasure::trace(&ordered, &query.segment);
        assert_eq!(a.hits, b.hits);
        assert_eq!(a.cost.bbox_tests.variance, 0.0);
        assert_eq!(b.cost.bbox_tests.variance, 0.0);
    }
}
