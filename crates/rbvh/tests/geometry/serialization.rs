use crate::common::{random_rays, random_soup, sah_build};
use rbvh::cost::{apply_rtsah_ordering, FullCostMeasure, TraversalKernel};
use rbvh::format::FormatError;
use rbvh::partitioning::bvh::{read_bvh, write_bvh, FirstHitTraversal, RayOrder};
use rbvh::query::Segment;

#[test]
fn written_trees_answer_queries_identically() {
    let tree = apply_rtsah_ordering(&sah_build(random_soup(300, 31)));

    let mut bytes = vec![];
    write_bvh(&mut bytes, &tree).unwrap();
    let read = read_bvh(&mut &bytes[..]).unwrap();
    read.assert_well_formed();

    // Kernels are not stored: ordering the read tree recovers them.
    assert!(read.branches().all(|b| b.content.kernel == TraversalKernel::LeftFirst));
    let read = apply_rtsah_ordering(&read);

    assert_eq!(read.num_leaves(), tree.num_leaves());
    assert_eq!(read.num_branches(), tree.num_branches());
    for (a, b) in tree.branches().zip(read.branches()) {
        assert_eq!(a.content.bbox, b.content.bbox);
        assert_eq!(a.content.kernel, b.content.kernel);
    }

    for ray in random_rays(300, 32) {
        let a = RayOrder.first_hit(&tree, &ray).map(|h| h.t);
        let b = RayOrder.first_hit(&read, &ray).map(|h| h.t);
        assert_eq!(a, b);

        let segment = Segment::new(ray.origin, ray.dir);
        assert_eq!(
            FullCostMeasure::trace(&tree, &segment),
            FullCostMeasure::trace(&read, &segment)
        );
    }
}

#[test]
fn truncated_streams_are_rejected() {
    let tree = sah_build(random_soup(20, 33));
    let mut bytes = vec![];
    write_bvh(&mut bytes, &tree).unwrap();

    for len in [0, 4, bytes.len() / 2, bytes.len() - 1] {
        assert!(
            matches!(read_bvh(&mut &bytes[..len]), Err(FormatError::Io(_))),
            "truncation at {len} was accepted"
        );
    }
}
