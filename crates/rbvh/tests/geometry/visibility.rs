use crate::common::{random_soup, sah_build};
use approx::assert_relative_eq;
use rbvh::cost::{random_internal_ray, visibility_report};

#[test]
fn reports_of_built_branches_are_normalized() {
    let tree = sah_build(random_soup(400, 21));

    for branch in tree.branches() {
        let report =
            visibility_report(&branch.content.bbox, branch.left.bbox(), branch.right.bbox());
        assert!(report.is_normalized(1.0e-6), "{report:?}");
        assert!(report.left >= 0.0 && report.left <= 1.0 + 1.0e-6);
        assert!(report.right >= 0.0 && report.right <= 1.0 + 1.0e-6);
    }
}

#[test]
fn marginals_follow_surface_area_ratios() {
    let tree = sah_build(random_soup(400, 22));
    let root = tree.root.as_branch().unwrap();
    let (parent, left, right) = (&root.content.bbox, root.left.bbox(), root.right.bbox());
    let report = visibility_report(parent, left, right);

    let mut rng = oorandom::Rand32::new(1234);
    let num_rays = 50_000;
    let (mut hits_left, mut hits_right) = (0, 0);
    for _ in 0..num_rays {
        let ray = random_internal_ray(parent, &mut rng);
        hits_left += left.intersects_line(&ray) as usize;
        hits_right += right.intersects_line(&ray) as usize;
    }

    assert_relative_eq!(hits_left as f64 / num_rays as f64, report.left, epsilon = 0.02);
    assert_relative_eq!(hits_right as f64 / num_rays as f64, report.right, epsilon = 0.02);
}
