//! Analytic visibility between the children of a branch.
//!
//! Lines crossing a box, weighted uniformly over position and direction, hit
//! a convex body inside it with a probability proportional to the surface
//! area of that body. The probability of hitting two disjoint bodies is the
//! area-weighted form factor between them, which for axis-aligned boxes is a
//! sum of closed-form face-to-face integrals.

use crate::bounding_volume::Box3;
use crate::math::{Point, Real, Vector};
use crate::query::Ray;
use crate::utils::ClosedInterval;
use std::f64::consts::PI;

/// The probabilities of the outcomes of a random line crossing the box of a
/// branch with respect to its two children.
///
/// `just_left`, `just_right`, `both` and `neither` are disjoint and sum to
/// one. `left` and `right` are the marginals `just_left + both` and
/// `just_right + both`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VisibilityReport {
    /// Probability of hitting the left box.
    pub left: f64,
    /// Probability of hitting the right box.
    pub right: f64,
    /// Probability of hitting the left box but not the right one.
    pub just_left: f64,
    /// Probability of hitting the right box but not the left one.
    pub just_right: f64,
    /// Probability of hitting both boxes.
    pub both: f64,
    /// Probability of hitting neither box.
    pub neither: f64,
}

impl VisibilityReport {
    /// Do the disjoint outcomes sum to one, and do the marginals agree with
    /// them, within `epsilon`?
    pub fn is_normalized(&self, epsilon: f64) -> bool {
        let total = self.just_left + self.just_right + self.both + self.neither;
        relative_eq!(total, 1.0, epsilon = epsilon)
            && relative_eq!(self.left, self.just_left + self.both, epsilon = epsilon)
            && relative_eq!(self.right, self.just_right + self.both, epsilon = epsilon)
    }
}

/// Computes the visibility of the boxes `left` and `right` for random lines
/// crossing `parent`.
///
/// Both boxes are expected to lie inside `parent`, which must have a non-zero
/// surface area.
pub fn visibility_report(parent: &Box3, left: &Box3, right: &Box3) -> VisibilityReport {
    let parent_area = parent.surface_area() as f64;
    let left_p = left.surface_area() as f64 / parent_area;
    let right_p = right.surface_area() as f64 / parent_area;
    let overlap = (*left & *right).surface_area() as f64;
    let both = (external_form_factor(left, right) + overlap) / parent_area;

    let just_left = left_p - both;
    let just_right = right_p - both;
    VisibilityReport {
        left: left_p,
        right: right_p,
        just_left,
        just_right,
        both,
        neither: 1.0 - both - just_left - just_right,
    }
}

/// The area-weighted form factor from the outside of `source` to the outside
/// of `sink`: the measure of lines, normalized like surface areas, meeting
/// both boxes outside of their intersection.
pub fn external_form_factor(source: &Box3, sink: &Box3) -> f64 {
    let (s, k) = (source, sink);
    per_axis([s.x(), s.y(), s.z()], [k.x(), k.y(), k.z()])
        + per_axis([s.y(), s.z(), s.x()], [k.y(), k.z(), k.x()])
        + per_axis([s.z(), s.x(), s.y()], [k.z(), k.x(), k.y()])
}

/// The form factors from the two faces of the source orthogonal to its
/// first axis.
fn per_axis(s: [ClosedInterval; 3], k: [ClosedInterval; 3]) -> f64 {
    let [s1, s2, s3] = s;
    let [k1, k2, k3] = k;

    let mut result = opposing(true, s1.max, s2, s3, k1.min, k2, k3)
        + opposing(false, s1.min, s2, s3, k1.max, k2, k3);

    let above_s2 = k2.greater_space() & s2;
    let below_s2 = k2.lesser_space() & s2;
    let above_s3 = k3.greater_space() & s3;
    let below_s3 = k3.lesser_space() & s3;

    for (end, space) in [(s1.max, s1.greater_space()), (s1.min, s1.lesser_space())] {
        let visible = space & k1;
        if visible.is_empty() {
            continue;
        }

        result += perpendicular(end, above_s2, s3, visible, k2.max, k3)
            + perpendicular(end, below_s2, s3, visible, k2.min, k3)
            + perpendicular(end, above_s3, s2, visible, k3.max, k2)
            + perpendicular(end, below_s3, s2, visible, k3.min, k2);
    }

    result
}

#[inline]
fn ends(interval: ClosedInterval) -> [f64; 2] {
    [interval.min as f64, interval.max as f64]
}

#[inline]
fn corner_sign(k: usize) -> f64 {
    if k % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Area-weighted form factor between two parallel rectangles facing each
/// other.
///
/// The source face lies at `source_plane` and spans `source_1 × source_2`;
/// the sink face lies at `sink_plane` and spans `sink_1 × sink_2`. The
/// source face emits along the positive axis if `positive_normal`.
fn opposing(
    positive_normal: bool,
    source_plane: Real,
    source_1: ClosedInterval,
    source_2: ClosedInterval,
    sink_plane: Real,
    sink_1: ClosedInterval,
    sink_2: ClosedInterval,
) -> f64 {
    if source_plane == sink_plane || positive_normal != (source_plane < sink_plane) {
        return 0.0;
    }
    if [source_1, source_2, sink_1, sink_2]
        .iter()
        .any(|i| i.size() == 0.0)
    {
        return 0.0;
    }

    let z = (source_plane as f64 - sink_plane as f64).abs();
    let mut sum = 0.0;

    for (i, u) in ends(source_1).into_iter().enumerate() {
        for (j, v) in ends(source_2).into_iter().enumerate() {
            for (k, x) in ends(sink_1).into_iter().enumerate() {
                for (l, y) in ends(sink_2).into_iter().enumerate() {
                    let a = (x - u) / z;
                    let b = (y - v) / z;
                    let sa = (1.0 + a * a).sqrt();
                    let sb = (1.0 + b * b).sqrt();
                    let h = b * sa * (b / sa).atan() + a * sb * (a / sb).atan()
                        - (1.0 + a * a + b * b).ln() / 2.0;
                    sum += corner_sign(i + j + k + l) * h;
                }
            }
        }
    }

    (z * z * sum / PI).abs()
}

/// Area-weighted form factor between two perpendicular rectangles.
///
/// The source face lies in the plane `axis_1 = source_plane` and spans
/// `source_2 × source_3`; the sink face lies in the plane
/// `axis_2 = sink_plane` and spans `sink_1 × sink_3`.
fn perpendicular(
    source_plane: Real,
    source_2: ClosedInterval,
    source_3: ClosedInterval,
    sink_1: ClosedInterval,
    sink_plane: Real,
    sink_3: ClosedInterval,
) -> f64 {
    if [source_2, source_3, sink_1, sink_3]
        .iter()
        .any(|i| i.size() == 0.0)
    {
        return 0.0;
    }

    let mut sum = 0.0;

    for (i, v) in ends(sink_3).into_iter().enumerate() {
        for (j, z) in ends(sink_1).into_iter().enumerate() {
            for (k, x) in ends(source_2).into_iter().enumerate() {
                for (l, y) in ends(source_3).into_iter().enumerate() {
                    let a = y - v;
                    let b = source_plane as f64 - z;
                    let c = x - sink_plane as f64;
                    if a == 0.0 && b == 0.0 && c == 0.0 {
                        continue;
                    }

                    let s = (c * c + b * b).sqrt();
                    let g = a * s * a.atan2(s)
                        + (a * a - b * b - c * c) * (a * a + b * b + c * c).ln() / 4.0;
                    sum += corner_sign(i + j + k + l) * g;
                }
            }
        }
    }

    (sum / PI).abs()
}

/// Samples a line entering `bbox` through its boundary, uniformly over
/// lines crossing the box.
///
/// The entry face is chosen proportionally to its area, the origin uniformly
/// on that face and the direction cosine-weighted around the inward normal.
pub fn random_internal_ray(bbox: &Box3, rng: &mut oorandom::Rand32) -> Ray {
    let phi = 2.0 * std::f32::consts::PI * rng.rand_float();
    let v = rng.rand_float();
    let cos_theta = v.sqrt();
    let sin_theta = (1.0 - v).sqrt();
    let (d1, d2) = (phi.cos() * sin_theta, phi.sin() * sin_theta);

    let extents = bbox.extents();
    let area_x = extents.y * extents.z;
    let area_y = extents.z * extents.x;
    let area_z = extents.x * extents.y;
    let face = (area_x + area_y + area_z) * rng.rand_float();

    let axis = if face <= area_x {
        0
    } else if face <= area_x + area_y {
        1
    } else {
        2
    };

    let range = bbox.axis(axis);
    let (plane, up) = if rng.rand_float() <= 0.5 {
        (range.min, cos_theta)
    } else {
        (range.max, -cos_theta)
    };

    let (origin, dir) = match axis {
        0 => (
            Point::new(
                plane,
                bbox.y().uniform_sample(rng.rand_float()),
                bbox.z().uniform_sample(rng.rand_float()),
            ),
            Vector::new(up, d1, d2),
        ),
        1 => (
            Point::new(
                bbox.x().uniform_sample(rng.rand_float()),
                plane,
                bbox.z().uniform_sample(rng.rand_float()),
            ),
            Vector::new(d1, up, d2),
        ),
        _ => (
            Point::new(
                bbox.x().uniform_sample(rng.rand_float()),
                bbox.y().uniform_sample(rng.rand_float()),
                plane,
            ),
            Vector::new(d1, d2, up),
        ),
    };

    Ray::new(origin, dir)
}
