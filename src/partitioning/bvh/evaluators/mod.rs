//! Cost models scoring the candidate splits of the binned builder.

pub use self::blended::{BlendedEvaluator, BlendedState, DEFAULT_BLEND_WEIGHT};
pub use self::ray_cost::{RayCostEvaluator, RaySamples, RayWindow};
pub use self::sah::{CountWeighting, SahEvaluator, DEFAULT_ALPHA};
pub use self::srdh::{BrokenRay, ShadowSamples, SrdhConfig, SrdhEvaluator, SrdhWindow};

mod blended;
mod ray_cost;
mod sah;
mod srdh;

/// Moves the elements of `items` satisfying `pred` to the front and returns
/// their number.
///
/// Elements are inspected once, in order.
pub(crate) fn sweep_partition<T>(items: &mut [T], mut pred: impl FnMut(&T) -> bool) -> usize {
    let mut part = 0;
    for k in 0..items.len() {
        if pred(&items[k]) {
            if part != k {
                items.swap(part, k);
            }
            part += 1;
        }
    }
    part
}
