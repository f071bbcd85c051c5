//! Traversal kernels, analytic visibility and expected-cost measures.

pub use self::cost_histogram::{CostHistogram, HISTOGRAM_SEED, NUM_COST_BINS};
pub use self::full_cost::{FullCostMeasure, FullTraceResult, SpineSideCost};
pub use self::kernel::{left_is_closer, KernelFlags, TraversalKernel};
pub use self::oracle_cost::{OracleCost, OracleTraceResult};
pub use self::ordering::{
    apply_rtsah_ordering, rtsah_order, SubtreeCost, PRIMITIVE_COST, TRAVERSAL_COST,
};
pub use self::trace_cost::{RandomVariable, TraceCost, TraceResult};
pub use self::visibility::{
    external_form_factor, random_internal_ray, visibility_report, VisibilityReport,
};
pub use self::wide_cost::WideCostMeasure;

mod cost_histogram;
mod full_cost;
mod kernel;
mod oracle_cost;
mod ordering;
mod trace_cost;
mod visibility;
mod wide_cost;
