//! Various unsorted geometrical and logical operators.

pub use self::interval::ClosedInterval;
pub use self::pool::{Pool, PoolGuard, Recycle};
pub(crate) use self::weighted_value::WeightedValue;

mod interval;
mod pool;
mod weighted_value;
