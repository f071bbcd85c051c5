use crate::math::Real;
use core::cmp::Ordering;
use ordered_float::OrderedFloat;

/// A value tagged with a cost, ordered so that a `BinaryHeap` pops the
/// *cheapest* entry first.
///
/// Entries of equal cost are ordered by `rank` (smaller first), then by
/// insertion `seq` (older first).
#[derive(Copy, Clone, Debug)]
pub struct WeightedValue<T> {
    /// The payload.
    pub value: T,
    /// The primary ordering key.
    pub cost: OrderedFloat<Real>,
    /// Tie-breaker between entries of equal cost.
    pub rank: u8,
    /// Insertion counter, last tie-breaker.
    pub seq: u32,
}

impl<T> WeightedValue<T> {
    /// Creates a new value packed with its cost and tie-breakers.
    #[inline]
    pub fn new(value: T, cost: Real, rank: u8, seq: u32) -> WeightedValue<T> {
        WeightedValue {
            value,
            cost: OrderedFloat(cost),
            rank,
            seq,
        }
    }

    #[inline]
    fn key(&self) -> (OrderedFloat<Real>, u8, u32) {
        (self.cost, self.rank, self.seq)
    }
}

impl<T> PartialEq for WeightedValue<T> {
    #[inline]
    fn eq(&self, other: &WeightedValue<T>) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for WeightedValue<T> {}

impl<T> PartialOrd for WeightedValue<T> {
    #[inline]
    fn partial_cmp(&self, other: &WeightedValue<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for WeightedValue<T> {
    #[inline]
    fn cmp(&self, other: &WeightedValue<T>) -> Ordering {
        // Reversed: the heap is a max-heap.
        other.key().cmp(&self.key())
    }
}
