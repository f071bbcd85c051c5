use core::cell::{Cell, RefCell};
use core::ops::{Deref, DerefMut};

/// A value that can be reset to a pristine state before being handed out again.
pub trait Recycle {
    /// Clears all the data held by `self`, keeping its allocation.
    fn recycle(&mut self);
}

impl<T> Recycle for Vec<T> {
    #[inline]
    fn recycle(&mut self) {
        self.clear();
    }
}

/// A pool of reusable scratch values.
///
/// Values are checked out with [`Pool::checkout`] and automatically returned,
/// cleared, when the returned guard is dropped. Checkouts may be nested: the
/// pool is shared by reference.
pub struct Pool<T, F = fn() -> T> {
    available: RefCell<Vec<T>>,
    factory: F,
    num_used: Cell<usize>,
    num_constructed: Cell<usize>,
}

impl<T: Recycle, F: Fn() -> T> Pool<T, F> {
    /// Creates an empty pool that builds new values with `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            available: RefCell::new(Vec::new()),
            factory,
            num_used: Cell::new(0),
            num_constructed: Cell::new(0),
        }
    }

    /// Takes a value out of the pool, constructing one if none is available.
    pub fn checkout(&self) -> PoolGuard<'_, T, F> {
        self.num_used.set(self.num_used.get() + 1);
        let recycled = self.available.borrow_mut().pop();
        let item = recycled.unwrap_or_else(|| {
            self.num_constructed.set(self.num_constructed.get() + 1);
            (self.factory)()
        });

        PoolGuard {
            pool: self,
            item: Some(item),
        }
    }

    /// The number of values currently checked out.
    pub fn num_used(&self) -> usize {
        self.num_used.get()
    }

    /// The number of values waiting in the pool.
    pub fn num_available(&self) -> usize {
        self.available.borrow().len()
    }

    /// How many times the factory has been invoked.
    pub fn num_constructed(&self) -> usize {
        self.num_constructed.get()
    }

    fn give_back(&self, mut item: T) {
        item.recycle();
        self.num_used.set(self.num_used.get() - 1);
        self.available.borrow_mut().push(item);
    }
}

/// A value checked out of a [`Pool`], returned to it on drop.
pub struct PoolGuard<'a, T: Recycle, F: Fn() -> T> {
    pool: &'a Pool<T, F>,
    item: Option<T>,
}

impl<T: Recycle, F: Fn() -> T> Deref for PoolGuard<'_, T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        // The item is only taken out in `drop`.
        match &self.item {
            Some(item) => item,
            None => unreachable!(),
        }
    }
}

impl<T: Recycle, F: Fn() -> T> DerefMut for PoolGuard<'_, T, F> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!(),
        }
    }
}

impl<T: Recycle, F: Fn() -> T> Drop for PoolGuard<'_, T, F> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.give_back(item);
        }
    }
}

#[cfg(test)]
mod test {
    use super::Pool;

    #[test]
    fn checkouts_are_recycled() {
        let pool = Pool::new(Vec::<u32>::new);

        {
            let mut a = pool.checkout();
            a.extend([1, 2, 3]);
            let b = pool.checkout();
            assert!(b.is_empty());
            assert_eq!(pool.num_used(), 2);
            assert_eq!(pool.num_constructed(), 2);
        }

        assert_eq!(pool.num_used(), 0);
        assert_eq!(pool.num_available(), 2);

        let c = pool.checkout();
        assert!(c.is_empty());
        assert_eq!(pool.num_constructed(), 2);
        assert_eq!(pool.num_available(), 1);
    }

    #[test]
    fn guards_are_returned_on_unwind() {
        let pool = Pool::new(Vec::<u32>::new);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = pool.checkout();
            guard.push(7);
            panic!("abort the measure");
        }));

        assert!(result.is_err());
        assert_eq!(pool.num_used(), 0);
        assert_eq!(pool.num_available(), 1);
    }
}
