//! The scoped, RAII-owning handle returned by [`crate::Pool::allocate_scoped`].

use std::ops::{Deref, DerefMut};
use std::ptr;

use crate::pool::Pool;

/// A unique owning reference to one occupied slot.
///
/// Runs `T`'s destructor and releases the slot on every exit path —
/// normal drop, early return, or unwind. A guard obtained when the pool was
/// exhausted (or whose constructor failed) is *empty*: dropping it is a
/// no-op, and dereferencing it is a programmer error.
///
/// Not `Clone`. Movable like any Rust value; a moved-from guard no longer
/// exists (Rust's move semantics make "moved-from but still droppable"
/// handles, as in C++, structurally impossible here).
pub struct PoolGuard<'p, T> {
    // `None` encodes the empty state; `Some` carries the owning pool
    // reference used to release the slot on drop.
    pool: Option<&'p Pool<T>>,
    idx: usize,
    ptr: *mut T,
}

impl<'p, T> PoolGuard<'p, T> {
    pub(crate) fn occupied(pool: &'p Pool<T>, idx: usize, ptr: *mut T) -> Self {
        PoolGuard {
            pool: Some(pool),
            idx,
            ptr,
        }
    }

    pub(crate) fn empty() -> Self {
        PoolGuard {
            pool: None,
            idx: 0,
            ptr: ptr::null_mut(),
        }
    }

    /// Whether this guard holds no value — the pool was exhausted, or the
    /// constructor failed, when it was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_none()
    }

    /// Immutable access to the held value, or `None` if empty.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            // SAFETY: non-empty guards own an exclusively-claimed slot
            // holding a fully constructed `T` for the guard's lifetime.
            Some(unsafe { &*self.ptr })
        }
    }

    /// Mutable access to the held value, or `None` if empty.
    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            None
        } else {
            // SAFETY: see `get`; `&mut self` ensures no other reference
            // to this guard's value exists.
            Some(unsafe { &mut *self.ptr })
        }
    }
}

impl<T> Deref for PoolGuard<'_, T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the guard is empty. Check [`PoolGuard::is_empty`] first, or
    /// use [`PoolGuard::get`] for a fallible accessor.
    fn deref(&self) -> &T {
        self.get().expect("PoolGuard::deref called on an empty guard")
    }
}

impl<T> DerefMut for PoolGuard<'_, T> {
    /// # Panics
    ///
    /// Panics if the guard is empty. Check [`PoolGuard::is_empty`] first, or
    /// use [`PoolGuard::get_mut`] for a fallible accessor.
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut().expect("PoolGuard::deref_mut called on an empty guard")
    }
}

impl<T> Drop for PoolGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            // SAFETY: this guard exclusively owns its slot; the pointer is
            // a live `T` that hasn't been dropped yet.
            unsafe { ptr::drop_in_place(self.ptr) };
            pool.release_claimed(self.idx);
        }
    }
}

// SAFETY: a `PoolGuard` exclusively owns its slot's contents until dropped,
// so transferring that ownership to another thread is sound whenever
// `T: Send`.
unsafe impl<T: Send> Send for PoolGuard<'_, T> {}
unsafe impl<T: Sync> Sync for PoolGuard<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok<T>(value: T) -> Result<T, std::convert::Infallible> {
        Ok(value)
    }

    #[test]
    fn empty_guard_is_inert_on_drop() {
        let guard: PoolGuard<'_, i32> = PoolGuard::empty();
        assert!(guard.is_empty());
        drop(guard);
    }

    #[test]
    #[should_panic(expected = "empty guard")]
    fn deref_on_empty_guard_panics() {
        let guard: PoolGuard<'_, i32> = PoolGuard::empty();
        let _ = *guard;
    }

    #[test]
    fn drop_runs_destructor_exactly_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct Counted(Arc<AtomicUsize>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let count = Arc::new(AtomicUsize::new(0));
        let pool = Pool::<Counted>::new(1);
        let guard = pool.allocate_scoped(|| ok(Counted(Arc::clone(&count))));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        drop(guard);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
