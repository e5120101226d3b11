//! The lock-free claim/release protocol and the pool's public API.

use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::error::ConstructionError;
use crate::handle::PoolGuard;
use crate::slot::Slot;
use crate::stats::PoolStats;

/// Number of times `claim` retries a spurious (weak-CAS) failure on the same
/// slot before moving on to the next candidate index.
///
/// Exposed per the recommendation that implementations "SHOULD expose a
/// single symbolic constant controlling the spurious-CAS retry cap".
pub const SPURIOUS_RETRY_LIMIT: u8 = 3;

/// A cache-line-isolated value.
///
/// Keeps `Pool::hint` off the cache line(s) touched by slot-occupancy
/// traffic, per the false-sharing note in the concurrency model: the hint
/// is advisory and must not be perturbed by — nor perturb — the hot
/// claim/release path.
#[repr(align(64))]
struct CachePadded<T>(T);

/// A fixed-capacity, lock-free object pool specialized to one concrete `T`.
///
/// The pool is created with a capacity that never changes; storage for all
/// slots is allocated once, up front, and slot addresses never move for the
/// lifetime of the pool.
pub struct Pool<T> {
    slots: Box<[Slot<T>]>,
    hint: CachePadded<AtomicUsize>,
    capacity: usize,
}

// SAFETY: `Pool<T>` only exposes `T` through slots that are exclusively
// owned by whichever caller last won the claim CAS on them (enforced by the
// occupancy protocol below), so sharing the pool across threads is sound
// whenever `T: Send`. No `Sync` requirement on `T` is needed because two
// threads never observe the same live `T` at once.
unsafe impl<T: Send> Sync for Pool<T> {}
unsafe impl<T: Send> Send for Pool<T> {}

impl<T> Pool<T> {
    /// Creates a new pool with `capacity` pre-allocated, empty slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Pool capacity must be > 0");

        let slots = (0..capacity).map(|_| Slot::new()).collect::<Vec<_>>().into_boxed_slice();

        debug!(capacity, "Pool created");

        Pool {
            slots,
            hint: CachePadded(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// Total number of slots in the pool. Fixed for the pool's lifetime.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A point-in-time, eventually-consistent view of slot availability.
    #[must_use]
    pub fn snapshot(&self) -> PoolStats {
        PoolStats::scan(&self.slots)
    }

    /// Forces the claim hint to `index` (wrapped into `[0, capacity)`).
    ///
    /// The hint is purely advisory — every other property must hold no
    /// matter where the next probe starts — so this exists only to let
    /// tests perturb it mid-run and confirm that. Debug-only because
    /// production code has no legitimate reason to second-guess the
    /// hint's natural progression.
    #[cfg(debug_assertions)]
    pub fn debug_set_hint(&self, index: usize) {
        self.hint.0.store(index % self.capacity, Ordering::Relaxed);
    }

    /// Allocates a `T`, returning an owning [`PoolGuard`].
    ///
    /// Returns an empty guard if the pool is exhausted, or if `ctor` fails —
    /// the scoped form never surfaces the constructor's error to the caller.
    pub fn allocate_scoped<F, E>(&self, ctor: F) -> PoolGuard<'_, T>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let Some(idx) = self.claim() else {
            return PoolGuard::empty();
        };

        let data_ptr = self.slots[idx].data_ptr();
        match ctor() {
            Ok(value) => {
                // SAFETY: we hold this slot exclusively claimed, and its
                // storage is uninitialized (nothing has written here since
                // the last release, by invariant I1).
                unsafe { data_ptr.write(value) };
                PoolGuard::occupied(self, idx, data_ptr)
            }
            Err(_) => {
                self.release(idx);
                PoolGuard::empty()
            }
        }
    }

    /// Allocates a `T`, returning a raw pointer into the pool's storage.
    ///
    /// - Returns `Ok(ptr::null_mut())` if the pool is exhausted.
    /// - Returns `Err` if `ctor` fails; the claimed slot is returned to the
    ///   free state before the error is propagated.
    /// - Otherwise returns `Ok(ptr)` pointing at a fully constructed `T`.
    ///
    /// The caller owns the pointee until it calls [`Pool::release_raw`] on
    /// the returned pointer.
    pub fn allocate_raw<F, E>(&self, ctor: F) -> Result<*mut T, ConstructionError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        E: std::error::Error + 'static,
    {
        let Some(idx) = self.claim() else {
            return Ok(ptr::null_mut());
        };

        let data_ptr = self.slots[idx].data_ptr();
        match ctor() {
            Ok(value) => {
                // SAFETY: see `allocate_scoped`.
                unsafe { data_ptr.write(value) };
                Ok(data_ptr)
            }
            Err(source) => {
                self.release(idx);
                Err(ConstructionError { slot: idx, source })
            }
        }
    }

    /// Returns a pointer previously returned by [`Pool::allocate_raw`] on
    /// *this* pool. A null pointer is accepted as a no-op.
    ///
    /// # Safety contract
    ///
    /// `ptr` must either be null or have come from a prior successful
    /// `allocate_raw` call on this same pool, not yet released. Passing a
    /// pointer from another pool, releasing twice, or releasing a pointer
    /// still referenced elsewhere is undefined behavior; debug builds check
    /// the recovered index is in range.
    pub fn release_raw(&self, ptr: *mut T) {
        if ptr.is_null() {
            return;
        }

        let idx = self.index_of(ptr);
        // SAFETY: caller contract guarantees `ptr` points at a live `T`
        // owned by this pool that has not yet been released.
        unsafe { ptr::drop_in_place(ptr) };
        self.release(idx);
    }

    /// Claims one free slot, returning its index.
    ///
    /// Implements the linear-probe-from-hint protocol: starts at the
    /// (advisory, relaxed) hint, and for each candidate index attempts a
    /// `false -> true` CAS on its occupancy flag with acquire-release
    /// success / relaxed failure ordering. A CAS failure that observed
    /// `true` means the slot is genuinely taken and probing advances; a
    /// failure that observed `false` is a spurious weak-CAS failure and is
    /// retried on the same index up to `SPURIOUS_RETRY_LIMIT` times before
    /// advancing. Returns `None` once every slot has been probed.
    fn claim(&self) -> Option<usize> {
        let start = self.hint.0.load(Ordering::Relaxed);

        for k in 0..self.capacity {
            let i = (start + k) % self.capacity;
            let occupied = self.slots[i].occupied();

            let mut attempts = 0u8;
            loop {
                match occupied.compare_exchange_weak(
                    false,
                    true,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        self.hint.0.store((i + 1) % self.capacity, Ordering::Relaxed);
                        return Some(i);
                    }
                    // Genuinely occupied: move on to the next candidate.
                    Err(true) => break,
                    // Spurious weak-CAS failure: retry the same slot.
                    Err(false) => {
                        attempts += 1;
                        if attempts >= SPURIOUS_RETRY_LIMIT {
                            break;
                        }
                    }
                }
            }
        }

        None
    }

    /// Transitions slot `idx` back to free.
    ///
    /// The release-ordered store pairs with the acquire half of a future
    /// `claim`'s successful CAS: every write this thread made to the slot's
    /// storage (including a destructor's reads) happens-before whatever the
    /// next claimer does with the slot.
    fn release(&self, idx: usize) {
        self.slots[idx].occupied().store(false, Ordering::Release);
    }

    /// Releases a slot whose destructor has already run. Used by
    /// [`crate::handle::PoolGuard::drop`], which destroys its value itself
    /// before handing the index back.
    pub(crate) fn release_claimed(&self, idx: usize) {
        self.release(idx);
    }

    /// Recovers a slot index from a pointer into this pool's storage by
    /// subtracting against the base of the (contiguous) slot array.
    fn index_of(&self, ptr: *mut T) -> usize {
        let base = self.slots.as_ptr() as usize;
        let byte_offset = (ptr as usize).wrapping_sub(base);
        let idx = byte_offset / mem::size_of::<Slot<T>>();

        debug_assert!(
            idx < self.capacity,
            "release_raw: pointer {ptr:p} does not belong to this pool (capacity {})",
            self.capacity
        );

        idx
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        // Contract violation, not a normal outcome: the spec requires that
        // no live guard or raw pointer outlive the pool. We can only check
        // this cheaply (a relaxed scan), so it's debug-only.
        if cfg!(debug_assertions) {
            let used = self
                .slots
                .iter()
                .filter(|slot| slot.occupied().load(Ordering::Relaxed))
                .count();
            debug_assert_eq!(
                used, 0,
                "Pool dropped with {used} slot(s) still occupied; a PoolGuard or \
                 raw pointer outlived the pool"
            );
        }
    }
}
