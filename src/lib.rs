//! A fixed-capacity, lock-free object pool specialized to a single type `T`.
//!
//! [`Pool<T>`] pre-allocates storage for exactly `capacity` instances of `T`
//! and hands out slots via a CAS-based claim/release protocol over a slot
//! array, rather than a lock or a blocking queue. There is no growth path and
//! no waiting: exhaustion is reported immediately to the caller.
//!
//! Two allocation forms are provided:
//!
//! - [`Pool::allocate_scoped`] returns a [`PoolGuard`] that releases the slot
//!   (running `T`'s destructor) when dropped.
//! - [`Pool::allocate_raw`] returns a raw pointer the caller must release
//!   explicitly via [`Pool::release_raw`].
//!
//! # Example
//!
//! ```
//! use lockpool::Pool;
//!
//! let pool = Pool::<i32>::new(4);
//!
//! let mut guard = pool.allocate_scoped(|| Ok::<_, std::convert::Infallible>(7));
//! assert!(!guard.is_empty());
//! *guard = 8;
//! drop(guard);
//!
//! assert_eq!(pool.snapshot().used, 0);
//! ```
//!
//! # What this crate does not do
//!
//! It does not grow, shrink, or block. A pool that is out of slots returns an
//! empty guard (or a null pointer) immediately; it is up to the caller to
//! retry, back off, or fail. See [`registry`] for an optional per-type global
//! singleton built on top of this core.

mod error;
mod handle;
mod pool;
mod registry;
mod slot;
mod stats;

pub use error::ConstructionError;
pub use handle::PoolGuard;
pub use pool::{Pool, SPURIOUS_RETRY_LIMIT};
pub use stats::PoolStats;
