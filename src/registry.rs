//! Per-type global pool registry — a convenience collaborator built on top
//! of the core [`crate::Pool`]. The core has no knowledge of this module;
//! it is a standalone value with an explicit lifetime, as required.
//!
//! Declares one process-wide [`Pool<T>`](crate::Pool) per macro invocation,
//! lazily constructed on first use and never torn down — teardown ordering
//! against arbitrary user code is intractable, so this is a deliberate
//! design choice, not an oversight.

/// Declares a named, process-wide singleton pool for a concrete type.
///
/// ```
/// use lockpool::pool;
///
/// pool!(Widgets: i32 = 16);
///
/// let guard = Widgets::get().allocate_scoped(|| Ok::<_, std::convert::Infallible>(7));
/// assert_eq!(*guard, 7);
/// ```
#[macro_export]
macro_rules! pool {
    ($ident:ident : $ty:ty = $capacity:expr) => {
        /// Marker type naming a process-wide singleton pool.
        #[allow(missing_docs)]
        pub struct $ident;

        impl $ident {
            /// Returns the process-wide pool, constructing it with the
            /// declared capacity on first access.
            pub fn get() -> &'static $crate::Pool<$ty> {
                static POOL: ::std::sync::OnceLock<$crate::Pool<$ty>> =
                    ::std::sync::OnceLock::new();
                POOL.get_or_init(|| {
                    ::tracing::info!(
                        pool = stringify!($ident),
                        capacity = $capacity,
                        "initializing global pool singleton"
                    );
                    $crate::Pool::new($capacity)
                })
            }
        }
    };
}
