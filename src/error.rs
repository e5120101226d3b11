//! Error types for the pool's one fallible path: constructor failure.
//!
//! Exhaustion is deliberately not an error here (see `Pool::allocate_raw`'s
//! return type) — it is an expected outcome, not a failure.

use thiserror::Error;

/// The constructor supplied to [`crate::Pool::allocate_raw`] failed.
///
/// Carries the slot index that was claimed and then released again, so a
/// caller inspecting the error can still correlate it with diagnostics.
#[derive(Debug, Error)]
#[error("constructor failed while claiming slot {slot}: {source}")]
pub struct ConstructionError<E>
where
    E: std::error::Error + 'static,
{
    pub(crate) slot: usize,
    #[source]
    pub(crate) source: E,
}

impl<E> ConstructionError<E>
where
    E: std::error::Error + 'static,
{
    /// The slot index that was claimed for the failed construction attempt
    /// and has already been returned to the free state.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The underlying error returned by the constructor.
    pub fn into_source(self) -> E {
        self.source
    }
}
