//! The fixed, never-reallocated backing storage for a [`crate::Pool`].

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::AtomicBool;

/// One slot: raw storage for exactly one `T`, plus its occupancy bit.
///
/// `#[repr(C)]` pins `storage` at offset 0 so that the address of a slot
/// and the address of the `T` it holds coincide — required for the
/// pointer-subtraction trick `Pool::index_of` uses to recover a slot index
/// from a raw pointer handed back via `release_raw`.
#[repr(C)]
pub(crate) struct Slot<T> {
    storage: UnsafeCell<MaybeUninit<T>>,
    occupied: AtomicBool,
}

// SAFETY: a `Slot<T>`'s storage is only read or written while its `occupied`
// flag is held by exactly one claimer (enforced by `Pool`'s claim/release
// protocol), so sharing `Slot<T>` across threads is sound whenever `T: Send`.
unsafe impl<T: Send> Sync for Slot<T> {}

impl<T> Slot<T> {
    pub(crate) fn new() -> Self {
        Slot {
            storage: UnsafeCell::new(MaybeUninit::uninit()),
            occupied: AtomicBool::new(false),
        }
    }

    pub(crate) fn occupied(&self) -> &AtomicBool {
        &self.occupied
    }

    /// Pointer to the slot's storage, valid to write/read as `T` only while
    /// the caller holds this slot claimed.
    pub(crate) fn data_ptr(&self) -> *mut T {
        self.storage.get().cast()
    }
}
