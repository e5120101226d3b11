//! The diagnostic snapshot view over a pool's slot-availability.

use std::sync::atomic::Ordering;

use crate::slot::Slot;

/// A point-in-time view of slot availability.
///
/// Obtained by a relaxed scan of each slot's occupancy bit: the scan is not
/// linearizable, and concurrent activity may be reflected inconsistently
/// across slots. `free + used == total` holds by construction of the
/// snapshot (`used` is derived as `total - free`), not because either
/// number is itself a linearization point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    /// Total slot count — the pool's fixed capacity.
    pub total: usize,
    /// Slots observed free during the scan.
    pub free: usize,
    /// `total - free`.
    pub used: usize,
    /// `used / total * 100`, or `0.0` when `total == 0`.
    pub utilization_percent: f64,
}

impl PoolStats {
    pub(crate) fn scan<T>(slots: &[Slot<T>]) -> Self {
        let total = slots.len();
        let free = slots
            .iter()
            .filter(|slot| !slot.occupied().load(Ordering::Relaxed))
            .count();
        let used = total - free;
        let utilization_percent = if total == 0 {
            0.0
        } else {
            (used as f64 / total as f64) * 100.0
        };

        PoolStats {
            total,
            free,
            used,
            utilization_percent,
        }
    }
}
