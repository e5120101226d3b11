//! Concrete scenarios (S1-S6) transcribed from the design notes that seeded
//! the test suite.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use lockpool::{Pool, PoolStats};

fn ok<T>(value: T) -> Result<T, std::convert::Infallible> {
    Ok(value)
}

/// S1 (Basic).
#[test]
fn s1_basic() {
    let pool = Pool::<i32>::new(10);

    let p1 = pool.allocate_raw(|| ok(42)).unwrap();
    let p2 = pool.allocate_raw(|| ok(100)).unwrap();

    // SAFETY: both pointers were just allocated and not yet released.
    unsafe {
        assert_eq!(*p1, 42);
        assert_eq!(*p2, 100);
    }
    assert_ne!(p1, p2);

    pool.release_raw(p1);
    pool.release_raw(p2);

    assert_eq!(
        pool.snapshot(),
        PoolStats {
            total: 10,
            free: 10,
            used: 0,
            utilization_percent: 0.0,
        }
    );
}

/// S2 (Exhaustion & reuse).
#[test]
fn s2_exhaustion_and_reuse() {
    let pool = Pool::<i32>::new(3);

    let first = pool.allocate_scoped(|| ok(1));
    let second = pool.allocate_scoped(|| ok(2));
    let third = pool.allocate_scoped(|| ok(3));
    let fourth = pool.allocate_scoped(|| ok(4));
    assert!(fourth.is_empty());

    drop(first);
    let reused = pool.allocate_scoped(|| ok(5));
    assert!(!reused.is_empty());

    drop(second);
    drop(third);
    drop(reused);
}

/// S3 (Utilization).
#[test]
fn s3_utilization() {
    let pool = Pool::<i32>::new(10);
    let guards: Vec<_> = (0..5).map(|i| pool.allocate_scoped(|| ok(i))).collect();

    let snapshot = pool.snapshot();
    assert_eq!(snapshot.total, 10);
    assert_eq!(snapshot.used, 5);
    assert_eq!(snapshot.free, 5);
    assert!((snapshot.utilization_percent - 50.0).abs() < f64::EPSILON);

    drop(guards);
}

/// S4 (Exception safety).
#[test]
fn s4_exception_safety() {
    #[derive(Debug, thiserror::Error)]
    #[error("constructor refused to build 666")]
    struct Refused;

    fn build(explode: bool) -> Result<i32, Refused> {
        if explode {
            Err(Refused)
        } else {
            Ok(666)
        }
    }

    let pool = Pool::<i32>::new(10);

    let first = pool.allocate_raw(|| build(false)).unwrap();
    assert!(!first.is_null());

    let failure = pool.allocate_raw(|| build(true)).unwrap_err();
    assert!(failure.slot() < pool.capacity());

    let second = pool.allocate_raw(|| build(false)).unwrap();
    assert!(!second.is_null());

    pool.release_raw(first);
    pool.release_raw(second);
    assert_eq!(pool.snapshot().used, 0);
}

/// S5 (Concurrent churn).
#[test]
fn s5_concurrent_churn() {
    const THREADS: usize = 8;
    const OPS_PER_THREAD: usize = 100;
    const CAPACITY: usize = 1000;

    let pool = Arc::new(Pool::<i32>::new(CAPACITY));
    let successes = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let pool = Arc::clone(&pool);
            let successes = Arc::clone(&successes);
            thread::spawn(move || {
                for op in 0..OPS_PER_THREAD {
                    let mut guard = pool.allocate_scoped(|| ok(0));
                    if guard.is_empty() {
                        continue;
                    }
                    *guard = (thread_id * OPS_PER_THREAD + op) as i32;
                    successes.fetch_add(1, Ordering::Relaxed);
                    drop(guard);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let snapshot = pool.snapshot();
    assert_eq!(snapshot.used, 0);
    assert_eq!(snapshot.free, CAPACITY);

    let total = successes.load(Ordering::Relaxed);
    assert!(total > 0);
    assert!(total <= CAPACITY * THREADS * OPS_PER_THREAD);
}

/// S6 (Null-tolerance).
#[test]
fn s6_null_tolerance() {
    let pool = Pool::<i32>::new(4);
    let before = pool.snapshot();

    pool.release_raw(std::ptr::null_mut());
    assert_eq!(pool.snapshot(), before);

    let ptr = pool.allocate_raw(|| ok(7)).unwrap();
    assert!(!ptr.is_null());
    pool.release_raw(ptr);
}
