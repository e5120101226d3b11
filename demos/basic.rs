//! Walks through both allocation forms on a small pool and prints a
//! diagnostic snapshot after each step.
//!
//! Run with: cargo run --example basic

use lockpool::Pool;

#[derive(Debug)]
struct Frame {
    id: u32,
    payload: Vec<u8>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let pool = Pool::<Frame>::new(4);
    println!("created pool: {:?}", pool.snapshot());

    // Scoped form: the slot is released automatically when the guard drops.
    {
        let mut guard = pool.allocate_scoped(|| {
            Ok::<_, std::convert::Infallible>(Frame {
                id: 1,
                payload: vec![0u8; 64],
            })
        });
        guard.payload[0] = 0xFF;
        println!("after scoped allocation: {:?}", pool.snapshot());
    }
    println!("after scoped guard dropped: {:?}", pool.snapshot());

    // Raw form: the caller owns the pointer until it calls release_raw.
    let ptr = pool
        .allocate_raw(|| {
            Ok::<_, std::convert::Infallible>(Frame {
                id: 2,
                payload: vec![0u8; 64],
            })
        })
        .expect("constructor is infallible here");
    assert!(!ptr.is_null());
    println!("after raw allocation: {:?}", pool.snapshot());

    // SAFETY: `ptr` came from `allocate_raw` on this pool and has not been
    // released yet.
    unsafe {
        println!("raw frame id: {}", (*ptr).id);
    }
    pool.release_raw(ptr);
    println!("after raw release: {:?}", pool.snapshot());

    // Exhaust the pool and observe an empty guard rather than a block.
    let guards: Vec<_> = (0..pool.capacity())
        .map(|id| {
            pool.allocate_scoped(move || {
                Ok::<_, std::convert::Infallible>(Frame {
                    id: id as u32,
                    payload: Vec::new(),
                })
            })
        })
        .collect();
    println!("after filling the pool: {:?}", pool.snapshot());

    let overflow = pool.allocate_scoped(|| {
        Ok::<_, std::convert::Infallible>(Frame {
            id: 99,
            payload: Vec::new(),
        })
    });
    assert!(overflow.is_empty(), "pool is full; allocation should report empty");
    println!("overflow allocation reported empty, as expected");

    drop(guards);
    println!("final snapshot: {:?}", pool.snapshot());
}
