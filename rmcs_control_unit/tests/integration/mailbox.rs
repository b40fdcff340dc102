//! Integration test: mailbox semantics under concurrent producers/consumers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use rmcs_control_unit::mailbox::{Mailbox, ReadCursor};

#[test]
fn reader_sees_monotonic_latest_values() {
    let mb = Arc::new(Mailbox::<u64>::new());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let mb = Arc::clone(&mb);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 1..=5_000u64 {
                mb.publish(i);
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut cursor = ReadCursor::default();
    let mut last = 0u64;
    while !done.load(Ordering::Acquire) {
        if let Some(v) = mb.recv_timeout(&mut cursor, Duration::from_millis(10)) {
            assert!(v > last, "went back from {last} to {v}");
            last = v;
        }
    }
    writer.join().unwrap();
    if let Some(v) = mb.try_recv(&mut cursor) {
        last = v;
    }
    assert_eq!(last, 5_000);
}

#[test]
fn independent_readers_each_get_the_write() {
    let mb = Arc::new(Mailbox::<u32>::new());
    let readers: Vec<_> = (0..3)
        .map(|_| {
            let mb = Arc::clone(&mb);
            thread::spawn(move || {
                let mut cursor = ReadCursor::default();
                mb.recv_timeout(&mut cursor, Duration::from_secs(2))
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    mb.publish(42);
    for r in readers {
        assert_eq!(r.join().unwrap(), Some(42));
    }
}

#[test]
fn timeout_is_honoured_without_writers() {
    let mb = Mailbox::<u8>::new();
    let mut cursor = ReadCursor::default();
    let start = Instant::now();
    assert_eq!(mb.recv_timeout(&mut cursor, Duration::from_millis(25)), None);
    assert!(start.elapsed() >= Duration::from_millis(25));
    assert!(!mb.is_fresh(Duration::from_secs(1)));
}

proptest! {
    #[test]
    fn only_the_last_write_is_delivered(values in prop::collection::vec(any::<i32>(), 1..50)) {
        let mb = Mailbox::new();
        let mut cursor = ReadCursor::default();
        for v in &values {
            mb.publish(*v);
        }
        prop_assert_eq!(mb.try_recv(&mut cursor), values.last().copied());
        prop_assert_eq!(mb.try_recv(&mut cursor), None);
        prop_assert_eq!(mb.seq(), values.len() as u64);
        prop_assert_eq!(mb.peek(), values.last().copied());
    }
}
