//! Thread Safety Tests

use crate::common::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_pushes_are_all_kept() {
    let t = TestDir::new();
    let stack = Arc::new(t.stack());
    let threads = 8;
    let per_thread = 10;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|n| {
            let stack = Arc::clone(&stack);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    stack.push(&format!("{}-{}", n, i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stack.count().unwrap(), threads * per_thread);
    assert_dense_invariant(&t.path());
}

#[test]
fn concurrent_producers_and_consumers() {
    let t = TestDir::new();
    let queue = Arc::new(t.queue());
    let produced = 40;
    for i in 0..produced {
        queue.enqueue(&i.to_string()).unwrap();
    }

    let consumed = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let consumed = Arc::clone(&consumed);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(item) = queue.try_dequeue().unwrap() {
                    consumed.fetch_add(1, Ordering::SeqCst);
                    seen.push(item.parse::<usize>().unwrap());
                }
                seen
            })
        })
        .collect();

    let mut all: Vec<usize> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all.sort_unstable();

    assert_eq!(consumed.load(Ordering::SeqCst), produced);
    assert_eq!(all, (0..produced).collect::<Vec<_>>());
    assert!(queue.is_empty().unwrap());
    assert!(t.data_files().is_empty());
}

#[test]
fn each_consumer_sees_fifo_order() {
    let t = TestDir::new();
    let queue = Arc::new(t.queue());
    for i in 0..30 {
        queue.enqueue(&i.to_string()).unwrap();
    }

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(item) = queue.try_dequeue().unwrap() {
                    seen.push(item.parse::<usize>().unwrap());
                }
                seen
            })
        })
        .collect();

    for handle in handles {
        let seen = handle.join().unwrap();
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", seen);
    }
}

#[test]
fn hooks_run_outside_the_lock() {
    let t = TestDir::new();
    let list = Arc::new(t.list());
    let observed = new_event_log();

    let weak = Arc::downgrade(&list);
    let sink = observed.clone();
    list.on_event(move |event| {
        // Re-entering would deadlock if the lock were still held
        if let Some(list) = weak.upgrade() {
            let _ = list.count();
        }
        sink.lock().push(event.clone());
    });

    for item in ["a", "b", "c"] {
        list.add(&s(item)).unwrap();
    }
    list.remove_at(1).unwrap();

    let events = observed.lock().clone();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[3], CollectionEvent::Removed { order: 1, .. }));
}
