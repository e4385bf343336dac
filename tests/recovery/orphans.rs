//! Orphan File Tests
//!
//! Files present on disk but absent from the index are left alone by
//! ordinary operations and removed only by an explicit sweep.

use crate::common::*;

#[test]
fn orphans_are_ignored_by_ordinary_operations() {
    let t = TestDir::new();
    let queue = t.queue();
    queue.enqueue(&s("a")).unwrap();
    std::fs::write(t.path().join("stray"), b"left over").unwrap();

    assert_eq!(queue.count().unwrap(), 1);
    assert_eq!(queue.to_vec().unwrap(), vec!["a"]);
    assert!(t.path().join("stray").exists());
}

#[test]
fn explicit_sweep_removes_orphans() {
    let t = TestDir::new();
    let queue = t.queue();
    queue.enqueue(&s("a")).unwrap();
    std::fs::write(t.path().join("stray"), b"left over").unwrap();

    let log = new_event_log();
    let sink = log.clone();
    queue.on_event(move |event| sink.lock().push(event.clone()));

    assert_eq!(queue.sweep_orphans().unwrap(), 1);
    assert_eq!(
        faults(&log),
        vec![Fault::OrphanDataFile {
            name: s("stray")
        }]
    );
    assert_dense_invariant(&t.path());
    assert_eq!(queue.sweep_orphans().unwrap(), 0);
}

#[test]
fn sweep_on_open() {
    let t = TestDir::new();
    {
        let queue = t.queue();
        queue.enqueue(&s("a")).unwrap();
    }
    std::fs::write(t.path().join("stray"), b"left over").unwrap();

    let config = CollectionConfig::default().with_sweep_orphans_on_open(true);
    let queue = PersistentQueue::<String>::open_with_config(t.path(), config).unwrap();
    assert!(!t.path().join("stray").exists());
    assert_eq!(queue.count().unwrap(), 1);
}
