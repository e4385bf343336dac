//! I/O Failure Tests
//!
//! A directory squatting on the index temp path makes every index rewrite
//! fail. The failed call must report `Io` and leave the collection as it was.

use crate::common::*;
use std::fs;
use stowage::CancellationToken;

fn block_index_rewrite(t: &TestDir) {
    fs::create_dir(t.path().join(".index.tmp")).expect("Failed to create blocker");
}

fn unblock_index_rewrite(t: &TestDir) {
    fs::remove_dir(t.path().join(".index.tmp")).expect("Failed to remove blocker");
}

#[test]
fn failed_insert_rolls_back_data_file() {
    let t = TestDir::new();
    let queue = t.queue();
    queue.enqueue(&s("a")).unwrap();
    let before = t.data_files();
    let index_before = t.index_text();

    block_index_rewrite(&t);
    let err = queue.enqueue(&s("b")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    assert_eq!(queue.count().unwrap(), 1);
    assert_eq!(t.data_files(), before);
    assert_eq!(t.index_text(), index_before);

    unblock_index_rewrite(&t);
    queue.enqueue(&s("c")).unwrap();
    assert_eq!(queue.to_vec().unwrap(), vec!["a", "c"]);
    assert_dense_invariant(&t.path());
}

#[test]
fn failed_removal_keeps_entry() {
    let t = TestDir::new();
    let stack = t.stack();
    stack.push(&s("a")).unwrap();
    stack.push(&s("b")).unwrap();

    block_index_rewrite(&t);
    let err = stack.pop().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(stack.count().unwrap(), 2);
    assert_eq!(t.data_files().len(), 2);

    unblock_index_rewrite(&t);
    assert_eq!(stack.pop().unwrap(), "b");
    assert_dense_invariant(&t.path());
}

#[test]
fn failed_insert_does_not_fire_added_event() {
    let t = TestDir::new();
    let list = t.list();
    let log = new_event_log();
    let sink = log.clone();
    list.on_event(move |event| sink.lock().push(event.clone()));

    block_index_rewrite(&t);
    assert!(list.add(&s("a")).is_err());
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn failed_async_insert_rolls_back_data_file() {
    let t = TestDir::new();
    let queue = t.queue();
    let cancel = CancellationToken::new();
    queue.enqueue_async(&s("a"), &cancel).await.unwrap();
    let before = t.data_files();

    block_index_rewrite(&t);
    let err = queue.enqueue_async(&s("b"), &cancel).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(queue.count_async(&cancel).await.unwrap(), 1);
    assert_eq!(t.data_files(), before);
}
