//! Ordering Laws
//!
//! LIFO, FIFO, and random-access behavior, checked against the on-disk
//! dense-order invariant after every step.

use crate::common::*;

// ============================================================================
// LIFO
// ============================================================================

#[test]
fn lifo_pops_in_reverse_push_order() {
    let t = TestDir::new();
    let stack = t.stack();
    let items: Vec<String> = (0..10).map(|i| format!("p{}", i)).collect();
    for item in &items {
        stack.push(item).unwrap();
        assert_dense_invariant(&t.path());
    }

    for expected in items.iter().rev() {
        assert_eq!(&stack.pop().unwrap(), expected);
        assert_dense_invariant(&t.path());
    }
    assert!(stack.is_empty().unwrap());
}

#[test]
fn stack_top_is_order_zero_on_disk() {
    let t = TestDir::new();
    let stack = t.stack();
    stack.push(&s("bottom")).unwrap();
    let top = stack.push(&s("top")).unwrap();

    let entries = index_entries(&t.path());
    let top_order = entries
        .iter()
        .find(|(k, _)| k == top.as_str())
        .map(|(_, o)| *o);
    assert_eq!(top_order, Some(0));
}

// ============================================================================
// FIFO
// ============================================================================

#[test]
fn fifo_dequeues_in_enqueue_order() {
    let t = TestDir::new();
    let queue = t.queue();
    let items: Vec<String> = (0..10).map(|i| format!("e{}", i)).collect();
    for item in &items {
        queue.enqueue(item).unwrap();
    }

    for expected in &items {
        assert_eq!(&queue.dequeue().unwrap(), expected);
        assert_dense_invariant(&t.path());
    }
    assert!(matches!(queue.dequeue(), Err(StowageError::EmptyCollection)));
}

#[test]
fn interleaved_queue_operations_keep_order() {
    let t = TestDir::new();
    let queue = t.queue();
    queue.enqueue(&s("a")).unwrap();
    queue.enqueue(&s("b")).unwrap();
    assert_eq!(queue.dequeue().unwrap(), "a");
    queue.enqueue(&s("c")).unwrap();
    assert_eq!(queue.to_vec().unwrap(), vec!["b", "c"]);
    assert_dense_invariant(&t.path());
}

// ============================================================================
// Random access
// ============================================================================

#[test]
fn insert_then_index_returns_item() {
    let t = TestDir::new();
    let list = t.list();
    for item in ["a", "b", "c", "d"] {
        list.add(&s(item)).unwrap();
    }

    list.insert(2, &s("x")).unwrap();
    assert_eq!(list.get(2).unwrap(), "x");
    assert_eq!(list.get(3).unwrap(), "c");
    assert_eq!(list.get(4).unwrap(), "d");
    assert_dense_invariant(&t.path());
}

#[test]
fn remove_at_shifts_later_items_down() {
    let t = TestDir::new();
    let list = t.list();
    for item in ["a", "b", "c", "d"] {
        list.add(&s(item)).unwrap();
    }

    assert_eq!(list.remove_at(1).unwrap(), "b");
    assert_eq!(list.count().unwrap(), 3);
    assert_eq!(list.to_vec().unwrap(), vec!["a", "c", "d"]);
    assert_dense_invariant(&t.path());
}

#[test]
fn out_of_range_positions_are_invalid_arguments() {
    let t = TestDir::new();
    let list = t.list();
    list.add(&s("only")).unwrap();

    for err in [
        list.get(1).unwrap_err(),
        list.remove_at(7).unwrap_err(),
        list.set(1, &s("x")).unwrap_err(),
        list.insert(2, &s("x")).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
    assert_eq!(list.count().unwrap(), 1);
    assert_eq!(t.data_files().len(), 1);
}

#[test]
fn unknown_key_is_not_found() {
    let t = TestDir::new();
    let list = t.list();
    list.add(&s("a")).unwrap();
    let stranger = EntryKey::generate();

    assert_eq!(list.peek_by_key(&stranger).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(list.remove_by_key(&stranger).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(
        list.update_by_key(&stranger, &s("x")).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

// ============================================================================
// Update in place
// ============================================================================

#[test]
fn update_at_changes_only_that_payload() {
    let t = TestDir::new();
    let list = t.list();
    for item in ["a", "b", "c"] {
        list.add(&s(item)).unwrap();
    }
    let before = index_entries(&t.path());

    list.update_at(1, &s("B")).unwrap();

    assert_eq!(list.count().unwrap(), 3);
    assert_eq!(list.to_vec().unwrap(), vec!["a", "B", "c"]);
    let mut after = index_entries(&t.path());
    let mut before = before;
    after.sort();
    before.sort();
    assert_eq!(before, after);
}

#[test]
fn update_by_key_on_stack_keeps_top() {
    let t = TestDir::new();
    let stack = t.stack();
    let bottom = stack.push(&s("bottom")).unwrap();
    stack.push(&s("top")).unwrap();

    stack.update_by_key(&bottom, &s("BOTTOM")).unwrap();
    assert_eq!(stack.peek().unwrap(), "top");
    assert_eq!(stack.peek_at(1).unwrap(), "BOTTOM");
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn snapshot_ignores_later_mutations() {
    let t = TestDir::new();
    let queue = t.queue();
    queue.enqueue(&s("a")).unwrap();
    queue.enqueue(&s("b")).unwrap();

    let snap = queue.snapshot().unwrap();
    assert_eq!(queue.dequeue().unwrap(), "a");
    queue.enqueue(&s("c")).unwrap();
    queue.update_at(0, &s("B")).unwrap();

    assert_eq!(snap.len(), 2);
    assert_eq!(snap.to_vec().unwrap(), vec!["a", "b"]);
    assert_eq!(queue.to_vec().unwrap(), vec!["B", "c"]);
}

#[test]
fn snapshot_survives_clear_and_restarts() {
    let t = TestDir::new();
    let stack = t.stack();
    for item in ["x", "y", "z"] {
        stack.push(&s(item)).unwrap();
    }

    let snap = stack.snapshot().unwrap();
    stack.clear().unwrap();
    assert!(t.data_files().is_empty());

    let first: Vec<String> = snap.iter().map(Result::unwrap).collect();
    let second: Vec<String> = snap.iter().map(Result::unwrap).collect();
    assert_eq!(first, vec!["z", "y", "x"]);
    assert_eq!(first, second);
}
