//! Worked Scenarios
//!
//! End-to-end walkthroughs of each collection kind.

use crate::common::*;

#[test]
fn stack_scenario() {
    let t = TestDir::new();
    let stack = t.stack();
    for item in ["A", "B", "C"] {
        stack.push(&s(item)).unwrap();
    }

    assert_eq!(stack.pop().unwrap(), "C");
    assert_eq!(stack.count().unwrap(), 2);
    assert_eq!(stack.pop().unwrap(), "B");
    assert_eq!(stack.pop().unwrap(), "A");
    let err = stack.pop().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyCollection);
}

#[test]
fn queue_scenario() {
    let t = TestDir::new();
    let queue = t.queue();
    queue.enqueue(&s("X")).unwrap();
    queue.enqueue(&s("Y")).unwrap();

    assert_eq!(queue.dequeue().unwrap(), "X");
    assert_eq!(queue.dequeue().unwrap(), "Y");
}

#[test]
fn list_scenario() {
    let t = TestDir::new();
    let list = t.list();
    for item in ["a", "b", "c"] {
        list.add(&s(item)).unwrap();
    }

    list.insert(1, &s("z")).unwrap();
    assert_eq!(list.to_vec().unwrap(), vec!["a", "z", "b", "c"]);

    list.remove_at(0).unwrap();
    assert_eq!(list.to_vec().unwrap(), vec!["z", "b", "c"]);
    assert_dense_invariant(&t.path());
}

#[test]
fn two_instances_same_directory() {
    let t = TestDir::new();
    {
        let first = t.stack();
        for item in ["one", "two", "three"] {
            first.push(&s(item)).unwrap();
        }
        first.dispose().unwrap();
    }

    let second = t.stack();
    assert_eq!(second.count().unwrap(), 3);
    assert_eq!(second.peek().unwrap(), "three");
}
