//! Persistence Tests
//!
//! A new instance opened on a populated directory sees byte-identical
//! payloads in the same order.

use crate::common::*;
use stowage::{CollectionConfig, PersistentList};

#[test]
fn queue_round_trip_across_instances() {
    let t = TestDir::new();
    let items: Vec<String> = (0..20).map(|i| format!("job-{}", i)).collect();
    {
        let queue = t.queue();
        for item in &items {
            queue.enqueue(item).unwrap();
        }
    }

    let queue = t.queue();
    assert_eq!(queue.to_vec().unwrap(), items);
}

#[test]
fn list_edits_survive_reopen() {
    let t = TestDir::new();
    {
        let list = t.list();
        for item in ["a", "b", "c"] {
            list.add(&s(item)).unwrap();
        }
        list.insert(0, &s("first")).unwrap();
        list.set(3, &s("C")).unwrap();
        list.remove_at(1).unwrap();
    }

    let list = t.list();
    assert_eq!(list.to_vec().unwrap(), vec!["first", "b", "C"]);
    assert_dense_invariant(&t.path());
}

#[test]
fn raw_bytes_are_stored_verbatim() {
    let t = TestDir::new();
    let payload = vec![0u8, 159, 146, 150, 255];
    let key = {
        let list = PersistentList::<Vec<u8>>::open(t.path()).unwrap();
        list.add(&payload).unwrap()
    };

    let on_disk = std::fs::read(t.path().join(key.as_str())).unwrap();
    assert_eq!(on_disk, payload);

    let list = PersistentList::<Vec<u8>>::open(t.path()).unwrap();
    assert_eq!(list.get(0).unwrap(), payload);
}

#[test]
fn text_payloads_are_plain_files() {
    let t = TestDir::new();
    let stack = t.stack();
    let key = stack.push(&s("hello world")).unwrap();
    let on_disk = std::fs::read_to_string(t.path().join(key.as_str())).unwrap();
    assert_eq!(on_disk, "hello world");
}

#[test]
fn index_file_format() {
    let t = TestDir::new();
    let queue = t.queue();
    let first = queue.enqueue(&s("a")).unwrap();
    let second = queue.enqueue(&s("b")).unwrap();

    let mut lines: Vec<String> = t.index_text().lines().map(str::to_string).collect();
    lines.sort();
    let mut expected = vec![format!("{} 0", first), format!("{} 1", second)];
    expected.sort();
    assert_eq!(lines, expected);
}

#[test]
fn custom_index_file_name() {
    let t = TestDir::new();
    let config = CollectionConfig::default().with_index_file_name("order.idx");
    {
        let list = PersistentList::<String>::open_with_config(t.path(), config.clone()).unwrap();
        list.add(&s("x")).unwrap();
    }
    assert!(t.path().join("order.idx").exists());
    assert!(!t.path().join(".index").exists());

    let list = PersistentList::<String>::open_with_config(t.path(), config).unwrap();
    assert_eq!(list.to_vec().unwrap(), vec!["x"]);
}

#[test]
fn config_file_drives_open() {
    let t = TestDir::new();
    let config_path = t.dir.path().join(stowage::CONFIG_FILE_NAME);
    std::fs::write(&config_path, "clear_on_dispose = true\nsync_writes = true\n").unwrap();

    let config = CollectionConfig::from_file(&config_path).unwrap();
    let list = PersistentList::<String>::open_with_config(t.path(), config).unwrap();
    list.add(&s("temporary")).unwrap();
    list.dispose().unwrap();
    assert!(!t.path().exists());
}

#[test]
fn clear_on_dispose_off_keeps_directory() {
    let t = TestDir::new();
    let stack = t.stack();
    stack.push(&s("x")).unwrap();
    drop(stack);
    assert!(t.path().exists());
    assert_eq!(t.data_files().len(), 1);
}
