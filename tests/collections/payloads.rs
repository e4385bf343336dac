//! Payload Codec Tests

use crate::common::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stowage::{json_payload, CollectionConfig, JsonCodec, PersistentQueue, TextCodec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Job {
    id: u32,
    name: String,
}

json_payload!(Job);

#[test]
fn serde_types_round_trip_as_json() {
    let t = TestDir::new();
    let queue = PersistentQueue::<Job>::open(t.path()).unwrap();
    let job = Job {
        id: 7,
        name: s("resize"),
    };
    let key = queue.enqueue(&job).unwrap();

    let on_disk: serde_json::Value =
        serde_json::from_slice(&std::fs::read(t.path().join(key.as_str())).unwrap()).unwrap();
    assert_eq!(on_disk["id"], 7);
    assert_eq!(queue.dequeue().unwrap(), job);
}

#[test]
fn explicit_codec_overrides_default() {
    let t = TestDir::new();
    let queue = PersistentQueue::<u32>::open_with_codec(
        t.path(),
        CollectionConfig::default(),
        Arc::new(JsonCodec::<u32>::new()),
    )
    .unwrap();
    queue.enqueue(&5).unwrap();
    assert_eq!(queue.peek().unwrap(), 5);
}

#[test]
fn json_text_codec_reads_plain_legacy_payloads() {
    let t = TestDir::new();
    {
        let plain = t.queue();
        plain.enqueue(&s("legacy")).unwrap();
    }

    let enveloped = PersistentQueue::<String>::open_with_codec(
        t.path(),
        CollectionConfig::default(),
        Arc::new(TextCodec::json()),
    )
    .unwrap();
    enveloped.enqueue(&s("modern")).unwrap();
    assert_eq!(enveloped.to_vec().unwrap(), vec!["legacy", "modern"]);
}

#[test]
fn structured_decode_failure_is_terminal_for_the_call() {
    let t = TestDir::new();
    {
        let text = t.queue();
        text.enqueue(&s("not json")).unwrap();
    }

    let numbers = PersistentQueue::<u64>::open(t.path()).unwrap();
    let err = numbers.dequeue().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert_eq!(numbers.count().unwrap(), 1);
}
