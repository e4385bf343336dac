//! Serialization boundary between typed items and payload bytes.
//!
//! Every collection owns one `PayloadCodec<T>`. The codec is picked from the
//! declared payload type when the collection is opened:
//!
//! - `Vec<u8>`: `BytesCodec`, bytes pass through unchanged
//! - `String`: `TextCodec`, bare UTF-8 without an envelope
//! - numbers, `bool`, `char`, `serde_json::Value`: `JsonCodec`
//!
//! Other serde types opt in with [`json_payload!`](crate::json_payload), or
//! are opened with an explicit codec via `Collection::open_with_codec`.
//!
//! # Usage
//!
//! ```ignore
//! use stowage_primitives::codec::{Payload, PayloadCodec};
//!
//! let codec = String::default_codec();
//! let bytes = codec.encode(&"hello".to_string())?;
//! assert_eq!(bytes, b"hello");
//! ```

mod bytes;
mod json;
mod text;
mod traits;

pub use bytes::BytesCodec;
pub use json::JsonCodec;
pub use text::{TextCodec, TextEnvelope};
pub use traits::{CodecError, PayloadCodec};

use std::sync::Arc;

/// Payload types with a default codec.
pub trait Payload: Sized + 'static {
    /// Codec used when a collection is opened without an explicit one
    fn default_codec() -> Arc<dyn PayloadCodec<Self>>;
}

impl Payload for String {
    fn default_codec() -> Arc<dyn PayloadCodec<Self>> {
        Arc::new(TextCodec::plain())
    }
}

impl Payload for Vec<u8> {
    fn default_codec() -> Arc<dyn PayloadCodec<Self>> {
        Arc::new(BytesCodec)
    }
}

/// Give serde types a JSON default codec.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Job { id: u32 }
///
/// stowage_primitives::json_payload!(Job);
/// let queue = PersistentQueue::<Job>::open(dir)?;
/// ```
#[macro_export]
macro_rules! json_payload {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::codec::Payload for $ty {
                fn default_codec() -> ::std::sync::Arc<dyn $crate::codec::PayloadCodec<Self>> {
                    ::std::sync::Arc::new($crate::codec::JsonCodec::<$ty>::new())
                }
            }
        )+
    };
}

json_payload!(
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    bool,
    char,
    serde_json::Value,
);
