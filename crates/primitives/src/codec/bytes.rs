//! Raw byte codec (no transformation).
//!
//! Payloads of raw-byte type pass through unchanged, so a `Vec<u8>`
//! collection stores exactly the bytes it was given.

use super::traits::{CodecError, PayloadCodec};

/// Identity codec for `Vec<u8>` payloads.
///
/// # Example
///
/// ```
/// use stowage_primitives::codec::{BytesCodec, PayloadCodec};
///
/// let codec = BytesCodec;
/// let encoded = codec.encode(&b"hello world".to_vec()).unwrap();
/// assert_eq!(encoded, b"hello world");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl PayloadCodec<Vec<u8>> for BytesCodec {
    fn encode(&self, item: &Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(item.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.to_vec())
    }

    fn codec_id(&self) -> &str {
        "bytes"
    }
}
