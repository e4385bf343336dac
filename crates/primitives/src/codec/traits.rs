//! Payload codec trait definitions.

use stowage_core::StowageError;

/// Converts typed items to and from the raw bytes stored in a data file.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync`: one codec instance is shared by every
/// operation on a collection, sync and async alike.
///
/// # Codec Identity
///
/// Each codec reports a short identifier used in logs and error messages.
pub trait PayloadCodec<T>: Send + Sync {
    /// Encode an item into payload bytes.
    fn encode(&self, item: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode payload bytes back into an item.
    ///
    /// Returns an error if the bytes are not a valid encoding for this codec.
    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError>;

    /// Unique codec identifier.
    fn codec_id(&self) -> &str;
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Item could not be encoded.
    #[error("{codec} encode error: {message}")]
    Encode {
        /// Codec that failed
        codec: String,
        /// Underlying failure
        message: String,
    },

    /// Stored bytes could not be decoded.
    #[error("{codec} decode error: {message}")]
    Decode {
        /// Codec that failed
        codec: String,
        /// Underlying failure
        message: String,
    },
}

impl CodecError {
    /// Build an `Encode` error for `codec`
    pub fn encode(codec: &str, message: impl ToString) -> Self {
        CodecError::Encode {
            codec: codec.to_string(),
            message: message.to_string(),
        }
    }

    /// Build a `Decode` error for `codec`
    pub fn decode(codec: &str, message: impl ToString) -> Self {
        CodecError::Decode {
            codec: codec.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<CodecError> for StowageError {
    fn from(e: CodecError) -> Self {
        StowageError::Serialization(e.to_string())
    }
}
