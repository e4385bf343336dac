//! Text codec.
//!
//! Text payloads are stored as bare UTF-8 with no structured envelope, so the
//! data files of a `String` collection are readable plain text.
//!
//! `TextEnvelope::Json` stores text as a JSON string instead. Decoding in that
//! mode falls back to reading the bytes as plain UTF-8 when they are not a
//! JSON string, which lets a collection switch to the envelope without
//! rewriting payloads written before the switch.

use super::traits::{CodecError, PayloadCodec};

/// How text is laid out in a data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEnvelope {
    /// Bare UTF-8 bytes
    #[default]
    Plain,
    /// A JSON string document, with plain UTF-8 accepted on decode
    Json,
}

/// Codec for `String` payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec {
    envelope: TextEnvelope,
}

impl TextCodec {
    /// Plain UTF-8 codec (the default for `String` collections)
    pub fn plain() -> Self {
        TextCodec {
            envelope: TextEnvelope::Plain,
        }
    }

    /// JSON-string codec with plain-text fallback on decode
    pub fn json() -> Self {
        TextCodec {
            envelope: TextEnvelope::Json,
        }
    }

    /// Envelope in use
    pub fn envelope(&self) -> TextEnvelope {
        self.envelope
    }
}

impl PayloadCodec<String> for TextCodec {
    fn encode(&self, item: &String) -> Result<Vec<u8>, CodecError> {
        match self.envelope {
            TextEnvelope::Plain => Ok(item.as_bytes().to_vec()),
            TextEnvelope::Json => {
                serde_json::to_vec(item).map_err(|e| CodecError::encode(self.codec_id(), e))
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        if self.envelope == TextEnvelope::Json {
            if let Ok(text) = serde_json::from_slice::<String>(bytes) {
                return Ok(text);
            }
        }
        String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::decode(self.codec_id(), e))
    }

    fn codec_id(&self) -> &str {
        match self.envelope {
            TextEnvelope::Plain => "text",
            TextEnvelope::Json => "text+json",
        }
    }
}
