//! Codec trait and implementations for persisted documents.
//!
//! The store and config layers don't care HOW records become bytes;
//! they hold something that implements [`Codec`]. [`JsonCodec`] is the
//! default because persisted room documents stay human-readable.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode them back.
///
/// `Send + Sync + 'static` lets a codec live inside stores that are
/// shared across tokio tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Output is pretty-printed: the file store writes whole documents that
/// people open in an editor while debugging a stuck room.
///
/// ```rust
/// use quizarena_protocol::{Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&vec![RoomId(1), RoomId(2)]).unwrap();
/// let decoded: Vec<RoomId> = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, vec![RoomId(1), RoomId(2)]);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec_pretty(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::PlayerId;

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<PlayerId, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_wrong_shape_returns_error() {
        let result: Result<PlayerId, _> = JsonCodec.decode(br#"{"name": "hello"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_codec_encode_is_readable_json() {
        let bytes = JsonCodec.encode(&PlayerId(5)).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), "5");
    }
}
