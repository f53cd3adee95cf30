//! Error types for the protocol layer.
//!
//! Each QuizArena crate defines its own error enum. A `ProtocolError`
//! always means a record or config document could not be converted to
//! or from bytes, never a game-rule violation.

/// Errors that can occur while encoding or decoding.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or a
    /// document written by an incompatible version.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The bytes decoded fine but violate a documented rule, e.g. a
    /// question with a correct-answer index outside its options.
    #[error("invalid document: {0}")]
    Invalid(String),
}
