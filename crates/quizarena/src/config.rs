//! Engine configuration.

use quizarena_protocol::{Codec, JsonCodec, ProtocolError};
use serde::{Deserialize, Serialize};

/// Tunables for a [`BattleEngine`](crate::BattleEngine).
///
/// Missing fields in a JSON document fall back to the defaults, so a
/// deployment only spells out what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a direct invite stays actionable.
    ///
    /// Default: 300 seconds.
    pub invite_ttl_secs: u64,

    /// Length of generated private-room codes.
    pub invite_code_len: usize,

    /// Capacity of the room update broadcast channel. Subscribers that
    /// fall further behind than this skip ahead and see a lag error.
    pub update_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            invite_ttl_secs: 300,
            invite_code_len: 6,
            update_buffer: 64,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config document.
    pub fn from_json(data: &[u8]) -> Result<Self, ProtocolError> {
        let config: Self = JsonCodec.decode(data)?;
        if config.invite_code_len == 0 {
            return Err(ProtocolError::Invalid("invite_code_len must be at least 1".into()));
        }
        if config.update_buffer == 0 {
            return Err(ProtocolError::Invalid("update_buffer must be at least 1".into()));
        }
        Ok(config)
    }

    pub fn invite_ttl_ms(&self) -> u64 {
        self.invite_ttl_secs.saturating_mul(1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_partial_document_keeps_defaults() {
        let config = EngineConfig::from_json(br#"{"invite_ttl_secs": 60}"#).unwrap();
        assert_eq!(config.invite_ttl_secs, 60);
        assert_eq!(config.invite_code_len, 6);
        assert_eq!(config.invite_ttl_ms(), 60_000);
    }

    #[test]
    fn test_from_json_zero_buffer_is_invalid() {
        let err = EngineConfig::from_json(br#"{"update_buffer": 0}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Invalid(_)));
    }

    #[test]
    fn test_from_json_garbage_is_decode_error() {
        assert!(matches!(
            EngineConfig::from_json(b"ttl=5"),
            Err(ProtocolError::Decode(_))
        ));
    }
}
