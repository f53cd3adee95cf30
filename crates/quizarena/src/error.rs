//! Unified error type for the QuizArena engine.

use quizarena_protocol::ProtocolError;
use quizarena_room::{BattleError, ErrorKind, ProviderError};
use quizarena_store::StoreError;

/// Top-level error that wraps every layer's error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// A room or invite rule rejected the operation.
    #[error(transparent)]
    Battle(#[from] BattleError),

    /// The store failed or a concurrent write won.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The question source failed; the room was left untouched.
    #[error(transparent)]
    Questions(#[from] ProviderError),

    /// Configuration could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ArenaError {
    /// Classifies this error for callers that only branch on the kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Battle(e) => e.kind(),
            Self::Store(StoreError::Conflict { .. }) => ErrorKind::Conflict,
            Self::Store(_) | Self::Questions(_) => ErrorKind::ExternalFailure,
            Self::Protocol(_) => ErrorKind::InvalidState,
        }
    }

    /// The domain error, if this is one.
    pub fn as_battle(&self) -> Option<&BattleError> {
        match self {
            Self::Battle(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use quizarena_protocol::RoomId;

    use super::*;

    #[test]
    fn test_from_battle_error_keeps_kind() {
        let err: ArenaError = BattleError::RoomFull(RoomId(1)).into();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(err.to_string(), "room R-1 is full");
        assert_eq!(err.as_battle(), Some(&BattleError::RoomFull(RoomId(1))));
    }

    #[test]
    fn test_from_store_conflict_is_conflict() {
        let err: ArenaError = StoreError::Conflict {
            room_id: RoomId(2),
            expected: Some(1),
            found: Some(2),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_from_provider_error_is_external_failure() {
        let err: ArenaError = ProviderError::Unavailable("down".into()).into();
        assert_eq!(err.kind(), ErrorKind::ExternalFailure);
        assert!(err.to_string().contains("down"));
    }
}
