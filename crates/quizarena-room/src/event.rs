//! Events emitted by room transitions.

use quizarena_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::BattleOutcome;

/// Why a room was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The room's creator left.
    CreatorLeft,
    /// The last player left.
    Empty,
}

/// Something that happened to a room as the result of one command.
///
/// `#[serde(tag = "type")]` gives the flat `{"type": "player_joined", ...}`
/// shape subscribers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    PlayerJoined { player_id: PlayerId, players: usize },
    PlayerLeft { player_id: PlayerId, players: usize },
    PlayerReady { player_id: PlayerId },
    /// Every member is ready; the battle may start.
    RoomReady,
    BattleStarted { questions: usize },
    AnswerRecorded {
        player_id: PlayerId,
        question_index: usize,
        is_correct: bool,
        points: u32,
        score: u32,
    },
    PlayerFinished { player_id: PlayerId, score: u32 },
    BattleFinished { outcome: Option<BattleOutcome> },
    RoomCancelled { reason: CancelReason },
}

impl RoomEvent {
    /// Returns `true` for events that end the room.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::BattleFinished { .. } | Self::RoomCancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_event_json_is_internally_tagged() {
        let event = RoomEvent::PlayerJoined { player_id: PlayerId(3), players: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "player_joined");
        assert_eq!(json["player_id"], 3);
        assert_eq!(json["players"], 2);
    }

    #[test]
    fn test_is_terminal() {
        assert!(RoomEvent::RoomCancelled { reason: CancelReason::Empty }.is_terminal());
        assert!(RoomEvent::BattleFinished { outcome: None }.is_terminal());
        assert!(!RoomEvent::RoomReady.is_terminal());
    }
}
