//! Room settings, battle modes, and the room lifecycle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fewest players a room needs before it can become [`RoomStatus::Ready`].
pub const MIN_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// BattleMode
// ---------------------------------------------------------------------------

/// How a battle is contested. The mode fixes the room's capacity and
/// whether players are split into teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleMode {
    #[serde(rename = "1v1")]
    OneVsOne,
    #[serde(rename = "2v2")]
    TwoVsTwo,
    #[serde(rename = "group")]
    Group,
}

impl BattleMode {
    /// Maximum players allowed in a room of this mode.
    pub fn max_players(self) -> usize {
        match self {
            Self::OneVsOne => 2,
            Self::TwoVsTwo => 4,
            Self::Group => 8,
        }
    }

    /// Returns `true` if players are partitioned into two teams.
    pub fn has_teams(self) -> bool {
        matches!(self, Self::TwoVsTwo | Self::Group)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneVsOne => "1v1",
            Self::TwoVsTwo => "2v2",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for BattleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Question difficulty a room draws its question set from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomSettings
// ---------------------------------------------------------------------------

/// Battle configuration, fixed when the room is created.
///
/// Missing fields in a JSON document fall back to [`RoomSettings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    /// How many questions a battle deals.
    pub questions_count: usize,

    /// Time budget per question in milliseconds. Answers faster than
    /// this earn a speed bonus.
    pub time_per_question_ms: u64,

    /// Difficulty the question pool is filtered by.
    pub difficulty: Difficulty,

    /// Presentation theme name. Opaque to the engine.
    pub theme: String,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            questions_count: 10,
            time_per_question_ms: 30_000,
            difficulty: Difficulty::Medium,
            theme: "classic".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a battle room.
///
/// ```text
/// Waiting → Ready → InProgress → Finished
///    └────────┴──────────┴─────→ Cancelled
/// ```
///
/// - **Waiting**: accepting players; readiness not yet aggregated.
/// - **Ready**: reached once at least [`MIN_PLAYERS`] members are all
///   ready. Edges only move forward, so a departure never sends the room
///   back to `Waiting`; [`BattleRoom::ensure_startable`](crate::BattleRoom::ensure_startable)
///   re-checks the aggregate instead.
/// - **InProgress**: questions dealt, answers being scored.
/// - **Finished**: every player finished; winner recorded. Terminal.
/// - **Cancelled**: creator left or the room emptied. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Ready,
    InProgress,
    Finished,
    Cancelled,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if no operation may mutate the room any more.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }

    /// Returns `true` if transitioning to `target` is a legal edge.
    pub fn can_transition_to(self, target: Self) -> bool {
        use RoomStatus::*;
        matches!(
            (self, target),
            (Waiting, Ready)
                | (Ready, InProgress)
                | (InProgress, Finished)
                | (Waiting | Ready | InProgress, Cancelled)
        )
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Ready => write!(f, "ready"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Finished => write!(f, "finished"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battle_mode_max_players() {
        assert_eq!(BattleMode::OneVsOne.max_players(), 2);
        assert_eq!(BattleMode::TwoVsTwo.max_players(), 4);
        assert_eq!(BattleMode::Group.max_players(), 8);
    }

    #[test]
    fn test_battle_mode_serializes_with_short_names() {
        let json = serde_json::to_string(&BattleMode::OneVsOne).unwrap();
        assert_eq!(json, "\"1v1\"");
        let mode: BattleMode = serde_json::from_str("\"group\"").unwrap();
        assert_eq!(mode, BattleMode::Group);
    }

    #[test]
    fn test_battle_mode_has_teams_only_for_team_modes() {
        assert!(!BattleMode::OneVsOne.has_teams());
        assert!(BattleMode::TwoVsTwo.has_teams());
        assert!(BattleMode::Group.has_teams());
    }

    #[test]
    fn test_room_status_can_transition_to() {
        assert!(RoomStatus::Waiting.can_transition_to(RoomStatus::Ready));
        assert!(RoomStatus::Ready.can_transition_to(RoomStatus::InProgress));
        assert!(RoomStatus::InProgress.can_transition_to(RoomStatus::Cancelled));
        assert!(!RoomStatus::Waiting.can_transition_to(RoomStatus::InProgress));
        assert!(!RoomStatus::InProgress.can_transition_to(RoomStatus::Ready));
        assert!(!RoomStatus::Ready.can_transition_to(RoomStatus::Waiting));
    }

    #[test]
    fn test_room_status_terminal_states_have_no_exits() {
        for terminal in [RoomStatus::Finished, RoomStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for target in [
                RoomStatus::Waiting,
                RoomStatus::Ready,
                RoomStatus::InProgress,
                RoomStatus::Finished,
                RoomStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn test_room_status_is_joinable() {
        assert!(RoomStatus::Waiting.is_joinable());
        assert!(!RoomStatus::Ready.is_joinable());
        assert!(!RoomStatus::InProgress.is_joinable());
        assert!(!RoomStatus::Cancelled.is_joinable());
    }

    #[test]
    fn test_room_status_serializes_snake_case() {
        let json = serde_json::to_string(&RoomStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(RoomStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_room_settings_default() {
        let settings = RoomSettings::default();
        assert_eq!(settings.questions_count, 10);
        assert_eq!(settings.time_per_question_ms, 30_000);
        assert_eq!(settings.difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_room_settings_missing_fields_use_defaults() {
        let settings: RoomSettings =
            serde_json::from_str(r#"{"questions_count": 3}"#).unwrap();
        assert_eq!(settings.questions_count, 3);
        assert_eq!(settings.time_per_question_ms, 30_000);
        assert_eq!(settings.theme, "classic");
    }
}
