//! Battle participants.

use quizarena_protocol::{Millis, PlayerId};
use serde::{Deserialize, Serialize};

/// Identity snapshot a player presents when joining.
///
/// Copied into the room at join time; later profile changes are not
/// synced into running rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub level: u32,
    pub xp: u64,
    pub avatar: String,
}

impl PlayerProfile {
    /// A level-1 profile with no avatar.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            level: 1,
            xp: 0,
            avatar: String::new(),
        }
    }
}

/// Per-player sub-state inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Waiting,
    Ready,
    Playing,
    Finished,
}

/// One scored answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selected_answer: usize,
    pub is_correct: bool,
    pub time_spent_ms: u64,
    /// Points this answer added to the player's score.
    pub points: u32,
}

/// A participant's state within one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePlayer {
    pub id: PlayerId,
    pub name: String,
    pub level: u32,
    pub xp: u64,
    pub avatar: String,
    pub status: PlayerStatus,
    /// Only ever increased, and only by answer submission.
    pub score: u32,
    /// In submission order, at most one entry per question index.
    pub answers: Vec<AnswerRecord>,
    pub joined_at: Millis,
    pub ready_at: Option<Millis>,
    pub finished_at: Option<Millis>,
}

impl BattlePlayer {
    pub(crate) fn from_profile(profile: PlayerProfile, now: Millis) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            level: profile.level,
            xp: profile.xp,
            avatar: profile.avatar,
            status: PlayerStatus::Waiting,
            score: 0,
            answers: Vec::new(),
            joined_at: now,
            ready_at: None,
            finished_at: None,
        }
    }

    pub fn has_answered(&self, question_index: usize) -> bool {
        self.answers.iter().any(|a| a.question_index == question_index)
    }

    /// Sum of time spent across every answer, used to break score ties.
    pub fn total_time_ms(&self) -> u64 {
        self.answers
            .iter()
            .fold(0u64, |total, a| total.saturating_add(a.time_spent_ms))
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    pub fn is_ready(&self) -> bool {
        self.status == PlayerStatus::Ready
    }

    pub fn is_finished(&self) -> bool {
        self.status == PlayerStatus::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answered(times: &[(usize, bool, u64)]) -> BattlePlayer {
        let mut p = BattlePlayer::from_profile(PlayerProfile::new(PlayerId(1), "ada"), 0);
        for &(question_index, is_correct, time_spent_ms) in times {
            p.answers.push(AnswerRecord {
                question_index,
                selected_answer: 0,
                is_correct,
                time_spent_ms,
                points: 0,
            });
        }
        p
    }

    #[test]
    fn test_from_profile_starts_waiting_with_zero_score() {
        let p = BattlePlayer::from_profile(PlayerProfile::new(PlayerId(9), "bob"), 1234);
        assert_eq!(p.status, PlayerStatus::Waiting);
        assert_eq!(p.score, 0);
        assert_eq!(p.joined_at, 1234);
        assert!(p.ready_at.is_none());
    }

    #[test]
    fn test_has_answered_checks_question_index() {
        let p = answered(&[(0, true, 100), (2, false, 200)]);
        assert!(p.has_answered(0));
        assert!(!p.has_answered(1));
        assert!(p.has_answered(2));
    }

    #[test]
    fn test_total_time_and_correct_count() {
        let p = answered(&[(0, true, 100), (1, false, 250), (2, true, 50)]);
        assert_eq!(p.total_time_ms(), 400);
        assert_eq!(p.correct_count(), 2);
    }

    #[test]
    fn test_total_time_saturates_at_max() {
        let p = answered(&[(0, true, u64::MAX), (1, true, u64::MAX)]);
        assert_eq!(p.total_time_ms(), u64::MAX);
    }
}
