//! Answer scoring and winner determination.

use quizarena_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{BattleMode, BattlePlayer, TeamSide, Teams};

/// Flat points for any correct answer.
pub const BASE_POINTS: u32 = 100;

/// Bonus points per whole second saved under the time budget.
pub const BONUS_PER_SECOND: u64 = 10;

/// Points earned by one answer.
///
/// A correct answer earns [`BASE_POINTS`] plus `floor(seconds_saved * 10)`,
/// where `seconds_saved = max(0, budget - spent)`. Slow correct answers
/// earn the base only; incorrect answers earn nothing.
///
/// The bonus is computed in whole milliseconds, so it is exact: one point
/// per 100 ms saved. Any `u64` budget or spent time is accepted; a bonus
/// too large for `u32` saturates.
pub fn score_answer(is_correct: bool, time_per_question_ms: u64, time_spent_ms: u64) -> u32 {
    if !is_correct {
        return 0;
    }
    let saved_ms = time_per_question_ms.saturating_sub(time_spent_ms);
    let bonus = saved_ms / (1_000 / BONUS_PER_SECOND);
    BASE_POINTS.saturating_add(u32::try_from(bonus).unwrap_or(u32::MAX))
}

/// How a finished battle was decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BattleOutcome {
    /// A single player won (`1v1`).
    Player { player_id: PlayerId, score: u32 },
    /// A team won (`2v2`, `group`); `score` is the team aggregate.
    Team { team: TeamSide, score: u32 },
    /// Equal score and equal total answer time.
    Draw { score: u32 },
}

impl BattleOutcome {
    /// The winning (or shared) score.
    pub fn score(&self) -> u32 {
        match self {
            Self::Player { score, .. } | Self::Team { score, .. } | Self::Draw { score } => *score,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Self::Draw { .. })
    }
}

/// The best-ranked contender, or a shared score when the top two are
/// indistinguishable.
enum Leader<T> {
    Sole(T, u32),
    Tied(u32),
}

/// Ranks `(who, score, total_time_ms)` entries: higher score first,
/// then lower total time.
fn leader<T: Copy>(mut contenders: Vec<(T, u32, u64)>) -> Option<Leader<T>> {
    contenders.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    let &(who, score, time) = contenders.first()?;
    match contenders.get(1) {
        Some(&(_, s, t)) if s == score && t == time => Some(Leader::Tied(score)),
        _ => Some(Leader::Sole(who, score)),
    }
}

/// Decides the outcome of a finished battle.
///
/// One rule for every mode: the higher score wins; an equal score goes to
/// the side with less total answer time; if that is equal too the battle
/// is a draw. Team figures are sums over members. Returns `None` only
/// when there is nobody left to rank.
pub fn decide_outcome(
    mode: BattleMode,
    players: &[BattlePlayer],
    teams: Option<&Teams>,
) -> Option<BattleOutcome> {
    match (mode.has_teams(), teams) {
        (true, Some(teams)) => {
            let totals = |side: TeamSide| {
                players
                    .iter()
                    .filter(|p| teams.members(side).contains(&p.id))
                    .fold((0u32, 0u64), |(score, time), p| {
                        (score.saturating_add(p.score), time.saturating_add(p.total_time_ms()))
                    })
            };
            let (s1, t1) = totals(TeamSide::Team1);
            let (s2, t2) = totals(TeamSide::Team2);
            Some(match leader(vec![(TeamSide::Team1, s1, t1), (TeamSide::Team2, s2, t2)])? {
                Leader::Sole(team, score) => BattleOutcome::Team { team, score },
                Leader::Tied(score) => BattleOutcome::Draw { score },
            })
        }
        _ => {
            let contenders = players
                .iter()
                .map(|p| (p.id, p.score, p.total_time_ms()))
                .collect();
            Some(match leader(contenders)? {
                Leader::Sole(player_id, score) => BattleOutcome::Player { player_id, score },
                Leader::Tied(score) => BattleOutcome::Draw { score },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerRecord, PlayerProfile, compute_teams};

    fn player(id: u64, score: u32, time_ms: u64) -> BattlePlayer {
        let mut p = BattlePlayer::from_profile(PlayerProfile::new(PlayerId(id), format!("p{id}")), 0);
        p.score = score;
        p.answers.push(AnswerRecord {
            question_index: 0,
            selected_answer: 0,
            is_correct: score > 0,
            time_spent_ms: time_ms,
            points: score,
        });
        p
    }

    #[test]
    fn test_score_answer_speed_bonus() {
        // 30 s budget, answered in 10 s: 100 + floor(20 * 10).
        assert_eq!(score_answer(true, 30_000, 10_000), 300);
    }

    #[test]
    fn test_score_answer_floors_partial_seconds() {
        // 19.95 s saved -> 199.5 -> 199 bonus points.
        assert_eq!(score_answer(true, 30_000, 10_050), 299);
    }

    #[test]
    fn test_score_answer_incorrect_is_zero() {
        assert_eq!(score_answer(false, 30_000, 0), 0);
        assert_eq!(score_answer(false, 30_000, 90_000), 0);
    }

    #[test]
    fn test_score_answer_slow_correct_earns_base_only() {
        assert_eq!(score_answer(true, 30_000, 30_000), BASE_POINTS);
        assert_eq!(score_answer(true, 30_000, 45_000), BASE_POINTS);
    }

    #[test]
    fn test_score_answer_huge_budget_saturates() {
        assert_eq!(score_answer(true, u64::MAX, 0), u32::MAX);
        assert_eq!(score_answer(true, u64::MAX, u64::MAX), BASE_POINTS);
        assert_eq!(score_answer(true, 0, u64::MAX), BASE_POINTS);
    }

    #[test]
    fn test_decide_outcome_one_vs_one_higher_score_wins() {
        let players = [player(1, 200, 5_000), player(2, 450, 9_000)];
        let outcome = decide_outcome(BattleMode::OneVsOne, &players, None);
        assert_eq!(
            outcome,
            Some(BattleOutcome::Player { player_id: PlayerId(2), score: 450 })
        );
    }

    #[test]
    fn test_decide_outcome_equal_score_faster_player_wins() {
        let players = [player(1, 300, 9_000), player(2, 300, 4_000)];
        let outcome = decide_outcome(BattleMode::OneVsOne, &players, None);
        assert_eq!(
            outcome,
            Some(BattleOutcome::Player { player_id: PlayerId(2), score: 300 })
        );
    }

    #[test]
    fn test_decide_outcome_full_tie_is_draw() {
        let players = [player(1, 300, 4_000), player(2, 300, 4_000)];
        let outcome = decide_outcome(BattleMode::OneVsOne, &players, None).unwrap();
        assert_eq!(outcome, BattleOutcome::Draw { score: 300 });
        assert!(outcome.is_draw());
    }

    #[test]
    fn test_decide_outcome_team_aggregate_wins() {
        let players = [
            player(1, 100, 1_000),
            player(2, 100, 1_000),
            player(3, 500, 1_000),
            player(4, 0, 1_000),
        ];
        let teams = compute_teams(&players, BattleMode::TwoVsTwo);
        let outcome = decide_outcome(BattleMode::TwoVsTwo, &players, teams.as_ref());
        assert_eq!(
            outcome,
            Some(BattleOutcome::Team { team: TeamSide::Team2, score: 500 })
        );
    }

    #[test]
    fn test_decide_outcome_team_tie_is_draw_not_unset() {
        let players = [
            player(1, 200, 1_000),
            player(2, 100, 2_000),
            player(3, 150, 1_500),
            player(4, 150, 1_500),
        ];
        let teams = compute_teams(&players, BattleMode::TwoVsTwo);
        let outcome = decide_outcome(BattleMode::TwoVsTwo, &players, teams.as_ref());
        assert_eq!(outcome, Some(BattleOutcome::Draw { score: 300 }));
    }

    #[test]
    fn test_decide_outcome_team_time_sum_saturates() {
        let players = [
            player(1, 100, u64::MAX),
            player(2, 100, u64::MAX),
            player(3, 100, 1_000),
            player(4, 100, 1_000),
        ];
        let teams = compute_teams(&players, BattleMode::TwoVsTwo);
        let outcome = decide_outcome(BattleMode::TwoVsTwo, &players, teams.as_ref());
        assert_eq!(
            outcome,
            Some(BattleOutcome::Team { team: TeamSide::Team2, score: 200 })
        );
    }

    #[test]
    fn test_decide_outcome_no_players_is_none() {
        assert_eq!(decide_outcome(BattleMode::OneVsOne, &[], None), None);
    }
}
