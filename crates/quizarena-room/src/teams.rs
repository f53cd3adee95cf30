//! Team partition for `2v2` and `group` battles.

use std::fmt;

use quizarena_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{BattleMode, BattlePlayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Team1,
    Team2,
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team1 => write!(f, "team1"),
            Self::Team2 => write!(f, "team2"),
        }
    }
}

/// Two disjoint member lists covering every current player.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Teams {
    pub team1: Vec<PlayerId>,
    pub team2: Vec<PlayerId>,
}

impl Teams {
    pub fn members(&self, side: TeamSide) -> &[PlayerId] {
        match side {
            TeamSide::Team1 => &self.team1,
            TeamSide::Team2 => &self.team2,
        }
    }

    pub fn side_of(&self, player_id: PlayerId) -> Option<TeamSide> {
        if self.team1.contains(&player_id) {
            Some(TeamSide::Team1)
        } else if self.team2.contains(&player_id) {
            Some(TeamSide::Team2)
        } else {
            None
        }
    }
}

/// Splits `players` into teams for modes that have them.
///
/// The first `ceil(n / 2)` players in join order go to `team1`, the rest
/// to `team2`. Rooms call this after every membership change instead of
/// patching the previous split, so the result always partitions exactly
/// the current players.
pub fn compute_teams(players: &[BattlePlayer], mode: BattleMode) -> Option<Teams> {
    if !mode.has_teams() {
        return None;
    }
    let (first, rest) = players.split_at(players.len().div_ceil(2));
    Some(Teams {
        team1: first.iter().map(|p| p.id).collect(),
        team2: rest.iter().map(|p| p.id).collect(),
    })
}
