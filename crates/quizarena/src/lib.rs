//! # QuizArena
//!
//! Battle rooms for PvP quiz duels: players join a room, ready up, answer
//! the same question set, and are scored with a speed bonus. `2v2` and
//! `group` rooms are split into two teams; a winner (or a draw) is decided
//! once everyone has finished.
//!
//! ## Quick Start
//!
//! ```rust
//! use quizarena::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ArenaError> {
//! let engine = BattleEngine::new(MemoryStore::new(), QuestionBank::default());
//! let host = PlayerProfile::new(PlayerId(1), "ada");
//!
//! let room = engine
//!     .create_room(host.id, BattleMode::OneVsOne, RoomSettings::default(), false)
//!     .await?;
//! let room = engine.join_room(room.id(), host).await?;
//! assert_eq!(room.current_players(), 1);
//! # Ok(())
//! # }
//! ```

mod config;
mod engine;
mod error;
mod matchmaking;

pub use config::EngineConfig;
pub use engine::{ArenaStore, BattleEngine, BattleEngineBuilder, RoomUpdate};
pub use error::ArenaError;

pub mod prelude {
    pub use crate::{ArenaError, BattleEngine, BattleEngineBuilder, EngineConfig, RoomUpdate};
    pub use quizarena_protocol::{InviteId, Millis, PlayerId, RoomId};
    pub use quizarena_room::{
        BattleError, BattleInvite, BattleMode, BattleOutcome, BattleRoom, Difficulty, ErrorKind,
        InviteStatus, PlayerProfile, Question, QuestionBank, QuestionProvider, RoomEvent,
        RoomSettings, RoomStatus, TeamSide,
    };
    pub use quizarena_store::{JsonFileStore, MemoryStore};
}
