//! Battle room domain for QuizArena.
//!
//! Everything here is pure: no I/O, no clocks, no locks. Callers pass the
//! current time in and persist what comes out.
//!
//! # Key types
//!
//! - [`BattleRoom`]: the room aggregate; changed only through [`BattleRoom::apply`]
//! - [`RoomCommand`] / [`RoomEvent`]: what a caller asks for, what happened
//! - [`RoomStatus`]: lifecycle state machine
//! - [`BattleInvite`]: a direct, time-boxed invitation
//! - [`QuestionProvider`]: where question sets come from
//! - [`BattleError`] / [`ErrorKind`]: domain failures and their classification

#![allow(async_fn_in_trait)]

mod config;
mod error;
mod event;
mod invite;
mod player;
mod question;
mod room;
mod scoring;
mod teams;

pub use config::{BattleMode, Difficulty, MIN_PLAYERS, RoomSettings, RoomStatus};
pub use error::{BattleError, ErrorKind};
pub use event::{CancelReason, RoomEvent};
pub use invite::{
    BattleInvite, INVITE_CODE_ALPHABET, InviteStatus, generate_invite_code, invite_code_at,
    invite_code_space, normalize_invite_code,
};
pub use player::{AnswerRecord, BattlePlayer, PlayerProfile, PlayerStatus};
pub use question::{
    OPTION_COUNT, ProviderError, Question, QuestionBank, QuestionProvider, select_questions,
};
pub use room::{BattleRoom, RoomCommand};
pub use scoring::{BASE_POINTS, BONUS_PER_SECOND, BattleOutcome, decide_outcome, score_answer};
pub use teams::{TeamSide, Teams, compute_teams};
