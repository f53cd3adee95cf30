//! Error types for the battle domain.

use quizarena_protocol::{InviteId, PlayerId, RoomId};

use crate::{InviteStatus, RoomStatus};

/// Coarse classification callers branch on.
///
/// - `NotFound`: try another identifier.
/// - `InvalidState`: the caller's view is stale; refresh and re-render.
/// - `CapacityExceeded`: route the player to another room.
/// - `ExternalFailure`: a collaborator failed; the room is unchanged, retry.
/// - `Conflict`: a concurrent writer won; re-read and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    CapacityExceeded,
    ExternalFailure,
    Conflict,
}

/// Errors raised by room and invite rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    /// The room does not exist.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The player is not a member of this room.
    #[error("player {0} not in room {1}")]
    PlayerNotInRoom(PlayerId, RoomId),

    /// The question index is outside the dealt question set.
    #[error("question {index} not found in room {room_id}")]
    QuestionNotFound { room_id: RoomId, index: usize },

    /// The invite does not exist.
    #[error("invite {0} not found")]
    InviteNotFound(InviteId),

    /// No open room carries this invite code.
    #[error("no open room matches invite code {0:?}")]
    InvalidCode(String),

    /// Joins are only accepted while the room is waiting.
    #[error("room {room_id} is not joinable while {status}")]
    RoomNotJoinable { room_id: RoomId, status: RoomStatus },

    /// The room is at capacity.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is already a member of this room.
    #[error("player {0} already in room {1}")]
    AlreadyJoined(PlayerId, RoomId),

    /// `start` requires every member to be ready first.
    #[error("room {room_id} is not ready to start (status {status})")]
    NotReady { room_id: RoomId, status: RoomStatus },

    /// Readiness can no longer change once questions are dealt.
    #[error("battle in room {0} has already started")]
    AlreadyStarted(RoomId),

    /// Answers are only accepted while the battle runs.
    #[error("room {room_id} has no battle in progress (status {status})")]
    NotInProgress { room_id: RoomId, status: RoomStatus },

    /// The room reached a terminal state.
    #[error("room {room_id} is {status} and can no longer change")]
    RoomClosed { room_id: RoomId, status: RoomStatus },

    /// Each question may be answered once per player.
    #[error("player {player_id} already answered question {index}")]
    AlreadyAnswered { player_id: PlayerId, index: usize },

    /// The question provider returned nothing for the room's difficulty.
    #[error("no questions available for room {0}")]
    NoQuestions(RoomId),

    /// The invite's validity window has passed.
    #[error("invite {0} has expired")]
    InviteExpired(InviteId),

    /// The invite was already accepted, declined, or expired.
    #[error("invite {invite_id} was already {status}")]
    InviteResolved { invite_id: InviteId, status: InviteStatus },

    /// Only the invited player may respond.
    #[error("player {player_id} is not the recipient of invite {invite_id}")]
    NotInvitee { player_id: PlayerId, invite_id: InviteId },

    /// Every invite code of this length is held by an open room.
    #[error("no free invite code of length {length}")]
    InviteCodesExhausted { length: usize },
}

impl BattleError {
    /// Classifies this error for callers that only branch on the kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomNotFound(_)
            | Self::PlayerNotInRoom(..)
            | Self::QuestionNotFound { .. }
            | Self::InviteNotFound(_)
            | Self::InvalidCode(_)
            | Self::NotInvitee { .. } => ErrorKind::NotFound,
            Self::RoomFull(_) | Self::InviteCodesExhausted { .. } => ErrorKind::CapacityExceeded,
            Self::NoQuestions(_) => ErrorKind::ExternalFailure,
            Self::RoomNotJoinable { .. }
            | Self::AlreadyJoined(..)
            | Self::NotReady { .. }
            | Self::AlreadyStarted(_)
            | Self::NotInProgress { .. }
            | Self::RoomClosed { .. }
            | Self::AlreadyAnswered { .. }
            | Self::InviteExpired(_)
            | Self::InviteResolved { .. } => ErrorKind::InvalidState,
        }
    }
}
