//! Storage seams the engine is written against.
//!
//! Each trait is a keyed get/put registry. Implementations must make a
//! single call atomic; nothing here spans calls. Rooms carry a version so
//! a read-modify-write cycle can detect that someone else wrote first.

use std::future::Future;

use quizarena_protocol::{InviteId, PlayerId, RoomId};
use quizarena_room::{BattleInvite, BattleRoom};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// A record together with the version it was stored under.
///
/// Versions start at 1 on insert and grow by one on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

/// Persists battle rooms with optimistic concurrency.
///
/// ## Trait bounds
///
/// - `Send + Sync` → one store is shared by every task driving the engine.
/// - `'static` → the engine owns its store for as long as it runs.
/// - Methods return `impl Future + Send` so the engine's own futures stay
///   `Send` and can be spawned on a multi-threaded runtime. Implementors
///   may simply write `async fn`.
///
/// ## Versions
///
/// `save_room` is a compare-and-swap. The engine reads a room with its
/// version, applies a command, and saves with that version as
/// `expected`. If another writer saved in between, the versions differ
/// and the save fails with [`StoreError::Conflict`] instead of
/// overwriting their change.
pub trait RoomStore: Send + Sync + 'static {
    /// Allocates a fresh room id. Ids are never reused.
    fn next_room_id(&self) -> impl Future<Output = Result<RoomId, StoreError>> + Send;

    fn load_room(
        &self,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Option<Versioned<BattleRoom>>, StoreError>> + Send;

    /// Writes `room` if the stored version still equals `expected`.
    ///
    /// `expected = None` inserts a new room and fails if one already exists
    /// under that id. Returns the new version.
    ///
    /// # Errors
    /// [`StoreError::Conflict`] when the stored version differs.
    fn save_room(
        &self,
        room: BattleRoom,
        expected: Option<u64>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Every room, ordered by id.
    fn list_rooms(&self) -> impl Future<Output = Result<Vec<BattleRoom>, StoreError>> + Send;
}

/// Persists direct invites.
pub trait InviteStore: Send + Sync + 'static {
    fn next_invite_id(&self) -> impl Future<Output = Result<InviteId, StoreError>> + Send;

    fn load_invite(
        &self,
        invite_id: InviteId,
    ) -> impl Future<Output = Result<Option<BattleInvite>, StoreError>> + Send;

    /// Inserts or replaces an invite.
    fn save_invite(
        &self,
        invite: BattleInvite,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Invites addressed to `player_id`, ordered by id.
    fn invites_for_player(
        &self,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<Vec<BattleInvite>, StoreError>> + Send;

    fn list_invites(&self) -> impl Future<Output = Result<Vec<BattleInvite>, StoreError>> + Send;

    /// Deletes the given invites. Returns how many existed.
    fn remove_invites(
        &self,
        invite_ids: &[InviteId],
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;
}

/// Remembers which room each player is currently in, so a client can
/// resume after a reload.
pub trait ActiveRoomIndex: Send + Sync + 'static {
    fn set_active_room(
        &self,
        player_id: PlayerId,
        room_id: RoomId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Clears the pointer only if it still points at `room_id`, so leaving
    /// an old room never clobbers a newer one. Returns whether it cleared.
    fn clear_active_room(
        &self,
        player_id: PlayerId,
        room_id: RoomId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn active_room(
        &self,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<Option<RoomId>, StoreError>> + Send;
}
