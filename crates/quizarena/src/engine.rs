//! `BattleEngine`: the async front door to room operations.
//!
//! Every operation follows the same cycle:
//!
//! ```text
//! load room + version ─→ BattleRoom::apply ─→ save_room(expected version)
//!                                                   │
//!                       publish RoomUpdates ←─ update active-room pointers
//! ```
//!
//! The engine keeps no room state of its own between calls. Two callers
//! racing on the same room both apply against the version they read; the
//! store accepts the first save and rejects the second with a conflict.
//!
//! The room save is the commit point. Once it succeeds the call succeeds:
//! pointer updates after it are best-effort and only logged on failure.

use std::collections::HashSet;

use quizarena_protocol::{Millis, PlayerId, RoomId, now_millis};
use quizarena_room::{
    BattleError, BattleMode, BattleRoom, PlayerProfile, QuestionProvider, RoomCommand, RoomEvent,
    RoomSettings, generate_invite_code, invite_code_at, invite_code_space, select_questions,
};
use quizarena_store::{ActiveRoomIndex, InviteStore, RoomStore, StoreError, Versioned};
use rand::Rng;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::{ArenaError, EngineConfig};

/// Code spaces up to this size are listed in full rather than sampled.
const ENUMERATED_CODE_SPACE: u64 = 4_096;

/// Random draws tried against a large code space before giving up.
const MAX_CODE_DRAWS: usize = 1_024;

/// Everything the engine needs from its storage.
pub trait ArenaStore: RoomStore + InviteStore + ActiveRoomIndex {}

impl<T: RoomStore + InviteStore + ActiveRoomIndex> ArenaStore for T {}

/// One room event, tagged with the room and the version that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomUpdate {
    pub room_id: RoomId,
    pub version: u64,
    pub event: RoomEvent,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`BattleEngine`].
///
/// ```rust
/// use quizarena::prelude::*;
///
/// let engine = BattleEngineBuilder::new()
///     .invite_ttl_secs(60)
///     .build(MemoryStore::new(), QuestionBank::default());
/// assert_eq!(engine.config().invite_ttl_secs, 60);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BattleEngineBuilder {
    config: EngineConfig,
}

impl BattleEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn invite_ttl_secs(mut self, secs: u64) -> Self {
        self.config.invite_ttl_secs = secs;
        self
    }

    pub fn invite_code_len(mut self, len: usize) -> Self {
        self.config.invite_code_len = len.max(1);
        self
    }

    pub fn build<S: ArenaStore, Q: QuestionProvider>(
        self,
        store: S,
        questions: Q,
    ) -> BattleEngine<S, Q> {
        let (updates, _) = broadcast::channel(self.config.update_buffer.max(1));
        BattleEngine {
            store,
            questions,
            config: self.config,
            updates,
        }
    }
}

// ---------------------------------------------------------------------------
// BattleEngine
// ---------------------------------------------------------------------------

/// Runs battle rooms over a store and a question source.
///
/// ## Type parameters
///
/// - `S: ArenaStore` → where rooms, invites and active-room pointers
///   live. [`MemoryStore`](quizarena_store::MemoryStore) for tests and
///   single-process use, [`JsonFileStore`](quizarena_store::JsonFileStore)
///   to survive restarts.
/// - `Q: QuestionProvider` → where `start_battle` gets its question pool.
///
/// ## Sharing
///
/// Every method takes `&self`, so one engine can be wrapped in an `Arc`
/// and called from many tasks. Room consistency comes from the store's
/// versioned saves, not from a lock in the engine: a caller that loses a
/// race gets [`ErrorKind::Conflict`](quizarena_room::ErrorKind::Conflict)
/// and may re-read and retry.
pub struct BattleEngine<S, Q> {
    pub(crate) store: S,
    questions: Q,
    pub(crate) config: EngineConfig,
    updates: broadcast::Sender<RoomUpdate>,
}

impl<S: ArenaStore, Q: QuestionProvider> BattleEngine<S, Q> {
    /// An engine with the default configuration.
    pub fn new(store: S, questions: Q) -> Self {
        BattleEngineBuilder::new().build(store, questions)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Receives every event of every room from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomUpdate> {
        self.updates.subscribe()
    }

    // ---- Room lifecycle ----

    /// Creates an empty `waiting` room.
    ///
    /// Private rooms get an invite code that no other open room uses.
    /// The creator is not joined automatically.
    pub async fn create_room(
        &self,
        created_by: PlayerId,
        mode: BattleMode,
        settings: RoomSettings,
        is_private: bool,
    ) -> Result<BattleRoom, ArenaError> {
        let invite_code = if is_private {
            Some(self.unique_invite_code().await?)
        } else {
            None
        };
        let room_id = self.store.next_room_id().await?;
        let room = BattleRoom::new(room_id, created_by, mode, settings, invite_code, now_millis());
        self.store.save_room(room.clone(), None).await?;

        tracing::info!(%room_id, %created_by, %mode, is_private, "room created");
        Ok(room)
    }

    pub async fn join_room(
        &self,
        room_id: RoomId,
        profile: PlayerProfile,
    ) -> Result<BattleRoom, ArenaError> {
        self.mutate(room_id, RoomCommand::Join(profile)).await
    }

    pub async fn leave_room(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
    ) -> Result<BattleRoom, ArenaError> {
        self.mutate(room_id, RoomCommand::Leave(player_id)).await
    }

    pub async fn set_player_ready(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
    ) -> Result<BattleRoom, ArenaError> {
        self.mutate(room_id, RoomCommand::Ready(player_id)).await
    }

    /// Deals questions and starts the battle.
    ///
    /// The room must be `ready`. The question source is called between the
    /// read and the write; the write uses the version read before the call,
    /// so a concurrent start fails with a conflict instead of dealing twice.
    ///
    /// # Errors
    /// [`ArenaError::Questions`] if the source fails, with the room untouched.
    pub async fn start_battle(&self, room_id: RoomId) -> Result<BattleRoom, ArenaError> {
        let current = self.load(room_id).await?;
        current.value.ensure_startable()?;

        let settings = current.value.settings();
        let wanted = settings.questions_count;
        let pool = self.questions.fetch_questions(settings.difficulty).await?;
        let dealt = select_questions(pool, wanted, &mut rand::rng());
        if dealt.len() < wanted {
            tracing::warn!(
                %room_id,
                wanted,
                dealt = dealt.len(),
                difficulty = %settings.difficulty,
                "question pool smaller than requested"
            );
        }

        self.commit(current, RoomCommand::Start(dealt)).await
    }

    /// Scores one answer. Finishes the player after their last question
    /// and the room after the last player.
    pub async fn submit_answer(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        question_index: usize,
        selected_answer: usize,
        time_spent_ms: u64,
    ) -> Result<BattleRoom, ArenaError> {
        self.mutate(
            room_id,
            RoomCommand::Answer {
                player_id,
                question_index,
                selected_answer,
                time_spent_ms,
            },
        )
        .await
    }

    // ---- Reads ----

    pub async fn get_room(&self, room_id: RoomId) -> Result<BattleRoom, ArenaError> {
        Ok(self.load(room_id).await?.value)
    }

    /// The room a player is currently in, if any.
    ///
    /// The stored pointer is only trusted when the room it names is still
    /// open and still lists the player, so a pointer that missed an update
    /// reads as `None`.
    pub async fn active_room(&self, player_id: PlayerId) -> Result<Option<BattleRoom>, ArenaError> {
        let Some(room_id) = self.store.active_room(player_id).await? else {
            return Ok(None);
        };
        Ok(self
            .store
            .load_room(room_id)
            .await?
            .map(|v| v.value)
            .filter(|room| room.is_open() && room.contains(player_id)))
    }

    // ---- Internals ----

    pub(crate) async fn load(&self, room_id: RoomId) -> Result<Versioned<BattleRoom>, ArenaError> {
        Ok(self
            .store
            .load_room(room_id)
            .await?
            .ok_or(BattleError::RoomNotFound(room_id))?)
    }

    async fn mutate(&self, room_id: RoomId, command: RoomCommand) -> Result<BattleRoom, ArenaError> {
        let current = self.load(room_id).await?;
        self.commit(current, command).await
    }

    /// Applies `command` to the version read earlier and saves the result
    /// only if nobody wrote in between.
    async fn commit(
        &self,
        current: Versioned<BattleRoom>,
        command: RoomCommand,
    ) -> Result<BattleRoom, ArenaError> {
        let (next, events) = current.value.apply(command, now_millis())?;
        let version = self.store.save_room(next.clone(), Some(current.version)).await?;

        // The room is committed from here on; nothing below may fail the call.
        self.sync_active_rooms(&next, &events).await;
        for event in events {
            log_event(next.id(), &event);
            // No subscribers is fine.
            let _ = self.updates.send(RoomUpdate {
                room_id: next.id(),
                version,
                event,
            });
        }
        Ok(next)
    }

    /// Keeps player → room pointers in step with membership.
    ///
    /// Pointers are an index over rooms that are already saved, so a
    /// failed pointer write is logged and skipped rather than reported.
    /// [`active_room`](Self::active_room) re-checks the room it resolves.
    async fn sync_active_rooms(&self, room: &BattleRoom, events: &[RoomEvent]) {
        let room_id = room.id();
        for event in events {
            match event {
                RoomEvent::PlayerJoined { player_id, .. } => {
                    let result = self.store.set_active_room(*player_id, room_id).await;
                    warn_on_pointer_failure(room_id, *player_id, result.map(|_| ()));
                }
                RoomEvent::PlayerLeft { player_id, .. } => {
                    let result = self.store.clear_active_room(*player_id, room_id).await;
                    warn_on_pointer_failure(room_id, *player_id, result.map(|_| ()));
                }
                RoomEvent::BattleFinished { .. } | RoomEvent::RoomCancelled { .. } => {
                    for player_id in room.participants() {
                        let result = self.store.clear_active_room(player_id, room_id).await;
                        warn_on_pointer_failure(room_id, player_id, result.map(|_| ()));
                    }
                }
                _ => {}
            }
        }
    }

    /// Picks a code no open room uses.
    ///
    /// Small code spaces are listed in full and a free code is chosen at
    /// random, so the result is exact. Large ones are sampled a bounded
    /// number of times.
    ///
    /// # Errors
    /// [`BattleError::InviteCodesExhausted`] when no free code was found.
    async fn unique_invite_code(&self) -> Result<String, ArenaError> {
        let len = self.config.invite_code_len;
        let taken: HashSet<String> = self
            .store
            .list_rooms()
            .await?
            .into_iter()
            .filter(BattleRoom::is_open)
            .filter_map(|r| r.invite_code().map(str::to_owned))
            .filter(|code| code.len() == len)
            .collect();

        let found = match invite_code_space(len) {
            Some(space) if space <= taken.len() as u64 => None,
            Some(space) if space <= ENUMERATED_CODE_SPACE => {
                let mut free: Vec<String> = (0..space)
                    .map(|index| invite_code_at(index, len))
                    .filter(|code| !taken.contains(code))
                    .collect();
                match free.len() {
                    0 => None,
                    n => Some(free.swap_remove(rand::rng().random_range(0..n))),
                }
            }
            _ => (0..MAX_CODE_DRAWS)
                .map(|_| generate_invite_code(&mut rand::rng(), len))
                .find(|code| !taken.contains(code)),
        };
        found.ok_or_else(|| {
            tracing::warn!(length = len, open_codes = taken.len(), "invite codes exhausted");
            BattleError::InviteCodesExhausted { length: len }.into()
        })
    }

    pub(crate) fn now(&self) -> Millis {
        now_millis()
    }
}

fn warn_on_pointer_failure(room_id: RoomId, player_id: PlayerId, result: Result<(), StoreError>) {
    if let Err(error) = result {
        tracing::warn!(%room_id, %player_id, %error, "active-room pointer not updated");
    }
}

fn log_event(room_id: RoomId, event: &RoomEvent) {
    match event {
        RoomEvent::PlayerJoined { player_id, players } => {
            tracing::info!(%room_id, %player_id, players, "player joined");
        }
        RoomEvent::PlayerLeft { player_id, players } => {
            tracing::info!(%room_id, %player_id, players, "player left");
        }
        RoomEvent::RoomReady => tracing::info!(%room_id, "room ready"),
        RoomEvent::BattleStarted { questions } => {
            tracing::info!(%room_id, questions, "battle started");
        }
        RoomEvent::BattleFinished { outcome } => {
            tracing::info!(%room_id, ?outcome, "battle finished");
        }
        RoomEvent::RoomCancelled { reason } => {
            tracing::info!(%room_id, ?reason, "room cancelled");
        }
        RoomEvent::PlayerReady { player_id } => {
            tracing::debug!(%room_id, %player_id, "player ready");
        }
        RoomEvent::AnswerRecorded {
            player_id,
            question_index,
            points,
            ..
        } => {
            tracing::debug!(%room_id, %player_id, question_index, points, "answer recorded");
        }
        RoomEvent::PlayerFinished { player_id, score } => {
            tracing::debug!(%room_id, %player_id, score, "player finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use quizarena_room::{CancelReason, QuestionBank};
    use quizarena_store::MemoryStore;

    use super::*;

    #[test]
    fn test_room_update_json_nests_tagged_event() {
        let update = RoomUpdate {
            room_id: RoomId(3),
            version: 7,
            event: RoomEvent::RoomCancelled { reason: CancelReason::CreatorLeft },
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["room_id"], 3);
        assert_eq!(json["version"], 7);
        assert_eq!(json["event"]["type"], "room_cancelled");
        assert_eq!(json["event"]["reason"], "creator_left");
    }

    #[test]
    fn test_builder_clamps_code_length() {
        let engine = BattleEngineBuilder::new()
            .invite_code_len(0)
            .build(MemoryStore::new(), QuestionBank::default());
        assert_eq!(engine.config().invite_code_len, 1);
    }

    #[tokio::test]
    async fn test_get_room_unknown_is_room_not_found() {
        let engine = BattleEngine::new(MemoryStore::new(), QuestionBank::default());
        let err = engine.get_room(RoomId(9)).await.unwrap_err();
        assert_eq!(err.as_battle(), Some(&BattleError::RoomNotFound(RoomId(9))));
    }
}
