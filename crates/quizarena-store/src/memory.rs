//! In-process store. The default for tests and single-node deployments.

use quizarena_protocol::{InviteId, PlayerId, RoomId};
use quizarena_room::{BattleInvite, BattleRoom};
use tokio::sync::Mutex;

use crate::registry::Registry;
use crate::{ActiveRoomIndex, InviteStore, RoomStore, StoreError, Versioned};

/// Keeps every registry in memory behind one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Registry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoomStore for MemoryStore {
    async fn next_room_id(&self) -> Result<RoomId, StoreError> {
        Ok(self.inner.lock().await.next_room_id())
    }

    async fn load_room(&self, room_id: RoomId) -> Result<Option<Versioned<BattleRoom>>, StoreError> {
        Ok(self.inner.lock().await.load_room(room_id))
    }

    async fn save_room(&self, room: BattleRoom, expected: Option<u64>) -> Result<u64, StoreError> {
        self.inner.lock().await.save_room(room, expected)
    }

    async fn list_rooms(&self) -> Result<Vec<BattleRoom>, StoreError> {
        Ok(self.inner.lock().await.list_rooms())
    }
}

impl InviteStore for MemoryStore {
    async fn next_invite_id(&self) -> Result<InviteId, StoreError> {
        Ok(self.inner.lock().await.next_invite_id())
    }

    async fn load_invite(&self, invite_id: InviteId) -> Result<Option<BattleInvite>, StoreError> {
        Ok(self.inner.lock().await.load_invite(invite_id))
    }

    async fn save_invite(&self, invite: BattleInvite) -> Result<(), StoreError> {
        self.inner.lock().await.save_invite(invite);
        Ok(())
    }

    async fn invites_for_player(&self, player_id: PlayerId) -> Result<Vec<BattleInvite>, StoreError> {
        Ok(self.inner.lock().await.invites_for_player(player_id))
    }

    async fn list_invites(&self) -> Result<Vec<BattleInvite>, StoreError> {
        Ok(self.inner.lock().await.list_invites())
    }

    async fn remove_invites(&self, invite_ids: &[InviteId]) -> Result<usize, StoreError> {
        Ok(self.inner.lock().await.remove_invites(invite_ids))
    }
}

impl ActiveRoomIndex for MemoryStore {
    async fn set_active_room(&self, player_id: PlayerId, room_id: RoomId) -> Result<(), StoreError> {
        self.inner.lock().await.set_active_room(player_id, room_id);
        Ok(())
    }

    async fn clear_active_room(&self, player_id: PlayerId, room_id: RoomId) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.clear_active_room(player_id, room_id))
    }

    async fn active_room(&self, player_id: PlayerId) -> Result<Option<RoomId>, StoreError> {
        Ok(self.inner.lock().await.active_room(player_id))
    }
}
