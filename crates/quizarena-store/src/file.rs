//! A store persisted as one JSON document on disk.
//!
//! The document is read once at open and cached. Every write applies the
//! change to a copy of the cache, rewrites the whole file, and only then
//! swaps the copy in, so a failed write leaves both file and cache as
//! they were.

use std::path::{Path, PathBuf};

use quizarena_protocol::{Codec, InviteId, JsonCodec, PlayerId, RoomId};
use quizarena_room::{BattleInvite, BattleRoom};
use tokio::sync::Mutex;

use crate::registry::{Document, Registry};
use crate::{ActiveRoomIndex, InviteStore, RoomStore, StoreError, Versioned};

/// Whole-document JSON store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<Registry>,
}

impl JsonFileStore {
    /// Opens the document at `path`, starting empty if it does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let registry = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let doc: Document = JsonCodec.decode(&bytes)?;
                Registry::from(doc)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Registry::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(path = %path.display(), "json store opened");
        Ok(Self {
            path,
            inner: Mutex::new(registry),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read<T>(&self, f: impl FnOnce(&Registry) -> T) -> T {
        f(&*self.inner.lock().await)
    }

    async fn write<T>(
        &self,
        f: impl FnOnce(&mut Registry) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.inner.lock().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }

    /// Writes to a sibling temp file and renames it over the document.
    async fn persist(&self, registry: &Registry) -> Result<(), StoreError> {
        let bytes = JsonCodec.encode(&Document::from(registry))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "json store written");
        Ok(())
    }
}

impl RoomStore for JsonFileStore {
    async fn next_room_id(&self) -> Result<RoomId, StoreError> {
        self.write(|r| Ok(r.next_room_id())).await
    }

    async fn load_room(&self, room_id: RoomId) -> Result<Option<Versioned<BattleRoom>>, StoreError> {
        Ok(self.read(|r| r.load_room(room_id)).await)
    }

    async fn save_room(&self, room: BattleRoom, expected: Option<u64>) -> Result<u64, StoreError> {
        self.write(|r| r.save_room(room, expected)).await
    }

    async fn list_rooms(&self) -> Result<Vec<BattleRoom>, StoreError> {
        Ok(self.read(Registry::list_rooms).await)
    }
}

impl InviteStore for JsonFileStore {
    async fn next_invite_id(&self) -> Result<InviteId, StoreError> {
        self.write(|r| Ok(r.next_invite_id())).await
    }

    async fn load_invite(&self, invite_id: InviteId) -> Result<Option<BattleInvite>, StoreError> {
        Ok(self.read(|r| r.load_invite(invite_id)).await)
    }

    async fn save_invite(&self, invite: BattleInvite) -> Result<(), StoreError> {
        self.write(|r| {
            r.save_invite(invite);
            Ok(())
        })
        .await
    }

    async fn invites_for_player(&self, player_id: PlayerId) -> Result<Vec<BattleInvite>, StoreError> {
        Ok(self.read(|r| r.invites_for_player(player_id)).await)
    }

    async fn list_invites(&self) -> Result<Vec<BattleInvite>, StoreError> {
        Ok(self.read(Registry::list_invites).await)
    }

    async fn remove_invites(&self, invite_ids: &[InviteId]) -> Result<usize, StoreError> {
        self.write(|r| Ok(r.remove_invites(invite_ids))).await
    }
}

impl ActiveRoomIndex for JsonFileStore {
    async fn set_active_room(&self, player_id: PlayerId, room_id: RoomId) -> Result<(), StoreError> {
        self.write(|r| {
            r.set_active_room(player_id, room_id);
            Ok(())
        })
        .await
    }

    async fn clear_active_room(&self, player_id: PlayerId, room_id: RoomId) -> Result<bool, StoreError> {
        self.write(|r| Ok(r.clear_active_room(player_id, room_id))).await
    }

    async fn active_room(&self, player_id: PlayerId) -> Result<Option<RoomId>, StoreError> {
        Ok(self.read(|r| r.active_room(player_id)).await)
    }
}
