//! The plain, single-owner maps both store implementations wrap.
//!
//! `Registry` is not thread-safe on its own; each store holds it behind a
//! `tokio::sync::Mutex` and calls exactly one method per lock.

use std::collections::{BTreeMap, HashMap};

use quizarena_protocol::{InviteId, PlayerId, RoomId};
use quizarena_room::{BattleInvite, BattleRoom};
use serde::{Deserialize, Serialize};

use crate::{StoreError, Versioned};

#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    rooms: BTreeMap<RoomId, Versioned<BattleRoom>>,
    invites: BTreeMap<InviteId, BattleInvite>,
    active: HashMap<PlayerId, RoomId>,
    last_room_id: u64,
    last_invite_id: u64,
}

impl Registry {
    // ---- Rooms ----

    pub(crate) fn next_room_id(&mut self) -> RoomId {
        self.last_room_id += 1;
        RoomId(self.last_room_id)
    }

    pub(crate) fn load_room(&self, room_id: RoomId) -> Option<Versioned<BattleRoom>> {
        self.rooms.get(&room_id).cloned()
    }

    pub(crate) fn save_room(
        &mut self,
        room: BattleRoom,
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        let room_id = room.id();
        let found = self.rooms.get(&room_id).map(|v| v.version);
        if found != expected {
            return Err(StoreError::Conflict {
                room_id,
                expected,
                found,
            });
        }
        let version = found.map_or(1, |v| v + 1);
        self.rooms.insert(room_id, Versioned { version, value: room });
        // Keep the allocator ahead of externally chosen ids.
        self.last_room_id = self.last_room_id.max(room_id.0);
        Ok(version)
    }

    pub(crate) fn list_rooms(&self) -> Vec<BattleRoom> {
        self.rooms.values().map(|v| v.value.clone()).collect()
    }

    // ---- Invites ----

    pub(crate) fn next_invite_id(&mut self) -> InviteId {
        self.last_invite_id += 1;
        InviteId(self.last_invite_id)
    }

    pub(crate) fn load_invite(&self, invite_id: InviteId) -> Option<BattleInvite> {
        self.invites.get(&invite_id).cloned()
    }

    pub(crate) fn save_invite(&mut self, invite: BattleInvite) {
        self.last_invite_id = self.last_invite_id.max(invite.id.0);
        self.invites.insert(invite.id, invite);
    }

    pub(crate) fn invites_for_player(&self, player_id: PlayerId) -> Vec<BattleInvite> {
        self.invites
            .values()
            .filter(|i| i.to_player_id == player_id)
            .cloned()
            .collect()
    }

    pub(crate) fn list_invites(&self) -> Vec<BattleInvite> {
        self.invites.values().cloned().collect()
    }

    pub(crate) fn remove_invites(&mut self, invite_ids: &[InviteId]) -> usize {
        invite_ids
            .iter()
            .filter(|&id| self.invites.remove(id).is_some())
            .count()
    }

    // ---- Active rooms ----

    pub(crate) fn set_active_room(&mut self, player_id: PlayerId, room_id: RoomId) {
        self.active.insert(player_id, room_id);
    }

    pub(crate) fn clear_active_room(&mut self, player_id: PlayerId, room_id: RoomId) -> bool {
        if self.active.get(&player_id) == Some(&room_id) {
            self.active.remove(&player_id);
            return true;
        }
        false
    }

    pub(crate) fn active_room(&self, player_id: PlayerId) -> Option<RoomId> {
        self.active.get(&player_id).copied()
    }
}

// ---------------------------------------------------------------------------
// On-disk document
// ---------------------------------------------------------------------------

/// The whole registry as one JSON document.
///
/// Maps are flattened to lists so every key stays a plain JSON value.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Document {
    #[serde(default)]
    rooms: Vec<Versioned<BattleRoom>>,
    #[serde(default)]
    invites: Vec<BattleInvite>,
    #[serde(default)]
    active_rooms: Vec<(PlayerId, RoomId)>,
    #[serde(default)]
    last_room_id: u64,
    #[serde(default)]
    last_invite_id: u64,
}

impl From<&Registry> for Document {
    fn from(registry: &Registry) -> Self {
        let mut active_rooms: Vec<_> = registry.active.iter().map(|(&p, &r)| (p, r)).collect();
        active_rooms.sort();
        Self {
            rooms: registry.rooms.values().cloned().collect(),
            invites: registry.invites.values().cloned().collect(),
            active_rooms,
            last_room_id: registry.last_room_id,
            last_invite_id: registry.last_invite_id,
        }
    }
}

impl From<Document> for Registry {
    fn from(doc: Document) -> Self {
        let rooms: BTreeMap<_, _> = doc.rooms.into_iter().map(|v| (v.value.id(), v)).collect();
        let invites: BTreeMap<_, _> = doc.invites.into_iter().map(|i| (i.id, i)).collect();
        let max_room = rooms.keys().next_back().map_or(0, |id| id.0);
        let max_invite = invites.keys().next_back().map_or(0, |id| id.0);
        Self {
            rooms,
            invites,
            active: doc.active_rooms.into_iter().collect(),
            last_room_id: doc.last_room_id.max(max_room),
            last_invite_id: doc.last_invite_id.max(max_invite),
        }
    }
}
