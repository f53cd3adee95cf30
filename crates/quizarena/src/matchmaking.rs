//! Room discovery, invite codes, and direct invites.
//!
//! Invite expiry is lazy: nothing runs on a timer. An overdue pending
//! invite is flipped to `expired` (and saved) the next time someone reads
//! or answers it.

use quizarena_protocol::{InviteId, PlayerId, RoomId};
use quizarena_room::{
    BattleError, BattleInvite, BattleRoom, InviteStatus, PlayerProfile, QuestionProvider,
    normalize_invite_code,
};

use crate::{ArenaError, ArenaStore, BattleEngine};

impl<S: ArenaStore, Q: QuestionProvider> BattleEngine<S, Q> {
    /// Public rooms that are waiting for players and have a free slot, in
    /// store order.
    pub async fn available_rooms(&self) -> Result<Vec<BattleRoom>, ArenaError> {
        let mut rooms = self.store.list_rooms().await?;
        rooms.retain(BattleRoom::is_listed);
        Ok(rooms)
    }

    /// Joins the open room whose invite code matches `code`.
    ///
    /// The code is trimmed and upper-cased first, so `" ab3k9z "` finds
    /// `AB3K9Z`.
    pub async fn join_by_invite_code(
        &self,
        code: &str,
        profile: PlayerProfile,
    ) -> Result<BattleRoom, ArenaError> {
        let code = normalize_invite_code(code);
        let room_id = self
            .store
            .list_rooms()
            .await?
            .into_iter()
            .find(|r| r.is_open() && r.invite_code() == Some(code.as_str()))
            .map(|r| r.id())
            .ok_or(BattleError::InvalidCode(code))?;
        self.join_room(room_id, profile).await
    }

    /// Invites `to` into `room_id` on behalf of `from`.
    ///
    /// Does not check capacity or reserve a slot; the join on accept does.
    pub async fn create_invite(
        &self,
        room_id: RoomId,
        from: &PlayerProfile,
        to: &PlayerProfile,
        message: Option<String>,
    ) -> Result<BattleInvite, ArenaError> {
        let room = self.load(room_id).await?.value;
        if !room.is_open() {
            return Err(BattleError::RoomClosed {
                room_id,
                status: room.status(),
            }
            .into());
        }

        let invite_id = self.store.next_invite_id().await?;
        let invite = BattleInvite::new(
            invite_id,
            &room,
            from,
            to,
            message,
            self.now(),
            self.config.invite_ttl_ms(),
        );
        self.store.save_invite(invite.clone()).await?;

        tracing::info!(%invite_id, %room_id, from = %from.id, to = %to.id, "invite created");
        Ok(invite)
    }

    /// Every invite addressed to `player_id`, with overdue pending ones
    /// marked expired.
    pub async fn player_invites(&self, player_id: PlayerId) -> Result<Vec<BattleInvite>, ArenaError> {
        let now = self.now();
        let mut invites = self.store.invites_for_player(player_id).await?;
        for invite in &mut invites {
            if invite.refresh(now) {
                tracing::debug!(invite_id = %invite.id, "invite expired");
                self.store.save_invite(invite.clone()).await?;
            }
        }
        Ok(invites)
    }

    /// The subset of [`player_invites`](Self::player_invites) that can
    /// still be answered.
    pub async fn pending_invites(&self, player_id: PlayerId) -> Result<Vec<BattleInvite>, ArenaError> {
        let now = self.now();
        let mut invites = self.player_invites(player_id).await?;
        invites.retain(|i| i.is_actionable(now));
        Ok(invites)
    }

    /// Accepts or declines an invite.
    ///
    /// Accepting joins the room first and marks the invite `accepted` only
    /// if the join succeeded; a failed join leaves the invite pending and
    /// returns the join error. Returns the joined room on accept, `None`
    /// on decline.
    pub async fn respond_to_invite(
        &self,
        invite_id: InviteId,
        responder: &PlayerProfile,
        accept: bool,
    ) -> Result<Option<BattleRoom>, ArenaError> {
        let mut invite = self
            .store
            .load_invite(invite_id)
            .await?
            .ok_or(BattleError::InviteNotFound(invite_id))?;

        let before = invite.status;
        if let Err(err) = invite.ensure_respondable(responder.id, self.now()) {
            if invite.status != before {
                self.store.save_invite(invite).await?;
            }
            tracing::warn!(%invite_id, responder = %responder.id, %err, "invite response rejected");
            return Err(err.into());
        }

        if !accept {
            invite.status = InviteStatus::Declined;
            self.store.save_invite(invite).await?;
            tracing::info!(%invite_id, "invite declined");
            return Ok(None);
        }

        let room = self.join_room(invite.room_id, responder.clone()).await?;
        invite.status = InviteStatus::Accepted;
        // The join is already committed; a lost status write must not undo it.
        if let Err(error) = self.store.save_invite(invite).await {
            tracing::warn!(%invite_id, room_id = %room.id(), %error, "accepted invite not saved");
        }
        tracing::info!(%invite_id, room_id = %room.id(), "invite accepted");
        Ok(Some(room))
    }

    /// Deletes invites that can no longer be answered. Returns how many.
    pub async fn purge_expired_invites(&self) -> Result<usize, ArenaError> {
        let now = self.now();
        let stale: Vec<InviteId> = self
            .store
            .list_invites()
            .await?
            .into_iter()
            .filter(|i| !i.is_actionable(now))
            .map(|i| i.id)
            .collect();
        if stale.is_empty() {
            return Ok(0);
        }
        let removed = self.store.remove_invites(&stale).await?;
        tracing::info!(removed, "stale invites purged");
        Ok(removed)
    }
}
