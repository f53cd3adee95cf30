//! Direct invites and private-room invite codes.

use std::fmt;

use quizarena_protocol::{InviteId, Millis, PlayerId, RoomId};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{BattleError, BattleMode, BattleRoom, PlayerProfile};

/// Characters invite codes are drawn from. Excludes `0/O` and `1/I`,
/// which people misread when typing a code.
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates a random invite code of `len` characters.
///
/// Uniqueness is not checked here; the engine regenerates on collision.
pub fn generate_invite_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| INVITE_CODE_ALPHABET[rng.random_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}

/// How many distinct codes of `len` characters exist, or `None` when the
/// count does not fit in a `u64`.
pub fn invite_code_space(len: usize) -> Option<u64> {
    let len = u32::try_from(len).ok()?;
    (INVITE_CODE_ALPHABET.len() as u64).checked_pow(len)
}

/// The `index`-th code of `len` characters, counting in alphabet order.
///
/// Lets a small code space be listed exhaustively: `0..space` maps onto
/// every code exactly once.
pub fn invite_code_at(mut index: u64, len: usize) -> String {
    let base = INVITE_CODE_ALPHABET.len() as u64;
    let mut code = vec![INVITE_CODE_ALPHABET[0]; len];
    for slot in code.iter_mut().rev() {
        *slot = INVITE_CODE_ALPHABET[(index % base) as usize];
        index /= base;
    }
    code.into_iter().map(char::from).collect()
}

/// Canonical form of a user-typed code: trimmed and upper-cased.
pub fn normalize_invite_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

// ---------------------------------------------------------------------------
// InviteStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a direct invite.
///
/// ```text
/// Pending ──(accept)──→ Accepted
///    ├─────(decline)──→ Declined
///    └─────(read after expires_at)──→ Expired
/// ```
///
/// Only `Pending` is ever re-evaluated; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InviteStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

// ---------------------------------------------------------------------------
// BattleInvite
// ---------------------------------------------------------------------------

/// A time-boxed invitation from one player to another to join a room.
///
/// Creating an invite does not reserve a slot in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleInvite {
    pub id: InviteId,
    pub room_id: RoomId,
    pub from_player_id: PlayerId,
    pub from_player_name: String,
    pub to_player_id: PlayerId,
    pub to_player_name: String,
    pub mode: BattleMode,
    pub message: Option<String>,
    pub created_at: Millis,
    pub expires_at: Millis,
    pub status: InviteStatus,
}

impl BattleInvite {
    /// Creates a pending invite valid for `ttl_ms` from `now`.
    pub fn new(
        id: InviteId,
        room: &BattleRoom,
        from: &PlayerProfile,
        to: &PlayerProfile,
        message: Option<String>,
        now: Millis,
        ttl_ms: u64,
    ) -> Self {
        Self {
            id,
            room_id: room.id(),
            from_player_id: from.id,
            from_player_name: from.name.clone(),
            to_player_id: to.id,
            to_player_name: to.name.clone(),
            mode: room.mode(),
            message,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
            status: InviteStatus::Pending,
        }
    }

    /// Flips an overdue pending invite to `Expired`.
    ///
    /// Returns `true` if the status changed, so callers know to persist.
    pub fn refresh(&mut self, now: Millis) -> bool {
        if self.status == InviteStatus::Pending && now >= self.expires_at {
            self.status = InviteStatus::Expired;
            return true;
        }
        false
    }

    /// Returns `true` if the invite can still be accepted or declined.
    pub fn is_actionable(&self, now: Millis) -> bool {
        self.status == InviteStatus::Pending && now < self.expires_at
    }

    /// Checks that `responder` may answer this invite right now.
    ///
    /// Refreshes first, so an overdue invite comes back as
    /// [`BattleError::InviteExpired`] with its status already flipped.
    pub fn ensure_respondable(&mut self, responder: PlayerId, now: Millis) -> Result<(), BattleError> {
        if responder != self.to_player_id {
            return Err(BattleError::NotInvitee {
                player_id: responder,
                invite_id: self.id,
            });
        }
        if self.refresh(now) {
            return Err(BattleError::InviteExpired(self.id));
        }
        match self.status {
            InviteStatus::Pending => Ok(()),
            InviteStatus::Expired => Err(BattleError::InviteExpired(self.id)),
            status => Err(BattleError::InviteResolved {
                invite_id: self.id,
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoomSettings;

    const TTL: u64 = 5 * 60 * 1_000;

    fn invite(now: Millis) -> BattleInvite {
        let room = BattleRoom::new(
            RoomId(1),
            PlayerId(1),
            BattleMode::OneVsOne,
            RoomSettings::default(),
            None,
            now,
        );
        BattleInvite::new(
            InviteId(1),
            &room,
            &PlayerProfile::new(PlayerId(1), "host"),
            &PlayerProfile::new(PlayerId(2), "guest"),
            Some("duel?".into()),
            now,
            TTL,
        )
    }

    #[test]
    fn test_generate_invite_code_uses_alphabet() {
        let code = generate_invite_code(&mut rand::rng(), 6);
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| INVITE_CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_invite_code_space_counts_and_overflows() {
        assert_eq!(invite_code_space(1), Some(32));
        assert_eq!(invite_code_space(6), Some(1 << 30));
        assert_eq!(invite_code_space(13), None);
    }

    #[test]
    fn test_invite_code_at_enumerates_in_alphabet_order() {
        assert_eq!(invite_code_at(0, 2), "AA");
        assert_eq!(invite_code_at(33, 2), "BB");
        assert_eq!(invite_code_at(31, 1), "9");
        let all: std::collections::HashSet<_> = (0..32).map(|i| invite_code_at(i, 1)).collect();
        assert_eq!(all.len(), 32);
    }

    #[test]
    fn test_normalize_invite_code_trims_and_uppercases() {
        assert_eq!(normalize_invite_code("  ab3k9z \n"), "AB3K9Z");
    }

    #[test]
    fn test_new_invite_expires_after_ttl() {
        let inv = invite(1_000);
        assert_eq!(inv.status, InviteStatus::Pending);
        assert_eq!(inv.expires_at, 1_000 + TTL);
        assert_eq!(inv.mode, BattleMode::OneVsOne);
    }

    #[test]
    fn test_refresh_expires_overdue_pending() {
        let mut inv = invite(0);
        assert!(!inv.refresh(TTL - 1));
        assert!(inv.refresh(TTL));
        assert_eq!(inv.status, InviteStatus::Expired);
        assert!(!inv.refresh(TTL + 1), "terminal status is not re-evaluated");
    }

    #[test]
    fn test_refresh_leaves_terminal_status_alone() {
        let mut inv = invite(0);
        inv.status = InviteStatus::Declined;
        assert!(!inv.refresh(TTL * 2));
        assert_eq!(inv.status, InviteStatus::Declined);
    }

    #[test]
    fn test_ensure_respondable_rejects_other_player() {
        let mut inv = invite(0);
        let err = inv.ensure_respondable(PlayerId(3), 10).unwrap_err();
        assert!(matches!(err, BattleError::NotInvitee { .. }));
    }

    #[test]
    fn test_ensure_respondable_overdue_is_expired() {
        let mut inv = invite(0);
        let err = inv.ensure_respondable(PlayerId(2), TTL + 5).unwrap_err();
        assert_eq!(err, BattleError::InviteExpired(InviteId(1)));
        assert_eq!(inv.status, InviteStatus::Expired);
    }

    #[test]
    fn test_ensure_respondable_resolved_invite() {
        let mut inv = invite(0);
        inv.status = InviteStatus::Accepted;
        let err = inv.ensure_respondable(PlayerId(2), 10).unwrap_err();
        assert!(matches!(
            err,
            BattleError::InviteResolved { status: InviteStatus::Accepted, .. }
        ));
    }
}
