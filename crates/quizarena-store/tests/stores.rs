//! Behaviour shared by every store implementation, plus file persistence.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use quizarena_protocol::{InviteId, PlayerId, RoomId};
use quizarena_room::{BattleInvite, BattleMode, BattleRoom, InviteStatus, PlayerProfile, RoomSettings};
use quizarena_store::{
    ActiveRoomIndex, InviteStore, JsonFileStore, MemoryStore, RoomStore, StoreError,
};

// =========================================================================
// Helpers
// =========================================================================

fn room(id: RoomId) -> BattleRoom {
    BattleRoom::new(id, PlayerId(1), BattleMode::TwoVsTwo, RoomSettings::default(), None, 0)
}

fn invite(id: InviteId, room: &BattleRoom, to: u64) -> BattleInvite {
    BattleInvite::new(
        id,
        room,
        &PlayerProfile::new(PlayerId(1), "host"),
        &PlayerProfile::new(PlayerId(to), "guest"),
        None,
        0,
        1_000,
    )
}

/// A fresh file path under the system temp dir.
fn temp_path(name: &str) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "quizarena-store-{}-{name}-{n}.json",
        std::process::id()
    ))
}

async fn exercise_rooms<S: RoomStore>(store: &S) {
    let id = store.next_room_id().await.unwrap();
    assert_eq!(store.save_room(room(id), None).await.unwrap(), 1);

    let loaded = store.load_room(id).await.unwrap().unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.value.id(), id);

    assert_eq!(store.save_room(loaded.value.clone(), Some(1)).await.unwrap(), 2);
    let stale = store.save_room(loaded.value, Some(1)).await.unwrap_err();
    assert!(matches!(stale, StoreError::Conflict { found: Some(2), .. }));

    let other = store.next_room_id().await.unwrap();
    assert_ne!(other, id);
    store.save_room(room(other), None).await.unwrap();
    let ids: Vec<_> = store.list_rooms().await.unwrap().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![id, other]);

    assert!(store.load_room(RoomId(999)).await.unwrap().is_none());
}

async fn exercise_invites<S: InviteStore>(store: &S) {
    let r = room(RoomId(1));
    let a = store.next_invite_id().await.unwrap();
    let b = store.next_invite_id().await.unwrap();
    store.save_invite(invite(a, &r, 2)).await.unwrap();
    store.save_invite(invite(b, &r, 3)).await.unwrap();

    let mine = store.invites_for_player(PlayerId(2)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, a);

    let mut declined = store.load_invite(b).await.unwrap().unwrap();
    declined.status = InviteStatus::Declined;
    store.save_invite(declined).await.unwrap();
    assert_eq!(
        store.load_invite(b).await.unwrap().unwrap().status,
        InviteStatus::Declined
    );

    assert_eq!(store.remove_invites(&[b, InviteId(77)]).await.unwrap(), 1);
    assert_eq!(store.list_invites().await.unwrap().len(), 1);
}

async fn exercise_active<S: ActiveRoomIndex>(store: &S) {
    let p = PlayerId(5);
    assert_eq!(store.active_room(p).await.unwrap(), None);
    store.set_active_room(p, RoomId(1)).await.unwrap();
    store.set_active_room(p, RoomId(2)).await.unwrap();
    assert!(!store.clear_active_room(p, RoomId(1)).await.unwrap());
    assert_eq!(store.active_room(p).await.unwrap(), Some(RoomId(2)));
    assert!(store.clear_active_room(p, RoomId(2)).await.unwrap());
    assert_eq!(store.active_room(p).await.unwrap(), None);
}

// =========================================================================
// MemoryStore
// =========================================================================

#[tokio::test]
async fn test_memory_store_rooms() {
    exercise_rooms(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_memory_store_invites() {
    exercise_invites(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_memory_store_active_rooms() {
    exercise_active(&MemoryStore::new()).await;
}

// =========================================================================
// JsonFileStore
// =========================================================================

#[tokio::test]
async fn test_json_store_rooms() {
    let path = temp_path("rooms");
    exercise_rooms(&JsonFileStore::open(&path).await.unwrap()).await;
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_json_store_invites() {
    let path = temp_path("invites");
    exercise_invites(&JsonFileStore::open(&path).await.unwrap()).await;
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_json_store_active_rooms() {
    let path = temp_path("active");
    exercise_active(&JsonFileStore::open(&path).await.unwrap()).await;
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_json_store_persists_across_reopen() {
    let path = temp_path("reopen");
    let room_id;
    {
        let store = JsonFileStore::open(&path).await.unwrap();
        room_id = store.next_room_id().await.unwrap();
        store.save_room(room(room_id), None).await.unwrap();
        store.set_active_room(PlayerId(9), room_id).await.unwrap();
        let inv = store.next_invite_id().await.unwrap();
        store.save_invite(invite(inv, &room(room_id), 9)).await.unwrap();
    }

    let reopened = JsonFileStore::open(&path).await.unwrap();
    let loaded = reopened.load_room(room_id).await.unwrap().unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.value.mode(), BattleMode::TwoVsTwo);
    assert_eq!(reopened.active_room(PlayerId(9)).await.unwrap(), Some(room_id));
    assert_eq!(reopened.invites_for_player(PlayerId(9)).await.unwrap().len(), 1);
    assert_ne!(reopened.next_room_id().await.unwrap(), room_id);

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_json_store_rejects_corrupt_document() {
    let path = temp_path("corrupt");
    std::fs::write(&path, b"{ not json").unwrap();
    let err = JsonFileStore::open(&path).await.unwrap_err();
    assert!(matches!(err, StoreError::Codec(_)));
    let _ = std::fs::remove_file(path);
}
