use lineup::backend::{BroadcastChannel, LayoutStore, MemoryChannel, MemoryLayoutStore};
use lineup::layout::{encode_grid, layout_row};
use lineup::{
    Alert, DragGestures, DropOutcome, Grid, GridShape, LayoutRow, LineupSession, LineupStore, LoadOutcome,
    Location, MemoryBackend, Mutation, Player, SaveOutcome, SyncClient, SyncConfig, SyncMode,
};
use tokio::time::{timeout, Duration};

type Session = LineupSession<MemoryChannel, MemoryLayoutStore>;

async fn session(backend: &MemoryBackend, mode: SyncMode) -> Session {
    let sync = SyncClient::new(backend.channel(), backend.layouts(), SyncConfig::with_mode(mode));
    LineupSession::start(LineupStore::new(GridShape::STANDARD), sync).await
}

#[tokio::test]
async fn local_drop_is_replayed_on_peer() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::Layouts).await;
    let mut bob = session(&backend, SyncMode::Layouts).await;

    alice.on_pick_up("15").await.unwrap();
    let outcome = alice.on_drop(Some("0-2")).await;
    assert!(matches!(outcome, DropOutcome::Applied(Mutation::Move { .. })));

    assert!(bob.recv_remote().await.unwrap());
    assert_eq!(bob.store().locate("15"), Some(Location::Cell { row: 0, col: 2 }));
    assert_eq!(alice.state(), bob.state());

    alice.return_player("15").await.unwrap();
    assert!(bob.recv_remote().await.unwrap());
    assert_eq!(alice.state(), bob.state());
}

#[tokio::test]
async fn renamed_player_keeps_new_name_on_peer_after_move() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::Live).await;
    let mut bob = session(&backend, SyncMode::Live).await;

    alice.rename_player("15", "RENAMED").await.unwrap();
    alice.on_pick_up("15").await.unwrap();
    alice.on_drop(Some("0-0")).await;

    assert!(bob.recv_remote().await.unwrap());
    assert_eq!(bob.store().grid().get(0, 0).unwrap().unwrap().name, "RENAMED");
    assert_eq!(alice.state(), bob.state());

    // Bob's own later move keeps the new name in the live snapshot.
    bob.move_player("6", 1, 0).await.unwrap();
    let late = session(&backend, SyncMode::Live).await;
    assert_eq!(late.store().find_player("15").unwrap().name, "RENAMED");

    // Returning the player keeps the name too.
    bob.return_player("15").await.unwrap();
    assert_eq!(bob.store().find_player("15").unwrap().name, "RENAMED");
}

#[tokio::test]
async fn replays_are_not_rebroadcast() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::BroadcastOnly).await;
    let mut bob = session(&backend, SyncMode::BroadcastOnly).await;

    alice.move_player("6", 1, 1).await.unwrap();
    bob.recv_remote().await.unwrap();

    // Bob's replay must not echo back to Alice.
    let echoed = timeout(Duration::from_millis(100), alice.recv_remote()).await;
    assert!(echoed.is_err());
}

#[tokio::test]
async fn rejected_and_cancelled_drops_emit_nothing() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::BroadcastOnly).await;
    let mut watcher = backend.channel();

    alice.move_player("15", 0, 0).await.unwrap();
    assert!(timeout(Duration::from_millis(100), watcher.recv()).await.is_ok());

    let outcome = alice.move_player("6", 0, 0).await.unwrap();
    assert!(matches!(outcome, DropOutcome::Rejected(_)));
    alice.on_pick_up("6").await.unwrap();
    assert_eq!(alice.on_drop(None).await, DropOutcome::Cancelled);

    assert!(timeout(Duration::from_millis(100), watcher.recv()).await.is_err());
}

#[tokio::test]
async fn subscribers_see_every_change() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::BroadcastOnly).await;
    let mut view = alice.subscribe();

    alice.move_player("3", 4, 0).await.unwrap();
    assert!(view.has_changed().unwrap());
    let seen = view.borrow_and_update().clone();
    assert_eq!(seen.grid.get(4, 0).unwrap().map(|p| p.id.as_str()), Some("3"));

    alice.rename_player("3", "WILDE").await.unwrap();
    assert_eq!(view.borrow_and_update().grid.get(4, 0).unwrap().unwrap().name, "WILDE");
}

#[tokio::test]
async fn peer_replay_onto_occupied_cell_is_skipped() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::BroadcastOnly).await;
    let mut bob = session(&backend, SyncMode::BroadcastOnly).await;

    // Concurrent edits: both fill 0-0 before hearing from each other.
    alice.move_player("15", 0, 0).await.unwrap();
    bob.move_player("6", 0, 0).await.unwrap();

    assert!(!alice.recv_remote().await.unwrap());
    assert!(!bob.recv_remote().await.unwrap());
    assert_ne!(alice.state(), bob.state());
}

#[tokio::test]
async fn undecodable_peer_payloads_are_skipped() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::BroadcastOnly).await;
    let mut rogue = backend.channel();

    rogue.publish("drag", "{not json".to_string()).await.unwrap();
    rogue.publish("cursor", "{}".to_string()).await.unwrap();
    let good = Mutation::Return {
        id: "1".to_string(),
        player: None,
    };
    rogue.publish("drag", good.to_json().unwrap()).await.unwrap();

    assert!(alice.recv_remote().await.unwrap());
    assert!(timeout(Duration::from_millis(100), alice.recv_remote()).await.is_err());
}

#[tokio::test]
async fn publish_failure_keeps_local_state() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::Live).await;
    backend.set_offline(true);

    let outcome = alice.move_player("15", 0, 0).await.unwrap();
    assert!(matches!(outcome, DropOutcome::Applied(_)));
    assert_eq!(alice.store().locate("15"), Some(Location::Cell { row: 0, col: 0 }));
}

#[tokio::test]
async fn save_rejects_duplicate_names_without_writing() {
    let backend = MemoryBackend::new();
    let layouts = backend.layouts();
    layouts.insert(LayoutRow::new("X", "[]")).await.unwrap();

    let mut alice = session(&backend, SyncMode::Layouts).await;
    assert_eq!(alice.sync().saved_names(), &["X".to_string()]);

    alice.move_player("15", 0, 0).await.unwrap();
    let outcome = alice.save_layout("X").await;
    assert_eq!(outcome, SaveOutcome::Alerted(Alert::DuplicateName("X".to_string())));
    assert_eq!(layouts.fetch("X").await.unwrap().unwrap().data, "[]");
}

#[tokio::test]
async fn save_catches_names_created_by_peers() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::Layouts).await;
    backend.layouts().insert(LayoutRow::new("round-2", "[]")).await.unwrap();

    let outcome = alice.save_layout("round-2").await;
    assert_eq!(
        outcome,
        SaveOutcome::Alerted(Alert::DuplicateName("round-2".to_string()))
    );
}

#[tokio::test]
async fn save_refuses_blank_and_reserved_names() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::Live).await;
    assert_eq!(alice.save_layout("   ").await, SaveOutcome::Alerted(Alert::InvalidName));
    assert_eq!(
        alice.save_layout("live").await,
        SaveOutcome::Alerted(Alert::DuplicateName("live".to_string()))
    );

    let mut plain = session(&backend, SyncMode::BroadcastOnly).await;
    assert_eq!(plain.save_layout("x").await, SaveOutcome::Alerted(Alert::LayoutsDisabled));
}

#[tokio::test]
async fn save_then_load_restores_the_grid() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::Layouts).await;

    alice.move_player("15", 0, 0).await.unwrap();
    alice.move_player("6", 8, 2).await.unwrap();
    let saved_grid = alice.store().grid().clone();
    assert_eq!(alice.save_layout("first").await, SaveOutcome::Saved);
    assert_eq!(alice.sync().saved_names(), &["first".to_string()]);

    alice.return_player("15").await.unwrap();
    alice.move_player("33", 3, 1).await.unwrap();

    let outcome = alice.load_layout("first").await;
    assert!(matches!(outcome, LoadOutcome::Loaded(_)));
    assert_eq!(alice.store().grid(), &saved_grid);
    assert!(matches!(alice.store().locate("33"), Some(Location::Roster(_))));
    alice.store().check_invariants().unwrap();
}

#[tokio::test]
async fn load_of_malformed_or_missing_layout_keeps_state() {
    let backend = MemoryBackend::new();
    let layouts = backend.layouts();
    layouts.insert(LayoutRow::new("broken", "{oops")).await.unwrap();
    let compact = layout_row("compact", &Grid::new(GridShape::COMPACT)).unwrap();
    layouts.insert(compact).await.unwrap();

    let mut alice = session(&backend, SyncMode::Layouts).await;
    alice.move_player("15", 0, 0).await.unwrap();
    let before = alice.state();

    assert_eq!(alice.load_layout("broken").await, LoadOutcome::Malformed);
    assert_eq!(alice.load_layout("compact").await, LoadOutcome::Malformed);
    assert_eq!(alice.load_layout("nope").await, LoadOutcome::Missing);
    backend.set_offline(true);
    assert_eq!(alice.load_layout("compact").await, LoadOutcome::Failed);
    assert_eq!(alice.state(), before);
}

#[tokio::test]
async fn live_mode_restores_snapshot_on_start() {
    let backend = MemoryBackend::new();
    let mut alice = session(&backend, SyncMode::Live).await;
    alice.move_player("15", 0, 0).await.unwrap();
    alice.move_player("6", 2, 1).await.unwrap();
    alice.rename_player("6", "SAWYER").await.unwrap();

    let late = session(&backend, SyncMode::Live).await;
    assert_eq!(late.store().grid(), alice.store().grid());
    assert_eq!(late.store().find_player("6").unwrap().name, "SAWYER");
    assert_eq!(late.store().roster().len(), 29);
    assert!(!late.sync().saved_names().contains(&"live".to_string()));
}

#[tokio::test]
async fn live_mode_survives_corrupt_snapshot() {
    let backend = MemoryBackend::new();
    backend.layouts().upsert(LayoutRow::new("live", "[[1,2,3]]")).await.unwrap();
    let alice = session(&backend, SyncMode::Live).await;
    assert!(alice.store().grid().is_empty());
    assert_eq!(alice.store().roster().len(), 31);
}

#[tokio::test]
async fn non_live_modes_ignore_the_snapshot() {
    let backend = MemoryBackend::new();
    let mut grid = Grid::new(GridShape::STANDARD);
    grid.set(0, 0, Player::new("15", 15, "POGGENPOEL")).unwrap();
    backend
        .layouts()
        .upsert(LayoutRow::new("live", encode_grid(&grid).unwrap()))
        .await
        .unwrap();

    let alice = session(&backend, SyncMode::Layouts).await;
    assert!(alice.store().grid().is_empty());
}
