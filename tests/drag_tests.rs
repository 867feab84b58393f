use lineup::{
    DragController, DragState, DropOutcome, DropZone, GridShape, LineupError, LineupStore, Mutation, Player,
};

fn store() -> LineupStore {
    LineupStore::new(GridShape::STANDARD)
}

#[test]
fn pick_up_finds_roster_players() {
    let store = store();
    let mut drag = DragController::new();
    assert_eq!(drag.state(), &DragState::Idle);
    let active = drag.pick_up(&store, "14").unwrap().clone();
    assert_eq!(active, Player::new("14", 14, "BUCHMASSER"));
    assert!(drag.is_dragging());
}

#[test]
fn pick_up_prefers_the_grid_copy() {
    let mut store = store();
    store.move_player("14", 0, 0).unwrap();
    let mut drag = DragController::new();
    drag.pick_up(&store, "14").unwrap();
    assert_eq!(drag.active().map(|p| p.id.as_str()), Some("14"));
}

#[test]
fn pick_up_unknown_id_stays_idle() {
    let store = store();
    let mut drag = DragController::new();
    assert_eq!(
        drag.pick_up(&store, "0").unwrap_err(),
        LineupError::UnknownPlayer("0".to_string())
    );
    assert!(!drag.is_dragging());
}

#[test]
fn drop_on_cell_emits_move() {
    let mut store = store();
    let mut drag = DragController::new();
    drag.pick_up(&store, "15").unwrap();
    let outcome = drag.drop_on_zone(&mut store, Some("2-1"));
    match outcome {
        DropOutcome::Applied(Mutation::Move { id, row, col, player }) => {
            assert_eq!((id.as_str(), row, col), ("15", 2, 1));
            assert_eq!(player.name, "POGGENPOEL");
        }
        other => panic!("expected a move, got {:?}", other),
    }
    assert_eq!(drag.state(), &DragState::Idle);
    assert!(!store.roster().iter().any(|p| p.id == "15"));
}

#[test]
fn drop_on_roster_emits_return() {
    let mut store = store();
    store.move_player("15", 0, 0).unwrap();
    let mut drag = DragController::new();
    drag.pick_up(&store, "15").unwrap();
    let outcome = drag.drop_on(&mut store, Some(DropZone::Roster));
    assert!(matches!(
        outcome.mutation(),
        Some(Mutation::Return { id, .. }) if id == "15"
    ));
    assert!(store.grid().is_empty());
}

#[test]
fn dropping_a_roster_player_on_the_roster_still_emits_one_return() {
    let mut store = store();
    let before = store.state();
    let mut drag = DragController::new();
    drag.pick_up(&store, "6").unwrap();
    let outcome = drag.drop_on_zone(&mut store, Some("player-list"));
    assert!(matches!(outcome, DropOutcome::Applied(Mutation::Return { .. })));
    assert_eq!(store.state(), before);
}

#[test]
fn occupied_cell_rejects_without_mutation() {
    let mut store = store();
    store.move_player("15", 0, 0).unwrap();
    store.move_player("6", 1, 0).unwrap();
    let before = store.state();

    let mut drag = DragController::new();
    drag.pick_up(&store, "6").unwrap();
    let outcome = drag.drop_on_zone(&mut store, Some("0-0"));
    assert!(matches!(outcome, DropOutcome::Rejected(LineupError::OccupiedCell { .. })));
    assert!(outcome.mutation().is_none());
    assert_eq!(store.state(), before);
    assert_eq!(drag.state(), &DragState::Idle);
}

#[test]
fn no_target_cancels() {
    let mut store = store();
    let before = store.state();
    let mut drag = DragController::new();

    drag.pick_up(&store, "15").unwrap();
    assert_eq!(drag.drop_on_zone(&mut store, None), DropOutcome::Cancelled);

    drag.pick_up(&store, "15").unwrap();
    assert_eq!(drag.drop_on_zone(&mut store, Some("touchline")), DropOutcome::Cancelled);

    drag.pick_up(&store, "15").unwrap();
    assert_eq!(drag.drop_on_zone(&mut store, Some("9-0")), DropOutcome::Cancelled);

    assert_eq!(store.state(), before);
    assert_eq!(drag.state(), &DragState::Idle);
}

#[test]
fn drop_while_idle_is_cancelled() {
    let mut store = store();
    let mut drag = DragController::new();
    assert_eq!(drag.drop_on_zone(&mut store, Some("0-0")), DropOutcome::Cancelled);
    assert!(store.grid().is_empty());
}

#[test]
fn cancel_discards_the_drag() {
    let store = store();
    let mut drag = DragController::new();
    drag.pick_up(&store, "15").unwrap();
    drag.cancel();
    assert_eq!(drag.state(), &DragState::Idle);
}
