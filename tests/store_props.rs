use lineup::layout::{decode_grid, encode_grid};
use lineup::{GridShape, LineupStore, Location, SEED_ROSTER};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Move { player: usize, row: usize, col: usize },
    Return { player: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..SEED_ROSTER.len(), 0..9usize, 0..3usize).prop_map(|(player, row, col)| Op::Move { player, row, col }),
        1 => (0..SEED_ROSTER.len()).prop_map(|player| Op::Return { player }),
    ]
}

fn id(idx: usize) -> String {
    SEED_ROSTER[idx].number.to_string()
}

fn apply(store: &mut LineupStore, op: &Op) {
    let _ = match op {
        Op::Move { player, row, col } => store.move_player(&id(*player), *row, *col).map(|_| ()),
        Op::Return { player } => store.return_player(&id(*player)).map(|_| ()),
    };
}

fn occurrences(store: &LineupStore, id: &str) -> usize {
    let on_grid = store.grid().occupied().filter(|(_, _, p)| p.id == id).count();
    let in_roster = store.roster().iter().filter(|p| p.id == id).count();
    on_grid + in_roster
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_player_sits_in_exactly_one_place(ops in prop::collection::vec(op(), 0..60)) {
        let mut store = LineupStore::new(GridShape::STANDARD);
        for op in &ops {
            apply(&mut store, op);
            prop_assert!(store.check_invariants().is_ok());
            for def in SEED_ROSTER.iter() {
                prop_assert_eq!(occurrences(&store, &def.number.to_string()), 1);
            }
        }
    }

    #[test]
    fn occupied_target_leaves_state_unchanged(
        ops in prop::collection::vec(op(), 0..40),
        mover in 0..SEED_ROSTER.len(),
        row in 0..9usize,
        col in 0..3usize,
    ) {
        let mut store = LineupStore::new(GridShape::STANDARD);
        for op in &ops {
            apply(&mut store, op);
        }
        let mover = id(mover);
        let occupant = store.grid().get(row, col).unwrap().map(|p| p.id.clone());
        if let Some(occupant) = occupant {
            if occupant != mover {
                let before = store.state();
                prop_assert!(store.move_player(&mover, row, col).is_err());
                prop_assert_eq!(&store.state(), &before);
                prop_assert!(store.move_player(&mover, row, col).is_err());
                prop_assert_eq!(store.state(), before);
            }
        }
    }

    #[test]
    fn return_twice_equals_return_once(
        ops in prop::collection::vec(op(), 0..40),
        player in 0..SEED_ROSTER.len(),
    ) {
        let mut store = LineupStore::new(GridShape::STANDARD);
        for op in &ops {
            apply(&mut store, op);
        }
        let player = id(player);
        store.return_player(&player).unwrap();
        let once = store.state();
        store.return_player(&player).unwrap();
        prop_assert_eq!(store.state(), once);
        prop_assert!(matches!(store.locate(&player), Some(Location::Roster(_))));
    }

    #[test]
    fn grid_json_roundtrip(ops in prop::collection::vec(op(), 0..60)) {
        let mut store = LineupStore::new(GridShape::STANDARD);
        for op in &ops {
            apply(&mut store, op);
        }
        let data = encode_grid(store.grid()).unwrap();
        let decoded = decode_grid(&data, Some(GridShape::STANDARD)).unwrap();
        prop_assert_eq!(&decoded, store.grid());
    }
}
