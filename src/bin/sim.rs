//! Two in-process clients make random drags in lock-step rounds and report
//! whether their lineups still agree afterwards.

use lineup::backend::{MemoryChannel, MemoryLayoutStore};
use lineup::{
    DropOutcome, DropZone, GridShape, LineupSession, LineupStore, MemoryBackend, SyncClient, SyncConfig, SyncMode,
    SEED_ROSTER,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde_json::json;

type Session = LineupSession<MemoryChannel, MemoryLayoutStore>;

#[derive(Default)]
struct Tally {
    applied: usize,
    rejected: usize,
    replayed: usize,
    refused_replays: usize,
}

async fn random_gesture(session: &mut Session, rng: &mut SmallRng, shape: GridShape, tally: &mut Tally) -> bool {
    let def = SEED_ROSTER[rng.random_range(0..SEED_ROSTER.len())];
    let id = def.number.to_string();
    if session.pick_up(&id).is_err() {
        return false;
    }
    let zone = if rng.random_bool(0.2) {
        DropZone::Roster
    } else {
        DropZone::Cell {
            row: rng.random_range(0..shape.rows),
            col: rng.random_range(0..shape.cols),
        }
    };
    match session.drop_on(Some(zone)).await {
        DropOutcome::Applied(_) => {
            tally.applied += 1;
            true
        }
        DropOutcome::Rejected(_) => {
            tally.rejected += 1;
            false
        }
        DropOutcome::Cancelled => false,
    }
}

async fn replay_one(session: &mut Session, tally: &mut Tally) -> anyhow::Result<()> {
    if session.recv_remote().await? {
        tally.replayed += 1;
    } else {
        tally.refused_replays += 1;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed> <rounds>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let rounds: usize = args[2].parse()?;

    let shape = GridShape::STANDARD;
    let backend = MemoryBackend::new();
    let config = SyncConfig::with_mode(SyncMode::BroadcastOnly);
    let mut s1 = LineupSession::start(
        LineupStore::new(shape),
        SyncClient::new(backend.channel(), backend.layouts(), config.clone()),
    )
    .await;
    let mut s2 = LineupSession::start(
        LineupStore::new(shape),
        SyncClient::new(backend.channel(), backend.layouts(), config),
    )
    .await;

    let mut rng = SmallRng::seed_from_u64(seed);
    let (mut t1, mut t2) = (Tally::default(), Tally::default());
    for _ in 0..rounds {
        // Both gestures land before either peer hears about the other.
        let sent1 = random_gesture(&mut s1, &mut rng, shape, &mut t1).await;
        let sent2 = random_gesture(&mut s2, &mut rng, shape, &mut t2).await;
        if sent2 {
            replay_one(&mut s1, &mut t1).await?;
        }
        if sent1 {
            replay_one(&mut s2, &mut t2).await?;
        }
    }

    let converged = s1.state() == s2.state();
    let result = json!({
        "seed": seed,
        "rounds": rounds,
        "client1": {"applied": t1.applied, "rejected": t1.rejected, "replayed": t1.replayed, "refused_replays": t1.refused_replays, "on_grid": s1.store().grid().count()},
        "client2": {"applied": t2.applied, "rejected": t2.rejected, "replayed": t2.replayed, "refused_replays": t2.refused_replays, "on_grid": s2.store().grid().count()},
        "converged": converged,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
