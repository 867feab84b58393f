use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lineup::{
    backend::remote, console::run_console, hub::Hub, hub::HubConfig, init_logging, GridShape,
    LineupSession, LineupStore, MemoryBackend, SyncClient, SyncConfig, SyncMode,
};

#[derive(Parser)]
#[command(author, version, about = "Arrange a team lineup and keep it in sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// Broadcast moves only.
    Broadcast,
    /// Broadcast plus save/load by name.
    Layouts,
    /// Layouts plus a live snapshot restored on startup.
    Live,
}

impl From<ModeArg> for SyncMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Broadcast => SyncMode::BroadcastOnly,
            ModeArg::Layouts => SyncMode::Layouts,
            ModeArg::Live => SyncMode::Live,
        }
    }
}

#[derive(Parser)]
enum Commands {
    /// Host the shared channel and layouts table.
    Hub {
        #[arg(long, default_value = "0.0.0.0:7400")]
        bind: String,
        #[arg(long, env = "LINEUP_KEY")]
        key: String,
        #[arg(long, help = "Persist saved layouts to this JSON file")]
        data: Option<PathBuf>,
    },
    /// Join a hub and edit the shared lineup.
    Client {
        #[arg(long, env = "LINEUP_ENDPOINT", default_value = "127.0.0.1:7400")]
        endpoint: String,
        #[arg(long, env = "LINEUP_KEY")]
        key: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Live)]
        mode: ModeArg,
        #[arg(long, help = "Two slots per position instead of three")]
        compact: bool,
    },
    /// Edit a lineup against an in-process backend.
    Local {
        #[arg(long, help = "Two slots per position instead of three")]
        compact: bool,
    },
}

fn shape(compact: bool) -> GridShape {
    if compact {
        GridShape::COMPACT
    } else {
        GridShape::STANDARD
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Hub { bind, key, data } => {
            let hub = Hub::bind(HubConfig {
                bind,
                access_key: key,
                data_file: data,
            })
            .await?;
            println!("Hub listening on {}", hub.local_addr()?);
            hub.run().await?;
        }
        Commands::Client {
            endpoint,
            key,
            mode,
            compact,
        } => {
            let config = SyncConfig::with_mode(mode.into());
            println!("Connecting to {}...", endpoint);
            let (channel, layouts) = remote::connect(&endpoint, &key, &config.topic).await?;
            let sync = SyncClient::new(channel, layouts, config);
            let session = LineupSession::start(LineupStore::new(shape(compact)), sync).await;
            run_console(session).await?;
        }
        Commands::Local { compact } => {
            let backend = MemoryBackend::new();
            let sync = SyncClient::new(backend.channel(), backend.layouts(), SyncConfig::with_mode(SyncMode::Live));
            let session = LineupSession::start(LineupStore::new(shape(compact)), sync).await;
            run_console(session).await?;
        }
    }
    Ok(())
}
