#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod common;
pub mod config;
pub mod drag;
mod grid;
mod mutation;
mod player;
pub mod prelude;
mod store;

#[cfg(feature = "std")]
pub mod backend;
#[cfg(feature = "std")]
pub mod console;
#[cfg(feature = "std")]
pub mod hub;
#[cfg(feature = "std")]
pub mod layout;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod sync;
#[cfg(feature = "std")]
pub mod transport;
#[cfg(feature = "std")]
pub mod ui;

pub use common::*;
pub use config::*;
pub use drag::{DragController, DragState, DropOutcome, DropZone};
pub use grid::Grid;
pub use mutation::Mutation;
pub use player::*;
pub use store::*;

#[cfg(feature = "std")]
pub use backend::{BroadcastChannel, LayoutStore, MemoryBackend, StoreError};
#[cfg(feature = "std")]
pub use drag::DragGestures;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use protocol::{LayoutRow, PROTOCOL_VERSION};
#[cfg(feature = "std")]
pub use session::LineupSession;
#[cfg(feature = "std")]
pub use sync::{Alert, LoadOutcome, SaveOutcome, SyncClient, SyncConfig, SyncMode};
#[cfg(feature = "std")]
pub use transport::tcp::TcpTransport;
