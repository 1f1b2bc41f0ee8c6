//! # Coindrop
//!
//! Client-side stream synchronization for two-player coin-drop games.
//!
//! The server is authoritative. The client connects, learns its player id
//! and color from a handshake, then receives full board snapshots in
//! order. Moves go out as single-column commands; the next snapshot says
//! whether they landed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coindrop::prelude::*;
//!
//! # async fn run() -> Result<(), CoindropError> {
//! let client = CoindropClientBuilder::new()
//!     .endpoint("ws://127.0.0.1:4001")
//!     .connect(&WebSocketTransport)
//!     .await?;
//!
//! let mut stream = client.view_stream();
//! let result = stream
//!     .run(|view, session| match view {
//!         View::Joined(me) => println!("playing as {} ({})", me.player_id, me.color),
//!         View::Snapshot(_) if session.is_winner() => println!("you win"),
//!         View::Snapshot(board) => println!("{} coins on the board", board.coins.len()),
//!     })
//!     .await;
//!
//! client.disconnect().await?;
//! result?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{load_config, CoindropClient, CoindropClientBuilder};
pub use error::CoindropError;

pub use coindrop_protocol as protocol;
pub use coindrop_session as session;
pub use coindrop_transport as transport;

/// Everything a typical client needs, in one import.
pub mod prelude {
    pub use crate::{load_config, CoindropClient, CoindropClientBuilder, CoindropError};
    pub use coindrop_protocol::{
        Cell, Coin, Color, Command, PlayerId, PlayerIdentity, Snapshot, View,
    };
    pub use coindrop_session::{
        CancelHandle, ClientConfig, CommandChannel, Session, SessionError, StreamState,
        ViewStream,
    };
    pub use coindrop_transport::memory::{MemoryPeer, MemoryTransport};
    pub use coindrop_transport::{Transport, TransportError, WebSocketTransport};
}
