//! Wire protocol for Coindrop.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Types** ([`View`], [`Snapshot`], [`Command`], [`Color`], etc.):
//!   the decoded form of every frame.
//! - **Codec** ([`decode_handshake`], [`decode_snapshot`],
//!   [`encode_command`], ...): pure functions between those types and
//!   the fixed big-endian binary layout.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw chunks) and session
//! (the handshake, the view stream, the command channel). It doesn't know
//! about connections or locks; it only knows how to read and write frames.
//!
//! ```text
//! Transport (chunks) → Protocol (Frame / View) → Session (ordered views)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{
    decode_command, decode_frame, decode_handshake, decode_snapshot,
    decode_u64_be, encode_command, encode_handshake, encode_snapshot,
    encode_u64_be, COMMAND_LEN, HANDSHAKE_LEN, SNAPSHOT_HEADER_LEN,
};
pub use error::ProtocolError;
pub use types::{
    Cell, Coin, Color, Command, Frame, FrameKind, PlayerId, PlayerIdentity,
    Snapshot, View,
};
