//! Core protocol types for Coindrop's wire format.
//!
//! These are the decoded forms of what travels on the wire: the identity
//! the server hands out, the board snapshots it streams, and the commands
//! the client sends back.

use std::collections::BTreeMap;
use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, assigned by the server.
///
/// Newtype wrapper so a player id can't be confused with a column index
/// or a board dimension, even though all three are `u64` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

/// `tracing::info!("{} joined", player_id)` prints "P-42 joined".
impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A coin color from the fixed palette.
///
/// On the wire a color is a single byte. `0` is reserved (it marks an
/// empty cell in the snapshot grid) and is never a valid color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    Orange = 1,
    Blue = 2,
    Red = 3,
    Yellow = 4,
    Purple = 5,
}

impl Color {
    /// Every palette entry, in wire order.
    pub const ALL: [Color; 5] = [
        Color::Orange,
        Color::Blue,
        Color::Red,
        Color::Yellow,
        Color::Purple,
    ];

    /// Decodes a color byte.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidColor`] for `0` and for any byte
    /// outside the palette.
    pub fn from_wire(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            1 => Ok(Color::Orange),
            2 => Ok(Color::Blue),
            3 => Ok(Color::Red),
            4 => Ok(Color::Yellow),
            5 => Ok(Color::Purple),
            other => Err(ProtocolError::InvalidColor(other)),
        }
    }

    /// The color's wire byte. Never `0`.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Linear RGB components in `0.0..=1.0`, for renderers.
    pub fn rgb(self) -> [f32; 3] {
        match self {
            Color::Orange => [1.0, 0.5, 0.0],
            Color::Blue => [0.0, 0.0, 1.0],
            Color::Red => [1.0, 0.0, 0.0],
            Color::Yellow => [1.0, 1.0, 0.0],
            Color::Purple => [0.5, 0.0, 1.0],
        }
    }

    /// Lowercase name, used in logs and the terminal demo.
    pub fn name(self) -> &'static str {
        match self {
            Color::Orange => "orange",
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
        }
    }
}

impl TryFrom<u8> for Color {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Color::from_wire(byte)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who the local player is. Learned once, from the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub player_id: PlayerId,
    pub color: Color,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A position on the board.
///
/// Ordered column-first, so a `BTreeMap<Cell, _>` iterates in the same
/// column-major order the wire grid uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub column: u64,
    pub row: u64,
}

impl Cell {
    pub fn new(column: u64, row: u64) -> Self {
        Self { column, row }
    }
}

/// A coin occupying one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coin {
    pub color: Color,
}

/// A full description of the board, as sent by the server.
///
/// Snapshots are never deltas: each one replaces the previous board
/// completely. Only occupied cells are stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// The winning player's id, or `0` while the game is undecided.
    pub winner_id: u64,
    pub columns: u64,
    pub rows: u64,
    pub coins: BTreeMap<Cell, Coin>,
}

impl Snapshot {
    /// An empty board of the given size with no winner.
    pub fn new(columns: u64, rows: u64) -> Self {
        Self {
            winner_id: 0,
            columns,
            rows,
            coins: BTreeMap::new(),
        }
    }

    /// Builder-style helper: places a coin. Mostly useful in tests.
    pub fn with_coin(mut self, column: u64, row: u64, color: Color) -> Self {
        self.coins.insert(Cell::new(column, row), Coin { color });
        self
    }

    /// Builder-style helper: sets the winner.
    pub fn with_winner(mut self, winner: PlayerId) -> Self {
        self.winner_id = winner.0;
        self
    }

    /// The winner, if the server declared one.
    pub fn winner(&self) -> Option<PlayerId> {
        (self.winner_id != 0).then_some(PlayerId(self.winner_id))
    }

    pub fn coin_at(&self, column: u64, row: u64) -> Option<&Coin> {
        self.coins.get(&Cell::new(column, row))
    }

    /// Number of occupied cells in `column`.
    pub fn column_height(&self, column: u64) -> usize {
        self.coins
            .range(Cell::new(column, 0)..=Cell::new(column, u64::MAX))
            .count()
    }

    /// The row a coin dropped into `column` would land in.
    ///
    /// Rows are indexed as on the wire and coins fall towards the highest
    /// index, so the first free row is searched from `rows - 1` down.
    /// Returns `None` for a full column or a column outside the board.
    /// The server stays authoritative; this only predicts the drop.
    pub fn next_free_row(&self, column: u64) -> Option<u64> {
        if column >= self.columns {
            return None;
        }
        (0..self.rows)
            .rev()
            .find(|&row| self.coin_at(column, row).is_none())
    }
}

// ---------------------------------------------------------------------------
// Frames, views, and commands
// ---------------------------------------------------------------------------

/// The three frame shapes, identified by their leading tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Handshake,
    Snapshot,
    Command,
}

impl FrameKind {
    /// The leading byte that identifies this frame on the wire.
    pub fn tag(self) -> u8 {
        match self {
            FrameKind::Handshake => 0,
            FrameKind::Snapshot => 1,
            FrameKind::Command => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FrameKind::Handshake),
            1 => Some(FrameKind::Snapshot),
            2 => Some(FrameKind::Command),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Handshake => f.write_str("handshake"),
            FrameKind::Snapshot => f.write_str("snapshot"),
            FrameKind::Command => f.write_str("command"),
        }
    }
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Handshake(PlayerIdentity),
    Snapshot(Snapshot),
    Command(Command),
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Handshake(_) => FrameKind::Handshake,
            Frame::Snapshot(_) => FrameKind::Snapshot,
            Frame::Command(_) => FrameKind::Command,
        }
    }
}

/// An event delivered to the UI, in the order the server sent it.
///
/// Exactly one `Joined` starts every session; any number of `Snapshot`s
/// follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Joined(PlayerIdentity),
    Snapshot(Snapshot),
}

/// A player action sent from client to server.
///
/// The server decides whether the action is legal; the client sends it
/// and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Drop a coin into `column` (0-based).
    PlayCoin { column: u64 },
}
