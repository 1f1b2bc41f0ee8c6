//! Session state: what the client has learned from the server so far.
//!
//! A [`Session`] is the one piece of mutable game state on the client. The
//! [`ViewStream`](crate::ViewStream) owns it and updates it before every
//! delivery, then lends it to the subscriber by shared reference. Because
//! only the reader flow ever mutates it, no lock is involved.

use coindrop_protocol::{PlayerIdentity, Snapshot, View};

/// The client's view of the current game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<PlayerIdentity>,
    board: Option<Snapshot>,
    snapshots_applied: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The local player's id and color, once the handshake is done.
    pub fn identity(&self) -> Option<&PlayerIdentity> {
        self.identity.as_ref()
    }

    /// The latest board, if a snapshot has arrived.
    pub fn board(&self) -> Option<&Snapshot> {
        self.board.as_ref()
    }

    /// How many snapshots have replaced the board so far.
    pub fn snapshots_applied(&self) -> u64 {
        self.snapshots_applied
    }

    /// `true` when the latest snapshot names the local player as winner.
    pub fn is_winner(&self) -> bool {
        match (&self.identity, &self.board) {
            (Some(me), Some(board)) => board.winner() == Some(me.player_id),
            _ => false,
        }
    }

    /// Applies a view. A snapshot replaces the board wholesale.
    pub(crate) fn apply(&mut self, view: &View) {
        match view {
            View::Joined(identity) => self.identity = Some(*identity),
            View::Snapshot(snapshot) => {
                self.board = Some(snapshot.clone());
                self.snapshots_applied += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use coindrop_protocol::{Color, PlayerId};

    use super::*;

    fn me() -> PlayerIdentity {
        PlayerIdentity {
            player_id: PlayerId(2),
            color: Color::Blue,
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.identity().is_none());
        assert!(session.board().is_none());
        assert_eq!(session.snapshots_applied(), 0);
        assert!(!session.is_winner());
    }

    #[test]
    fn test_snapshot_replaces_board() {
        let mut session = Session::new();
        session.apply(&View::Snapshot(Snapshot::new(4, 4).with_coin(0, 3, Color::Red)));
        session.apply(&View::Snapshot(Snapshot::new(4, 4)));

        assert_eq!(session.board(), Some(&Snapshot::new(4, 4)));
        assert_eq!(session.snapshots_applied(), 2);
    }

    #[test]
    fn test_is_winner_compares_against_identity() {
        let mut session = Session::new();
        session.apply(&View::Joined(me()));

        session.apply(&View::Snapshot(Snapshot::new(1, 1).with_winner(PlayerId(1))));
        assert!(!session.is_winner());

        session.apply(&View::Snapshot(Snapshot::new(1, 1).with_winner(PlayerId(2))));
        assert!(session.is_winner());
    }
}
