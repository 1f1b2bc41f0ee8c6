//! View stream behavior over the in-memory transport.

use coindrop_protocol::{
    encode_command, encode_handshake, encode_snapshot, Color, Command, FrameKind, PlayerId,
    PlayerIdentity, ProtocolError, Snapshot, View,
};
use coindrop_session::{
    CancelState, ClientConfig, ConnectionManager, SessionError, StreamPhase, StreamState,
};
use coindrop_transport::memory::{MemoryPeer, MemoryReader, MemoryTransport, MemoryWriter};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn connect() -> (ConnectionManager<MemoryReader, MemoryWriter>, MemoryPeer) {
    let (transport, peer) = MemoryTransport::new();
    let manager = ConnectionManager::connect(&transport, ClientConfig::with_endpoint("memory"))
        .await
        .expect("should connect");
    (manager, peer)
}

fn me() -> PlayerIdentity {
    PlayerIdentity {
        player_id: PlayerId(5),
        color: Color::Yellow,
    }
}

fn snapshot_bytes(snapshot: &Snapshot) -> Vec<u8> {
    encode_snapshot(snapshot).expect("encode snapshot")
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_joined_then_snapshots_in_order() {
    let (manager, mut peer) = connect().await;
    let first = Snapshot::new(7, 6).with_coin(3, 5, Color::Yellow);
    let second = first.clone().with_coin(3, 4, Color::Red);

    peer.send(encode_handshake(&me())).expect("send");
    peer.send(snapshot_bytes(&first)).expect("send");
    peer.send(snapshot_bytes(&second)).expect("send");
    peer.hang_up();

    let mut stream = manager.view_stream();
    let mut views = Vec::new();
    let result = stream.run(|view, _| views.push(view.clone())).await;

    assert!(matches!(
        result,
        Err(SessionError::StreamClosed(StreamPhase::Streaming))
    ));
    assert_eq!(
        views,
        vec![
            View::Joined(me()),
            View::Snapshot(first),
            View::Snapshot(second.clone()),
        ]
    );
    assert_eq!(stream.state(), StreamState::Closed);
    assert_eq!(stream.session().board(), Some(&second));
    assert_eq!(stream.session().snapshots_applied(), 2);
    assert_eq!(
        manager.cancel_handle().state(),
        CancelState::Running,
        "a server hang-up is not a cancellation"
    );
}

#[tokio::test]
async fn test_coalesced_snapshot_delivered_before_next_read() {
    let (manager, mut peer) = connect().await;
    let board = Snapshot::new(2, 3).with_coin(0, 2, Color::Orange);
    let next = board.clone().with_coin(1, 2, Color::Yellow);

    let mut chunk = encode_handshake(&me());
    chunk.extend(snapshot_bytes(&board));
    peer.send(chunk).expect("send");
    peer.send(snapshot_bytes(&next)).expect("send");
    peer.hang_up();

    let mut stream = manager.view_stream();
    let mut views = Vec::new();
    let _ = stream.run(|view, _| views.push(view.clone())).await;

    assert_eq!(
        views,
        vec![View::Joined(me()), View::Snapshot(board), View::Snapshot(next)]
    );
}

#[tokio::test]
async fn test_session_is_updated_before_callback() {
    let (manager, mut peer) = connect().await;
    peer.send(encode_handshake(&me())).expect("send");
    peer.send(snapshot_bytes(&Snapshot::new(1, 1).with_winner(PlayerId(5))))
        .expect("send");
    peer.hang_up();

    let mut stream = manager.view_stream();
    let mut winner_seen = false;
    let _ = stream
        .run(|view, session| {
            if let View::Snapshot(_) = view {
                winner_seen = session.is_winner();
            }
            if let View::Joined(identity) = view {
                assert_eq!(session.identity(), Some(identity));
            }
        })
        .await;

    assert!(winner_seen);
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_rejected_handshake_emits_nothing() {
    let (manager, peer) = connect().await;
    peer.send(snapshot_bytes(&Snapshot::new(1, 1))).expect("send");

    let mut stream = manager.view_stream();
    let mut views = Vec::new();
    let result = stream.run(|view, _| views.push(view.clone())).await;

    assert!(matches!(
        result,
        Err(SessionError::Protocol(ProtocolError::TagMismatch {
            expected: FrameKind::Handshake,
            found: 1,
        }))
    ));
    assert!(views.is_empty());
    assert_eq!(stream.state(), StreamState::Closed);
}

#[tokio::test]
async fn test_hang_up_before_handshake() {
    let (manager, mut peer) = connect().await;
    peer.hang_up();

    let mut stream = manager.view_stream();
    let result = stream.run(|_, _| panic!("no view expected")).await;

    assert!(matches!(
        result,
        Err(SessionError::StreamClosed(StreamPhase::Handshake))
    ));
}

#[tokio::test]
async fn test_invalid_color_in_snapshot_ends_stream() {
    let (manager, peer) = connect().await;
    peer.send(encode_handshake(&me())).expect("send");
    let mut bad = snapshot_bytes(&Snapshot::new(1, 1));
    bad[25] = 9;
    peer.send(bad).expect("send");

    let mut stream = manager.view_stream();
    let mut views = Vec::new();
    let result = stream.run(|view, _| views.push(view.clone())).await;

    assert!(matches!(
        result,
        Err(SessionError::Protocol(ProtocolError::InvalidColor(9)))
    ));
    assert_eq!(views, vec![View::Joined(me())]);
}

#[tokio::test]
async fn test_malformed_coalesced_snapshot_still_emits_joined() {
    let (manager, peer) = connect().await;
    let mut chunk = encode_handshake(&me());
    chunk.extend_from_slice(&[1, 0, 0]);
    peer.send(chunk).expect("send");

    let mut stream = manager.view_stream();
    let mut views = Vec::new();
    let result = stream.run(|view, _| views.push(view.clone())).await;

    assert!(matches!(
        result,
        Err(SessionError::Protocol(ProtocolError::Truncated {
            needed: 25,
            available: 3,
        }))
    ));
    assert_eq!(views, vec![View::Joined(me())]);
    assert_eq!(stream.state(), StreamState::Closed);
    assert_eq!(stream.session().identity(), Some(&me()));
}

#[tokio::test]
async fn test_second_handshake_is_unexpected() {
    let (manager, peer) = connect().await;
    peer.send(encode_handshake(&me())).expect("send");
    peer.send(encode_handshake(&me())).expect("send");

    let mut stream = manager.view_stream();
    let result = stream.run(|_, _| {}).await;

    assert!(matches!(
        result,
        Err(SessionError::Protocol(ProtocolError::UnexpectedFrame {
            expected: FrameKind::Snapshot,
            found: FrameKind::Handshake,
        }))
    ));
}

#[tokio::test]
async fn test_echoed_command_is_unexpected() {
    let (manager, peer) = connect().await;
    peer.send(encode_handshake(&me())).expect("send");
    peer.send(encode_command(&Command::PlayCoin { column: 1 }))
        .expect("send");

    let mut stream = manager.view_stream();
    let result = stream.run(|_, _| {}).await;

    assert!(matches!(
        result,
        Err(SessionError::Protocol(ProtocolError::UnexpectedFrame {
            found: FrameKind::Command,
            ..
        }))
    ));
}

#[tokio::test]
async fn test_run_twice_is_refused() {
    let (manager, mut peer) = connect().await;
    peer.hang_up();

    let mut stream = manager.view_stream();
    let _ = stream.run(|_, _| {}).await;
    let again = stream.run(|_, _| {}).await;

    assert!(matches!(
        again,
        Err(SessionError::AlreadyStarted(StreamState::Closed))
    ));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cancel_before_start() {
    let (manager, peer) = connect().await;
    peer.send(encode_handshake(&me())).expect("send");

    let mut stream = manager.view_stream();
    stream.cancel_handle().request();
    let result = stream.run(|_, _| panic!("no view expected")).await;

    assert!(result.is_ok());
    assert_eq!(stream.state(), StreamState::Cancelled);
    assert_eq!(manager.cancel_handle().state(), CancelState::Cancelled);
}

#[tokio::test]
async fn test_cancel_takes_effect_between_reads() {
    let (manager, peer) = connect().await;
    peer.send(encode_handshake(&me())).expect("send");
    peer.send(snapshot_bytes(&Snapshot::new(2, 2))).expect("send");

    let cancel = manager.cancel_handle();
    let mut stream = manager.view_stream();
    let mut views = Vec::new();
    let result = stream
        .run(|view, _| {
            views.push(view.clone());
            cancel.request();
        })
        .await;

    assert!(result.is_ok(), "cancellation is not an error");
    assert_eq!(views, vec![View::Joined(me())]);
    assert_eq!(stream.state(), StreamState::Cancelled);
}

#[tokio::test]
async fn test_end_of_data_after_cancel_is_not_an_error() {
    let (manager, peer) = connect().await;
    peer.send(encode_handshake(&me())).expect("send");

    let cancel = manager.cancel_handle();
    let mut stream = manager.view_stream();
    let (result, ()) = tokio::join!(stream.run(|_, _| {}), async {
        tokio::task::yield_now().await;
        cancel.request();
        manager.connection().begin_close();
    });

    assert!(result.is_ok());
    assert_eq!(stream.state(), StreamState::Cancelled);
}
