//! WebSocket client transport implementation using `tokio-tungstenite`.
//!
//! One binary WebSocket message is one chunk. The socket is split into a
//! sink and a stream with `futures_util::StreamExt::split`, so the reader
//! and the writer can be owned by different flows without sharing a lock.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{
    close_signal, ChunkReader, ChunkWriter, ClosingSignal, Connection,
    ConnectionId, Transport, TransportError,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A WebSocket-based [`Transport`] that dials `ws://` or `wss://` endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl Transport for WebSocketTransport {
    type Reader = WebSocketReader;
    type Writer = WebSocketWriter;

    async fn connect(
        &self,
        endpoint: &str,
    ) -> Result<Connection<WebSocketReader, WebSocketWriter>, TransportError>
    {
        let (ws, _response) = tokio_tungstenite::connect_async(endpoint)
            .await
            .map_err(|e| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;

        let id = ConnectionId::next();
        tracing::info!(%id, endpoint, "WebSocket connection established");

        let (sink, stream) = ws.split();
        let (trigger, closing) = close_signal();

        let reader = WebSocketReader {
            id,
            stream,
            closing,
            done: false,
        };
        let writer = WebSocketWriter {
            id,
            sink,
            closed: false,
        };
        Ok(Connection::new(id, reader, writer, trigger))
    }
}

/// The readable half of a WebSocket connection.
pub struct WebSocketReader {
    id: ConnectionId,
    stream: SplitStream<WsStream>,
    closing: ClosingSignal,
    done: bool,
}

impl ChunkReader for WebSocketReader {
    async fn read(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            if self.done {
                return Ok(None);
            }

            let next = tokio::select! {
                biased;
                () = self.closing.closed() => None,
                msg = self.stream.next() => Some(msg),
            };
            let Some(msg) = next else {
                tracing::debug!(id = %self.id, "read ended by close signal");
                self.done = true;
                return Ok(None);
            };

            match msg {
                Some(Ok(Message::Binary(data))) => {
                    tracing::trace!(id = %self.id, len = data.len(), "chunk received");
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => {
                    self.done = true;
                }
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    self.done = true;
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn cancel(&mut self) -> Result<(), TransportError> {
        tracing::debug!(id = %self.id, "reader cancelled");
        self.done = true;
        Ok(())
    }
}

/// The writable half of a WebSocket connection.
pub struct WebSocketWriter {
    id: ConnectionId,
    sink: SplitSink<WsStream, Message>,
    closed: bool,
}

impl ChunkWriter for WebSocketWriter {
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Shutdown);
        }
        let msg = Message::Binary(data.to_vec().into());
        self.sink.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!(id = %self.id, "closing WebSocket writer");
        self.sink.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }
}
