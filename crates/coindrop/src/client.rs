//! `CoindropClient` builder and handle.
//!
//! This is the entry point for a game client. It ties the layers together:
//! transport → protocol → session.

use std::path::Path;
use std::time::Duration;

use coindrop_session::{
    CancelHandle, ClientConfig, CommandChannel, ConnectionManager, ViewStream,
};
use coindrop_transport::{ChunkReader, ChunkWriter, ConnectionId, Transport};

use crate::CoindropError;

/// Reads a JSON client config from `path`.
///
/// Fields missing from the file keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig, CoindropError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| CoindropError::ConfigIo {
        path: path.display().to_string(),
        source,
    })?;
    let config = serde_json::from_str(&text)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Builder for configuring and connecting a client.
///
/// # Example
///
/// ```rust,ignore
/// use coindrop::prelude::*;
///
/// let client = CoindropClient::builder()
///     .endpoint("ws://127.0.0.1:4001")
///     .max_unlock_polls(Some(5))
///     .connect(&WebSocketTransport)
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoindropClientBuilder {
    config: ClientConfig,
}

impl CoindropClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole config, e.g. one from [`load_config`].
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the server endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Sets how long shutdown waits between checks of a locked side.
    ///
    /// Sub-millisecond precision is dropped.
    pub fn unlock_poll_interval(mut self, interval: Duration) -> Self {
        self.config.unlock_poll_interval_ms =
            u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Caps the shutdown wait. `None` waits forever.
    pub fn max_unlock_polls(mut self, polls: Option<u32>) -> Self {
        self.config.max_unlock_polls = polls;
        self
    }

    /// Returns the config the client will connect with.
    pub fn build_config(&self) -> ClientConfig {
        self.config.clone().validated()
    }

    /// Connects through `transport`.
    pub async fn connect<T: Transport>(
        self,
        transport: &T,
    ) -> Result<CoindropClient<T::Reader, T::Writer>, CoindropError> {
        let manager = ConnectionManager::connect(transport, self.config).await?;
        Ok(CoindropClient { manager })
    }
}

/// A connected game client.
///
/// Get a [`ViewStream`] to follow the game, a [`CommandChannel`] to make
/// moves, and call [`disconnect`](Self::disconnect) when done.
pub struct CoindropClient<R, W> {
    manager: ConnectionManager<R, W>,
}

impl<R: ChunkReader, W: ChunkWriter> CoindropClient<R, W> {
    /// Creates a new builder.
    pub fn builder() -> CoindropClientBuilder {
        CoindropClientBuilder::new()
    }

    pub fn id(&self) -> ConnectionId {
        self.manager.id()
    }

    pub fn config(&self) -> &ClientConfig {
        self.manager.config()
    }

    pub fn view_stream(&self) -> ViewStream<R> {
        self.manager.view_stream()
    }

    pub fn command_channel(&self) -> Result<CommandChannel<W>, CoindropError> {
        Ok(self.manager.command_channel()?)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.manager.cancel_handle()
    }

    /// The underlying connection manager.
    pub fn manager(&self) -> &ConnectionManager<R, W> {
        &self.manager
    }

    /// Cancels the view stream and shuts the connection down.
    ///
    /// Release any [`CommandChannel`] first, or shutdown waits for it.
    pub async fn disconnect(self) -> Result<(), CoindropError> {
        Ok(self.manager.disconnect().await?)
    }
}
