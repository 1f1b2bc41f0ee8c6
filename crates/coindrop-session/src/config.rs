//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for connecting to a game server and shutting down.
///
/// `#[serde(default)]` lets a config file name only the fields it wants
/// to change; everything else falls back to [`ClientConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server endpoint, e.g. `ws://127.0.0.1:4001`.
    pub endpoint: String,

    /// How long shutdown waits between checks of a locked side.
    ///
    /// Default: 1000 ms.
    pub unlock_poll_interval_ms: u64,

    /// How many times shutdown re-checks a locked side before giving up
    /// with [`SessionError::UnlockTimedOut`](crate::SessionError::UnlockTimedOut).
    ///
    /// Default: `Some(30)`. `None` waits forever.
    pub max_unlock_polls: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            unlock_poll_interval_ms: 1_000,
            max_unlock_polls: Some(30),
        }
    }
}

impl ClientConfig {
    /// Where the reference server listens by default.
    pub const DEFAULT_ENDPOINT: &'static str = "ws://127.0.0.1:4001";

    /// Default config pointed at `endpoint`.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by
    /// [`ConnectionManager::connect`](crate::ConnectionManager::connect).
    /// A zero poll interval would spin, so it is raised to 1 ms.
    pub fn validated(mut self) -> Self {
        if self.unlock_poll_interval_ms == 0 {
            tracing::warn!("unlock_poll_interval_ms is 0, raising to 1");
            self.unlock_poll_interval_ms = 1;
        }
        self
    }

    pub fn unlock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.unlock_poll_interval_ms)
    }
}
