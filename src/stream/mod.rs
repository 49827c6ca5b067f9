//! Long-lived newline-delimited-JSON streaming.
//!
//! TradeStation streaming endpoints hold an HTTP connection open and emit
//! one JSON object per line, with blank lines as heartbeats. A
//! [`StreamSession`] owns one such connection: it decodes lines, dispatches
//! them to a consumer callback, refreshes the bearer token on 401, and
//! reconnects on network failures. The loop has no natural termination; it
//! runs until [`StreamHandle::stop`] is called or the server rejects the
//! connection outright.

mod endpoints;

pub use endpoints::{BrokerStream, MarketDataStream};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;
use url::Url;

use crate::core::{TsClient, TsError};

const STREAM_ACCEPT: &str = "application/vnd.tradestation.streams.v2+json";

/// Timing knobs for a streaming session.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Delay before reconnecting after a network-level failure.
    pub reconnect_delay: Duration,
    /// Delay before reconnecting after a clean close that delivered no
    /// lines at all, so a market-closed feed is not hammered.
    pub idle_delay: Duration,
    /// Idle time (since the last non-blank line) after which a liveness
    /// message is logged. Idleness is never treated as an error; markets
    /// may simply be closed.
    pub heartbeat_timeout: Duration,
    /// Maximum gap between raw bytes before the connection is considered
    /// dead and reopened. Heartbeat lines reset this.
    pub read_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(5),
            idle_delay: Duration::from_secs(10),
            heartbeat_timeout: Duration::from_secs(60),
            read_timeout: Duration::from_secs(30),
        }
    }
}

/// Connection state of a [`StreamSession`], observable from any thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Terminal; reached only via [`StreamHandle::stop`] or a fatal
    /// connect error.
    Stopped,
}

impl StreamState {
    fn as_u8(self) -> u8 {
        match self {
            StreamState::Disconnected => 0,
            StreamState::Connecting => 1,
            StreamState::Connected => 2,
            StreamState::Reconnecting => 3,
            StreamState::Stopped => 4,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => StreamState::Connecting,
            2 => StreamState::Connected,
            3 => StreamState::Reconnecting,
            4 => StreamState::Stopped,
            _ => StreamState::Disconnected,
        }
    }
}

#[derive(Debug)]
struct Shared {
    stopped: AtomicBool,
    state: AtomicU8,
}

/// Cloneable handle for stopping a running session and observing its state.
///
/// `stop` is cooperative: it is observed at the next loop boundary (once per
/// received line or reconnect tick), never preemptively; in-flight line
/// processing completes first.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    shared: Arc<Shared>,
}

impl StreamHandle {
    /// Request termination of the session.
    pub fn stop(&self) {
        self.shared.stopped.store(true, Ordering::SeqCst);
    }

    /// Current connection state.
    pub fn state(&self) -> StreamState {
        StreamState::from_u8(self.shared.state.load(Ordering::SeqCst))
    }
}

/// One long-lived streaming connection.
pub struct StreamSession {
    client: TsClient,
    config: StreamConfig,
    shared: Arc<Shared>,
}

impl StreamSession {
    pub fn new(client: &TsClient) -> Self {
        Self::with_config(client, StreamConfig::default())
    }

    pub fn with_config(client: &TsClient, config: StreamConfig) -> Self {
        Self {
            client: client.clone(),
            config,
            shared: Arc::new(Shared {
                stopped: AtomicBool::new(false),
                state: AtomicU8::new(StreamState::Disconnected.as_u8()),
            }),
        }
    }

    /// A handle for stopping this session from another task.
    pub fn handle(&self) -> StreamHandle {
        StreamHandle {
            shared: self.shared.clone(),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> StreamState {
        StreamState::from_u8(self.shared.state.load(Ordering::SeqCst))
    }

    pub(crate) fn client(&self) -> &TsClient {
        &self.client
    }

    fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: StreamState) {
        self.shared.state.store(state.as_u8(), Ordering::SeqCst);
    }

    /// Open the stream and dispatch decoded messages to `on_message` until
    /// stopped. Blocks the calling task for the lifetime of the session.
    ///
    /// Network failures and 401s are recovered internally and never surface
    /// to the caller; malformed lines are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TsError::StreamFatal`] when the server rejects a connect
    /// with a non-2xx, non-401 status (bad endpoint, missing entitlement),
    /// or an auth/config error when no token can be established at all.
    pub async fn run<F>(
        &self,
        url: Url,
        params: &[(&str, String)],
        mut on_message: F,
    ) -> Result<(), TsError>
    where
        F: FnMut(Value),
    {
        let manager = self.client.token_manager();
        let mut token = manager.get_token().await?;

        tracing::info!(%url, "starting stream");

        loop {
            if self.is_stopped() {
                self.set_state(StreamState::Stopped);
                return Ok(());
            }
            self.set_state(StreamState::Connecting);

            let mut resp = match self
                .client
                .http()
                .get(url.clone())
                .query(params)
                .bearer_auth(&token)
                .header(ACCEPT, STREAM_ACCEPT)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(err) => {
                    tracing::warn!(%url, error = %err, "stream connect failed, reconnecting");
                    self.set_state(StreamState::Reconnecting);
                    tokio::time::sleep(self.config.reconnect_delay).await;
                    continue;
                }
            };

            if resp.status() == StatusCode::UNAUTHORIZED {
                tracing::info!(%url, "stream unauthorized, refreshing token");
                token = manager.refresh_if_stale(&token).await?;
                continue;
            }
            if !resp.status().is_success() {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                tracing::error!(%url, status, "stream rejected, stopping session");
                self.set_state(StreamState::Stopped);
                return Err(TsError::StreamFatal { status, body });
            }

            self.set_state(StreamState::Connected);
            tracing::info!(%url, "stream connected");

            let mut buf: Vec<u8> = Vec::new();
            let mut saw_line = false;
            let mut last_message = Instant::now();
            let mut idle_logged = false;

            let outcome = 'read: loop {
                if self.is_stopped() {
                    break 'read ReadOutcome::Stopped;
                }
                match tokio::time::timeout(self.config.read_timeout, resp.chunk()).await {
                    Err(_) => break 'read ReadOutcome::TimedOut,
                    Ok(Err(err)) => break 'read ReadOutcome::Failed(err),
                    Ok(Ok(None)) => break 'read ReadOutcome::Closed,
                    Ok(Ok(Some(chunk))) => {
                        buf.extend_from_slice(&chunk);
                        while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                            let raw: Vec<u8> = buf.drain(..=pos).collect();
                            let line = raw.trim_ascii();
                            if line.is_empty() {
                                // heartbeat line
                                if !idle_logged
                                    && last_message.elapsed() >= self.config.heartbeat_timeout
                                {
                                    tracing::info!(
                                        %url,
                                        idle_secs = last_message.elapsed().as_secs(),
                                        "stream idle but alive"
                                    );
                                    idle_logged = true;
                                }
                                continue;
                            }
                            saw_line = true;
                            last_message = Instant::now();
                            idle_logged = false;
                            match serde_json::from_slice::<Value>(line) {
                                Ok(msg) => on_message(msg),
                                Err(err) => {
                                    tracing::warn!(error = %err, "malformed stream line, skipping");
                                }
                            }
                            if self.is_stopped() {
                                break 'read ReadOutcome::Stopped;
                            }
                        }
                    }
                }
            };

            match outcome {
                ReadOutcome::Stopped => {
                    tracing::info!(%url, "stream stopped by caller");
                    self.set_state(StreamState::Stopped);
                    return Ok(());
                }
                ReadOutcome::TimedOut => {
                    tracing::warn!(%url, "stream read timed out, reconnecting");
                    self.set_state(StreamState::Reconnecting);
                    tokio::time::sleep(self.config.reconnect_delay).await;
                }
                ReadOutcome::Failed(err) => {
                    tracing::warn!(%url, error = %err, "stream read failed, reconnecting");
                    self.set_state(StreamState::Reconnecting);
                    tokio::time::sleep(self.config.reconnect_delay).await;
                }
                ReadOutcome::Closed => {
                    self.set_state(StreamState::Reconnecting);
                    if saw_line {
                        tracing::info!(%url, "server closed stream, reconnecting");
                    } else {
                        tracing::info!(%url, "no stream data received, waiting before reconnect");
                        tokio::time::sleep(self.config.idle_delay).await;
                    }
                }
            }
        }
    }
}

enum ReadOutcome {
    Stopped,
    Closed,
    TimedOut,
    Failed(reqwest::Error),
}
