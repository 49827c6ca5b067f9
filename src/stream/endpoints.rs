//! Streaming endpoint wrappers.
//!
//! Each method builds the endpoint URL and parameters, validates list
//! limits, and delegates to [`StreamSession::run`]. Independent wrappers
//! composed over the shared session replace any endpoint class hierarchy.

use serde_json::Value;
use url::Url;

use super::{StreamConfig, StreamHandle, StreamSession};
use crate::core::params::csv_segment;
use crate::core::{TsClient, TsError};
use crate::history::{BarUnit, SessionTemplate};

/// Real-time market data streams: bars, quotes, market depth.
pub struct MarketDataStream {
    session: StreamSession,
}

impl MarketDataStream {
    pub fn new(client: &TsClient) -> Self {
        Self {
            session: StreamSession::new(client),
        }
    }

    pub fn with_config(client: &TsClient, config: StreamConfig) -> Self {
        Self {
            session: StreamSession::with_config(client, config),
        }
    }

    /// A handle for stopping the active stream.
    pub fn handle(&self) -> StreamHandle {
        self.session.handle()
    }

    /// Stream real-time bars for one symbol. Blocks until stopped.
    pub async fn stream_bars<F>(
        &self,
        symbol: &str,
        interval: u32,
        unit: BarUnit,
        barsback: Option<u32>,
        session_template: Option<SessionTemplate>,
        on_message: F,
    ) -> Result<(), TsError>
    where
        F: FnMut(Value),
    {
        let url = self.url(&format!("marketdata/stream/barcharts/{symbol}"))?;
        let mut params = vec![
            ("interval", interval.to_string()),
            ("unit", unit.as_str().to_string()),
        ];
        if let Some(bars) = barsback {
            params.push(("barsback", bars.to_string()));
        }
        if let Some(template) = session_template {
            params.push(("sessiontemplate", template.as_str().to_string()));
        }
        self.session.run(url, &params, on_message).await
    }

    /// Stream real-time quotes for up to 100 symbols. Blocks until stopped.
    pub async fn stream_quotes<F>(&self, symbols: &[&str], on_message: F) -> Result<(), TsError>
    where
        F: FnMut(Value),
    {
        let segment = csv_segment(symbols, 100, "symbol")?;
        let url = self.url(&format!("marketdata/stream/quotes/{segment}"))?;
        self.session.run(url, &[], on_message).await
    }

    /// Stream level-II market depth quotes for one symbol.
    pub async fn stream_market_depth_quotes<F>(
        &self,
        symbol: &str,
        max_levels: Option<u32>,
        on_message: F,
    ) -> Result<(), TsError>
    where
        F: FnMut(Value),
    {
        let url = self.url(&format!("marketdata/stream/marketdepth/quotes/{symbol}"))?;
        let mut params = Vec::new();
        if let Some(levels) = max_levels {
            params.push(("maxlevels", levels.to_string()));
        }
        self.session.run(url, &params, on_message).await
    }

    /// Stream aggregated level-II market depth for one symbol.
    pub async fn stream_market_depth_aggregates<F>(
        &self,
        symbol: &str,
        max_levels: Option<u32>,
        on_message: F,
    ) -> Result<(), TsError>
    where
        F: FnMut(Value),
    {
        let url = self.url(&format!("marketdata/stream/marketdepth/aggregates/{symbol}"))?;
        let mut params = Vec::new();
        if let Some(levels) = max_levels {
            params.push(("maxlevels", levels.to_string()));
        }
        self.session.run(url, &params, on_message).await
    }

    fn url(&self, path: &str) -> Result<Url, TsError> {
        Ok(self.session.client().base_api().join(path)?)
    }
}

/// Real-time brokerage streams: order and position updates.
pub struct BrokerStream {
    session: StreamSession,
}

impl BrokerStream {
    pub fn new(client: &TsClient) -> Self {
        Self {
            session: StreamSession::new(client),
        }
    }

    pub fn with_config(client: &TsClient, config: StreamConfig) -> Self {
        Self {
            session: StreamSession::with_config(client, config),
        }
    }

    /// A handle for stopping the active stream.
    pub fn handle(&self) -> StreamHandle {
        self.session.handle()
    }

    /// Stream order status events for up to 100 accounts.
    pub async fn stream_orders<F>(&self, accounts: &[&str], on_message: F) -> Result<(), TsError>
    where
        F: FnMut(Value),
    {
        let segment = csv_segment(accounts, 100, "account")?;
        let url = self.url(&format!("brokerage/accounts/{segment}/orders"))?;
        self.session.run(url, &[], on_message).await
    }

    /// Stream updates for specific orders (both lists capped at 100).
    pub async fn stream_orders_by_id<F>(
        &self,
        accounts: &[&str],
        order_ids: &[&str],
        on_message: F,
    ) -> Result<(), TsError>
    where
        F: FnMut(Value),
    {
        let account_segment = csv_segment(accounts, 100, "account")?;
        let id_segment = csv_segment(order_ids, 100, "order id")?;
        let url = self.url(&format!(
            "brokerage/accounts/{account_segment}/orders/{id_segment}"
        ))?;
        self.session.run(url, &[], on_message).await
    }

    /// Stream position updates for up to 25 accounts. With `changes`, only
    /// position changes are sent instead of all open positions.
    pub async fn stream_positions<F>(
        &self,
        accounts: &[&str],
        changes: bool,
        on_message: F,
    ) -> Result<(), TsError>
    where
        F: FnMut(Value),
    {
        let segment = csv_segment(accounts, 25, "account")?;
        let url = self.url(&format!("brokerage/accounts/{segment}/positions"))?;
        let params = vec![("changes", changes.to_string())];
        self.session.run(url, &params, on_message).await
    }

    fn url(&self, path: &str) -> Result<Url, TsError> {
        Ok(self.session.client().base_api().join(path)?)
    }
}
