//! Market data endpoints: bar charts, symbol details, quote snapshots.
//!
//! Thin plumbing over the shared executor; validation happens before any
//! network call, responses pass through as parsed JSON.

use serde_json::Value;

use crate::core::params::csv_segment;
use crate::core::{TsClient, TsError};
use crate::history::BarsBuilder;

/// Access to the market data API, composed over a shared [`TsClient`].
pub struct MarketData<'a> {
    client: &'a TsClient,
}

impl<'a> MarketData<'a> {
    pub fn new(client: &'a TsClient) -> Self {
        Self { client }
    }

    /// Start building a bar-chart request for `symbol`.
    pub fn bars(&self, symbol: impl Into<String>) -> BarsBuilder<'a> {
        BarsBuilder::new(self.client, symbol)
    }

    /// Descriptive metadata for up to 100 symbols.
    ///
    /// # Errors
    ///
    /// Fails with [`TsError::InvalidParams`] when the list is empty or over
    /// the limit, with zero network calls made.
    pub async fn symbol_details(&self, symbols: &[&str]) -> Result<Value, TsError> {
        let segment = csv_segment(symbols, 100, "symbol")?;
        let url = self
            .client
            .base_api()
            .join(&format!("marketdata/symbols/{segment}"))?;
        self.client.get_json_with_retry(&url, &[], None).await
    }

    /// Snapshot quotes for up to 100 symbols.
    pub async fn quote_snapshots(&self, symbols: &[&str]) -> Result<Value, TsError> {
        let segment = csv_segment(symbols, 100, "symbol")?;
        let url = self
            .client
            .base_api()
            .join(&format!("marketdata/quotes/{segment}"))?;
        self.client.get_json_with_retry(&url, &[], None).await
    }

    /// Names of the available cryptocurrency pairs.
    pub async fn crypto_symbol_names(&self) -> Result<Value, TsError> {
        let url = self
            .client
            .base_api()
            .join("marketdata/symbollists/cryptopairs/symbolnames")?;
        self.client.get_json_with_retry(&url, &[], None).await
    }
}
