//! Brokerage endpoints: accounts, balances, orders, positions.
//!
//! Thin plumbing over the shared executor. List parameters are validated
//! against the API's 100-identifier limit before any network call.

use chrono::NaiveDate;
use serde_json::Value;

use crate::core::params::csv_segment;
use crate::core::{TsClient, TsError};

/// How far back the historical-orders endpoint accepts a `since` date.
const HISTORICAL_ORDERS_WINDOW_DAYS: i64 = 90;

/// Access to the brokerage API, composed over a shared [`TsClient`].
pub struct Brokerage<'a> {
    client: &'a TsClient,
}

impl<'a> Brokerage<'a> {
    pub fn new(client: &'a TsClient) -> Self {
        Self { client }
    }

    /// The brokerage accounts of the authenticated user.
    pub async fn accounts(&self) -> Result<Value, TsError> {
        let url = self.client.base_api().join("brokerage/accounts")?;
        self.client.get_json_with_retry(&url, &[], None).await
    }

    /// Current balances for up to 100 accounts.
    pub async fn balances(&self, accounts: &[&str]) -> Result<Value, TsError> {
        let segment = csv_segment(accounts, 100, "account")?;
        let url = self
            .client
            .base_api()
            .join(&format!("brokerage/accounts/{segment}/balances"))?;
        self.client.get_json_with_retry(&url, &[], None).await
    }

    /// Beginning-of-day balances for up to 100 accounts.
    pub async fn bod_balances(&self, accounts: &[&str]) -> Result<Value, TsError> {
        let segment = csv_segment(accounts, 100, "account")?;
        let url = self
            .client
            .base_api()
            .join(&format!("brokerage/accounts/{segment}/bodbalances"))?;
        self.client.get_json_with_retry(&url, &[], None).await
    }

    /// Today's and open orders for up to 100 accounts.
    pub async fn orders(
        &self,
        accounts: &[&str],
        page_size: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Value, TsError> {
        let segment = csv_segment(accounts, 100, "account")?;
        let url = self
            .client
            .base_api()
            .join(&format!("brokerage/accounts/{segment}/orders"))?;
        let mut params = Vec::new();
        if let Some(size) = page_size {
            params.push(("pageSize", size.to_string()));
        }
        if let Some(token) = next_token {
            params.push(("nextToken", token.to_string()));
        }
        self.client.get_json_with_retry(&url, &params, None).await
    }

    /// Today's and open orders filtered to specific order ids (both lists
    /// capped at 100).
    pub async fn orders_by_id(
        &self,
        accounts: &[&str],
        order_ids: &[&str],
    ) -> Result<Value, TsError> {
        let account_segment = csv_segment(accounts, 100, "account")?;
        let id_segment = csv_segment(order_ids, 100, "order id")?;
        let url = self.client.base_api().join(&format!(
            "brokerage/accounts/{account_segment}/orders/{id_segment}"
        ))?;
        self.client.get_json_with_retry(&url, &[], None).await
    }

    /// Closed orders since `since`, which must fall within the past 90 days.
    pub async fn historical_orders(
        &self,
        accounts: &[&str],
        since: NaiveDate,
        page_size: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Value, TsError> {
        let segment = csv_segment(accounts, 100, "account")?;
        let today = chrono::Utc::now().date_naive();
        if (today - since).num_days() > HISTORICAL_ORDERS_WINDOW_DAYS {
            return Err(TsError::InvalidParams(format!(
                "`since` must be within the past {HISTORICAL_ORDERS_WINDOW_DAYS} days"
            )));
        }

        let url = self
            .client
            .base_api()
            .join(&format!("brokerage/accounts/{segment}/historicalorders"))?;
        let mut params = vec![("since", since.format("%Y-%m-%d").to_string())];
        if let Some(size) = page_size {
            params.push(("pageSize", size.to_string()));
        }
        if let Some(token) = next_token {
            params.push(("nextToken", token.to_string()));
        }
        self.client.get_json_with_retry(&url, &params, None).await
    }

    /// Open positions for up to 100 accounts, optionally filtered by symbol.
    pub async fn positions(
        &self,
        accounts: &[&str],
        symbols: Option<&[&str]>,
    ) -> Result<Value, TsError> {
        let segment = csv_segment(accounts, 100, "account")?;
        let url = self
            .client
            .base_api()
            .join(&format!("brokerage/accounts/{segment}/positions"))?;
        let mut params = Vec::new();
        if let Some(symbols) = symbols {
            params.push(("symbol", symbols.join(",")));
        }
        self.client.get_json_with_retry(&url, &params, None).await
    }
}
