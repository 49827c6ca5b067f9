//! tradestation-rs: async client for the TradeStation v3 API.
//!
//! The crate is organized around a shared [`TsClient`] injected into
//! independent endpoint modules:
//! - [`history`]: historical bars with automatic chunking, bounded parallel
//!   fetch, and chronological merge.
//! - [`market_data`] / [`brokerage`]: request/response endpoints.
//! - [`stream`]: long-lived newline-delimited-JSON streams with reconnect
//!   and token-refresh-on-401.
//! - [`auth`]: the OAuth2 token lifecycle behind all of the above.

pub mod auth;
pub mod brokerage;
pub mod core;
pub mod history;
pub mod market_data;
pub mod stream;

pub use crate::auth::{AuthConfig, Credentials, TokenManager};
pub use crate::brokerage::Brokerage;
pub use crate::core::client::retry::{Backoff, RetryConfig};
pub use crate::core::{TsClient, TsClientBuilder, TsError};
pub use crate::history::{BarUnit, BarsBuilder, MAX_BARS_PER_CALL, SessionTemplate};
pub use crate::market_data::MarketData;
pub use crate::stream::{
    BrokerStream, MarketDataStream, StreamConfig, StreamHandle, StreamSession, StreamState,
};
