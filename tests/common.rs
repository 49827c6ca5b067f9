#![allow(dead_code)]

use httpmock::{Method::POST, Mock, MockServer};
use std::time::Duration;
use tradestation_rs::{Backoff, RetryConfig, TsClient};
use url::Url;

pub fn setup_server() -> MockServer {
    init_tracing();
    MockServer::start()
}

/// Honor `RUST_LOG` when running tests; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn base_api(server: &MockServer) -> Url {
    Url::parse(&format!("{}/v3/", server.base_url())).unwrap()
}

pub fn token_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/oauth/token", server.base_url())).unwrap()
}

/// A client pointed at the mock server, with millisecond backoff so retry
/// tests run fast.
pub fn client(server: &MockServer) -> TsClient {
    TsClient::builder()
        .base_api(base_api(server))
        .token_url(token_url(server))
        .client_id("client-id")
        .client_secret("client-secret")
        .refresh_token("seed-refresh")
        .retry_config(fast_retry())
        .build()
        .unwrap()
}

pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        backoff: Backoff::Fixed(Duration::from_millis(1)),
        ..RetryConfig::default()
    }
}

pub fn token_body(access_token: &str) -> String {
    format!(
        r#"{{"access_token":"{access_token}","expires_in":1200,"id_token":"id-token","scope":"openid offline_access MarketData","token_type":"Bearer"}}"#
    )
}

pub fn mock_token<'a>(server: &'a MockServer, access_token: &str) -> Mock<'a> {
    let body = token_body(access_token);
    server.mock(move |when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200)
            .header("content-type", "application/json")
            .body(body);
    })
}

pub fn bars_json(stamps: &[&str]) -> String {
    let bars: Vec<String> = stamps
        .iter()
        .map(|t| format!(r#"{{"TimeStamp":"{t}","Close":"10.0","TotalVolume":"100"}}"#))
        .collect();
    format!(r#"{{"Bars":[{}]}}"#, bars.join(","))
}

/// Extract the TimeStamp column from a bars response.
pub fn stamps(body: &serde_json::Value) -> Vec<String> {
    body["Bars"]
        .as_array()
        .expect("Bars array")
        .iter()
        .map(|b| b["TimeStamp"].as_str().expect("TimeStamp").to_string())
        .collect()
}
