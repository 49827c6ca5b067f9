use crate::common;
use httpmock::Method::GET;
use std::time::Duration;
use tradestation_rs::{MarketDataStream, StreamConfig, TsClient};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config() -> StreamConfig {
    StreamConfig {
        reconnect_delay: Duration::from_millis(10),
        idle_delay: Duration::from_millis(20),
        heartbeat_timeout: Duration::from_millis(200),
        read_timeout: Duration::from_millis(500),
    }
}

/// A clean close with no data is an idle market, not an error; the session
/// keeps reconnecting until told to stop.
#[tokio::test]
async fn empty_close_reconnects_until_stopped() {
    let server = common::setup_server();
    common::mock_token(&server, "tok-1");

    let stream_mock = server.mock(|when, then| {
        when.method(GET).path("/v3/marketdata/stream/quotes/AAPL");
        then.status(200)
            .header("content-type", "application/vnd.tradestation.streams.v2+json")
            .body("");
    });

    let client = common::client(&server);
    let streamer = MarketDataStream::with_config(&client, fast_config());
    let handle = streamer.handle();

    let task = tokio::spawn(async move { streamer.stream_quotes(&["AAPL"], |_| {}).await });

    // Wait for at least two connects, proving a reconnect happened.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while stream_mock.hits() < 2 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "stream never reconnected"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    handle.stop();
    let result = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("stream did not stop")
        .unwrap();
    assert!(result.is_ok());
    assert!(stream_mock.hits() >= 2);
}

/// A 401 mid-session means the token aged out; the session refreshes and
/// reconnects with the new token instead of dying.
#[tokio::test]
async fn unauthorized_connect_refreshes_the_token_and_reconnects() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(common::token_body("tok-1"), "application/json"),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/marketdata/stream/quotes/AAPL"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/marketdata/stream/quotes/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            r#"{"Symbol":"AAPL","Last":"190.10"}"#,
            "\n"
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = TsClient::builder()
        .base_api(Url::parse(&format!("{}/v3/", server.uri())).unwrap())
        .token_url(Url::parse(&format!("{}/oauth/token", server.uri())).unwrap())
        .client_id("client-id")
        .client_secret("client-secret")
        .refresh_token("seed-refresh")
        .build()
        .unwrap();

    let streamer = MarketDataStream::with_config(&client, fast_config());
    let handle = streamer.handle();

    let mut received = Vec::new();
    streamer
        .stream_quotes(&["AAPL"], |msg| {
            received.push(msg);
            handle.stop();
        })
        .await
        .unwrap();

    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["Last"], "190.10");
}
