use crate::common;
use httpmock::Method::{GET, POST};
use tradestation_rs::{AuthConfig, Brokerage, TokenManager, TsError};

#[tokio::test]
async fn refresh_happens_once_then_token_is_cached() {
    let server = common::setup_server();
    let token_mock = common::mock_token(&server, "tok-1");
    let accounts = server.mock(|when, then| {
        when.method(GET)
            .path("/v3/brokerage/accounts")
            .header("authorization", "Bearer tok-1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"Accounts":[{"AccountID":"11111111"}]}"#);
    });

    let client = common::client(&server);
    let brokerage = Brokerage::new(&client);

    brokerage.accounts().await.unwrap();
    brokerage.accounts().await.unwrap();

    // Both requests carried the same bearer token from a single refresh.
    token_mock.assert_hits(1);
    accounts.assert_hits(2);
}

#[tokio::test]
async fn refresh_error_surfaces_status_and_body() {
    let server = common::setup_server();
    let token_mock = server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(403).body("invalid_grant");
    });

    let manager = TokenManager::new(
        reqwest::Client::new(),
        AuthConfig {
            token_url: common::token_url(&server),
            client_id: Some("client-id".into()),
            client_secret: Some("client-secret".into()),
            refresh_token: Some("seed-refresh".into()),
        },
        None,
    );

    let err = manager.get_token().await.unwrap_err();
    match err {
        TsError::Auth(msg) => {
            assert!(msg.contains("403"), "missing status in: {msg}");
            assert!(msg.contains("invalid_grant"), "missing body in: {msg}");
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
    token_mock.assert_hits(1);
}

#[tokio::test]
async fn missing_client_id_fails_without_network() {
    let server = common::setup_server();
    let token_mock = common::mock_token(&server, "tok-1");

    let manager = TokenManager::new(
        reqwest::Client::new(),
        AuthConfig {
            token_url: common::token_url(&server),
            client_id: None,
            client_secret: Some("client-secret".into()),
            refresh_token: Some("seed-refresh".into()),
        },
        None,
    );

    let err = manager.get_token().await.unwrap_err();
    assert!(matches!(err, TsError::Config(_)), "got {err:?}");
    token_mock.assert_hits(0);
}

#[tokio::test]
async fn refresh_token_is_kept_when_server_does_not_rotate_it() {
    let server = common::setup_server();
    // Never returns a refresh_token, and expires immediately, so the second
    // get_token must POST the seed refresh token again.
    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/token")
            .body_includes("refresh_token=seed-refresh");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"access_token":"tok-1","expires_in":10,"token_type":"Bearer"}"#);
    });

    let manager = TokenManager::new(
        reqwest::Client::new(),
        AuthConfig {
            token_url: common::token_url(&server),
            client_id: Some("client-id".into()),
            client_secret: Some("client-secret".into()),
            refresh_token: Some("seed-refresh".into()),
        },
        None,
    );

    assert_eq!(manager.get_token().await.unwrap(), "tok-1");
    assert_eq!(manager.get_token().await.unwrap(), "tok-1");
    token_mock.assert_hits(2);
}

#[tokio::test]
async fn rotated_refresh_token_is_used_on_the_next_refresh() {
    let server = common::setup_server();
    let first = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/token")
            .body_includes("refresh_token=seed-refresh");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"access_token":"tok-1","expires_in":10,"token_type":"Bearer","refresh_token":"rotated-1"}"#,
            );
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/token")
            .body_includes("refresh_token=rotated-1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"access_token":"tok-2","expires_in":1200,"token_type":"Bearer"}"#);
    });

    let manager = TokenManager::new(
        reqwest::Client::new(),
        AuthConfig {
            token_url: common::token_url(&server),
            client_id: Some("client-id".into()),
            client_secret: Some("client-secret".into()),
            refresh_token: Some("seed-refresh".into()),
        },
        None,
    );

    assert_eq!(manager.get_token().await.unwrap(), "tok-1");
    // tok-1 expires_in=10 is inside the expiry margin, so this refreshes
    // again, now with the rotated token.
    assert_eq!(manager.get_token().await.unwrap(), "tok-2");
    first.assert_hits(1);
    second.assert_hits(1);
}
