//! Public client surface + builder.
//! Request execution lives in `exec`, retry policy in `retry`.

mod exec;
pub mod retry;

use crate::auth::{AuthConfig, TokenManager};
use crate::core::TsError;
use retry::RetryConfig;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_BASE_API: &str = "https://api.tradestation.com/v3/";
const DEFAULT_TOKEN_URL: &str = "https://signin.tradestation.com/oauth/token";
const USER_AGENT: &str = concat!("tradestation-rs/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for all TradeStation endpoints.
///
/// Cloning is cheap; clones share the same connection pool and token state,
/// so every part of an application observes a single refresh cycle.
#[derive(Debug, Clone)]
pub struct TsClient {
    http: reqwest::Client,
    base_api: Url,
    token: TokenManager,
    retry: RetryConfig,
}

impl TsClient {
    /// Create a new builder.
    pub fn builder() -> TsClientBuilder {
        TsClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn base_api(&self) -> &Url {
        &self.base_api
    }

    pub(crate) fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// The token manager driving this client's bearer tokens.
    pub fn token_manager(&self) -> &TokenManager {
        &self.token
    }
}

/* ----------------------- Builder ----------------------- */

/// Builder for [`TsClient`].
#[derive(Default)]
pub struct TsClientBuilder {
    user_agent: Option<String>,
    base_api: Option<Url>,
    token_url: Option<Url>,
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_token: Option<String>,
    token_file: Option<PathBuf>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_config: Option<RetryConfig>,
}

impl TsClientBuilder {
    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the API base (e.g. `https://api.tradestation.com/v3/`).
    /// Handy for pointing tests at a mock server.
    pub fn base_api(mut self, url: Url) -> Self {
        self.base_api = Some(url);
        self
    }

    /// Override the OAuth token endpoint.
    pub fn token_url(mut self, url: Url) -> Self {
        self.token_url = Some(url);
        self
    }

    /// OAuth client id used for token refreshes.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// OAuth client secret used for token refreshes.
    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Seed refresh token, used until the token file carries one of its own.
    pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Persist credentials to this file, and load them from it at startup.
    ///
    /// Without a token file the credentials live in memory only. The file has
    /// no cross-process locking; two processes sharing one file may race.
    pub fn token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Set a global request timeout. Default: none.
    ///
    /// Leave this unset when the client also drives streaming sessions; an
    /// overall timeout would cut long-lived connections short.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Override the default retry policy for transient failures.
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry_config = Some(cfg);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if a default URL fails to parse or the underlying
    /// HTTP client cannot be constructed.
    pub fn build(self) -> Result<TsClient, TsError> {
        let base_api = match self.base_api {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_API)?,
        };
        let token_url = match self.token_url {
            Some(u) => u,
            None => Url::parse(DEFAULT_TOKEN_URL)?,
        };

        let mut httpb =
            reqwest::Client::builder().user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));
        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        let http = httpb.build()?;

        let token = TokenManager::new(
            http.clone(),
            AuthConfig {
                token_url,
                client_id: self.client_id,
                client_secret: self.client_secret,
                refresh_token: self.refresh_token,
            },
            self.token_file,
        );

        Ok(TsClient {
            http,
            base_api,
            token,
            retry: self.retry_config.unwrap_or_default(),
        })
    }
}
