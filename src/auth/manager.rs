//! Token acquisition with serialized refreshes.

use super::{Credentials, store};
use crate::core::TsError;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use url::Url;

/// OAuth client configuration used for token refreshes.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The token endpoint to POST refresh requests to.
    pub token_url: Url,
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// Seed refresh token, used until a stored record carries one.
    pub refresh_token: Option<String>,
}

/// Owns the in-memory credential record and serializes refreshes.
///
/// Cloning shares the same state, so any number of holders observe a single
/// refresh cycle. The fast path (`get_token` with a fresh record) takes only
/// a read lock; refreshes go through a dedicated mutex so that at most one
/// network call is in flight regardless of how many callers race.
#[derive(Debug, Clone)]
pub struct TokenManager {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    config: AuthConfig,
    token_file: Option<PathBuf>,
    state: RwLock<Option<Credentials>>,
    refresh_lock: Mutex<()>,
}

/// Wire shape of the token endpoint response. Everything but `access_token`
/// and `expires_in` is optional; servers do not rotate the refresh token on
/// every call.
#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
    id_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
    refresh_token: Option<String>,
}

impl TokenManager {
    /// Create a manager, loading any persisted record from `token_file`.
    ///
    /// A missing or corrupt token file is treated as empty credential state;
    /// the first `get_token` call will refresh.
    pub fn new(http: reqwest::Client, config: AuthConfig, token_file: Option<PathBuf>) -> Self {
        let initial = token_file.as_deref().and_then(store::load);
        Self {
            inner: Arc::new(Inner {
                http,
                config,
                token_file,
                state: RwLock::new(initial),
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    /// Return a valid bearer token, refreshing it first if needed.
    ///
    /// Concurrent callers with an expired record trigger exactly one refresh;
    /// the rest block on the refresh lock and then observe the new token.
    ///
    /// # Errors
    ///
    /// Fails with [`TsError::Config`] when refresh configuration is missing,
    /// or [`TsError::Auth`] when the token endpoint rejects the refresh.
    pub async fn get_token(&self) -> Result<String, TsError> {
        // Fast path: a fresh record needs only the read lock.
        if let Some(token) = self.current_if_fresh().await {
            return Ok(token);
        }

        let _guard = self.inner.refresh_lock.lock().await;

        // Double-check: another caller may have refreshed while this one
        // waited on the lock.
        if let Some(token) = self.current_if_fresh().await {
            return Ok(token);
        }

        self.refresh_locked().await
    }

    /// Refresh after a 401, unless someone else already replaced the token
    /// this caller presented. Serialized by the same refresh lock.
    pub async fn refresh_if_stale(&self, seen_token: &str) -> Result<String, TsError> {
        let _guard = self.inner.refresh_lock.lock().await;

        if let Some(current) = self.current_token().await
            && current != seen_token
        {
            return Ok(current);
        }

        self.refresh_locked().await
    }

    /// Unconditionally refresh the token. Serialized with all other refreshes.
    pub async fn force_refresh(&self) -> Result<String, TsError> {
        let _guard = self.inner.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn current_if_fresh(&self) -> Option<String> {
        let state = self.inner.state.read().await;
        state
            .as_ref()
            .filter(|c| !c.is_expired())
            .map(|c| c.access_token.clone())
    }

    async fn current_token(&self) -> Option<String> {
        let state = self.inner.state.read().await;
        state.as_ref().map(|c| c.access_token.clone())
    }

    /// Perform the network refresh. Caller must hold `refresh_lock`.
    async fn refresh_locked(&self) -> Result<String, TsError> {
        let cfg = &self.inner.config;
        let client_id = cfg
            .client_id
            .as_deref()
            .ok_or_else(|| TsError::Config("OAuth client id not configured".into()))?;
        let client_secret = cfg
            .client_secret
            .as_deref()
            .ok_or_else(|| TsError::Config("OAuth client secret not configured".into()))?;

        let prev_refresh = {
            let state = self.inner.state.read().await;
            state.as_ref().map(|c| c.refresh_token.clone())
        };
        let refresh_token = prev_refresh
            .or_else(|| cfg.refresh_token.clone())
            .ok_or_else(|| TsError::Config("no refresh token available".into()))?;

        tracing::debug!(url = %cfg.token_url, "refreshing access token");

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", &refresh_token),
        ];
        let resp = self
            .inner
            .http
            .post(cfg.token_url.clone())
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TsError::Auth(format!(
                "token refresh failed with status {status}: {body}"
            )));
        }

        let parsed: RefreshResponse = resp
            .json()
            .await
            .map_err(|e| TsError::Auth(format!("token refresh returned unusable body: {e}")))?;

        let creds = Credentials {
            access_token: parsed.access_token,
            id_token: parsed.id_token.unwrap_or_default(),
            scope: parsed.scope.unwrap_or_default(),
            token_type: parsed.token_type.unwrap_or_else(|| "Bearer".into()),
            expires_in: parsed.expires_in,
            // Servers may not rotate the refresh token every call.
            refresh_token: parsed.refresh_token.unwrap_or(refresh_token),
            obtained_at: chrono::Utc::now().timestamp(),
        };

        if let Some(path) = self.inner.token_file.as_deref()
            && let Err(err) = store::save(path, &creds)
        {
            // The in-memory record stays usable; only persistence failed.
            tracing::warn!(path = %path.display(), error = %err, "failed to persist token file");
        }

        let token = creds.access_token.clone();
        *self.inner.state.write().await = Some(creds);
        tracing::debug!("access token refreshed");
        Ok(token)
    }
}
