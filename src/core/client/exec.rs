//! Authenticated request execution.
//!
//! Two layers compose here:
//! - [`TsClient::get_json`]: one authenticated GET with a single
//!   refresh-and-retry cycle on 401. This layer owns 401 handling
//!   exclusively.
//! - [`TsClient::get_json_with_retry`]: bounded retry with backoff for
//!   transient failures (empty 200 payloads, retryable status codes,
//!   network errors). A 401 that survived the layer below is not transient
//!   and is never retried here.

use super::TsClient;
use super::retry::RetryConfig;
use crate::core::TsError;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

impl TsClient {
    /// Execute one authenticated GET and parse the JSON body.
    ///
    /// On 401 the bearer token is refreshed (serialized through the token
    /// manager) and the request is retried exactly once.
    pub(crate) async fn get_json(
        &self,
        url: &Url,
        params: &[(&str, String)],
    ) -> Result<Value, TsError> {
        let token = self.token_manager().get_token().await?;
        let mut resp = self
            .http()
            .get(url.clone())
            .query(params)
            .bearer_auth(&token)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(%url, "got 401, refreshing token and retrying once");
            let fresh = self.token_manager().refresh_if_stale(&token).await?;
            resp = self
                .http()
                .get(url.clone())
                .query(params)
                .bearer_auth(&fresh)
                .send()
                .await?;
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        Ok(resp.json().await?)
    }

    /// Execute an authenticated GET with bounded retry for transient failures.
    ///
    /// Retries when the payload is empty (see
    /// [`RetryConfig::empty_list_field`]), the status is in
    /// `retry_on_status`, or a network error occurs. Exhausting attempts
    /// returns the last error, or the last (possibly empty) payload when only
    /// emptiness kept the loop going.
    pub(crate) async fn get_json_with_retry(
        &self,
        url: &Url,
        params: &[(&str, String)],
        retry_override: Option<&RetryConfig>,
    ) -> Result<Value, TsError> {
        let cfg = retry_override.unwrap_or_else(|| self.retry());
        if !cfg.enabled {
            return self.get_json(url, params).await;
        }

        let attempts = cfg.max_retries + 1;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let last = attempt >= attempts;

            match self.get_json(url, params).await {
                Ok(body) => {
                    if !last && cfg.is_empty_payload(&body) {
                        tracing::debug!(%url, attempt, "empty payload, retrying");
                        tokio::time::sleep(cfg.backoff.delay(attempt)).await;
                        continue;
                    }
                    return Ok(body);
                }
                Err(TsError::Status { status, .. })
                    if !last && cfg.retry_on_status.contains(&status) =>
                {
                    tracing::debug!(%url, status, attempt, "retryable status");
                    tokio::time::sleep(cfg.backoff.delay(attempt)).await;
                }
                Err(TsError::Transport(err)) if !last && cfg.retry_on_transport => {
                    tracing::debug!(%url, attempt, error = %err, "transport error, retrying");
                    tokio::time::sleep(cfg.backoff.delay(attempt)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
