/// Specifies the backoff strategy for retrying failed requests.
#[derive(Clone, Debug)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(std::time::Duration),
    /// Uses a linearly growing delay: `base * attempt_number`.
    Linear {
        /// The delay after the first failed attempt.
        base: std::time::Duration,
    },
}

impl Backoff {
    pub(crate) fn delay(&self, attempt: u32) -> std::time::Duration {
        match self {
            Self::Fixed(d) => *d,
            Self::Linear { base } => *base * attempt,
        }
    }
}

/// Configuration for the automatic retry mechanism.
///
/// This layer handles transient failures only. Authorization failures (401)
/// are handled one level below, by the executor's single refresh-and-retry
/// cycle, and are never retried here.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Enables or disables the retry mechanism.
    pub enabled: bool,
    /// The maximum number of retries. The total number of attempts is `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// HTTP status codes that should trigger a retry.
    pub retry_on_status: Vec<u16>,
    /// Whether to retry on network-level errors (timeouts, resets).
    pub retry_on_transport: bool,
    /// A list field whose emptiness marks a 200 response as retryable.
    ///
    /// TradeStation can return 200-OK with no data for benign reasons
    /// (holiday, illiquid symbol) that look identical to transient glitches,
    /// so empty payloads get the same bounded retry as server errors. The
    /// last attempt's payload is returned as-is even when still empty.
    pub empty_list_field: Option<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 2,
            backoff: Backoff::Linear {
                base: std::time::Duration::from_millis(500),
            },
            retry_on_status: vec![500, 502, 503, 504],
            retry_on_transport: true,
            empty_list_field: Some("Bars".to_string()),
        }
    }
}

impl RetryConfig {
    /// True when the payload is empty, or the designated list field is
    /// present but empty.
    pub(crate) fn is_empty_payload(&self, body: &serde_json::Value) -> bool {
        match body {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => {
                if map.is_empty() {
                    return true;
                }
                self.empty_list_field
                    .as_deref()
                    .and_then(|field| map.get(field))
                    .and_then(serde_json::Value::as_array)
                    .is_some_and(Vec::is_empty)
            }
            _ => false,
        }
    }
}
