use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum TsError {
    /// Required configuration is missing or unusable (e.g. no client credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// The token refresh call failed or returned unusable credentials.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The server returned a non-2xx status after all applicable retries.
    #[error("unexpected response status {status} at {url}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
        /// The response body, as text.
        body: String,
    },

    /// A network-level failure that survived all retries.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The data received from the API was in an unexpected format.
    #[error("data format unexpected or missing field: {0}")]
    Data(String),

    /// A caller-supplied parameter violates a documented constraint.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// An inverted date range was provided for a historical data request.
    #[error("invalid date range: first date must not be after last date")]
    InvalidDates,

    /// A streaming connection was rejected with a non-2xx, non-401 status.
    /// The session terminates instead of reconnecting.
    #[error("stream terminated by server: status {status}: {body}")]
    StreamFatal {
        /// The HTTP status code.
        status: u16,
        /// The response body, as text.
        body: String,
    },
}
