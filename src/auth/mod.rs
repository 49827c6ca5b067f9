//! OAuth2 bearer-token lifecycle: the on-disk credential record, the file
//! store, and the refresh-serializing [`TokenManager`].

mod manager;
mod store;

pub use manager::{AuthConfig, TokenManager};

use serde::{Deserialize, Serialize};

/// Safety margin subtracted from the token lifetime, compensating for clock
/// drift and in-flight latency between obtaining and using a token.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// One complete OAuth2 credential record, as persisted in the token file.
///
/// A file missing any of these fields deserializes to nothing and is treated
/// the same as an absent file. The record is replaced wholesale on every
/// successful refresh; `refresh_token` carries over from the previous record
/// when the server omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub id_token: String,
    pub scope: String,
    pub token_type: String,
    /// Token lifetime in seconds, as reported by the server.
    pub expires_in: i64,
    pub refresh_token: String,
    /// Unix seconds at which the token was obtained, set locally at save time.
    pub obtained_at: i64,
}

impl Credentials {
    pub(crate) fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }

    pub(crate) fn is_expired_at(&self, now: i64) -> bool {
        now >= self.obtained_at + self.expires_in - EXPIRY_MARGIN_SECS
    }
}
