//! Durable storage for the credential record.
//!
//! Pure file I/O: an absent, unreadable, malformed, or incomplete file loads
//! as `None`, which forces an initial refresh instead of failing startup.
//! The file carries no cross-process locking.

use super::Credentials;
use std::io;
use std::path::Path;

pub(crate) fn load(path: &Path) -> Option<Credentials> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

/// Overwrites the whole file with the serialized record.
pub(crate) fn save(path: &Path, creds: &Credentials) -> io::Result<()> {
    let body = serde_json::to_string(creds).map_err(io::Error::other)?;
    std::fs::write(path, body)
}
