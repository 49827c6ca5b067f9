//! Shared validation for list-valued path parameters.

use crate::core::TsError;

/// Validate a caller-supplied identifier list and join it into one
/// comma-separated path segment. Items are trimmed and uppercased, matching
/// how the API canonicalizes symbols and account ids.
pub(crate) fn csv_segment(items: &[&str], limit: usize, label: &str) -> Result<String, TsError> {
    if items.is_empty() {
        return Err(TsError::InvalidParams(format!(
            "at least one {label} must be provided"
        )));
    }
    if items.len() > limit {
        return Err(TsError::InvalidParams(format!(
            "maximum {limit} {label}s allowed per request"
        )));
    }
    Ok(items
        .iter()
        .map(|item| item.trim().to_uppercase())
        .collect::<Vec<_>>()
        .join(","))
}
