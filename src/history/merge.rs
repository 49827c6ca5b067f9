//! Accumulation of per-chunk bar payloads into one response.

use serde_json::{Map, Value};

/// The list field concatenated across chunks.
pub(crate) const BARS_FIELD: &str = "Bars";
/// The key bars are sorted by after the merge.
pub(crate) const TIMESTAMP_FIELD: &str = "TimeStamp";

/// Fold one chunk payload into the accumulator. The `Bars` array is
/// concatenated; every other field is overwritten (last-write-wins, in
/// completion order, which is deliberately non-deterministic).
pub(crate) fn merge_into(acc: &mut Map<String, Value>, payload: Value) {
    let Value::Object(obj) = payload else {
        return;
    };
    for (key, value) in obj {
        if key == BARS_FIELD {
            match (acc.get_mut(BARS_FIELD), value) {
                (Some(Value::Array(dst)), Value::Array(src)) => dst.extend(src),
                (_, value) => {
                    acc.insert(BARS_FIELD.to_string(), value);
                }
            }
        } else {
            acc.insert(key, value);
        }
    }
}

/// Sort the accumulated bars ascending by timestamp, regardless of the
/// order chunks completed in. ISO-8601 timestamps in a uniform zone sort
/// correctly as strings.
pub(crate) fn sort_bars(acc: &mut Map<String, Value>) {
    if let Some(Value::Array(bars)) = acc.get_mut(BARS_FIELD) {
        bars.sort_by(|a, b| bar_timestamp(a).cmp(bar_timestamp(b)));
    }
}

fn bar_timestamp(bar: &Value) -> &str {
    bar.get(TIMESTAMP_FIELD)
        .and_then(Value::as_str)
        .unwrap_or("")
}
