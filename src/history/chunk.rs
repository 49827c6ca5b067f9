//! Date-range chunk planning for large historical queries.

use super::params::BarUnit;
use crate::core::TsError;
use chrono::{Days, NaiveDate};

/// Server-side cap on bars returned by a single call.
pub const MAX_BARS_PER_CALL: u64 = 57_600;

/// Split an inclusive day-granularity range into sub-ranges small enough
/// that each fits under `max_bars` estimated bars.
///
/// The returned chunks are consecutive, disjoint, inclusive on both ends,
/// and cover `[first, last]` exactly: each chunk starts the day after the
/// previous one ends, so no boundary day is requested twice.
pub(crate) fn plan(
    first: NaiveDate,
    last: NaiveDate,
    unit: BarUnit,
    interval: u32,
    max_bars: u64,
) -> Result<Vec<(NaiveDate, NaiveDate)>, TsError> {
    if first > last {
        return Err(TsError::InvalidDates);
    }
    if interval == 0 {
        return Err(TsError::InvalidParams("interval must be at least 1".into()));
    }

    let days = (last - first).num_days() as u64 + 1;
    let multiplier = unit.period_multiplier();

    // estimate = days * multiplier / interval, compared without rounding
    if days * multiplier <= max_bars * u64::from(interval) {
        return Ok(vec![(first, last)]);
    }

    let max_days = max_bars * u64::from(interval) / multiplier;
    if max_days == 0 {
        return Err(TsError::Config(format!(
            "{} bars at interval {interval} do not fit in a single-day request",
            unit.as_str()
        )));
    }

    let mut chunks = Vec::new();
    let mut start = first;
    while start <= last {
        let end = start
            .checked_add_days(Days::new(max_days - 1))
            .map_or(last, |d| d.min(last));
        chunks.push((start, end));
        start = match end.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(chunks)
}
