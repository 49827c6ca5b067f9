//! Historical bar retrieval, with automatic chunking and parallel fetch for
//! date ranges that exceed the server's per-call bar limit.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};

use crate::core::client::retry::RetryConfig;
use crate::core::{TsClient, TsError};

pub(crate) mod chunk;
pub(crate) mod merge;
mod params;

pub use chunk::MAX_BARS_PER_CALL;
pub use params::{BarUnit, SessionTemplate};

const DATE_FMT: &str = "%Y-%m-%d";

/// Builder for the bar-chart endpoint.
///
/// Two request shapes are supported, mirroring the upstream API:
/// - `barsback`: a fixed lookback from `last_date` (or now), capped at
///   [`MAX_BARS_PER_CALL`] by the server.
/// - a date range via [`between`](Self::between): when the estimated bar
///   count exceeds the cap, the range is split into sub-ranges fetched
///   concurrently and merged into a single chronologically sorted response.
///
/// Chunks that still fail after retries are logged and skipped; a multi-year
/// fetch succeeds with partial data rather than aborting on one bad chunk.
pub struct BarsBuilder<'a> {
    client: &'a TsClient,
    symbol: String,
    interval: u32,
    unit: BarUnit,
    barsback: Option<u32>,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    session_template: Option<SessionTemplate>,
    max_workers: usize,
    retry_override: Option<RetryConfig>,
}

impl<'a> BarsBuilder<'a> {
    pub fn new(client: &'a TsClient, symbol: impl Into<String>) -> Self {
        Self {
            client,
            symbol: symbol.into(),
            interval: 1,
            unit: BarUnit::Daily,
            barsback: None,
            first_date: None,
            last_date: None,
            session_template: None,
            max_workers: 15,
            retry_override: None,
        }
    }

    /// Bar interval; minutes per bar for intraday data. Default 1.
    #[must_use]
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Bar time unit. Default [`BarUnit::Daily`].
    #[must_use]
    pub fn unit(mut self, unit: BarUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Number of bars to look back from `last_date`. Mutually exclusive with
    /// a date range.
    #[must_use]
    pub fn barsback(mut self, bars: u32) -> Self {
        self.barsback = Some(bars);
        self
    }

    /// Inclusive day-granularity date range.
    #[must_use]
    pub fn between(mut self, first: NaiveDate, last: NaiveDate) -> Self {
        self.first_date = Some(first);
        self.last_date = Some(last);
        self
    }

    /// Start date of the range. `last_date` defaults to today.
    #[must_use]
    pub fn first_date(mut self, first: NaiveDate) -> Self {
        self.first_date = Some(first);
        self
    }

    /// End date of the range or of the `barsback` lookback.
    #[must_use]
    pub fn last_date(mut self, last: NaiveDate) -> Self {
        self.last_date = Some(last);
        self
    }

    /// U.S. equity session template.
    #[must_use]
    pub fn session_template(mut self, template: SessionTemplate) -> Self {
        self.session_template = Some(template);
        self
    }

    /// Concurrency bound for chunked fetches. Default 15.
    #[must_use]
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Override the client's retry policy for this request.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Execute the request and return the (possibly merged) JSON response.
    ///
    /// # Errors
    ///
    /// Fails with [`TsError::InvalidParams`] or [`TsError::InvalidDates`] on
    /// parameter violations before any network call, and otherwise with the
    /// executor's error for single-call requests. Chunked requests tolerate
    /// per-chunk failures.
    pub async fn fetch(self) -> Result<Value, TsError> {
        if self.barsback.is_some() && self.first_date.is_some() {
            return Err(TsError::InvalidParams(
                "barsback and firstdate are mutually exclusive".into(),
            ));
        }
        if let Some(bars) = self.barsback
            && u64::from(bars) > MAX_BARS_PER_CALL
        {
            return Err(TsError::InvalidParams(format!(
                "requests are limited to {MAX_BARS_PER_CALL} bars per call"
            )));
        }
        if self.interval == 0 {
            return Err(TsError::InvalidParams("interval must be at least 1".into()));
        }

        let url = self
            .client
            .base_api()
            .join(&format!("marketdata/barcharts/{}", self.symbol))?;

        let Some(first) = self.first_date else {
            // Lookback (or server-default) request: always a single call.
            let params = self.params_for(None, self.last_date);
            return self
                .client
                .get_json_with_retry(&url, &params, self.retry_override.as_ref())
                .await;
        };

        let last = self
            .last_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let plan = chunk::plan(first, last, self.unit, self.interval, MAX_BARS_PER_CALL)?;

        if let [(start, end)] = plan[..] {
            let params = self.params_for(Some(start), Some(end));
            return self
                .client
                .get_json_with_retry(&url, &params, self.retry_override.as_ref())
                .await;
        }

        tracing::debug!(
            symbol = %self.symbol,
            chunks = plan.len(),
            "splitting bar request into concurrent chunks"
        );

        let client = self.client;
        let retry = self.retry_override.clone();
        let jobs: Vec<_> = plan
            .iter()
            .map(|&(start, end)| (start, end, self.params_for(Some(start), Some(end))))
            .collect();

        let fetches = jobs.into_iter().map(|(start, end, params)| {
            let url = url.clone();
            let retry = retry.clone();
            async move {
                let result = client
                    .get_json_with_retry(&url, &params, retry.as_ref())
                    .await;
                (start, end, result)
            }
        });
        let results: Vec<_> = stream::iter(fetches)
            .buffer_unordered(self.max_workers.max(1))
            .collect()
            .await;

        let mut acc = Map::new();
        acc.insert(merge::BARS_FIELD.to_string(), Value::Array(Vec::new()));
        for (start, end, result) in results {
            match result {
                Ok(payload) => {
                    let has_bars = payload
                        .get(merge::BARS_FIELD)
                        .and_then(Value::as_array)
                        .is_some_and(|bars| !bars.is_empty());
                    if has_bars {
                        merge::merge_into(&mut acc, payload);
                    } else {
                        tracing::warn!(
                            symbol = %self.symbol,
                            %start,
                            %end,
                            "chunk returned no bars, skipping"
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        symbol = %self.symbol,
                        %start,
                        %end,
                        error = %err,
                        "chunk failed after retries, continuing with partial data"
                    );
                }
            }
        }
        merge::sort_bars(&mut acc);
        Ok(Value::Object(acc))
    }

    fn params_for(
        &self,
        first: Option<NaiveDate>,
        last: Option<NaiveDate>,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("interval", self.interval.to_string()),
            ("unit", self.unit.as_str().to_string()),
        ];
        if let Some(bars) = self.barsback {
            params.push(("barsback", bars.to_string()));
        }
        if let Some(date) = first {
            params.push(("firstdate", date.format(DATE_FMT).to_string()));
        }
        if let Some(date) = last {
            params.push(("lastdate", date.format(DATE_FMT).to_string()));
        }
        if let Some(template) = self.session_template {
            params.push(("sessiontemplate", template.as_str().to_string()));
        }
        params
    }
}
