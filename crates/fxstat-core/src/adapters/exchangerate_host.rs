use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;

use crate::data_source::{HealthStatus, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{CurrencyPair, DateRange, RateDate, RateSeries};

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate.host";

/// Shared access to the exchangerate.host API.
///
/// Both remote tiers go through this client; it owns the credential, the base
/// URL and the transport, and turns every failure mode into a [`SourceError`].
#[derive(Clone)]
pub struct ExchangeRateHostApi {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateHostApi {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn health(&self) -> HealthStatus {
        if self.is_configured() {
            HealthStatus::ready()
        } else {
            HealthStatus::unconfigured("no exchangerate.host access key configured")
        }
    }

    /// Rate of `pair` on one date via the `historical` endpoint.
    pub async fn historical(
        &self,
        date: RateDate,
        pair: &CurrencyPair,
        timeout_ms: u64,
    ) -> Result<f64, SourceError> {
        let request = self
            .request("historical")?
            .with_query("date", date.format_iso())
            .with_query("source", pair.base.as_str())
            .with_query("currencies", pair.quote.as_str())
            .with_timeout_ms(timeout_ms);

        let body = self.send(request).await?;
        let payload: HistoricalPayload = serde_json::from_str(&body).map_err(|e| {
            SourceError::malformed(format!("failed to parse historical response: {e}"))
        })?;

        if !payload.success {
            return Err(rejection("historical", payload.error));
        }

        let quotes = payload
            .quotes
            .ok_or_else(|| SourceError::malformed("historical response has no quotes"))?;

        quotes.get(&pair.code()).copied().ok_or_else(|| {
            SourceError::empty(format!(
                "historical response for {date} has no '{}' quote",
                pair.code()
            ))
        })
    }

    /// Rates of `pair` over `range` via the `timeframe` endpoint.
    ///
    /// Only dates inside `range` that carry the pair key are kept.
    pub async fn timeframe(
        &self,
        range: DateRange,
        pair: &CurrencyPair,
        timeout_ms: u64,
    ) -> Result<RateSeries, SourceError> {
        let request = self
            .request("timeframe")?
            .with_query("start_date", range.start().format_iso())
            .with_query("end_date", range.end().format_iso())
            .with_query("source", pair.base.as_str())
            .with_query("currencies", pair.quote.as_str())
            .with_timeout_ms(timeout_ms);

        let body = self.send(request).await?;
        let payload: TimeframePayload = serde_json::from_str(&body).map_err(|e| {
            SourceError::malformed(format!("failed to parse timeframe response: {e}"))
        })?;

        if !payload.success {
            return Err(rejection("timeframe", payload.error));
        }

        let quotes = payload
            .quotes
            .ok_or_else(|| SourceError::malformed("timeframe response has no quotes"))?;

        let key = pair.code();
        let mut series = RateSeries::new();
        for (raw_date, day_quotes) in quotes {
            let Ok(date) = RateDate::parse(&raw_date) else {
                tracing::debug!(date = %raw_date, "skipping timeframe entry with unparsable date");
                continue;
            };
            if !range.contains(date) {
                continue;
            }
            if let Some(rate) = day_quotes.get(&key) {
                series.insert(date, pair.quote.clone(), *rate);
            }
        }

        if series.is_empty() {
            return Err(SourceError::empty(format!(
                "timeframe response has no '{key}' quotes between {} and {}",
                range.start(),
                range.end()
            )));
        }

        Ok(series)
    }

    fn request(&self, endpoint: &str) -> Result<HttpRequest, SourceError> {
        let Some(api_key) = &self.api_key else {
            return Err(SourceError::not_configured(
                "no exchangerate.host access key configured",
            ));
        };

        Ok(HttpRequest::get(format!("{}/{endpoint}", self.base_url))
            .with_header("accept", "application/json")
            .with_query("access_key", api_key.as_str()))
    }

    async fn send(&self, request: HttpRequest) -> Result<String, SourceError> {
        let url = request.redacted_url();
        let timeout_ms = request.timeout_ms;
        tracing::debug!(%url, timeout_ms, "calling exchangerate.host");

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                SourceError::unavailable(format!(
                    "exchangerate.host did not answer within {timeout_ms} ms"
                ))
            } else {
                SourceError::unavailable(format!(
                    "exchangerate.host transport error: {}",
                    e.message()
                ))
            }
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "exchangerate.host returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}

fn rejection(endpoint: &str, error: Option<ApiErrorPayload>) -> SourceError {
    let detail = error
        .and_then(|error| match (error.info, error.code) {
            (Some(info), Some(code)) => Some(format!("{info} (code {code})")),
            (Some(info), None) => Some(info),
            (None, Some(code)) => Some(format!("code {code}")),
            (None, None) => None,
        })
        .unwrap_or_else(|| String::from("no error detail"));

    SourceError::rejected(format!("{endpoint} request rejected: {detail}"))
}

#[derive(Debug, Deserialize)]
struct HistoricalPayload {
    #[serde(default)]
    success: bool,
    quotes: Option<HashMap<String, f64>>,
    error: Option<ApiErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct TimeframePayload {
    #[serde(default)]
    success: bool,
    quotes: Option<BTreeMap<String, HashMap<String, f64>>>,
    error: Option<ApiErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    code: Option<i64>,
    info: Option<String>,
}
