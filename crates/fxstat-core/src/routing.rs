use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::adapters::{
    ExchangeRateHostApi, HistoricalAdapter, SampleDatasetAdapter, TimeframeAdapter,
    DEFAULT_BASE_URL, DEFAULT_DATASET_PATH,
};
use crate::data_source::{
    CapabilitySet, HealthState, HealthStatus, RateRequest, RateSource, SourceError,
    SourceErrorKind,
};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{CurrencyCode, ProviderId, RateSeries};

/// One failed tier, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: ProviderId,
    pub code: String,
    pub message: String,
}

impl SourceFailure {
    fn new(source: ProviderId, error: &SourceError) -> Self {
        Self {
            source,
            code: error.code().to_owned(),
            message: error.message().to_owned(),
        }
    }
}

/// Successful retrieval.
#[derive(Debug, Clone)]
pub struct RateSuccess {
    pub base: CurrencyCode,
    pub series: RateSeries,
    pub selected_source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub errors: Vec<SourceFailure>,
    pub latency_ms: u64,
}

/// Failed retrieval after exhausting every tier.
#[derive(Debug, Clone)]
pub struct RateFailure {
    /// Error description of the last tier attempted.
    pub message: String,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub errors: Vec<SourceFailure>,
    pub latency_ms: u64,
}

pub type RateResult = Result<RateSuccess, RateFailure>;

/// Source snapshot used by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSnapshot {
    pub id: ProviderId,
    pub remote: bool,
    pub capabilities: CapabilitySet,
    #[serde(flatten)]
    pub health: HealthStatus,
}

/// Ordered chain of rate sources.
///
/// Sources are tried in order; the first success wins. Failures are logged
/// and recorded, never raised.
pub struct RateRouter {
    sources: Vec<Arc<dyn RateSource>>,
    deadline: Option<Duration>,
}

impl Default for RateRouter {
    fn default() -> Self {
        RateRouterBuilder::new().build()
    }
}

/// Builder wiring the default three-tier chain from explicit configuration.
///
/// Nothing is read from the environment here; the binary owns that.
///
/// # Example
///
/// ```rust,ignore
/// use fxstat_core::RateRouterBuilder;
///
/// let router = RateRouterBuilder::new()
///     .with_api_key(std::env::var("EXCHANGE_RATE_API_KEY").ok())
///     .with_fallback_path("data/sample_api.json")
///     .build();
/// ```
pub struct RateRouterBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    api_key: Option<String>,
    base_url: String,
    fallback_path: PathBuf,
    fallback_source: Option<SampleDatasetAdapter>,
    deadline: Option<Duration>,
    enable_timeframe: bool,
    enable_historical: bool,
}

impl Default for RateRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateRouterBuilder {
    pub fn new() -> Self {
        Self {
            http_client: None,
            api_key: None,
            base_url: String::from(DEFAULT_BASE_URL),
            fallback_path: PathBuf::from(DEFAULT_DATASET_PATH),
            fallback_source: None,
            deadline: None,
            enable_timeframe: true,
            enable_historical: true,
        }
    }

    /// Transport for the remote tiers. Defaults to [`ReqwestHttpClient`].
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Remote credential. Without one the remote tiers are skipped.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_fallback_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_path = path.into();
        self.fallback_source = None;
        self
    }

    /// Replaces the file-backed fallback tier, e.g. with an in-memory dataset.
    pub fn with_fallback_source(mut self, source: SampleDatasetAdapter) -> Self {
        self.fallback_source = Some(source);
        self
    }

    /// Overall budget for the remote tiers of one request.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_timeframe_enabled(mut self, enabled: bool) -> Self {
        self.enable_timeframe = enabled;
        self
    }

    pub fn with_historical_enabled(mut self, enabled: bool) -> Self {
        self.enable_historical = enabled;
        self
    }

    pub fn build(self) -> RateRouter {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let api =
            ExchangeRateHostApi::new(http_client, self.api_key).with_base_url(self.base_url);

        let mut sources: Vec<Arc<dyn RateSource>> = Vec::with_capacity(3);
        if self.enable_timeframe {
            sources.push(Arc::new(TimeframeAdapter::new(api.clone())));
        }
        if self.enable_historical {
            sources.push(Arc::new(HistoricalAdapter::new(api)));
        }
        sources.push(Arc::new(
            self.fallback_source
                .unwrap_or_else(|| SampleDatasetAdapter::from_path(self.fallback_path)),
        ));

        RateRouter::new(sources).with_deadline(self.deadline)
    }
}

impl RateRouter {
    pub fn new(sources: Vec<Arc<dyn RateSource>>) -> Self {
        Self {
            sources,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn snapshots(&self) -> Vec<SourceSnapshot> {
        let mut snapshots = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            snapshots.push(SourceSnapshot {
                id: source.id(),
                remote: source.id().is_remote(),
                capabilities: source.capabilities(),
                health: source.health().await,
            });
        }
        snapshots
    }

    /// Resolves rates for `req`, walking the chain until one source succeeds.
    pub async fn get_rates(&self, req: &RateRequest) -> RateResult {
        let started = Instant::now();
        let shape = req.shape();
        let mut source_chain = Vec::with_capacity(self.sources.len());
        let mut errors = Vec::new();
        let mut last_error: Option<SourceError> = None;

        for source in &self.sources {
            let provider = source.id();

            if !source.capabilities().supports(shape) {
                tracing::debug!(source = %provider, %shape, "source does not serve this range shape");
                continue;
            }

            source_chain.push(provider);

            let health = source.health().await;
            if health.state == HealthState::Unconfigured {
                let error = SourceError::not_configured(
                    health
                        .detail
                        .unwrap_or_else(|| String::from("source is not configured")),
                );
                record_failure(provider, &error, &mut errors);
                last_error = Some(error);
                continue;
            }

            let outcome = match self.remaining_budget(started, provider) {
                Budget::Unbounded => source.rates(req.clone()).await,
                Budget::Remaining(remaining) => {
                    match tokio::time::timeout(remaining, source.rates(req.clone())).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(SourceError::deadline_exceeded(format!(
                            "request deadline elapsed during '{provider}'"
                        ))),
                    }
                }
                Budget::Exhausted => Err(SourceError::deadline_exceeded(format!(
                    "request deadline elapsed before '{provider}'"
                ))),
            };

            match outcome {
                Ok(mut batch) => {
                    batch.series.retain_within(req.range);

                    let mut warnings = Vec::new();
                    if !errors.is_empty() {
                        warnings.push(format!(
                            "source fallback succeeded with '{provider}' after {} failed attempt(s)",
                            errors.len()
                        ));
                    }
                    if batch.base != req.pair.base {
                        warnings.push(format!(
                            "rates are quoted against {} instead of requested {}",
                            batch.base, req.pair.base
                        ));
                    }

                    tracing::info!(
                        source = %provider,
                        entries = batch.series.len(),
                        failed_attempts = errors.len(),
                        "rates resolved"
                    );

                    return Ok(RateSuccess {
                        base: batch.base,
                        series: batch.series,
                        selected_source: provider,
                        source_chain,
                        warnings,
                        errors,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) => {
                    record_failure(provider, &error, &mut errors);
                    last_error = Some(error);
                }
            }
        }

        let message = last_error.map_or_else(
            || format!("no source candidates available for range shape '{shape}'"),
            |error| error.message().to_owned(),
        );
        tracing::error!(pair = %req.pair, %message, "all rate sources failed");

        Err(RateFailure {
            message,
            source_chain,
            warnings: vec![String::from("all rate sources failed")],
            errors,
            latency_ms: elapsed_ms(started),
        })
    }

    fn remaining_budget(&self, started: Instant, provider: ProviderId) -> Budget {
        let Some(deadline) = self.deadline else {
            return Budget::Unbounded;
        };
        if !provider.is_remote() {
            return Budget::Unbounded;
        }

        match deadline.checked_sub(started.elapsed()) {
            Some(remaining) if !remaining.is_zero() => Budget::Remaining(remaining),
            _ => Budget::Exhausted,
        }
    }
}

enum Budget {
    Unbounded,
    Remaining(Duration),
    Exhausted,
}

fn record_failure(provider: ProviderId, error: &SourceError, errors: &mut Vec<SourceFailure>) {
    if error.kind() == SourceErrorKind::NotConfigured {
        tracing::debug!(source = %provider, code = error.code(), "{}", error.message());
    } else {
        tracing::warn!(source = %provider, code = error.code(), "{}", error.message());
    }
    errors.push(SourceFailure::new(provider, error));
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
