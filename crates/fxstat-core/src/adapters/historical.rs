use std::future::Future;
use std::pin::Pin;

use crate::adapters::ExchangeRateHostApi;
use crate::data_source::{
    CapabilitySet, HealthStatus, RateRequest, RateSource, RatesFuture, SourceError,
    SourceErrorKind,
};
use crate::{ProviderId, RateBatch, RateSeries};

/// Per-day tier: one `historical` call for each calendar day of the range.
///
/// A single-day request is the single-date path: one call, longer timeout, and
/// its error is reported as-is. For longer ranges, days that fail are skipped
/// and only an empty accumulation is an error.
#[derive(Clone)]
pub struct HistoricalAdapter {
    api: ExchangeRateHostApi,
    single_day_timeout_ms: u64,
    per_day_timeout_ms: u64,
}

impl HistoricalAdapter {
    pub const DEFAULT_SINGLE_DAY_TIMEOUT_MS: u64 = 10_000;
    pub const DEFAULT_PER_DAY_TIMEOUT_MS: u64 = 5_000;

    pub fn new(api: ExchangeRateHostApi) -> Self {
        Self {
            api,
            single_day_timeout_ms: Self::DEFAULT_SINGLE_DAY_TIMEOUT_MS,
            per_day_timeout_ms: Self::DEFAULT_PER_DAY_TIMEOUT_MS,
        }
    }

    async fn single_day(&self, req: RateRequest) -> Result<RateBatch, SourceError> {
        let date = req.range.start();
        let rate = self
            .api
            .historical(date, &req.pair, self.single_day_timeout_ms)
            .await?;

        let mut series = RateSeries::new();
        series.insert(date, req.pair.quote.clone(), rate);
        Ok(RateBatch::new(req.pair.base, series))
    }

    async fn day_by_day(&self, req: RateRequest) -> Result<RateBatch, SourceError> {
        let mut series = RateSeries::new();
        let mut skipped = 0_u32;

        for date in req.range.days() {
            match self
                .api
                .historical(date, &req.pair, self.per_day_timeout_ms)
                .await
            {
                Ok(rate) => series.insert(date, req.pair.quote.clone(), rate),
                Err(error) if error.kind() == SourceErrorKind::NotConfigured => {
                    return Err(error);
                }
                Err(error) => {
                    skipped += 1;
                    tracing::debug!(%date, pair = %req.pair, %error, "skipping day");
                }
            }
        }

        if series.is_empty() {
            return Err(SourceError::empty(format!(
                "no historical rates retrieved for {} day(s) between {} and {}",
                req.range.len_days(),
                req.range.start(),
                req.range.end()
            )));
        }

        if skipped > 0 {
            tracing::info!(
                pair = %req.pair,
                retrieved = series.len(),
                skipped,
                "day-by-day retrieval finished with gaps"
            );
        }

        Ok(RateBatch::new(req.pair.base, series))
    }
}

impl RateSource for HistoricalAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Historical
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn rates<'a>(&'a self, req: RateRequest) -> RatesFuture<'a> {
        Box::pin(async move {
            if req.range.is_single_day() {
                self.single_day(req).await
            } else {
                self.day_by_day(req).await
            }
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { self.api.health() })
    }
}
