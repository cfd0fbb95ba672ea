use std::future::Future;
use std::pin::Pin;

use crate::adapters::ExchangeRateHostApi;
use crate::data_source::{
    CapabilitySet, HealthStatus, RateRequest, RateSource, RatesFuture, SourceError,
};
use crate::{ProviderId, RateBatch};

/// Multi-day tier: one bulk `timeframe` call covering the whole range.
#[derive(Clone)]
pub struct TimeframeAdapter {
    api: ExchangeRateHostApi,
    timeout_ms: u64,
}

impl TimeframeAdapter {
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    pub fn new(api: ExchangeRateHostApi) -> Self {
        Self {
            api,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

impl RateSource for TimeframeAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Timeframe
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(false, true)
    }

    fn rates<'a>(&'a self, req: RateRequest) -> RatesFuture<'a> {
        Box::pin(async move {
            if !self.capabilities().supports(req.shape()) {
                return Err(SourceError::unsupported_range(req.shape()));
            }

            let series = self
                .api
                .timeframe(req.range, &req.pair, self.timeout_ms)
                .await?;
            Ok(RateBatch::new(req.pair.base, series))
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { self.api.health() })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};

    #[tokio::test]
    async fn refuses_single_day_requests_without_calling_out() {
        let client = Arc::new(ScriptedHttpClient::failing());
        let adapter = TimeframeAdapter::new(ExchangeRateHostApi::new(
            client.clone(),
            Some(String::from("key")),
        ));

        let request =
            RateRequest::parse("2025-07-01", "2025-07-01", "USD", "EUR").expect("valid request");
        let err = adapter.rates(request).await.expect_err("must fail");

        assert_eq!(err.kind(), SourceErrorKind::UnsupportedRange);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn reshapes_bulk_quotes_under_requested_base() {
        let client = Arc::new(ScriptedHttpClient::new(|_| {
            Ok(HttpResponse::ok_json(
                r#"{"success":true,"quotes":{"2025-07-01":{"USDGBP":0.78},"2025-07-02":{"USDGBP":0.79}}}"#,
            ))
        }));
        let adapter = TimeframeAdapter::new(ExchangeRateHostApi::new(
            client.clone(),
            Some(String::from("key")),
        ))
        .with_timeout_ms(2_500);

        let request =
            RateRequest::parse("2025-07-01", "2025-07-02", "USD", "GBP").expect("valid request");
        let batch = adapter.rates(request).await.expect("bulk call succeeds");

        assert_eq!(batch.base.as_str(), "USD");
        assert_eq!(batch.series.len(), 2);
        assert_eq!(client.calls()[0].timeout_ms, 2_500);
        assert_eq!(client.calls()[0].query_param("start_date"), Some("2025-07-01"));
        assert_eq!(client.calls()[0].query_param("end_date"), Some("2025-07-02"));
    }
}
