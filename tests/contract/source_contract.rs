use std::sync::Arc;

use fxstat_core::{
    CapabilitySet, ExchangeRateHostApi, HealthState, HistoricalAdapter, RangeShape, RateSource,
    SampleDatasetAdapter, SourceErrorKind, TimeframeAdapter,
};
use fxstat_tests::*;

#[derive(Clone)]
struct SourceCase {
    id: ProviderId,
    source: Arc<dyn RateSource>,
    capabilities: CapabilitySet,
}

fn source_cases(client: Arc<ScriptedHttpClient>, api_key: Option<&str>) -> Vec<SourceCase> {
    let api = ExchangeRateHostApi::new(client, api_key.map(String::from));
    vec![
        SourceCase {
            id: ProviderId::Timeframe,
            source: Arc::new(TimeframeAdapter::new(api.clone())),
            capabilities: CapabilitySet::new(false, true),
        },
        SourceCase {
            id: ProviderId::Historical,
            source: Arc::new(HistoricalAdapter::new(api)),
            capabilities: CapabilitySet::full(),
        },
        SourceCase {
            id: ProviderId::Sample,
            source: Arc::new(SampleDatasetAdapter::from_dataset(fallback_dataset())),
            capabilities: CapabilitySet::full(),
        },
    ]
}

#[test]
fn every_source_reports_its_id_and_capabilities() {
    for case in source_cases(Arc::new(ScriptedHttpClient::failing()), Some("key")) {
        assert_eq!(case.source.id(), case.id);
        assert_eq!(
            case.source.capabilities(),
            case.capabilities,
            "source '{}': capabilities",
            case.id
        );
        assert_eq!(case.id.is_remote(), case.id != ProviderId::Sample);
    }
}

#[tokio::test]
async fn successful_sources_stay_inside_requested_range() {
    let client = Arc::new(ScriptedHttpClient::new(|request| {
        if request.url.ends_with("/timeframe") {
            Ok(HttpResponse::ok_json(
                r#"{"success":true,"quotes":{"2025-07-01":{"USDEUR":0.9},"2025-07-02":{"USDEUR":0.91},"2025-07-09":{"USDEUR":0.99}}}"#,
            ))
        } else {
            Ok(historical_quote("USDEUR", 0.9))
        }
    }));
    let req = request("2025-07-01", "2025-07-02");

    for case in source_cases(client, Some("key")) {
        if !case.capabilities.supports(RangeShape::of(req.range)) {
            continue;
        }
        let batch = case
            .source
            .rates(req.clone())
            .await
            .unwrap_or_else(|error| panic!("source '{}' failed: {error}", case.id));
        assert!(
            batch.series.dates().all(|day| req.range.contains(day)),
            "source '{}': dates outside range",
            case.id
        );
        assert!(!batch.series.is_empty(), "source '{}': empty", case.id);
    }
}

#[tokio::test]
async fn remote_sources_without_key_are_unconfigured() {
    let client = Arc::new(ScriptedHttpClient::failing());

    for case in source_cases(client.clone(), None) {
        let health = case.source.health().await;
        if case.id.is_remote() {
            assert_eq!(health.state, HealthState::Unconfigured, "source '{}'", case.id);
            let error = case
                .source
                .rates(request("2025-07-01", "2025-07-02"))
                .await
                .expect_err("unconfigured source must fail");
            assert_eq!(error.kind(), SourceErrorKind::NotConfigured);
        } else {
            assert_eq!(health.state, HealthState::Ready);
        }
    }

    assert_eq!(client.call_count(), 0);
}
