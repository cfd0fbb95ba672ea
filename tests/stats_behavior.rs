//! Behavior-driven tests for statistics over retrieved rates.
//!
//! Rates come from the real router backed by the fallback dataset, so these
//! tests cover the path from retrieval to the numbers a caller sees.

use std::sync::Arc;

use fxstat_core::{percentage_change, RateResult};
use fxstat_tests::*;

async fn retrieve(start: &str, end: &str) -> RateResult {
    keyed_router(Arc::new(ScriptedHttpClient::failing()))
        .get_rates(&request(start, end))
        .await
}

// =============================================================================
// Percentage change
// =============================================================================

#[test]
fn percentage_change_handles_zero_baseline() {
    assert_eq!(percentage_change(0.0, 0.0), PctChange::Value(0.0));
    assert!(percentage_change(0.0, 5.0).is_undefined());
    assert_eq!(percentage_change(100.0, 150.0).value(), Some(50.0));
    assert_eq!(percentage_change(100.0, 50.0).value(), Some(-50.0));
}

// =============================================================================
// Totals and breakdown
// =============================================================================

#[tokio::test]
async fn when_day_breakdown_requested_every_day_is_listed_with_its_change() {
    // Given: two fallback days for EUR
    let result = retrieve("2025-07-01", "2025-07-02").await;

    // When
    let stats = StatsCalculator::new()
        .process_rates(&result, &currency("EUR"), BreakdownMode::parse("day"))
        .expect("stats computed");

    // Then
    let breakdown = stats.breakdown.expect("breakdown present");
    assert_eq!(breakdown[0].rate, 0.9);
    assert_eq!(breakdown[0].pct_change, PctChange::Value(0.0));
    assert_eq!(breakdown[1].rate, 0.91);
    assert_eq!(breakdown[1].pct_change, PctChange::Value(1.11));
    assert_eq!(stats.totals.start_rate, 0.9);
    assert_eq!(stats.totals.end_rate, 0.91);
    assert_eq!(stats.totals.total_pct_change, PctChange::Value(1.11));
    assert_eq!(stats.totals.mean_rate, 0.905);
}

#[tokio::test]
async fn when_totals_only_requested_json_has_no_breakdown_key() {
    // Given
    let result = retrieve("2025-07-01", "2025-07-05").await;

    // When
    let stats = StatsCalculator::new()
        .process_rates(&result, &currency("GBP"), BreakdownMode::parse("none"))
        .expect("stats computed");

    // Then
    let json = serde_json::to_value(&stats).expect("serializable");
    assert!(json.get("breakdown").is_none());
    assert_eq!(json["totals"]["start_rate"], 0.78);
    assert_eq!(json["totals"]["end_rate"], 0.79);
}

#[tokio::test]
async fn breakdown_follows_calendar_order() {
    // Given
    let result = retrieve("2025-07-01", "2025-07-05").await;

    // When
    let stats = StatsCalculator::new()
        .process_rates(&result, &currency("EUR"), BreakdownMode::Day)
        .expect("stats computed");

    // Then
    let dates = stats
        .breakdown
        .expect("breakdown present")
        .iter()
        .map(|day| day.date)
        .collect::<Vec<_>>();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(dates.len(), 5);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn when_range_has_no_data_caller_sees_no_rates_message() {
    // Given: a range the dataset does not cover
    let result = retrieve("2024-01-01", "2024-01-03").await;

    // When
    let error = StatsCalculator::new()
        .process_rates(&result, &currency("EUR"), BreakdownMode::Day)
        .expect_err("no data");

    // Then
    assert_eq!(error, StatsError::NoData);
    assert_eq!(error.to_string(), "No rates data available");
}

#[tokio::test]
async fn when_retrieval_fails_caller_sees_retrieval_message() {
    // Given: every tier fails
    let dir = tempfile::tempdir().expect("temp dir");
    let router = RateRouterBuilder::new()
        .with_http_client(Arc::new(ScriptedHttpClient::failing()))
        .with_fallback_path(dir.path().join("absent.json"))
        .build();
    let result = router.get_rates(&request("2025-07-01", "2025-07-02")).await;

    // When
    let error = StatsCalculator::new()
        .process_rates(&result, &currency("EUR"), BreakdownMode::Day)
        .expect_err("retrieval failed");

    // Then
    assert_eq!(error.to_string(), "Failed to retrieve rates data");
    assert!(error.detail().is_some_and(|detail| detail.contains("absent.json")));
}
