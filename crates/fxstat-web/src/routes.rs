use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use fxstat_core::{
    BreakdownMode, CurrencyCode, PctChange, ProviderId, RateDate, RateRequest, RateResult,
    RateRouter, RateStats, SourceSnapshot, StatsCalculator, SummaryStats, UtcDateTime,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;

const SERVICE_NAME: &str = "fxstat";
const DEFAULT_FROM: &str = "USD";
const DEFAULT_TO: &str = "EUR";
const FINANCE_EXAMPLE: &str = "/finance?start=2025-07-01&end=2025-07-03";
const RATES_EXAMPLE: &str = "/api/rates?start=2025-07-01&end=2025-07-03";
const DASHBOARD: &str = include_str!("../assets/index.html");

/// Shared handler state. Cloned per request; the router itself is immutable.
#[derive(Clone)]
pub struct AppState {
    router: Arc<RateRouter>,
    calculator: StatsCalculator,
}

impl AppState {
    pub fn new(router: RateRouter) -> Self {
        Self {
            router: Arc::new(router),
            calculator: StatsCalculator::new(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/finance", get(finance))
        .route("/api/rates", get(api_rates))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct RateQuery {
    start: Option<String>,
    end: Option<String>,
    breakdown: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl RateQuery {
    fn to_request(&self, example: &'static str) -> Result<RateRequest, ApiError> {
        let (Some(start), Some(end)) = (non_blank(&self.start), non_blank(&self.end)) else {
            return Err(ApiError::MissingDates { example });
        };
        let from = non_blank(&self.from).unwrap_or(DEFAULT_FROM);
        let to = non_blank(&self.to).unwrap_or(DEFAULT_TO);

        RateRequest::parse(start, end, from, to)
            .map_err(|error| ApiError::from_validation(error, example))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
struct ResponseMetadata {
    request_id: Uuid,
    start_date: RateDate,
    end_date: RateDate,
    from_currency: CurrencyCode,
    to_currency: CurrencyCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<String>,
    source: Option<ProviderId>,
    source_chain: Vec<ProviderId>,
    warnings: Vec<String>,
    timestamp: UtcDateTime,
}

impl ResponseMetadata {
    fn new(request: &RateRequest, breakdown: Option<String>, result: RateResult) -> Self {
        let (source, source_chain, warnings) = match result {
            Ok(success) => (
                Some(success.selected_source),
                success.source_chain,
                success.warnings,
            ),
            Err(failure) => (None, failure.source_chain, failure.warnings),
        };

        Self {
            request_id: Uuid::new_v4(),
            start_date: request.range.start(),
            end_date: request.range.end(),
            from_currency: request.pair.base.clone(),
            to_currency: request.pair.quote.clone(),
            breakdown,
            source,
            source_chain,
            warnings,
            timestamp: UtcDateTime::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FinanceResponse {
    #[serde(flatten)]
    stats: RateStats,
    metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
struct ChartResponse {
    labels: Vec<RateDate>,
    rates: Vec<f64>,
    /// Undefined changes are plotted as 0.
    changes: Vec<f64>,
    totals: SummaryStats,
    metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    timestamp: UtcDateTime,
    sources: Vec<SourceSnapshot>,
}

async fn finance(
    State(state): State<AppState>,
    Query(query): Query<RateQuery>,
) -> Result<Json<FinanceResponse>, ApiError> {
    let request = query.to_request(FINANCE_EXAMPLE)?;
    let breakdown = query.breakdown.unwrap_or_else(|| String::from("day"));
    let mode = BreakdownMode::parse(&breakdown);

    let result = state.router.get_rates(&request).await;
    let stats = state
        .calculator
        .process_rates(&result, &request.pair.quote, mode)?;

    Ok(Json(FinanceResponse {
        stats,
        metadata: ResponseMetadata::new(&request, Some(breakdown), result),
    }))
}

async fn api_rates(
    State(state): State<AppState>,
    Query(query): Query<RateQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    let request = query.to_request(RATES_EXAMPLE)?;

    let result = state.router.get_rates(&request).await;
    let stats = state
        .calculator
        .process_rates(&result, &request.pair.quote, BreakdownMode::Day)?;

    let days = stats.breakdown.unwrap_or_default();
    Ok(Json(ChartResponse {
        labels: days.iter().map(|day| day.date).collect(),
        rates: days.iter().map(|day| day.rate).collect(),
        changes: days
            .iter()
            .map(|day| match day.pct_change {
                PctChange::Value(value) => value,
                PctChange::Undefined => 0.0,
            })
            .collect(),
        totals: stats.totals,
        metadata: ResponseMetadata::new(&request, None, result),
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: UtcDateTime::now(),
        sources: state.router.snapshots().await,
    })
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use fxstat_core::{FallbackDataset, RateRouterBuilder, SampleDatasetAdapter, ScriptedHttpClient};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn offline_app() -> Router {
        let dataset = FallbackDataset::from_json(
            r#"{"base":"USD","rates":{
                "2025-07-01":{"EUR":0.9,"GBP":0.78},
                "2025-07-02":{"EUR":0.91,"GBP":0.79},
                "2025-07-03":{"EUR":0.92}
            }}"#,
        )
        .expect("valid dataset");
        let router = RateRouterBuilder::new()
            .with_http_client(Arc::new(ScriptedHttpClient::failing()))
            .with_fallback_source(SampleDatasetAdapter::from_dataset(dataset))
            .build();
        app(AppState::new(router))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = offline_app()
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn finance_returns_breakdown_totals_and_metadata() {
        let (status, body) = get_json("/finance?start=2025-07-01&end=2025-07-02").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totals"]["start_rate"], 0.9);
        assert_eq!(body["totals"]["total_pct_change"], 1.11);
        assert_eq!(body["breakdown"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["metadata"]["from_currency"], "USD");
        assert_eq!(body["metadata"]["to_currency"], "EUR");
        assert_eq!(body["metadata"]["breakdown"], "day");
        assert_eq!(body["metadata"]["source"], "sample");
        assert!(body["metadata"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn finance_without_day_breakdown_omits_list() {
        let (status, body) =
            get_json("/finance?start=2025-07-01&end=2025-07-03&breakdown=none&to=GBP").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("breakdown").is_none());
        assert_eq!(body["totals"]["end_rate"], 0.0);
        assert_eq!(body["metadata"]["breakdown"], "none");
    }

    #[tokio::test]
    async fn missing_dates_are_rejected_with_example() {
        let (status, body) = get_json("/finance?start=2025-07-01").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Both start and end dates are required");
        assert_eq!(body["example"], FINANCE_EXAMPLE);
    }

    #[tokio::test]
    async fn malformed_and_inverted_ranges_are_bad_requests() {
        let (status, body) = get_json("/api/rates?start=07-01-2025&end=2025-07-03").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid date format. Use YYYY-MM-DD");

        let (status, _) = get_json("/finance?start=2025-07-03&end=2025-07-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json("/finance?start=2025-07-01&end=2025-07-03&to=EURO").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn range_without_data_is_server_error() {
        let (status, body) = get_json("/finance?start=2024-01-01&end=2024-01-05").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "No rates data available");
    }

    #[tokio::test]
    async fn chart_data_maps_undefined_changes_to_zero() {
        let (status, body) = get_json("/api/rates?start=2025-07-01&end=2025-07-03&to=GBP").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["labels"],
            serde_json::json!(["2025-07-01", "2025-07-02", "2025-07-03"])
        );
        assert_eq!(body["rates"], serde_json::json!([0.78, 0.79, 0.0]));
        assert_eq!(body["changes"][2], -100.0);
        assert!(body["metadata"].get("breakdown").is_none());
    }

    #[tokio::test]
    async fn health_lists_sources() {
        let (status, body) = get_json("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        let states = body["sources"]
            .as_array()
            .expect("sources")
            .iter()
            .map(|source| source["state"].as_str().unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(states, vec!["unconfigured", "unconfigured", "ready"]);
    }

    #[tokio::test]
    async fn dashboard_is_served() {
        let response = offline_app()
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert!(String::from_utf8_lossy(&bytes).contains("/api/rates"));
    }
}
