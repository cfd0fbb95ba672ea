//! # fxstat Core
//!
//! Exchange-rate retrieval with tiered fallback, and summary statistics over
//! the retrieved series.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Rate sources: timeframe, per-day historical, bundled dataset |
//! | [`data_source`] | Rate source trait, request type and structured errors |
//! | [`domain`] | Dates, ranges, currency codes and rate series |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`routing`] | Ordered fallback chain over the rate sources |
//! | [`source`] | Provider identifiers |
//! | [`stats`] | Percentage changes, totals and per-day breakdown |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fxstat_core::{BreakdownMode, RateRequest, RateRouterBuilder, StatsCalculator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = RateRouterBuilder::new()
//!         .with_api_key(std::env::var("EXCHANGE_RATE_API_KEY").ok())
//!         .build();
//!
//!     let request = RateRequest::parse("2025-07-01", "2025-07-03", "USD", "EUR")?;
//!     let result = router.get_rates(&request).await;
//!     let stats = StatsCalculator::new().process_rates(
//!         &result,
//!         &request.pair.quote,
//!         BreakdownMode::Day,
//!     )?;
//!
//!     println!("mean rate: {}", stats.totals.mean_rate);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  HTTP handlers  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Rate Router   │────▶│ Stats Calculator │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Rate Sources   │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Security
//!
//! - The API key is passed in explicitly and masked in logged URLs
//! - Input validation on all domain types

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod routing;
pub mod source;
pub mod stats;

// Adapter implementations
pub use adapters::{
    ExchangeRateHostApi, FallbackDataset, HistoricalAdapter, SampleDatasetAdapter,
    TimeframeAdapter, DEFAULT_BASE_URL, DEFAULT_DATASET_PATH,
};

// Data source trait and types
pub use data_source::{
    CapabilitySet, HealthState, HealthStatus, RangeShape, RateRequest, RateSource, RatesFuture,
    SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{
    CurrencyCode, CurrencyPair, DateRange, DayIter, DayRates, RateBatch, RateDate, RateSeries,
    UtcDateTime,
};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, ScriptedHttpClient,
};

// Routing types
pub use routing::{
    RateFailure, RateResult, RateRouter, RateRouterBuilder, RateSuccess, SourceFailure,
    SourceSnapshot,
};

// Source identifiers
pub use source::ProviderId;

// Statistics
pub use stats::{
    percentage_change, BreakdownMode, DailyStat, PctChange, RateStats, StatsCalculator,
    StatsError, SummaryStats,
};
