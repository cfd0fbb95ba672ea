//! Rate source trait and request/response types.
//!
//! This module defines the adapter contract (`RateSource`) that every tier of
//! the retrieval chain implements, along with the request type and the
//! structured error the router uses to decide whether to fall through.
//!
//! # Example
//!
//! ```rust,ignore
//! use fxstat_core::{RateRequest, RateSource, SampleDatasetAdapter};
//!
//! async fn fetch(adapter: &SampleDatasetAdapter) -> Result<(), Box<dyn std::error::Error>> {
//!     let request = RateRequest::parse("2025-07-01", "2025-07-03", "USD", "EUR")?;
//!     let batch = adapter.rates(request).await?;
//!
//!     for (date, rates) in batch.series.iter() {
//!         println!("{date}: {rates:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{CurrencyCode, CurrencyPair, DateRange, ProviderId, RateBatch, ValidationError};

/// Shape of a requested range, used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeShape {
    SingleDay,
    MultiDay,
}

impl RangeShape {
    pub fn of(range: DateRange) -> Self {
        if range.is_single_day() {
            Self::SingleDay
        } else {
            Self::MultiDay
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleDay => "single_day",
            Self::MultiDay => "multi_day",
        }
    }
}

impl Display for RangeShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Range shapes a source can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub single_day: bool,
    pub multi_day: bool,
}

impl CapabilitySet {
    pub const fn new(single_day: bool, multi_day: bool) -> Self {
        Self {
            single_day,
            multi_day,
        }
    }

    pub const fn full() -> Self {
        Self::new(true, true)
    }

    pub const fn supports(self, shape: RangeShape) -> bool {
        match shape {
            RangeShape::SingleDay => self.single_day,
            RangeShape::MultiDay => self.multi_day,
        }
    }
}

/// Readiness of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Ready,
    /// Missing configuration (e.g. no credential). The router skips the source.
    Unconfigured,
    /// Configured but currently unable to serve, e.g. dataset file missing.
    Unavailable,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthStatus {
    pub const fn ready() -> Self {
        Self {
            state: HealthState::Ready,
            detail: None,
        }
    }

    pub fn unconfigured(detail: impl Into<String>) -> Self {
        Self {
            state: HealthState::Unconfigured,
            detail: Some(detail.into()),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            state: HealthState::Unavailable,
            detail: Some(detail.into()),
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotConfigured,
    UnsupportedRange,
    /// Transport failure, timeout or non-2xx status.
    Unavailable,
    /// Provider answered with `success: false`.
    Rejected,
    Malformed,
    /// Call succeeded but yielded no usable rates.
    Empty,
    DeadlineExceeded,
    /// Local dataset could not be read or parsed.
    Dataset,
}

/// Structured source error used by router fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotConfigured, message)
    }

    pub fn unsupported_range(shape: RangeShape) -> Self {
        Self::new(
            SourceErrorKind::UnsupportedRange,
            format!("range shape '{shape}' is not supported by this source"),
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Rejected, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, message)
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Empty, message)
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::DeadlineExceeded, message)
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Dataset, message)
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotConfigured => "source.not_configured",
            SourceErrorKind::UnsupportedRange => "source.unsupported_range",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Rejected => "source.rejected",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Empty => "source.empty",
            SourceErrorKind::DeadlineExceeded => "source.deadline_exceeded",
            SourceErrorKind::Dataset => "source.dataset",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload shared by every tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub range: DateRange,
    pub pair: CurrencyPair,
}

impl RateRequest {
    pub fn new(range: DateRange, pair: CurrencyPair) -> Self {
        Self { range, pair }
    }

    /// Validates raw caller input: ISO dates with `start <= end` and two
    /// currency codes.
    pub fn parse(start: &str, end: &str, from: &str, to: &str) -> Result<Self, ValidationError> {
        let range = DateRange::parse(start, end)?;
        let pair = CurrencyPair::new(CurrencyCode::parse(from)?, CurrencyCode::parse(to)?);
        Ok(Self { range, pair })
    }

    pub fn shape(&self) -> RangeShape {
        RangeShape::of(self.range)
    }
}

/// Future returned by [`RateSource::rates`].
pub type RatesFuture<'a> = Pin<Box<dyn Future<Output = Result<RateBatch, SourceError>> + Send + 'a>>;

/// Rate source contract.
///
/// Every tier of the retrieval chain implements this trait; the router walks
/// an ordered list of them and stops at the first success.
///
/// Implementations must be `Send + Sync` as they are shared across request
/// handlers.
pub trait RateSource: Send + Sync {
    /// Returns the unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Returns the range shapes this source serves.
    fn capabilities(&self) -> CapabilitySet;

    /// Fetches rates for every day of the requested range it can find.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the remote call fails, the payload is
    /// malformed, no usable rate was found, or the local dataset cannot be
    /// loaded.
    fn rates<'a>(&'a self, req: RateRequest) -> RatesFuture<'a>;

    /// Returns the current health status of this source.
    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parse_validates_dates_and_currencies() {
        let request =
            RateRequest::parse("2025-07-01", "2025-07-03", "usd", "eur").expect("valid request");
        assert_eq!(request.pair.code(), "USDEUR");
        assert_eq!(request.shape(), RangeShape::MultiDay);

        assert!(matches!(
            RateRequest::parse("07/01/2025", "2025-07-03", "USD", "EUR"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(matches!(
            RateRequest::parse("2025-07-01", "2025-07-03", "", "EUR"),
            Err(ValidationError::EmptyCurrency)
        ));
    }

    #[test]
    fn multi_day_only_capability_excludes_single_day() {
        let caps = CapabilitySet::new(false, true);
        assert!(!caps.supports(RangeShape::SingleDay));
        assert!(caps.supports(RangeShape::MultiDay));
        assert!(CapabilitySet::full().supports(RangeShape::SingleDay));
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SourceError::empty("none").code(), "source.empty");
        assert_eq!(
            SourceError::unsupported_range(RangeShape::SingleDay).code(),
            "source.unsupported_range"
        );
    }
}
