use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::data_source::{
    CapabilitySet, HealthStatus, RateRequest, RateSource, RatesFuture, SourceError,
};
use crate::{CoreError, CurrencyCode, DateRange, DayRates, ProviderId, RateBatch, RateDate, RateSeries};

pub const DEFAULT_DATASET_PATH: &str = "data/sample_api.json";

/// Static historical rate table bundled with the service.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDataset {
    pub base: CurrencyCode,
    pub rates: RateSeries,
}

#[derive(Debug, Deserialize)]
struct DatasetDocument {
    base: Option<String>,
    rates: BTreeMap<String, BTreeMap<String, f64>>,
}

impl FallbackDataset {
    /// Parses `{"base": "USD", "rates": {"YYYY-MM-DD": {"EUR": 0.9}}}`.
    ///
    /// `base` defaults to `USD` when absent. Currency keys that are not
    /// three-letter codes are skipped; a malformed date fails the whole load.
    pub fn from_json(input: &str) -> Result<Self, CoreError> {
        let document: DatasetDocument = serde_json::from_str(input)?;
        let base = CurrencyCode::parse(document.base.as_deref().unwrap_or("USD"))?;

        let mut rates = RateSeries::new();
        for (raw_date, raw_rates) in document.rates {
            let date = RateDate::parse(&raw_date)?;
            let day = raw_rates
                .into_iter()
                .filter_map(|(code, rate)| match CurrencyCode::parse(&code) {
                    Ok(currency) => Some((currency, rate)),
                    Err(error) => {
                        tracing::debug!(%date, %error, "skipping fallback rate with bad currency key");
                        None
                    }
                })
                .collect::<DayRates>();
            rates.insert_day(date, day);
        }

        Ok(Self { base, rates })
    }

    pub async fn load(path: &Path) -> Result<Self, SourceError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            SourceError::dataset(format!(
                "failed to read fallback dataset {}: {e}",
                path.display()
            ))
        })?;

        Self::from_json(&raw).map_err(|e| {
            SourceError::dataset(format!(
                "failed to parse fallback dataset {}: {e}",
                path.display()
            ))
        })
    }

    /// Entries with dates inside `range`, all currencies kept.
    pub fn within(&self, range: DateRange) -> RateSeries {
        let mut series = self.rates.clone();
        series.retain_within(range);
        series
    }
}

#[derive(Debug, Clone)]
enum DatasetOrigin {
    File(PathBuf),
    Memory(Arc<FallbackDataset>),
}

/// Local tier: serves the fallback dataset, tagged with the dataset's own base
/// currency.
///
/// The file is read on every call and never cached or mutated. An empty slice
/// is a success; only a read or parse failure is an error.
#[derive(Debug, Clone)]
pub struct SampleDatasetAdapter {
    origin: DatasetOrigin,
}

impl Default for SampleDatasetAdapter {
    fn default() -> Self {
        Self::from_path(DEFAULT_DATASET_PATH)
    }
}

impl SampleDatasetAdapter {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: DatasetOrigin::File(path.into()),
        }
    }

    pub fn from_dataset(dataset: FallbackDataset) -> Self {
        Self {
            origin: DatasetOrigin::Memory(Arc::new(dataset)),
        }
    }

    async fn dataset(&self) -> Result<Arc<FallbackDataset>, SourceError> {
        match &self.origin {
            DatasetOrigin::File(path) => FallbackDataset::load(path).await.map(Arc::new),
            DatasetOrigin::Memory(dataset) => Ok(Arc::clone(dataset)),
        }
    }
}

impl RateSource for SampleDatasetAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Sample
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn rates<'a>(&'a self, req: RateRequest) -> RatesFuture<'a> {
        Box::pin(async move {
            let dataset = self.dataset().await?;
            let series = dataset.within(req.range);
            if dataset.base != req.pair.base {
                tracing::debug!(
                    requested = %req.pair.base,
                    dataset = %dataset.base,
                    "fallback dataset is quoted against a different base"
                );
            }
            Ok(RateBatch::new(dataset.base.clone(), series))
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            match &self.origin {
                DatasetOrigin::Memory(_) => HealthStatus::ready(),
                DatasetOrigin::File(path) => match tokio::fs::metadata(path).await {
                    Ok(meta) if meta.is_file() => HealthStatus::ready(),
                    Ok(_) => HealthStatus::unavailable(format!("{} is not a file", path.display())),
                    Err(e) => HealthStatus::unavailable(format!("{}: {e}", path.display())),
                },
            }
        })
    }
}
