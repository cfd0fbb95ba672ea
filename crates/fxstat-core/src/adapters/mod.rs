//! Rate source adapters, one per tier of the retrieval chain.
//!
//! | Adapter | Tier | Shapes |
//! |---------|------|--------|
//! | [`TimeframeAdapter`] | remote bulk call | multi-day |
//! | [`HistoricalAdapter`] | remote call per day | single- and multi-day |
//! | [`SampleDatasetAdapter`] | bundled local dataset | single- and multi-day |

mod exchangerate_host;
mod historical;
mod sample;
mod timeframe;

pub use exchangerate_host::{ExchangeRateHostApi, DEFAULT_BASE_URL};
pub use historical::HistoricalAdapter;
pub use sample::{FallbackDataset, SampleDatasetAdapter, DEFAULT_DATASET_PATH};
pub use timeframe::TimeframeAdapter;
