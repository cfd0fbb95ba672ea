//! # Domain Models
//!
//! Canonical domain types for fxstat rate data. Construction validates all
//! invariants, so downstream code never re-checks shape.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RateDate`] | Calendar day in ISO `YYYY-MM-DD` form |
//! | [`DateRange`] | Inclusive range with `start <= end` |
//! | [`CurrencyCode`] | Three-letter uppercase code |
//! | [`CurrencyPair`] | Base/quote pair (`USDEUR`) |
//! | [`RateSeries`] | Date-ordered table of per-day rates |
//! | [`RateBatch`] | Series plus its base currency |
//! | [`UtcDateTime`] | UTC instant stamped on response metadata |

mod currency;
mod date;
mod series;
mod timestamp;

pub use currency::{CurrencyCode, CurrencyPair};
pub use date::{DateRange, DayIter, RateDate};
pub use series::{DayRates, RateBatch, RateSeries};
pub use timestamp::UtcDateTime;
