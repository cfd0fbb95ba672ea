//! Summary statistics over a retrieved rate series.
//!
//! Values are computed at full precision; rounding happens only when a
//! [`RateStats`] is produced (rates to 5 decimals, percentages to 2).

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::routing::RateResult;
use crate::{CurrencyCode, RateDate};

const RATE_DECIMALS: usize = 5;
const PCT_DECIMALS: usize = 2;
const UNDEFINED_LABEL: &str = "N/A";

/// Percentage change between two rates.
///
/// Undefined when the old rate is zero and the new one is not. Serialized as a
/// bare number or the string `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PctChange {
    Value(f64),
    Undefined,
}

impl PctChange {
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(value),
            Self::Undefined => None,
        }
    }

    pub const fn is_undefined(self) -> bool {
        matches!(self, Self::Undefined)
    }

    fn rounded(self) -> Self {
        match self {
            Self::Value(value) => Self::Value(round_to(value, PCT_DECIMALS)),
            Self::Undefined => Self::Undefined,
        }
    }
}

impl Display for PctChange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Undefined => f.write_str(UNDEFINED_LABEL),
        }
    }
}

impl Serialize for PctChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => serializer.serialize_f64(*value),
            Self::Undefined => serializer.serialize_str(UNDEFINED_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for PctChange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(f64),
            Label(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(value) => Ok(Self::Value(value)),
            Wire::Label(label) if label == UNDEFINED_LABEL => Ok(Self::Undefined),
            Wire::Label(label) => Err(serde::de::Error::custom(format!(
                "expected a number or \"{UNDEFINED_LABEL}\", got \"{label}\""
            ))),
        }
    }
}

/// `(new - old) / old * 100`, with `0 -> 0` being no change and
/// `0 -> x` undefined.
pub fn percentage_change(old: f64, new: f64) -> PctChange {
    if old == 0.0 {
        if new == 0.0 {
            PctChange::Value(0.0)
        } else {
            PctChange::Undefined
        }
    } else {
        PctChange::Value((new - old) / old * 100.0)
    }
}

/// Whether a per-day breakdown is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownMode {
    Day,
    #[default]
    Totals,
}

impl BreakdownMode {
    /// `"day"` selects the per-day breakdown; anything else means totals only.
    pub fn parse(input: &str) -> Self {
        if input == "day" {
            Self::Day
        } else {
            Self::Totals
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Totals => "totals",
        }
    }
}

impl Display for BreakdownMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: RateDate,
    pub rate: f64,
    /// Change against the previous day; the first day is always `0`.
    pub pct_change: PctChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub start_rate: f64,
    pub end_rate: f64,
    pub total_pct_change: PctChange,
    pub mean_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateStats {
    pub totals: SummaryStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<DailyStat>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("Failed to retrieve rates data")]
    RetrievalFailed { detail: String },
    #[error("No rates data available")]
    NoData,
}

impl StatsError {
    /// Underlying cause, when one is known.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::RetrievalFailed { detail } => Some(detail),
            Self::NoData => None,
        }
    }
}

/// Stateless calculator turning a retrieval outcome into [`RateStats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsCalculator;

impl StatsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Builds totals (and optionally a per-day breakdown) for `quote`.
    ///
    /// Days are taken in ascending date order. A day without a rate for
    /// `quote` counts as a rate of `0`.
    ///
    /// # Errors
    ///
    /// [`StatsError::RetrievalFailed`] when every source failed and
    /// [`StatsError::NoData`] when the series is empty.
    pub fn process_rates(
        &self,
        result: &RateResult,
        quote: &CurrencyCode,
        mode: BreakdownMode,
    ) -> Result<RateStats, StatsError> {
        let success = result.as_ref().map_err(|failure| StatsError::RetrievalFailed {
            detail: failure.message.clone(),
        })?;

        let daily = success
            .series
            .iter()
            .map(|(date, rates)| {
                let rate = rates.get(quote).copied().unwrap_or_else(|| {
                    tracing::debug!(%date, %quote, "quote currency missing for day, counting as 0");
                    0.0
                });
                (*date, rate)
            })
            .collect::<Vec<_>>();

        let (Some(&(_, start_rate)), Some(&(_, end_rate))) = (daily.first(), daily.last()) else {
            return Err(StatsError::NoData);
        };

        let mean_rate = daily.iter().map(|(_, rate)| rate).sum::<f64>() / daily.len() as f64;
        let totals = SummaryStats {
            start_rate: round_to(start_rate, RATE_DECIMALS),
            end_rate: round_to(end_rate, RATE_DECIMALS),
            total_pct_change: percentage_change(start_rate, end_rate).rounded(),
            mean_rate: round_to(mean_rate, RATE_DECIMALS),
        };

        let breakdown = match mode {
            BreakdownMode::Totals => None,
            BreakdownMode::Day => {
                let mut previous: Option<f64> = None;
                let days = daily
                    .iter()
                    .map(|&(date, rate)| {
                        let pct_change = previous
                            .map_or(PctChange::Value(0.0), |prev| percentage_change(prev, rate));
                        previous = Some(rate);
                        DailyStat {
                            date,
                            rate: round_to(rate, RATE_DECIMALS),
                            pct_change: pct_change.rounded(),
                        }
                    })
                    .collect();
                Some(days)
            }
        };

        Ok(RateStats { totals, breakdown })
    }
}

/// Rounds the exact binary value of `value` to `decimals` places, ties to
/// even.
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}
