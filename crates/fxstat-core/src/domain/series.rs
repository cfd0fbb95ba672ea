use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CurrencyCode, DateRange, RateDate};

/// Rates quoted on one day, keyed by quote currency.
pub type DayRates = BTreeMap<CurrencyCode, f64>;

/// Date-ordered rate table.
///
/// Backed by a `BTreeMap`, so iteration is always ascending by date no matter
/// the order entries were inserted in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateSeries {
    entries: BTreeMap<RateDate, DayRates>,
}

impl RateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: RateDate, currency: CurrencyCode, rate: f64) {
        self.entries.entry(date).or_default().insert(currency, rate);
    }

    pub fn insert_day(&mut self, date: RateDate, rates: DayRates) {
        self.entries.insert(date, rates);
    }

    /// Rate of `currency` on `date`, if both are present.
    pub fn rate(&self, date: RateDate, currency: &CurrencyCode) -> Option<f64> {
        self.entries.get(&date)?.get(currency).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = RateDate> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, RateDate, DayRates> {
        self.entries.iter()
    }

    /// Drops every entry outside `range`.
    pub fn retain_within(&mut self, range: DateRange) {
        self.entries.retain(|date, _| range.contains(*date));
    }
}

/// Rate series together with the base currency it is quoted against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBatch {
    pub base: CurrencyCode,
    pub series: RateSeries,
}

impl RateBatch {
    pub fn new(base: CurrencyCode, series: RateSeries) -> Self {
        Self { base, series }
    }
}
