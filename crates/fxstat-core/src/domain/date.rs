use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar day rendered as ISO `YYYY-MM-DD`.
///
/// Ordering is chronological, which for this format is also lexicographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RateDate(Date);

impl RateDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), ISO_DATE)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    pub fn next_day(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(ISO_DATE)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl Display for RateDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl FromStr for RateDate {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for RateDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for RateDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Inclusive calendar range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: RateDate,
    end: RateDate,
}

impl DateRange {
    pub fn new(start: RateDate, end: RateDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange {
                start: start.format_iso(),
                end: end.format_iso(),
            });
        }

        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(RateDate::parse(start)?, RateDate::parse(end)?)
    }

    pub const fn start(self) -> RateDate {
        self.start
    }

    pub const fn end(self) -> RateDate {
        self.end
    }

    pub fn is_single_day(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, day: RateDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(self) -> u32 {
        let span = self.end.into_inner() - self.start.into_inner();
        u32::try_from(span.whole_days()).map_or(u32::MAX, |days| days.saturating_add(1))
    }

    pub fn days(self) -> DayIter {
        DayIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

/// Iterator over every calendar day of a [`DateRange`].
#[derive(Debug, Clone)]
pub struct DayIter {
    next: Option<RateDate>,
    end: RateDate,
}

impl Iterator for DayIter {
    type Item = RateDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        if current > self.end {
            self.next = None;
            return None;
        }

        self.next = if current == self.end {
            None
        } else {
            current.next_day()
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_iso_dates() {
        let date = RateDate::parse("2025-07-01").expect("must parse");
        assert_eq!(date.format_iso(), "2025-07-01");
    }

    #[test]
    fn rejects_malformed_dates() {
        for raw in ["2025/07/01", "2025-13-01", "2025-02-30", "", "yesterday"] {
            let err = RateDate::parse(raw).expect_err("must fail");
            assert!(matches!(err, ValidationError::InvalidDate { .. }), "{raw}");
        }
    }

    #[test]
    fn range_rejects_start_after_end() {
        let err = DateRange::parse("2025-07-03", "2025-07-01").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvertedRange { .. }));
    }

    #[test]
    fn day_iteration_is_inclusive_and_crosses_month_boundary() {
        let range = DateRange::parse("2025-06-29", "2025-07-02").expect("valid range");
        let days = range.days().map(RateDate::format_iso).collect::<Vec<_>>();

        assert_eq!(
            days,
            vec!["2025-06-29", "2025-06-30", "2025-07-01", "2025-07-02"]
        );
        assert_eq!(range.len_days(), 4);
    }

    #[test]
    fn single_day_range_yields_one_day() {
        let range = DateRange::parse("2025-07-01", "2025-07-01").expect("valid range");
        assert!(range.is_single_day());
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn chronological_order_matches_iso_string_order() {
        let mut dates = ["2025-10-01", "2025-02-15", "2024-12-31"]
            .iter()
            .map(|raw| RateDate::parse(raw).expect("valid"))
            .collect::<Vec<_>>();
        dates.sort();

        let mut raw = vec!["2025-10-01", "2025-02-15", "2024-12-31"];
        raw.sort();

        assert_eq!(
            dates.iter().map(|d| d.format_iso()).collect::<Vec<_>>(),
            raw
        );
    }
}
