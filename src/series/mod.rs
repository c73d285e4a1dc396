//! Domain types for price series
//!
//! Daily observations come from the store or the upstream provider; the
//! aligner collapses them into one representative bar per calendar period.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A calendar year-month bucket used to aggregate daily bars into monthly ones.
///
/// `Ord` follows (year, month), so lexicographic order of the `YYYY-MM`
/// rendering equals chronological order. Grouping and truncation rely on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Create a key, validating the month number
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Bucket a calendar date into its month
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error parsing a month key from a date string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month key: {0:?}")]
pub struct ParseMonthKeyError(pub String);

impl FromStr for MonthKey {
    type Err = ParseMonthKeyError;

    /// Accepts `YYYY-MM` or any longer ISO date string such as `YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let head = s.get(..7).ok_or_else(|| ParseMonthKeyError(s.to_string()))?;
        let (year_part, month_part) = match head.split_once('-') {
            Some(parts) => parts,
            None => return Err(ParseMonthKeyError(s.to_string())),
        };
        let year: i32 = year_part
            .parse()
            .map_err(|_| ParseMonthKeyError(s.to_string()))?;
        let month: u32 = month_part
            .parse()
            .map_err(|_| ParseMonthKeyError(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| ParseMonthKeyError(s.to_string()))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One representative observation for a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Close adjusted for splits and dividends
    pub adj_close: Decimal,
    pub volume: i64,
    /// Dividend paid in the period, if any
    pub dividend: Option<Decimal>,
}

/// One OHLCV(+dividend) record for one symbol on one trading date.
///
/// Read-only once constructed; sourced from the store or an ingestion job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adj_close: Decimal,
    pub volume: i64,
    pub dividend: Option<Decimal>,
}

impl DailyBar {
    /// The observation's value fields, without the (symbol, date) identity
    pub fn bar(&self) -> Bar {
        Bar {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            adj_close: self.adj_close,
            volume: self.volume,
            dividend: self.dividend,
        }
    }
}

/// Per-symbol descriptive fields carried alongside a series
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub symbol: String,
    pub information: String,
    pub last_refreshed: String,
    pub time_zone: String,
}

impl SeriesMeta {
    /// Metadata for a series assembled locally rather than decoded upstream
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}

/// A monthly series: at most one bar per month, sorted chronologically
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    pub meta: SeriesMeta,
    pub bars: BTreeMap<MonthKey, Bar>,
}

impl MonthlySeries {
    pub fn new(meta: SeriesMeta, bars: BTreeMap<MonthKey, Bar>) -> Self {
        Self { meta, bars }
    }

    pub fn symbol(&self) -> &str {
        &self.meta.symbol
    }

    /// Number of monthly periods in the series
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Oldest period, if the series is non-empty
    pub fn first_period(&self) -> Option<MonthKey> {
        self.bars.keys().next().copied()
    }

    /// Most recent period, if the series is non-empty
    pub fn last_period(&self) -> Option<MonthKey> {
        self.bars.keys().next_back().copied()
    }
}

/// A weekly series keyed by the week-ending trading date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklySeries {
    pub meta: SeriesMeta,
    pub bars: BTreeMap<NaiveDate, Bar>,
}

impl WeeklySeries {
    pub fn new(meta: SeriesMeta, bars: BTreeMap<NaiveDate, Bar>) -> Self {
        Self { meta, bars }
    }

    pub fn symbol(&self) -> &str {
        &self.meta.symbol
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
