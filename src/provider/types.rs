//! Upstream wire types and soft-signal classification
//!
//! The provider returns HTTP 200 bodies that may still encode an upstream
//! failure through the `Note` (rate limit) or `Error Message` (fatal)
//! fields. Classification happens in one step right after decode so the
//! retry loop only ever sees the tagged [`Upstream`] variants.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::series::{Bar, MonthKey, MonthlySeries, SeriesMeta, WeeklySeries};

/// Query function for the weekly adjusted series
pub const WEEKLY_ADJUSTED_FUNCTION: &str = "TIME_SERIES_WEEKLY_ADJUSTED";
/// Query function for the monthly adjusted series
pub const MONTHLY_ADJUSTED_FUNCTION: &str = "TIME_SERIES_MONTHLY_ADJUSTED";

/// Series granularity requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    WeeklyAdjusted,
    MonthlyAdjusted,
}

impl Granularity {
    /// The upstream `function` query parameter value
    pub fn query_function(&self) -> &'static str {
        match self {
            Granularity::WeeklyAdjusted => WEEKLY_ADJUSTED_FUNCTION,
            Granularity::MonthlyAdjusted => MONTHLY_ADJUSTED_FUNCTION,
        }
    }
}

/// Fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Caller misuse; no request was issued
    #[error("invalid request parameters: {0}")]
    InvalidParams(&'static str),
    /// Network-level failure (connect, timeout, body read)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-success HTTP status from the provider
    #[error("provider returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Body did not decode into the expected shape
    #[error("malformed response body: {0}")]
    Decode(String),
}

/// A decoded response classified by its soft-signal fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upstream<T> {
    /// Clean payload
    Series(T),
    /// `Note` was populated: the free-tier rate limit was hit; retryable
    RateLimited(String),
    /// `Error Message` was populated: the provider rejected the request
    Failed(String),
}

#[derive(Debug, Default, Deserialize)]
struct WireMeta {
    #[serde(rename = "1. Information", default)]
    information: String,
    #[serde(rename = "2. Symbol", default)]
    symbol: String,
    #[serde(rename = "3. Last Refreshed", default)]
    last_refreshed: String,
    #[serde(rename = "4. Time Zone", default)]
    time_zone: String,
}

impl WireMeta {
    fn into_meta(self) -> SeriesMeta {
        SeriesMeta {
            symbol: self.symbol,
            information: self.information,
            last_refreshed: self.last_refreshed,
            time_zone: self.time_zone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. adjusted close")]
    adj_close: String,
    #[serde(rename = "6. volume")]
    volume: String,
    #[serde(rename = "7. dividend amount", default)]
    dividend: String,
}

impl WireBar {
    fn into_bar(self, date: &str) -> Result<Bar, FetchError> {
        Ok(Bar {
            open: parse_price(date, "1. open", &self.open)?,
            high: parse_price(date, "2. high", &self.high)?,
            low: parse_price(date, "3. low", &self.low)?,
            close: parse_price(date, "4. close", &self.close)?,
            adj_close: parse_price(date, "5. adjusted close", &self.adj_close)?,
            volume: self.volume.parse().map_err(|_| {
                FetchError::Decode(format!("bad volume {:?} at {date}", self.volume))
            })?,
            dividend: parse_dividend(date, &self.dividend)?,
        })
    }
}

fn parse_price(date: &str, field: &str, raw: &str) -> Result<Decimal, FetchError> {
    Decimal::from_str(raw)
        .map_err(|_| FetchError::Decode(format!("bad {field} value {raw:?} at {date}")))
}

fn parse_dividend(date: &str, raw: &str) -> Result<Option<Decimal>, FetchError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let amount = Decimal::from_str(raw)
        .map_err(|_| FetchError::Decode(format!("bad dividend value {raw:?} at {date}")))?;
    Ok(Some(amount))
}

/// Decoded monthly adjusted response, not yet classified
#[derive(Debug, Deserialize)]
pub struct MonthlyResponse {
    #[serde(rename = "Meta Data", default)]
    meta: WireMeta,
    #[serde(rename = "Monthly Adjusted Time Series", default)]
    series: BTreeMap<String, WireBar>,
    #[serde(rename = "Error Message", default)]
    error_message: String,
    #[serde(rename = "Note", default)]
    note: String,
}

impl MonthlyResponse {
    /// Classify the soft-signal fields and convert the payload to the typed
    /// model. Duplicate dates within one month keep the latest date.
    pub fn classify(self) -> Result<Upstream<MonthlySeries>, FetchError> {
        if !self.note.is_empty() {
            return Ok(Upstream::RateLimited(self.note));
        }
        if !self.error_message.is_empty() {
            return Ok(Upstream::Failed(self.error_message));
        }

        let mut bars: BTreeMap<MonthKey, (NaiveDate, Bar)> = BTreeMap::new();
        for (date_str, wire) in self.series {
            let date = parse_series_date(&date_str)?;
            let bar = wire.into_bar(&date_str)?;
            let key = MonthKey::from_date(date);
            match bars.get(&key) {
                Some((seen, _)) if *seen >= date => {}
                _ => {
                    bars.insert(key, (date, bar));
                }
            }
        }

        let bars = bars.into_iter().map(|(k, (_, bar))| (k, bar)).collect();
        Ok(Upstream::Series(MonthlySeries::new(
            self.meta.into_meta(),
            bars,
        )))
    }
}

/// Decoded weekly adjusted response, not yet classified
#[derive(Debug, Deserialize)]
pub struct WeeklyResponse {
    #[serde(rename = "Meta Data", default)]
    meta: WireMeta,
    #[serde(rename = "Weekly Adjusted Time Series", default)]
    series: BTreeMap<String, WireBar>,
    #[serde(rename = "Error Message", default)]
    error_message: String,
    #[serde(rename = "Note", default)]
    note: String,
}

impl WeeklyResponse {
    /// Classify the soft-signal fields and convert the payload
    pub fn classify(self) -> Result<Upstream<WeeklySeries>, FetchError> {
        if !self.note.is_empty() {
            return Ok(Upstream::RateLimited(self.note));
        }
        if !self.error_message.is_empty() {
            return Ok(Upstream::Failed(self.error_message));
        }

        let mut bars = BTreeMap::new();
        for (date_str, wire) in self.series {
            let date = parse_series_date(&date_str)?;
            bars.insert(date, wire.into_bar(&date_str)?);
        }
        Ok(Upstream::Series(WeeklySeries::new(
            self.meta.into_meta(),
            bars,
        )))
    }
}

fn parse_series_date(raw: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| FetchError::Decode(format!("bad series date {raw:?}")))
}
