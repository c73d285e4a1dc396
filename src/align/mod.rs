//! Cross-symbol series alignment
//!
//! Collapses daily rows into one bar per calendar month and truncates
//! series so every symbol in a batch carries the same number of periods.
//! All functions here are pure over the typed series model; I/O stays in
//! [`crate::pipeline`].

use std::collections::BTreeMap;
use thiserror::Error;

use crate::series::{Bar, DailyBar, MonthKey, MonthlySeries, SeriesMeta};

/// Minimum period count a batch must retain to be usable downstream
pub const MIN_AGGREGATE_PERIODS: usize = 2;

/// Alignment errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    /// A symbol has fewer periods than the caller's required window
    #[error("symbol {symbol:?} has {got} months of history, requires {need}")]
    InsufficientHistory {
        symbol: String,
        got: usize,
        need: usize,
    },
    /// The shortest series in the batch is below the usable minimum
    #[error("not enough aggregate data: shortest series has {shortest} periods")]
    InsufficientAggregateData { shortest: usize },
}

/// Collapse daily rows into monthly buckets, keeping the observation with
/// the latest date inside each month
pub fn collapse_daily(rows: &[DailyBar]) -> BTreeMap<MonthKey, Bar> {
    let mut latest: BTreeMap<MonthKey, &DailyBar> = BTreeMap::new();
    for row in rows {
        let key = MonthKey::from_date(row.date);
        match latest.get(&key) {
            Some(seen) if seen.date >= row.date => {}
            _ => {
                latest.insert(key, row);
            }
        }
    }
    latest.into_iter().map(|(k, row)| (k, row.bar())).collect()
}

/// Assemble a monthly series for one symbol from its stored daily rows
pub fn monthly_from_daily(symbol: &str, rows: &[DailyBar]) -> MonthlySeries {
    MonthlySeries::new(SeriesMeta::for_symbol(symbol), collapse_daily(rows))
}

/// Fail unless the series carries at least `need` periods
pub fn require_months(series: &MonthlySeries, need: usize) -> Result<(), AlignError> {
    let got = series.len();
    if got < need {
        return Err(AlignError::InsufficientHistory {
            symbol: series.symbol().to_string(),
            got,
            need,
        });
    }
    Ok(())
}

/// Keep only the chronologically latest `window` periods.
///
/// Retained periods keep their order; series at or below the window are
/// untouched, so truncating an aligned series with its own length is a
/// no-op.
pub fn truncate_to_latest(series: &mut MonthlySeries, window: usize) {
    if series.len() <= window {
        return;
    }
    if window == 0 {
        series.bars.clear();
        return;
    }
    // The window-th key from the end starts the retained tail
    let cutoff = series
        .bars
        .keys()
        .rev()
        .nth(window - 1)
        .copied()
        .expect("window is below the checked series length");
    series.bars = series.bars.split_off(&cutoff);
}

/// Truncate every series in the batch to the shortest surviving length.
///
/// Each series keeps its own most recent periods; histories starting at
/// different dates therefore stay count-aligned but may cover different
/// calendar windows, which is logged at WARN.
pub fn align_to_shortest(batch: &mut [MonthlySeries]) -> Result<usize, AlignError> {
    let shortest = batch.iter().map(MonthlySeries::len).min().unwrap_or(0);
    if shortest < MIN_AGGREGATE_PERIODS {
        return Err(AlignError::InsufficientAggregateData { shortest });
    }

    for series in batch.iter_mut() {
        truncate_to_latest(series, shortest);
    }

    if let Some(first) = batch.first().and_then(MonthlySeries::first_period) {
        for series in batch.iter() {
            if let Some(start) = series.first_period() {
                if start != first {
                    tracing::warn!(
                        symbol = series.symbol(),
                        start = %start,
                        batch_start = %first,
                        "Aligned series cover different calendar windows"
                    );
                }
            }
        }
    }

    Ok(shortest)
}
