//! End-to-end pipeline scenarios

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use folio_feed::align::AlignError;
use folio_feed::pipeline::{Pipeline, PipelineError, PriceSource};
use folio_feed::retrieve::{BatchRetriever, RetryPolicy};
use folio_feed::series::DailyBar;
use folio_feed::store::{BarStore, MemoryBarStore};

use crate::support::{monthly_body, symbols, weekly_body, ScriptedProvider};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        backoff: std::time::Duration::ZERO,
        ..RetryPolicy::default()
    }
}

fn daily(symbol: &str, y: i32, m: u32, d: u32) -> DailyBar {
    let close = Decimal::from(d);
    DailyBar {
        symbol: symbol.to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        adj_close: close,
        volume: 100,
        dividend: None,
    }
}

/// `months` months of daily rows (two rows per month) ending 2024-06
fn monthly_rows(symbol: &str, months: usize) -> Vec<DailyBar> {
    let (mut year, mut month) = (2024_i32, 6_u32);
    let mut rows = Vec::new();
    for _ in 0..months {
        rows.push(daily(symbol, year, month, 10));
        rows.push(daily(symbol, year, month, 25));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    rows
}

#[tokio::test]
async fn api_sourced_batch_is_length_aligned() {
    let provider = ScriptedProvider::default()
        .script("AAA", vec![monthly_body("AAA", 24)])
        .script("BBB", vec![monthly_body("BBB", 30)]);
    let pipeline = Pipeline::new(
        BatchRetriever::with_policy(provider, fast_policy()),
        MemoryBarStore::new(),
    );

    let batch = pipeline
        .aligned_monthly_batch(
            &symbols(&["AAA", "BBB"]),
            60,
            PriceSource::Api,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(batch.series.len(), 2);
    // Every series in the batch carries the same period count, each its
    // own most recent periods.
    assert_eq!(batch.series[0].len(), 24);
    assert_eq!(batch.series[1].len(), 24);
    assert_eq!(
        batch.series[0].last_period(),
        batch.series[1].last_period()
    );
}

#[tokio::test]
async fn store_sourced_batch_respects_required_window() {
    let mut rows = monthly_rows("AAA", 70);
    rows.extend(monthly_rows("BBB", 55));
    let store = MemoryBarStore::with_bars(&rows).await;
    let pipeline = Pipeline::new(
        BatchRetriever::with_policy(ScriptedProvider::default(), fast_policy()),
        store,
    );

    // BBB's 55 months cannot satisfy the 60-month window: the whole call
    // fails naming the offending symbol, AAA untouched.
    let error = pipeline
        .aligned_monthly_batch(
            &symbols(&["AAA", "BBB"]),
            60,
            PriceSource::Store,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match error {
        PipelineError::Align(AlignError::InsufficientHistory { symbol, got, need }) => {
            assert_eq!(symbol, "BBB");
            assert_eq!(got, 55);
            assert_eq!(need, 60);
        }
        other => panic!("expected InsufficientHistory, got {other}"),
    }
}

#[tokio::test]
async fn store_sourced_batch_collapses_to_latest_daily_row() {
    let store = MemoryBarStore::with_bars(&monthly_rows("AAA", 3)).await;
    let pipeline = Pipeline::new(
        BatchRetriever::with_policy(ScriptedProvider::default(), fast_policy()),
        store,
    );

    let batch = pipeline
        .aligned_monthly_batch(
            &symbols(&["AAA"]),
            2,
            PriceSource::Store,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    // Each month keeps the day-25 row, not the day-10 row
    let series = &batch.series[0];
    assert_eq!(series.len(), 2);
    assert!(series.bars.values().all(|bar| bar.close == Decimal::from(25)));
}

#[tokio::test]
async fn aligned_batch_is_stable_under_reruns() {
    let store = MemoryBarStore::with_bars(&monthly_rows("AAA", 60)).await;
    let pipeline = Pipeline::new(
        BatchRetriever::with_policy(ScriptedProvider::default(), fast_policy()),
        store,
    );
    let cancel = CancellationToken::new();

    let first = pipeline
        .aligned_monthly_batch(&symbols(&["AAA"]), 60, PriceSource::Store, &cancel)
        .await
        .unwrap();
    let second = pipeline
        .aligned_monthly_batch(&symbols(&["AAA"]), 60, PriceSource::Store, &cancel)
        .await
        .unwrap();

    assert_eq!(first.series, second.series);
}

#[tokio::test]
async fn weekly_batch_reports_failures_alongside_series() {
    let provider = ScriptedProvider::default()
        .script("AAA", vec![weekly_body("AAA", 8)])
        .script("BAD", vec![None]);
    let pipeline = Pipeline::new(
        BatchRetriever::with_policy(provider, fast_policy()),
        MemoryBarStore::new(),
    );

    let batch = pipeline
        .weekly_batch(&symbols(&["AAA", "BAD"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(batch.series.len(), 1);
    assert_eq!(batch.series[0].len(), 8);
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].symbol, "BAD");
}

#[tokio::test]
async fn upsert_then_assemble_round_trip() {
    let store = MemoryBarStore::new();
    store.upsert_daily_bars(&monthly_rows("AAA", 4)).await.unwrap();
    // Re-ingest one date with a corrected close; last write wins
    let mut corrected = daily("AAA", 2024, 6, 25);
    corrected.close = Decimal::from(99);
    store.upsert_daily_bars(&[corrected]).await.unwrap();

    let pipeline = Pipeline::new(
        BatchRetriever::with_policy(ScriptedProvider::default(), fast_policy()),
        store,
    );
    let batch = pipeline
        .aligned_monthly_batch(
            &symbols(&["AAA"]),
            4,
            PriceSource::Store,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let series = &batch.series[0];
    let last = series.last_period().unwrap();
    assert_eq!(series.bars[&last].close, Decimal::from(99));
}
