//! Daily-bar store seam
//!
//! The relational engine holding daily bars is an external collaborator;
//! this module defines the query/upsert contract the pipeline consumes and
//! ships an in-memory implementation for tests and embedded use.

mod memory;

pub use memory::MemoryBarStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::series::DailyBar;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query against the store failed
    #[error("store query failed: {0}")]
    Query(String),
    /// The store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for daily-bar stores
#[async_trait]
pub trait BarStore: Send + Sync {
    /// All daily bars for one symbol, ascending by date
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<DailyBar>, StoreError>;

    /// Insert or update bars keyed on (symbol, date); the incoming row's
    /// value columns win on conflict
    async fn upsert_daily_bars(&self, bars: &[DailyBar]) -> Result<(), StoreError>;

    /// Distinct symbols present in the store, ascending
    async fn tickers(&self) -> Result<Vec<String>, StoreError>;
}
