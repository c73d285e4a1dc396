//! Upstream market-data provider
//!
//! One bounded request per symbol/granularity pair, decoded into a typed
//! series. Soft signals in the body are classified but never interpreted
//! here; the retry policy lives in [`crate::retrieve`].

mod client;
mod types;

pub use client::AlphaVantageClient;
pub use types::{
    FetchError, Granularity, MonthlyResponse, Upstream, WeeklyResponse,
    MONTHLY_ADJUSTED_FUNCTION, WEEKLY_ADJUSTED_FUNCTION,
};

use async_trait::async_trait;

/// Trait for series providers
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Fetch the full monthly adjusted history for one symbol
    async fn monthly_adjusted(&self, symbol: &str) -> Result<MonthlyResponse, FetchError>;

    /// Fetch the full weekly adjusted history for one symbol
    async fn weekly_adjusted(&self, symbol: &str) -> Result<WeeklyResponse, FetchError>;
}
