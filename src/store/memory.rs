//! In-memory daily-bar store

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{BarStore, StoreError};
use crate::series::DailyBar;

/// Bar store backed by process memory.
///
/// Stands in for the external relational engine in tests and local runs;
/// upserts follow the same (symbol, date) last-write-wins contract.
#[derive(Debug, Default)]
pub struct MemoryBarStore {
    inner: RwLock<BTreeMap<String, BTreeMap<NaiveDate, DailyBar>>>,
}

impl MemoryBarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor preloading a set of bars
    pub async fn with_bars(bars: &[DailyBar]) -> Self {
        let store = Self::new();
        store
            .upsert_daily_bars(bars)
            .await
            .expect("memory upsert cannot fail");
        store
    }
}

#[async_trait]
impl BarStore for MemoryBarStore {
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<DailyBar>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(symbol)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert_daily_bars(&self, bars: &[DailyBar]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for bar in bars {
            inner
                .entry(bar.symbol.clone())
                .or_default()
                .insert(bar.date, bar.clone());
        }
        Ok(())
    }

    async fn tickers(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.keys().cloned().collect())
    }
}
