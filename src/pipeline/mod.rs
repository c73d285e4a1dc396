//! Batch pipeline: the seam the API layer and optimizer consume
//!
//! Takes a symbol list, a required window, and a data-source mode, and
//! returns a batch of equal-length monthly series. The store path is
//! preferred in production; the API path exists for symbols not yet
//! ingested.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::align::{self, AlignError};
use crate::provider::SeriesProvider;
use crate::retrieve::{BatchError, BatchRetriever, MonthlyBatch, WeeklyBatch};
use crate::series::{MonthlySeries, WeeklySeries};
use crate::store::{BarStore, StoreError};
use crate::telemetry::{record_latency, LatencyMetric};

/// Where a monthly batch is sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Live provider fetch through the batch retriever
    Api,
    /// Assembly from stored daily bars
    Store,
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Caller misuse; nothing was fetched or queried
    #[error("invalid request parameters: {0}")]
    InvalidParams(&'static str),
    /// Batch retrieval failed
    #[error(transparent)]
    Retrieve(BatchError<MonthlySeries>),
    /// Alignment failed
    #[error(transparent)]
    Align(#[from] AlignError),
    /// The store collaborator failed
    #[error(transparent)]
    Store(#[from] StoreError),
    /// No symbol yielded a usable series
    #[error("no valid monthly series assembled")]
    NoValidData,
    /// The cancellation signal fired
    #[error("batch request cancelled")]
    Cancelled,
}

impl From<BatchError<MonthlySeries>> for PipelineError {
    fn from(error: BatchError<MonthlySeries>) -> Self {
        match error {
            BatchError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::Retrieve(other),
        }
    }
}

/// Ingestion pipeline over a provider and a daily-bar store
pub struct Pipeline<P, S> {
    retriever: BatchRetriever<P>,
    store: S,
}

impl<P: SeriesProvider, S: BarStore> Pipeline<P, S> {
    pub fn new(retriever: BatchRetriever<P>, store: S) -> Self {
        Self { retriever, store }
    }

    /// Produce a batch of equal-length monthly series for the symbols.
    ///
    /// Store mode assembles each series from daily rows and requires every
    /// included symbol to carry at least `required_months` periods, failing
    /// fast otherwise. Api mode retrieves through the retry policy and
    /// aligns the whole batch to its shortest surviving series.
    pub async fn aligned_monthly_batch(
        &self,
        symbols: &[String],
        required_months: usize,
        source: PriceSource,
        cancel: &CancellationToken,
    ) -> Result<MonthlyBatch, PipelineError> {
        if required_months < 2 {
            return Err(PipelineError::InvalidParams(
                "required_months must be at least 2",
            ));
        }

        let batch_id = Uuid::new_v4();
        tracing::info!(
            %batch_id,
            symbols = symbols.len(),
            ?source,
            "Assembling monthly batch"
        );

        let batch = match source {
            PriceSource::Store => self.monthly_from_store(symbols, required_months, cancel).await?,
            PriceSource::Api => self.monthly_from_api(symbols, cancel).await?,
        };

        tracing::info!(
            %batch_id,
            series = batch.series.len(),
            failed = batch.failures.len(),
            "Monthly batch ready"
        );
        Ok(batch)
    }

    /// Retrieve weekly series for the symbols through the retry policy
    pub async fn weekly_batch(
        &self,
        symbols: &[String],
        cancel: &CancellationToken,
    ) -> Result<WeeklyBatch, BatchError<WeeklySeries>> {
        self.retriever.weekly_batch(symbols, cancel).await
    }

    async fn monthly_from_store(
        &self,
        symbols: &[String],
        required_months: usize,
        cancel: &CancellationToken,
    ) -> Result<MonthlyBatch, PipelineError> {
        let mut batch = MonthlyBatch::default();

        for symbol in symbols {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let started = std::time::Instant::now();
            let rows = self.store.daily_bars(symbol).await?;
            record_latency(LatencyMetric::StoreQuery, started.elapsed());

            if rows.is_empty() {
                tracing::warn!(symbol = %symbol, "No stored rows, skipping symbol");
                continue;
            }

            let mut series = align::monthly_from_daily(symbol, &rows);
            align::require_months(&series, required_months)?;
            align::truncate_to_latest(&mut series, required_months);
            batch.series.push(series);
        }

        if batch.series.is_empty() {
            return Err(PipelineError::NoValidData);
        }
        Ok(batch)
    }

    async fn monthly_from_api(
        &self,
        symbols: &[String],
        cancel: &CancellationToken,
    ) -> Result<MonthlyBatch, PipelineError> {
        let mut batch = self.retriever.monthly_batch(symbols, cancel).await?;
        let aligned = align::align_to_shortest(&mut batch.series)?;
        tracing::debug!(periods = aligned, "Batch aligned to shortest series");
        Ok(batch)
    }
}
