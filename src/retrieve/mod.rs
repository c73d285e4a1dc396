//! Batch retrieval with per-symbol retry and a cross-batch failure budget
//!
//! Symbols are processed one at a time; serialization plus the fixed
//! backoff keeps the request rate inside the provider's free-tier
//! contract. Per-symbol failures accumulate without aborting the batch
//! until the failure budget is exceeded.

mod types;

pub use types::{
    BatchError, FailureCause, MonthlyBatch, RetryPolicy, SeriesBatch, SymbolFailure, WeeklyBatch,
};

use std::time::Instant;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::provider::{SeriesProvider, Upstream};
use crate::series::{MonthlySeries, WeeklySeries};
use crate::telemetry::{increment_counter, record_latency, CounterMetric, LatencyMetric};

/// Drives a [`SeriesProvider`] across a batch of symbols
pub struct BatchRetriever<P> {
    provider: P,
    policy: RetryPolicy,
}

enum SymbolOutcome<S> {
    Retrieved { series: S, attempts: u32 },
    Failed(SymbolFailure),
    Cancelled,
}

impl<P: SeriesProvider> BatchRetriever<P> {
    /// Create a retriever with the default policy
    pub fn new(provider: P) -> Self {
        Self::with_policy(provider, RetryPolicy::default())
    }

    /// Create a retriever with an explicit policy
    pub fn with_policy(provider: P, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Retrieve monthly adjusted series for every symbol.
    ///
    /// Each symbol gets up to `max_attempts` attempts with a fixed backoff
    /// between them; a populated upstream error message fails the symbol
    /// immediately. Exceeding the monthly failure budget aborts the batch,
    /// returning the series collected so far inside the error.
    pub async fn monthly_batch(
        &self,
        symbols: &[String],
        cancel: &CancellationToken,
    ) -> Result<MonthlyBatch, BatchError<MonthlySeries>> {
        let mut batch = MonthlyBatch::default();

        for symbol in symbols {
            match self.monthly_symbol(symbol, cancel).await {
                SymbolOutcome::Retrieved { series, attempts } => {
                    batch.attempts.insert(symbol.clone(), attempts);
                    batch.series.push(series);
                }
                SymbolOutcome::Failed(failure) => {
                    increment_counter(CounterMetric::SymbolFailures);
                    tracing::warn!(symbol = %symbol, error = %failure, "Symbol failed permanently");
                    batch.attempts.insert(symbol.clone(), failure.attempts);
                    batch.failures.push(failure);

                    if batch.failures.len() > self.policy.monthly_failure_budget {
                        increment_counter(CounterMetric::BatchAborts);
                        tracing::error!(
                            failed = batch.failures.len(),
                            budget = self.policy.monthly_failure_budget,
                            "Failure budget exceeded, aborting batch"
                        );
                        return Err(BatchError::BudgetExceeded {
                            completed: batch.series,
                            failures: batch.failures,
                        });
                    }
                }
                SymbolOutcome::Cancelled => return Err(BatchError::Cancelled),
            }
        }

        if batch.series.is_empty() {
            return Err(BatchError::NoValidData {
                failures: batch.failures,
            });
        }
        Ok(batch)
    }

    /// Retrieve weekly adjusted series for every symbol.
    ///
    /// One attempt per symbol; the weekly failure budget is the only brake.
    pub async fn weekly_batch(
        &self,
        symbols: &[String],
        cancel: &CancellationToken,
    ) -> Result<WeeklyBatch, BatchError<WeeklySeries>> {
        let mut batch = WeeklyBatch::default();

        for symbol in symbols {
            let started = Instant::now();
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return Err(BatchError::Cancelled),
                result = self.provider.weekly_adjusted(symbol) => result,
            };
            increment_counter(CounterMetric::FetchAttempts);
            record_latency(LatencyMetric::ProviderFetch, started.elapsed());

            batch.attempts.insert(symbol.clone(), 1);
            let cause = match fetched.and_then(|response| response.classify()) {
                Ok(Upstream::Series(series)) => {
                    batch.series.push(series);
                    continue;
                }
                Ok(Upstream::RateLimited(note)) => {
                    increment_counter(CounterMetric::RateLimited);
                    FailureCause::RateLimited(note)
                }
                Ok(Upstream::Failed(message)) => FailureCause::UpstreamFatal(message),
                Err(error) => FailureCause::Fetch(error),
            };

            increment_counter(CounterMetric::SymbolFailures);
            let failure = SymbolFailure {
                symbol: symbol.clone(),
                attempts: 1,
                cause,
            };
            tracing::warn!(symbol = %symbol, error = %failure, "Symbol failed");
            batch.failures.push(failure);

            if batch.failures.len() > self.policy.weekly_failure_budget {
                increment_counter(CounterMetric::BatchAborts);
                tracing::error!(
                    failed = batch.failures.len(),
                    budget = self.policy.weekly_failure_budget,
                    "Failure budget exceeded, aborting batch"
                );
                return Err(BatchError::BudgetExceeded {
                    completed: batch.series,
                    failures: batch.failures,
                });
            }
        }

        if batch.series.is_empty() {
            return Err(BatchError::NoValidData {
                failures: batch.failures,
            });
        }
        Ok(batch)
    }

    async fn monthly_symbol(
        &self,
        symbol: &str,
        cancel: &CancellationToken,
    ) -> SymbolOutcome<MonthlySeries> {
        let mut attempts = 0;

        let cause = loop {
            attempts += 1;
            let started = Instant::now();
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return SymbolOutcome::Cancelled,
                result = self.provider.monthly_adjusted(symbol) => result,
            };
            increment_counter(CounterMetric::FetchAttempts);
            record_latency(LatencyMetric::ProviderFetch, started.elapsed());

            let transient = match fetched.and_then(|response| response.classify()) {
                Ok(Upstream::Series(series)) => {
                    let got = series.len();
                    if got >= self.policy.min_observations {
                        tracing::debug!(symbol, attempt = attempts, periods = got, "Series retrieved");
                        return SymbolOutcome::Retrieved { series, attempts };
                    }
                    FailureCause::InsufficientData {
                        got,
                        need: self.policy.min_observations,
                    }
                }
                Ok(Upstream::RateLimited(note)) => {
                    increment_counter(CounterMetric::RateLimited);
                    FailureCause::RateLimited(note)
                }
                // A populated error message is final for this symbol
                Ok(Upstream::Failed(message)) => break FailureCause::UpstreamFatal(message),
                Err(error) => FailureCause::Fetch(error),
            };

            if attempts >= self.policy.max_attempts {
                break transient;
            }

            tracing::warn!(
                symbol,
                attempt = attempts,
                error = %transient,
                "Transient failure, backing off"
            );
            tokio::select! {
                _ = cancel.cancelled() => return SymbolOutcome::Cancelled,
                _ = sleep(self.policy.backoff) => {}
            }
        };

        SymbolOutcome::Failed(SymbolFailure {
            symbol: symbol.to_string(),
            attempts,
            cause,
        })
    }
}
