//! Batch retrieval types and errors

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::config::RetryConfig;
use crate::provider::FetchError;
use crate::series::{MonthlySeries, WeeklySeries};

/// Retry policy driving the per-symbol state machine
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per symbol for monthly retrieval
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub backoff: Duration,
    /// Minimum observations for a monthly series to count as valid
    pub min_observations: usize,
    /// Failed symbols tolerated in a monthly batch before aborting
    pub monthly_failure_budget: usize,
    /// Failed symbols tolerated in a weekly batch before aborting
    pub weekly_failure_budget: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().policy()
    }
}

impl RetryConfig {
    /// Build the runtime policy from configuration
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff: Duration::from_secs(self.backoff_secs),
            min_observations: self.min_observations,
            monthly_failure_budget: self.monthly_failure_budget,
            weekly_failure_budget: self.weekly_failure_budget,
        }
    }
}

/// Why one symbol's retrieval ultimately failed
#[derive(Debug, Error)]
pub enum FailureCause {
    /// Transport, status, or decode failure from the fetcher
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The provider's rate-limit note stayed populated through every attempt
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// The provider returned a fatal error message; not retried
    #[error("upstream error: {0}")]
    UpstreamFatal(String),
    /// Too few observations to be usable
    #[error("insufficient data points ({got}, need {need})")]
    InsufficientData { got: usize, need: usize },
}

/// One symbol's recorded failure
#[derive(Debug, Error)]
#[error("symbol {symbol:?}: {cause} (after {attempts} attempts)")]
pub struct SymbolFailure {
    pub symbol: String,
    pub attempts: u32,
    pub cause: FailureCause,
}

/// A retrieved batch: one series per successful symbol plus the accumulated
/// per-symbol failures and attempt counts
#[derive(Debug, Default)]
pub struct SeriesBatch<S> {
    pub series: Vec<S>,
    pub failures: Vec<SymbolFailure>,
    /// Attempts consumed per requested symbol
    pub attempts: BTreeMap<String, u32>,
}

pub type MonthlyBatch = SeriesBatch<MonthlySeries>;
pub type WeeklyBatch = SeriesBatch<WeeklySeries>;

fn summarize(failures: &[SymbolFailure]) -> String {
    failures
        .iter()
        .map(SymbolFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Batch-level retrieval errors
#[derive(Debug, Error)]
pub enum BatchError<S: fmt::Debug> {
    /// More symbols failed than the budget tolerates; carries everything
    /// collected before the abort and every per-symbol cause
    #[error("too many failed symbols ({}): {}", .failures.len(), summarize(.failures))]
    BudgetExceeded {
        completed: Vec<S>,
        failures: Vec<SymbolFailure>,
    },
    /// Every requested symbol failed
    #[error("no valid series retrieved: {}", summarize(.failures))]
    NoValidData { failures: Vec<SymbolFailure> },
    /// The cancellation signal fired; partial results are discarded
    #[error("batch retrieval cancelled")]
    Cancelled,
}
