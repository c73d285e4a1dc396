//! Prometheus metrics

use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One provider fetch, including body read
    ProviderFetch,
    /// One store query for a symbol's daily rows
    StoreQuery,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Fetch attempts issued, including retries
    FetchAttempts,
    /// Responses carrying the upstream rate-limit note
    RateLimited,
    /// Symbols that failed permanently within a batch
    SymbolFailures,
    /// Batches aborted by the failure budget
    BatchAborts,
}

/// Start the Prometheus exporter on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let name = match metric {
        LatencyMetric::ProviderFetch => "foliofeed_provider_fetch_latency_ms",
        LatencyMetric::StoreQuery => "foliofeed_store_query_latency_ms",
    };
    metrics::histogram!(name).record(duration.as_millis() as f64);
}

/// Increment a counter by one
pub fn increment_counter(metric: CounterMetric) {
    let name = match metric {
        CounterMetric::FetchAttempts => "foliofeed_fetch_attempts_total",
        CounterMetric::RateLimited => "foliofeed_rate_limited_total",
        CounterMetric::SymbolFailures => "foliofeed_symbol_failures_total",
        CounterMetric::BatchAborts => "foliofeed_batch_aborts_total",
    };
    metrics::counter!(name).increment(1);
}
