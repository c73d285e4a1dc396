//! folio-feed: market-data ingestion and alignment pipeline
//!
//! This library provides the core components for:
//! - Fetching weekly/monthly adjusted series from the upstream provider
//! - Per-symbol retry with soft-signal classification and failure budgets
//! - Collapsing stored daily bars into monthly series
//! - Cross-symbol alignment to a common observation window
//! - Configuration and credentials
//! - Observability stack

pub mod align;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod provider;
pub mod retrieve;
pub mod series;
pub mod store;
pub mod telemetry;
