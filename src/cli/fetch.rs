//! Fetch command implementation

use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, Credentials};
use crate::pipeline::{Pipeline, PriceSource};
use crate::provider::AlphaVantageClient;
use crate::retrieve::BatchRetriever;
use crate::store::MemoryBarStore;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Ticker symbols to retrieve
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Required window in months (defaults to the configured value)
    #[arg(short, long)]
    pub months: Option<usize>,

    /// Emit the aligned batch as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl FetchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let credentials = Credentials::from_env()?;
        let client = AlphaVantageClient::new(config.provider.clone(), &credentials);
        let retriever = BatchRetriever::with_policy(client, config.retry.policy());
        let pipeline = Pipeline::new(retriever, MemoryBarStore::new());

        let cancel = cancel_on_ctrl_c();
        let months = self.months.unwrap_or(config.align.required_months);

        let batch = pipeline
            .aligned_monthly_batch(&self.symbols, months, PriceSource::Api, &cancel)
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&batch.series)?);
        } else {
            for series in &batch.series {
                let window = match (series.first_period(), series.last_period()) {
                    (Some(first), Some(last)) => format!("{first} .. {last}"),
                    _ => "empty".to_string(),
                };
                println!("{:<8} {:>4} periods  {}", series.symbol(), series.len(), window);
            }
        }

        for failure in &batch.failures {
            eprintln!("warning: {failure}");
        }

        Ok(())
    }
}

/// Token cancelled by the first Ctrl-C
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling batch");
            handle.cancel();
        }
    });
    cancel
}
