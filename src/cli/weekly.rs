//! Weekly command implementation

use clap::Args;

use crate::config::{Config, Credentials};
use crate::pipeline::Pipeline;
use crate::provider::AlphaVantageClient;
use crate::retrieve::BatchRetriever;
use crate::store::MemoryBarStore;

#[derive(Args, Debug)]
pub struct WeeklyArgs {
    /// Ticker symbols to retrieve
    #[arg(required = true)]
    pub symbols: Vec<String>,
}

impl WeeklyArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let credentials = Credentials::from_env()?;
        let client = AlphaVantageClient::new(config.provider.clone(), &credentials);
        let retriever = BatchRetriever::with_policy(client, config.retry.policy());
        let pipeline = Pipeline::new(retriever, MemoryBarStore::new());

        let cancel = super::fetch::cancel_on_ctrl_c();
        let batch = pipeline.weekly_batch(&self.symbols, &cancel).await?;

        for series in &batch.series {
            println!("{:<8} {:>4} weeks", series.symbol(), series.len());
        }
        for failure in &batch.failures {
            eprintln!("warning: {failure}");
        }

        Ok(())
    }
}
