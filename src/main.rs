use clap::Parser;
use folio_feed::cli::{Cli, Commands};
use folio_feed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = folio_feed::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Fetch(args) => {
            tracing::info!(symbols = args.symbols.len(), "Starting monthly batch fetch");
            args.execute(&config).await?;
        }
        Commands::Weekly(args) => {
            tracing::info!(symbols = args.symbols.len(), "Starting weekly batch fetch");
            args.execute(&config).await?;
        }
        Commands::Status => {
            println!("folio-feed status");
            println!("  Provider: {}", config.provider.base_url);
            println!("  Status: idle");
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Provider: {} (timeout {}s)",
                config.provider.base_url, config.provider.timeout_secs
            );
            println!(
                "  Retry: {} attempts, {}s backoff, budgets weekly={} monthly={}",
                config.retry.max_attempts,
                config.retry.backoff_secs,
                config.retry.weekly_failure_budget,
                config.retry.monthly_failure_budget
            );
            println!("  Align: required_months={}", config.align.required_months);
        }
    }

    Ok(())
}
