use anyhow::Result;
use signalforge_dash::{run_onboarding_checks, run_tui, ApiClient, Config};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Log to file, never the terminal, so the TUI is not corrupted
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    match File::create(&config.log_file) {
        Ok(log_file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(log_file))
                    .with_ansi(false),
            )
            .init(),
        Err(e) => eprintln!("Logging disabled, cannot create {}: {}", config.log_file, e),
    }

    // Backend URL and export directory
    if let Err(e) = run_onboarding_checks(&config) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation failed: {:#}", e);
        std::process::exit(1);
    }

    let client = ApiClient::new(&config.api_url, config.fetch_timeout())?;
    tracing::info!("✓ Backend client ready for {}", config.api_url);

    run_tui(config, Arc::new(client)).await?;

    tracing::info!("Dashboard closed");
    Ok(())
}
