//! Tickwatch - Main Entry Point
//!
//! Initializes logging and configuration, wires the adapters and runs the
//! terminal clock until the user quits.
//!
//! `--print-config` prints the effective configuration and exits.
//! `--save-config` writes it to the config file and exits.

use std::sync::Arc;

use tickwatch_infrastructure::{ConfigRepository, ReqwestApiClient, SocketIoChannel, to_json_stable};
use tickwatch_ui::AppWindow;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the panel on stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tickwatch=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let repository = ConfigRepository::new();
    let config = repository.load_effective().await?;

    let flag = |name: &str| std::env::args().skip(1).any(|arg| arg == name);
    if flag("--print-config") {
        println!("{}", to_json_stable(&config)?);
        return Ok(());
    }
    if flag("--save-config") {
        repository.save(&config).await?;
        if let Some(path) = repository.path() {
            println!("Configuration written to {}", path.display());
        }
        return Ok(());
    }

    tracing::info!(
        server = %config.server_url,
        records = %config.records_url,
        config_path = ?repository.path(),
        "starting tickwatch"
    );

    let api = Arc::new(ReqwestApiClient::new(&config)?);
    let channel = Arc::new(SocketIoChannel::from_config(&config)?);

    let app = AppWindow::new(&config, Arc::clone(&api), api, channel);
    app.run().await?;

    Ok(())
}
