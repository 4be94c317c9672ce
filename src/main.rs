use std::path::PathBuf;

use anyhow::Result;
use astrocast::api::AppState;
use astrocast::config::AstrocastConfig;
use astrocast::dashboard::DashboardService;
use astrocast::{telemetry, web};
use clap::Parser;
use tracing::info;

/// Weather and climate dashboard for planning outdoor events
#[derive(Debug, Parser)]
#[command(name = "astrocast", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "ASTROCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AstrocastConfig::load_from_path(cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _telemetry = telemetry::init(&config.logging)?;
    info!("Starting astrocast {}", astrocast::VERSION);

    let service = DashboardService::from_config(&config)?;
    web::run(&config.server, AppState::new(service)).await
}
