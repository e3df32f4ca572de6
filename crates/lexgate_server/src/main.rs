use anyhow::Result;
use clap::Parser;
use lexgate_rate_limit::{LexgateConfig, RateLimiter, Reaper};
use lexgate_server::{ServerConfig, init_observability, serve};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lexgate admission-control server", long_about = None)]
struct Args {
    /// Path to a configuration file (defaults to bundled + user config)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listen address (e.g. "0.0.0.0:8080")
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => LexgateConfig::from_file(path)?,
        None => LexgateConfig::load()?,
    };

    let mut server_config = ServerConfig::from_settings(&config.server);
    if let Some(bind) = args.bind {
        server_config.bind = bind;
    }

    init_observability(&server_config)?;

    let limiter = Arc::new(RateLimiter::from_config(&config)?);

    // Background eviction keeps idle client records from accumulating.
    let reaper = Reaper::new(Arc::clone(&limiter), config.reaper);
    let _sweeper = reaper.spawn();

    info!(
        bind = %server_config.bind,
        endpoints = config.endpoints.len(),
        "starting lexgate admission-control server"
    );

    serve(server_config, limiter).await?;
    Ok(())
}
