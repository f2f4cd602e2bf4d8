//! # repeat-fetch server
//!
//! Serves the batch runner over HTTP on `127.0.0.1:3001` by default.
//!
//! ```text
//! repeat-fetch --config repeat-fetch.toml --bind 0.0.0.0:3001 --log-level debug
//! ```

use clap::Parser;
use repeat_fetch::{BatchRunner, Config, HttpFetcher, TitleExtractor, api};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "repeat-fetch", version, about = "Sequential batch fetcher")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides `server.bind_address`)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = args.log_level.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match args.config.as_deref() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    config.validate()?;

    let config = Arc::new(config);
    let runner = Arc::new(BatchRunner::new(
        Arc::new(HttpFetcher::new()?),
        Arc::new(TitleExtractor),
        config.runner.clone(),
    ));

    api::start_api_server(runner, config, repeat_fetch::shutdown_signal()).await?;
    Ok(())
}
