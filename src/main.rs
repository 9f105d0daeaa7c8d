use clap::Parser;
use message_verifier::{args::Args, init_logging, metrics::Metrics, start_server, AppError, AppResult, Config};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config).map_err(AppError::Config)?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging.level)?;

    info!("🚀 Starting MessageVerifier v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", args.config);
    info!("HTTP API available at: http://{}", config.get_server_address());

    let metrics = Arc::new(Metrics::new());
    if let Err(e) = start_server(Arc::new(config), metrics).await {
        error!("HTTP server exited: {}", e);
        return Err(AppError::Server(e));
    }

    Ok(())
}
