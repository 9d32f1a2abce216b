//! Server entry point used by the `serve` command

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use tracing::info;

/// Build the server from a loaded configuration and run it to completion
pub async fn run_server(config: Config) -> Result<()> {
    info!(
        version = crate::VERSION,
        concurrency = config.dispatcher().concurrency,
        "Starting oak-disperser"
    );

    let server = HttpServer::new(&config)?;
    info!("Server starting at: http://{}", config.server().address());
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   POST /pubsub/push - Pub/Sub push delivery");
    info!("   POST /v1/batches - Direct batch submission");

    server.start().await
}
