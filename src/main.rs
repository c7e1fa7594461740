use anyhow::Result;
use std::sync::Arc;
use warp::Filter;

use metaapi_trading_gateway::api::ProviderFactory;
use metaapi_trading_gateway::core::{logging, Config};
use metaapi_trading_gateway::server;
use metaapi_trading_gateway::session::MetaApiSessionFactory;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    logging::init_logging(&config.server.log_level);

    tracing::info!("🚀 MetaApi trading gateway starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Provider directory: {}",
        config.metaapi.provisioning_base_url
    );

    let factory: Arc<dyn ProviderFactory> =
        Arc::new(MetaApiSessionFactory::new(config.metaapi.clone()));
    let routes = server::routes(factory).recover(server::handle_rejection);

    tracing::info!("✅ Gateway listening on port {}", config.server.port);
    warp::serve(routes)
        .run(([0, 0, 0, 0], config.server.port))
        .await;

    Ok(())
}
