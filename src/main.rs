// Initialize configuration
// Set up logging
// Create database connection pool
// Initialize response cache and Blockchair client
// Start HTTP server, shut down on Ctrl-C

use wallet_tracker::{api, blockchain::BlockchairClient, cache, config::Config, db, state::AppState};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting wallet-tracker");

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    // Setup database connection
    let db_pool = db::connection::establish_connection(&config.database_url).await?;
    sqlx::query("SELECT 1").execute(&db_pool).await?;
    tracing::info!("Database connection established");

    // Initialize cache
    let response_cache = cache::init_cache(&config);
    tracing::info!(
        "Response cache initialized with TTL: {:?} and capacity: {}",
        config.cache_ttl,
        config.cache_max_capacity
    );

    let chain = BlockchairClient::new(&config, response_cache.clone())?;

    // Create shared state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        db_pool: db_pool.clone(),
        chain: Arc::new(chain),
    });

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutdown signal received");
        signal_token.cancel();
    });

    // Start HTTP server
    let app = api::create_router(app_state);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    response_cache.clear().await;
    db_pool.close().await;
    tracing::info!("wallet-tracker stopped");

    Ok(())
}
