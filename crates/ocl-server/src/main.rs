//! Binary entrypoint for the source dictionary HTTP server.
//!
//! Configuration comes from flags or environment variables; see
//! [`ServerConfig`].

use clap::Parser;

use ocl_server::config::ServerConfig;
use ocl_server::router::build_router;
use ocl_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::parse();
    let addr = config.listen_addr();
    tracing::info!(db_path = %config.db_path, staff = config.staff_users.len(), "loading configuration");

    let state = AppState::new(config)?;
    let app = build_router(state);

    tracing::info!("ocl server starting on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
