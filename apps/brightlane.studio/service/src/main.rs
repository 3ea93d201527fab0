use std::net::SocketAddr;

use anyhow::Context;
use brightlane_contact_service::{build_router, config::Config, shutdown_signal};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let bind_addr = config.bind_addr;
    tracing::info!(
        %bind_addr,
        runtime_env = %config.runtime_env,
        store = config.store_path.is_some(),
        "starting contact service",
    );
    let app = build_router(config);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated unexpectedly")?;

    Ok(())
}
