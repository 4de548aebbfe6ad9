use std::sync::Arc;

use anyhow::Context;

use wardcast_api::app::{build_app, services::build_services};
use wardcast_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wardcast_observability::init();

    let config = AppConfig::from_env();
    tracing::info!(?config, "configuration loaded");

    let services = Arc::new(build_services(&config)?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
