use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ucp_gateway::{app, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    if config.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let addr = format!("{}:{}", config.host, config.port);
    // Persistent backends plug in through the storage traits; the binary
    // runs against the in-memory collaborators until then.
    let (state, _handles) = AppState::in_memory(config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "UCP gateway listening");

    axum::serve(listener, app(state))
        .await
        .context("server error")?;
    Ok(())
}
