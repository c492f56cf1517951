use anyhow::Context;

use onboarding_api::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    onboarding_observability::init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let app = onboarding_api::app::build_app(config.store.clone())
        .await
        .context("failed to initialise the record store")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}
