use anyhow::Context;

use rockparade_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    rockparade_observability::init(config.log_format);

    let services = rockparade_api::app::services::build_services(&config)
        .await
        .context("failed to initialise storage")?;
    let app = rockparade_api::app::build_app(config.jwt_secret.as_bytes(), services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, storage = ?config.storage, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
