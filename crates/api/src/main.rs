use anyhow::Context;

use roster_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    roster_observability::init();

    let config = ApiConfig::from_env()
        .inspect_err(|e| tracing::error!(error.message = %e, "invalid configuration"))?;

    let app = roster_api::app::build_app_from_config(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Unexpected error happened in server")
        .inspect_err(|e| {
            tracing::error!(error.cause_chain = ?e, error.message = %e, "Unexpected error")
        })
}
