use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use citescan_core::config_file;
use citescan_parsing::ParsingConfigBuilder;
use citescan_web::{AppState, ServerSettings, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let file_config = config_file::load_config();
    let parsing = file_config
        .extraction
        .as_ref()
        .map(ParsingConfigBuilder::from_file_config)
        .unwrap_or_default()
        .build()
        .context("invalid section_header_regex in config")?;

    let mut settings = ServerSettings::from_env(file_config.server.as_ref())?;
    if let Some(dir) = &settings.static_dir
        && !dir.is_dir()
    {
        tracing::warn!(dir = %dir.display(), "static directory not found; frontend disabled");
        settings.static_dir = None;
    }

    let addr = settings.bind;
    tracing::info!(
        %addr,
        cors_origins = ?settings.cors_origins,
        static_dir = ?settings.static_dir,
        max_upload_bytes = settings.max_upload_bytes,
        "starting server"
    );

    let app = router(Arc::new(AppState::new(parsing, settings)));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
