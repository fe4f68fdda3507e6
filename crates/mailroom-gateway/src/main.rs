use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

mod app;
mod caption;
mod http;
mod intake;
mod limit;
mod resolve;
mod sniff;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailroom_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path via MAILROOM_CONFIG > ./mailroom.toml
    let config_path = std::env::var("MAILROOM_CONFIG").ok();
    let config = mailroom_core::MailroomConfig::load(config_path.as_deref())?;

    let token = config.telegram.resolve_token()?;
    let directory = config.chats.load_directory()?;
    info!(labels = directory.len(), "chat directory loaded");

    let telegram = mailroom_telegram::Client::with_api_url(token, config.telegram.api_url.clone());
    let limiter = limit::RateLimiter::new(
        Duration::from_millis(config.gateway.rate.period_ms),
        config.gateway.rate.burst,
    );

    let state = Arc::new(app::AppState::new(
        telegram,
        limiter,
        &config.chats.default_id,
        directory,
    ));
    let router = app::build_router(state, config.gateway.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    info!(chat = %config.chats.default_id, "mailroom gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
