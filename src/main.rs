use std::sync::Arc;

use anyhow::Context;
use huddle::{AppState, Config, Gateway, auth::Credentials, db, store::codes::RandomCodes};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let db_pool = db::connect(&config.database_url, config.db_max_connections)
        .await
        .with_context(|| format!("connecting to {}", config.database_url))?;
    db::migrate(&db_pool).await.context("creating schema")?;

    let gateway = Gateway::new(
        db_pool,
        Arc::new(RandomCodes { length: config.room_code_length }),
        Credentials::new().context("setting up password hashing")?,
    );
    let app = huddle::app(AppState { gateway }, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}
