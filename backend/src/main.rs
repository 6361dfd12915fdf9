// eNote - multi-user note service
// Entry point: configuration, logging and database startup

use enote::app::AppState;
use enote::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enote=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting eNote backend");

    let config = AppConfig::from_env()?;
    let state = AppState::initialize(&config).await?;

    let mut tx = state.repo.begin().await?;
    let users = tx.count_users().await?;
    tx.commit().await?;

    tracing::info!("Ready with {} registered users", users);

    state.repo.pool().close().await;

    Ok(())
}
