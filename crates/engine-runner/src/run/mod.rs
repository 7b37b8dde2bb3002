//! Startup and transport loops.

mod stdio;
mod ws;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questwright_engine_adapters::infrastructure::config::AppConfig;

use crate::composition::AppState;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questwright=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting QuestWright Engine");
    let config = AppConfig::from_env();
    let state = Arc::new(AppState::new(&config).await?);

    if let Some(bind) = config.ws_bind.clone() {
        let ws_state = state.clone();
        tokio::spawn(async move {
            if let Err(err) = ws::serve(ws_state, &bind).await {
                tracing::error!(error = %err, "WebSocket listener failed");
            }
        });
    }

    stdio::serve(state).await
}
