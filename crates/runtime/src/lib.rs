use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parlor_bot::GeminiClient;
use parlor_chat::{ChatService, HistoryStore};
use parlor_config::AppConfig;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Fully initialised service graph for the relay.
pub struct Services {
    pub chat: Arc<ChatService<GeminiClient>>,
}

impl Services {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        ensure_parent_dir(&config.storage.history_file)
            .await
            .context("failed to prepare history directory")?;
        tokio::fs::create_dir_all(&config.storage.upload_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create upload directory {}",
                    config.storage.upload_dir.display()
                )
            })?;

        let history = HistoryStore::load(&config.storage.history_file).await;
        info!(path = %config.storage.history_file.display(), "chat history loaded");

        let backend =
            GeminiClient::from_config(&config.bot).context("failed to build Gemini client")?;
        if backend.has_api_key() {
            info!(model = %config.bot.model, "bot gateway ready");
        } else {
            tracing::warn!(
                "no Gemini API key configured, bot invocations will fail until one is set"
            );
        }

        let chat = Arc::new(ChatService::new(
            history,
            backend,
            Duration::from_millis(config.bot.reply_delay_ms),
        ));

        Ok(Self { chat })
    }
}

async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
