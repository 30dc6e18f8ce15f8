use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "parlor.toml",
    "config/parlor.toml",
    "crates/config/parlor.toml",
    "../parlor.toml",
    "../config/parlor.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub bot: BotConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            storage: StorageConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

/// Locations of the durable chat history and the upload directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_history_file")]
    pub history_file: PathBuf,
    #[serde(default = "StorageConfig::default_upload_dir")]
    pub upload_dir: PathBuf,
}

impl StorageConfig {
    fn default_history_file() -> PathBuf {
        PathBuf::from("data/parlor_history.json")
    }

    fn default_upload_dir() -> PathBuf {
        PathBuf::from("uploads")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_file: Self::default_history_file(),
            upload_dir: Self::default_upload_dir(),
        }
    }
}

/// Configuration for the AI bot integration.
///
/// ```
/// use parlor_config::BotConfig;
///
/// let bot = BotConfig::default();
/// assert_eq!(bot.model, "models/gemini-2.5-pro");
/// assert_eq!(bot.request_timeout_seconds, 30);
/// assert!(bot.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "BotConfig::default_model")]
    pub model: String,
    #[serde(default = "BotConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "BotConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Pause before delivering a bot reply so the typing indicator is
    /// perceptible. Zero disables the pause.
    #[serde(default = "BotConfig::default_reply_delay")]
    pub reply_delay_ms: u64,
}

impl BotConfig {
    fn default_model() -> String {
        "models/gemini-2.5-pro".to_string()
    }

    fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_reply_delay() -> u64 {
        1_000
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: Self::default_model(),
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
            reply_delay_ms: Self::default_reply_delay(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use parlor_config::load;
///
/// std::env::remove_var("PARLOR_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default(
            "storage.history_file",
            defaults.storage.history_file.display().to_string(),
        )
        .unwrap()
        .set_default(
            "storage.upload_dir",
            defaults.storage.upload_dir.display().to_string(),
        )
        .unwrap()
        .set_default("bot.model", defaults.bot.model.clone())
        .unwrap()
        .set_default("bot.base_url", defaults.bot.base_url.clone())
        .unwrap()
        .set_default(
            "bot.request_timeout_seconds",
            i64::try_from(defaults.bot.request_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "bot.reply_delay_ms",
            i64::try_from(defaults.bot.reply_delay_ms).unwrap_or(i64::MAX),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("PARLOR").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("PARLOR_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via PARLOR_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded relay configuration");
    Ok(config)
}
