//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::PathBuf, sync::Arc, time::Duration};

use serde::Deserialize;

use super::types::{ChatId, Res};

/// Fallback autopost interval when neither minutes nor hours are configured.
pub const DEFAULT_AUTOPOST_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);

/// Shortest autopost interval accepted; smaller values are raised to it.
pub const MIN_AUTOPOST_INTERVAL: Duration = Duration::from_secs(1);

/// Default Telegram Bot API base URL.
fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Default long-poll timeout, in seconds.
fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_autopost() -> bool {
    true
}

/// Default location of the registered chat state file.
fn default_state_path() -> PathBuf {
    PathBuf::from(".hidden/state.json")
}

/// Default conjunction used when joining participant names.
fn default_conjunction() -> String {
    "и".to_string()
}

/// Configuration for the event bot.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Telegram bot token (`EVENT_BOT_BOT_TOKEN`).
    pub bot_token: String,
    /// Telegram Bot API base URL (`EVENT_BOT_TELEGRAM_API_URL`).
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    /// Long-poll timeout for `getUpdates`, in seconds (`EVENT_BOT_POLL_TIMEOUT_SECS`).
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    /// Fixed autopost target chat (`EVENT_BOT_CHAT_ID`).
    /// Takes precedence over the chat registered with `/register`.
    #[serde(default)]
    pub chat_id: Option<ChatId>,
    /// Whether the periodic autopost scheduler runs at all (`EVENT_BOT_AUTOPOST`).
    #[serde(default = "default_autopost")]
    pub autopost: bool,
    /// Autopost interval in minutes (`EVENT_BOT_INTERVAL_MINUTES`).
    #[serde(default)]
    pub interval_minutes: Option<f64>,
    /// Autopost interval in hours (`EVENT_BOT_INTERVAL_HOURS`).
    /// Only used when no positive minute interval is set.
    #[serde(default)]
    pub interval_hours: Option<f64>,
    /// Post one event right after startup instead of waiting a full interval (`EVENT_BOT_SEND_ON_START`).
    #[serde(default)]
    pub send_on_start: bool,
    /// Where the registered chat is persisted (`EVENT_BOT_STATE_PATH`).
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    /// Optional catalog file replacing the built-in people and templates (`EVENT_BOT_CATALOG_PATH`).
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Word placed before the last name in a group (`EVENT_BOT_CONJUNCTION`).
    #[serde(default = "default_conjunction")]
    pub conjunction: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("EVENT_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Res<()> {
        if self.bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Bot token must not be empty."));
        }

        if self.poll_timeout_secs < 1 || self.poll_timeout_secs > 50 {
            return Err(anyhow::anyhow!("Poll timeout must be between 1 and 50 seconds."));
        }

        if self.conjunction.trim().is_empty() {
            return Err(anyhow::anyhow!("Conjunction must not be empty."));
        }

        Ok(())
    }

    /// Resolves the autopost interval.
    ///
    /// Positive minutes win over positive hours; anything else falls back to
    /// [`DEFAULT_AUTOPOST_INTERVAL`]. Returns `None` when autopost is disabled.
    /// The result is never shorter than [`MIN_AUTOPOST_INTERVAL`].
    pub fn autopost_interval(&self) -> Option<Duration> {
        if !self.autopost {
            return None;
        }

        let positive = |value: Option<f64>| value.filter(|v| v.is_finite() && *v > 0.0);

        let seconds = if let Some(minutes) = positive(self.interval_minutes) {
            minutes * 60.0
        } else if let Some(hours) = positive(self.interval_hours) {
            hours * 60.0 * 60.0
        } else {
            return Some(DEFAULT_AUTOPOST_INTERVAL);
        };

        let interval = Duration::try_from_secs_f64(seconds).unwrap_or(DEFAULT_AUTOPOST_INTERVAL);

        Some(interval.max(MIN_AUTOPOST_INTERVAL))
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}
