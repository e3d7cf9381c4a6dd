//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides for sensitive values (`TELEGRAM_BOT_TOKEN`, `DATABASE_URL`).
//! Every section has defaults matching the observed production setup, so
//! a missing config file falls back to a fully working configuration
//! (minus the bot token, which must come from the environment).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::{CurrencyCode, Language};
use crate::error::{ConfigError, Error, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub provider: ProviderConfig,
    pub bot: BotConfig,
    pub alerts: AlertsConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Telegram transport settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token from BotFather. Usually supplied via the
    /// `TELEGRAM_BOT_TOKEN` environment variable rather than the file.
    pub bot_token: String,
}

/// Rate provider settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the exchange-rate API; the base currency code is
    /// appended as the final path segment.
    pub api_url: String,
    /// Base currency all cached rates are expressed in.
    pub base_currency: String,
    /// Upper bound on a single provider request, so a slow provider
    /// cannot stall every stale interaction indefinitely.
    pub request_timeout_secs: u64,
    /// Maximum age of the cached table before a refresh is forced.
    pub staleness_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.exchangerate-api.com/v4/latest".into(),
            base_currency: "USD".into(),
            request_timeout_secs: 10,
            staleness_secs: 3600,
        }
    }
}

/// Conversation behavior settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// History entries retained per user, newest first.
    pub history_cap: usize,
    /// Favorites assigned to a profile on first access.
    pub default_favorites: Vec<String>,
    /// Currencies listed by the rates overview and inline fan-out.
    pub showcase_currencies: Vec<String>,
    /// Maximum favorite buttons on the target-currency keyboard.
    pub target_keyboard_limit: usize,
    /// Locale assigned to a profile on first access.
    pub default_language: Language,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            history_cap: 10,
            default_favorites: vec!["USD".into(), "EUR".into(), "RUB".into()],
            showcase_currencies: vec![
                "EUR".into(),
                "RUB".into(),
                "GBP".into(),
                "JPY".into(),
                "CNY".into(),
                "KZT".into(),
                "UZS".into(),
            ],
            target_keyboard_limit: 3,
            default_language: Language::Ru,
        }
    }
}

/// Alert evaluator scheduling.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub poll_interval_secs: u64,
    pub initial_delay_secs: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            initial_delay_secs: 10,
        }
    }
}

/// SQLite database settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "cambio.db".into(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults if
    /// the file does not exist, then apply environment overrides and
    /// validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
            toml::from_str(&content).map_err(|e| Error::Config(ConfigError::Parse(e)))?
        } else {
            Self::default()
        };

        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Environment overrides for values that should not live in the file.
    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.provider.api_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "provider.api_url",
            }
            .into());
        }
        if CurrencyCode::parse(&self.provider.base_currency).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "provider.base_currency",
                reason: format!("`{}` is not a 3-letter code", self.provider.base_currency),
            }
            .into());
        }
        if self.provider.staleness_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "provider.staleness_secs",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.bot.history_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bot.history_cap",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.bot.target_keyboard_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bot.target_keyboard_limit",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.bot.default_favorites.is_empty() {
            return Err(ConfigError::MissingField {
                field: "bot.default_favorites",
            }
            .into());
        }
        for (field, codes) in [
            ("bot.default_favorites", &self.bot.default_favorites),
            ("bot.showcase_currencies", &self.bot.showcase_currencies),
        ] {
            if let Some(bad) = codes.iter().find(|c| CurrencyCode::parse(c).is_none()) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("`{bad}` is not a 3-letter code"),
                }
                .into());
            }
        }
        if self.alerts.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "alerts.poll_interval_secs",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url",
            }
            .into());
        }
        Ok(())
    }

    /// Initialize the tracing subscriber.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    #[must_use]
    pub fn base_currency(&self) -> CurrencyCode {
        // Validated during load.
        CurrencyCode::parse(&self.provider.base_currency).unwrap_or_else(|| {
            CurrencyCode::parse("USD").expect("static code")
        })
    }

    #[must_use]
    pub fn default_favorites(&self) -> Vec<CurrencyCode> {
        self.bot
            .default_favorites
            .iter()
            .filter_map(|c| CurrencyCode::parse(c))
            .collect()
    }

    #[must_use]
    pub fn showcase_currencies(&self) -> Vec<CurrencyCode> {
        self.bot
            .showcase_currencies
            .iter()
            .filter_map(|c| CurrencyCode::parse(c))
            .collect()
    }

    #[must_use]
    pub fn staleness(&self) -> Duration {
        Duration::from_secs(self.provider.staleness_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.request_timeout_secs)
    }

    #[must_use]
    pub fn alert_poll_interval(&self) -> Duration {
        Duration::from_secs(self.alerts.poll_interval_secs)
    }

    #[must_use]
    pub fn alert_initial_delay(&self) -> Duration {
        Duration::from_secs(self.alerts.initial_delay_secs)
    }
}
