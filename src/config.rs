//! # Configuration Module
//!
//! This module defines configuration structures for the HTTP host, the
//! Telegram integration and the session store. Values come from environment
//! variables (optionally loaded from a `.env` file) with defaults for
//! everything except the Telegram credentials.

use std::time::Duration;

use crate::localization::DEFAULT_LANGUAGE;

// Constants for default configuration
pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const WEBHOOK_PATH: &str = "/telegram/webhook";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60; // 1 day
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

/// Retention settings for conversation sessions
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle time after which a session is discarded
    pub ttl: Duration,
    /// Maximum number of sessions kept in memory
    pub capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            capacity: DEFAULT_SESSION_CAPACITY,
        }
    }
}

/// Telegram credentials and webhook location
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    /// Bot token; the integration is disabled when absent
    pub token: Option<String>,
    /// Public base URL of this service, e.g. `https://bot.example.com`
    pub public_url: Option<String>,
    /// Full webhook URL, takes precedence over `public_url`
    pub webhook_url: Option<String>,
    /// Remove the webhook registration when the server stops
    pub delete_webhook_on_shutdown: bool,
}

impl TelegramConfig {
    /// URL to register with Telegram, if one can be derived
    pub fn resolved_webhook_url(&self) -> Option<String> {
        if let Some(url) = &self.webhook_url {
            return Some(url.clone());
        }
        self.public_url
            .as_ref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), WEBHOOK_PATH))
    }
}

/// Configuration structure for the whole service
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bind_address: String,
    pub port: u16,
    pub telegram: TelegramConfig,
    pub session: SessionConfig,
    /// Locale used when a user has no supported language code
    pub default_language: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            telegram: TelegramConfig::default(),
            session: SessionConfig::default(),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl BotConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    ///
    /// Blank values count as missing. Unparsable numbers fall back to the
    /// defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        Self {
            bind_address: var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_or("PORT", var("PORT"), defaults.port),
            telegram: TelegramConfig {
                token: var("TELEGRAM_BOT_TOKEN"),
                public_url: var("PUBLIC_URL"),
                webhook_url: var("TELEGRAM_WEBHOOK_URL"),
                delete_webhook_on_shutdown: parse_or(
                    "DELETE_WEBHOOK_ON_SHUTDOWN",
                    var("DELETE_WEBHOOK_ON_SHUTDOWN"),
                    false,
                ),
            },
            session: SessionConfig {
                ttl: Duration::from_secs(parse_or(
                    "SESSION_TTL_SECS",
                    var("SESSION_TTL_SECS"),
                    DEFAULT_SESSION_TTL_SECS,
                )),
                capacity: parse_or(
                    "SESSION_CAPACITY",
                    var("SESSION_CAPACITY"),
                    defaults.session.capacity,
                ),
            },
            default_language: var("DEFAULT_LANGUAGE").unwrap_or(defaults.default_language),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => match raw.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(variable = key, value = %raw, "Invalid value, using default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> BotConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert!(config.telegram.token.is_none());
        assert!(!config.telegram.delete_webhook_on_shutdown);
        assert_eq!(config.session.capacity, DEFAULT_SESSION_CAPACITY);
        assert_eq!(config.default_language, "ru");
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        let config = config_from(&[("TELEGRAM_BOT_TOKEN", "   ")]);
        assert!(config.telegram.token.is_none());
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let config = config_from(&[("PORT", "eighty")]);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_webhook_url_resolution() {
        let config = config_from(&[("PUBLIC_URL", "https://bot.example.com/")]);
        assert_eq!(
            config.telegram.resolved_webhook_url().as_deref(),
            Some("https://bot.example.com/telegram/webhook")
        );

        let config = config_from(&[
            ("PUBLIC_URL", "https://bot.example.com"),
            ("TELEGRAM_WEBHOOK_URL", "https://hooks.example.com/tg"),
        ]);
        assert_eq!(
            config.telegram.resolved_webhook_url().as_deref(),
            Some("https://hooks.example.com/tg")
        );

        assert!(config_from(&[]).telegram.resolved_webhook_url().is_none());
    }

    #[test]
    fn test_session_settings() {
        let config = config_from(&[("SESSION_TTL_SECS", "60"), ("SESSION_CAPACITY", "5")]);
        assert_eq!(config.session.ttl, Duration::from_secs(60));
        assert_eq!(config.session.capacity, 5);
    }
}
