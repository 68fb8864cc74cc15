//! TOML configuration for verdictbot.
//!
//! A layered model: compiled-in defaults, an optional config file, and
//! environment variables for the three secrets. The resulting [`BotConfig`]
//! is built once at startup and handed to everything that needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Env var holding an explicit config file path.
pub const CONFIG_ENV: &str = "VERDICTBOT_CONFIG";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default, skip_serializing)]
    pub credentials: Credentials,
}

impl BotConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path in the `VERDICTBOT_CONFIG` environment variable.
    /// 2. `./verdictbot.toml`.
    /// 3. Compiled-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "VERDICTBOT_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local_path = Path::new("verdictbot.toml");
        if local_path.exists() {
            match Self::load(local_path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %local_path.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Self::default()
    }

    /// Resolve the effective config: explicit file if given (errors are
    /// fatal), otherwise the fallback chain, then secrets from the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::load(p)?,
            None => Self::load_or_default(),
        };
        cfg.credentials.overlay(|name| std::env::var(name).ok());
        Ok(cfg)
    }
}

// ---------------------------------------------------------------------------
// Status API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Review status endpoint queried with `from_date`.
    pub endpoint: String,
    /// Per-request deadline, shared with the Telegram client.
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API base URL, without the `/bot<token>` suffix.
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Fixed delay between cycles, applied after success and failure alike.
    pub retry_period_secs: u64,
    /// How far before "now" the first query window starts.
    pub lookback_secs: u64,
}

impl PollingConfig {
    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            retry_period_secs: 600,
            lookback_secs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// Append log lines to this file instead of stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// The three secrets required to run. Environment variables win over the file.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl Credentials {
    /// Replace fields with values from `lookup` (keyed by env var name)
    /// when present.
    pub fn overlay(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(PRACTICUM_TOKEN) {
            self.practicum_token = v;
        }
        if let Some(v) = lookup(TELEGRAM_TOKEN) {
            self.telegram_token = v;
        }
        if let Some(v) = lookup(TELEGRAM_CHAT_ID) {
            self.telegram_chat_id = v;
        }
    }

    /// `(env var name, value)` pairs in check order.
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (PRACTICUM_TOKEN, self.practicum_token.as_str()),
            (TELEGRAM_TOKEN, self.telegram_token.as_str()),
            (TELEGRAM_CHAT_ID, self.telegram_chat_id.as_str()),
        ]
    }
}

fn redact(s: &str) -> &'static str {
    if s.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &redact(&self.practicum_token))
            .field("telegram_token", &redact(&self.telegram_token))
            .field("telegram_chat_id", &redact(&self.telegram_chat_id))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = BotConfig::default();

        assert_eq!(cfg.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.api.request_timeout_secs, 30);
        assert_eq!(cfg.telegram.api_base, "https://api.telegram.org");
        assert_eq!(cfg.polling.retry_period(), Duration::from_secs(600));
        assert_eq!(cfg.polling.lookback_secs, 0);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.format, LogFormat::Text);
        assert!(cfg.logging.file.is_none());
        assert!(cfg.credentials.practicum_token.is_empty());
    }

    #[test]
    fn test_parse_example_toml() {
        let toml_str = r#"
[api]
endpoint = "http://localhost:9000/statuses/"
request_timeout_secs = 5

[telegram]
api_base = "http://localhost:9001"

[polling]
retry_period_secs = 60
lookback_secs = 2592000

[logging]
level = "debug"
format = "json"
file = "/var/log/verdictbot.log"

[credentials]
practicum_token = "p"
telegram_token = "t"
telegram_chat_id = "42"
"#;

        let cfg: BotConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(cfg.api.endpoint, "http://localhost:9000/statuses/");
        assert_eq!(cfg.api.request_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.telegram.api_base, "http://localhost:9001");
        assert_eq!(cfg.polling.retry_period_secs, 60);
        assert_eq!(cfg.polling.lookback_secs, 2_592_000);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.file, Some(PathBuf::from("/var/log/verdictbot.log")));
        assert_eq!(cfg.credentials.telegram_chat_id, "42");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: BotConfig = toml::from_str("[polling]\nretry_period_secs = 5\n").unwrap();

        assert_eq!(cfg.polling.retry_period_secs, 5);
        assert_eq!(cfg.polling.lookback_secs, 0);
        assert_eq!(cfg.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nrequest_timeout_secs = 7").unwrap();

        let cfg = BotConfig::load(file.path()).unwrap();
        assert_eq!(cfg.api.request_timeout_secs, 7);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = BotConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[polling\nretry_period_secs = ").unwrap();
        let err = BotConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_serialized_config_omits_credentials() {
        let mut cfg = BotConfig::default();
        cfg.credentials.telegram_token = "super-secret".into();
        let out = toml::to_string_pretty(&cfg).unwrap();
        assert!(!out.contains("super-secret"));
        assert!(out.contains("retry_period_secs"));
    }

    #[test]
    fn test_env_overlay_wins_over_file() {
        let mut creds = Credentials {
            practicum_token: "from-file".into(),
            telegram_token: "from-file".into(),
            telegram_chat_id: "1".into(),
        };
        let env: HashMap<&str, &str> = [(PRACTICUM_TOKEN, "from-env"), (TELEGRAM_CHAT_ID, "")]
            .into_iter()
            .collect();

        creds.overlay(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(creds.practicum_token, "from-env");
        assert_eq!(creds.telegram_token, "from-file");
        // An explicitly empty variable still overrides.
        assert_eq!(creds.telegram_chat_id, "");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials {
            practicum_token: "super-secret".into(),
            telegram_token: String::new(),
            telegram_chat_id: "42".into(),
        };
        let out = format!("{:?}", creds);
        assert!(!out.contains("super-secret"));
        assert!(!out.contains("42"));
        assert!(out.contains("<unset>"));
    }
}
