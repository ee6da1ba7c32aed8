//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LEAGUE_BACK_CONFIG_PATH";
/// Environment variable holding the admin password.
const ADMIN_PASSWORD_ENV: &str = "LEAGUE_ADMIN_PASSWORD";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

const MIN_ACTIVITY_LOG_LIMIT: usize = 20;
const MAX_ACTIVITY_LOG_LIMIT: usize = 50;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Secret expected in the `X-Admin-Token` header.
    pub admin_password: String,
    /// Name given to a league materialized from scratch.
    pub league_name: String,
    /// Minimum delay between two writes to the store.
    pub save_cooldown: Duration,
    /// Upper bound for a single store call.
    pub storage_timeout: Duration,
    /// Period of the background save of pending changes.
    pub autosave_interval: Duration,
    /// Number of activity entries kept, within 20..=50.
    pub activity_log_limit: usize,
    /// Days between round generation and the generated fixtures.
    pub round_interval_days: u32,
    /// News items returned by the public view.
    pub public_news_limit: usize,
}

impl AppConfig {
    /// Load the configuration from disk, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file();

        match env::var(ADMIN_PASSWORD_ENV) {
            Ok(password) if !password.trim().is_empty() => config.admin_password = password,
            _ if config.admin_password == DEFAULT_ADMIN_PASSWORD => warn!(
                var = ADMIN_PASSWORD_ENV,
                "admin password not configured; using the built-in default"
            ),
            _ => {}
        }

        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        activity_log_limit = app_config.activity_log_limit,
                        "loaded league configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_password: DEFAULT_ADMIN_PASSWORD.into(),
            league_name: "League".into(),
            save_cooldown: Duration::from_secs(1),
            storage_timeout: Duration::from_secs(15),
            autosave_interval: Duration::from_secs(30),
            activity_log_limit: MAX_ACTIVITY_LOG_LIMIT,
            round_interval_days: 7,
            public_news_limit: 6,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    admin_password: Option<String>,
    league_name: Option<String>,
    save_cooldown_ms: Option<u64>,
    storage_timeout_ms: Option<u64>,
    autosave_interval_secs: Option<u64>,
    activity_log_limit: Option<usize>,
    round_interval_days: Option<u32>,
    public_news_limit: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            admin_password: value
                .admin_password
                .filter(|password| !password.trim().is_empty())
                .unwrap_or(defaults.admin_password),
            league_name: value.league_name.unwrap_or(defaults.league_name),
            save_cooldown: value
                .save_cooldown_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.save_cooldown),
            storage_timeout: value
                .storage_timeout_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.storage_timeout),
            autosave_interval: value
                .autosave_interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.autosave_interval),
            activity_log_limit: value
                .activity_log_limit
                .map(|limit| limit.clamp(MIN_ACTIVITY_LOG_LIMIT, MAX_ACTIVITY_LOG_LIMIT))
                .unwrap_or(defaults.activity_log_limit),
            round_interval_days: value
                .round_interval_days
                .unwrap_or(defaults.round_interval_days),
            public_news_limit: value
                .public_news_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.public_news_limit),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
