//! Configuration for the boardwall dashboard.
//!
//! Layered with figment: built-in defaults, then `config.toml` in the
//! platform config directory, then `BOARDWALL_*` environment variables.
//! [`to_dashboard_config`] validates the result and translates it into
//! `boardwall_core::DashboardConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use boardwall_core::{DashboardConfig, SystemInfo};

/// Environment variable prefix. Nested keys use `__`, as in
/// `BOARDWALL_FALLBACK__NUM_BOARDS`.
pub const ENV_PREFIX: &str = "BOARDWALL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL (e.g., "http://localhost:3000").
    pub backend_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    pub poll_interval_ms: u64,
    pub watchdog_grace_ms: u64,
    pub resize_debounce_ms: u64,
    pub telemetry_interval_ms: u64,

    /// Readiness checks before startup gives up.
    pub health_check_attempts: u32,
    pub health_check_backoff_ms: u64,

    /// Padding around the board grid, in terminal cells.
    pub layout_padding: f64,

    /// System info assumed when the backend cannot provide it.
    pub fallback: Fallback,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".into(),
            request_timeout_secs: 10,
            poll_interval_ms: 250,
            watchdog_grace_ms: 5000,
            resize_debounce_ms: 250,
            telemetry_interval_ms: 1000,
            health_check_attempts: 20,
            health_check_backoff_ms: 1000,
            layout_padding: 2.0,
            fallback: Fallback::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Fallback {
    pub cpu_cores: u32,
    pub num_boards: u32,
    pub total_memory_gb: f64,
}

impl Default for Fallback {
    fn default() -> Self {
        let info = SystemInfo::default();
        Self {
            cpu_cores: info.cpu_cores,
            num_boards: info.num_boards,
            total_memory_gb: info.total_memory_gb,
        }
    }
}

impl From<&Fallback> for SystemInfo {
    fn from(f: &Fallback) -> Self {
        Self {
            cpu_cores: f.cpu_cores,
            num_boards: f.num_boards,
            total_memory_gb: f.total_memory_gb,
        }
    }
}

impl Config {
    /// Parsed and validated backend URL.
    pub fn backend_url(&self) -> Result<Url, ConfigError> {
        let url: Url = self
            .backend_url
            .parse()
            .map_err(|e| ConfigError::Validation {
                field: "backend_url".into(),
                reason: format!("invalid URL '{}': {e}", self.backend_url),
            })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Validation {
                field: "backend_url".into(),
                reason: format!("expected http or https, got '{other}'"),
            }),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn health_check_backoff(&self) -> Duration {
        Duration::from_millis(self.health_check_backoff_ms)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "boardwall", "boardwall").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("boardwall");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file is not an error: defaults
/// and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate `cfg` and build the runtime configuration for the core.
pub fn to_dashboard_config(cfg: &Config) -> Result<DashboardConfig, ConfigError> {
    cfg.backend_url()?;

    let millis = |field: &str, value: u64| {
        if value == 0 {
            Err(ConfigError::Validation {
                field: field.into(),
                reason: "must be greater than zero".into(),
            })
        } else {
            Ok(Duration::from_millis(value))
        }
    };

    if cfg.request_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "request_timeout_secs".into(),
            reason: "must be greater than zero".into(),
        });
    }
    if !cfg.layout_padding.is_finite() || cfg.layout_padding < 0.0 {
        return Err(ConfigError::Validation {
            field: "layout_padding".into(),
            reason: format!("must be a non-negative number, got {}", cfg.layout_padding),
        });
    }
    if cfg.fallback.num_boards == 0 {
        return Err(ConfigError::Validation {
            field: "fallback.num_boards".into(),
            reason: "must be at least 1".into(),
        });
    }

    Ok(DashboardConfig {
        poll_interval: millis("poll_interval_ms", cfg.poll_interval_ms)?,
        // A zero grace period is allowed: restart as soon as a game ends.
        watchdog_grace: Duration::from_millis(cfg.watchdog_grace_ms),
        resize_debounce: millis("resize_debounce_ms", cfg.resize_debounce_ms)?,
        telemetry_interval: millis("telemetry_interval_ms", cfg.telemetry_interval_ms)?,
        layout_padding: cfg.layout_padding,
        fallback_system_info: SystemInfo::from(&cfg.fallback),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_translate_cleanly() {
        let dash = to_dashboard_config(&Config::default()).unwrap();
        assert_eq!(dash.poll_interval, Duration::from_millis(250));
        assert_eq!(dash.watchdog_grace, Duration::from_secs(5));
        assert_eq!(dash.resize_debounce, Duration::from_millis(250));
        assert_eq!(dash.telemetry_interval, Duration::from_secs(1));
        assert_eq!(dash.fallback_system_info, SystemInfo::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
backend_url = "http://10.0.0.5:8080/"
poll_interval_ms = 100
watchdog_grace_ms = 3000

[fallback]
num_boards = 9
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.backend_url, "http://10.0.0.5:8080/");
        assert_eq!(cfg.poll_interval_ms, 100);
        assert_eq!(cfg.resize_debounce_ms, 250);
        assert_eq!(cfg.fallback.num_boards, 9);
        assert_eq!(cfg.fallback.cpu_cores, 4);

        let dash = to_dashboard_config(&cfg).unwrap();
        assert_eq!(dash.watchdog_grace, Duration::from_secs(3));
        assert_eq!(dash.fallback_system_info.num_boards, 9);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.poll_interval_ms, Config::default().poll_interval_ms);
    }

    #[test]
    fn telemetry_and_padding_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "telemetry_interval_ms = 2000\nlayout_padding = 4.0\n").unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.telemetry_interval_ms, 2000);
        assert!((loaded.layout_padding - 4.0).abs() < f64::EPSILON);

        let dash = to_dashboard_config(&loaded).unwrap();
        assert_eq!(dash.telemetry_interval, Duration::from_secs(2));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        let err = to_dashboard_config(&cfg).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "poll_interval_ms")
        );
    }

    #[test]
    fn bad_url_is_rejected() {
        for url in ["not a url", "ftp://example.com"] {
            let cfg = Config {
                backend_url: url.into(),
                ..Config::default()
            };
            assert!(matches!(
                to_dashboard_config(&cfg),
                Err(ConfigError::Validation { .. })
            ));
        }
    }

    #[test]
    fn malformed_toml_is_a_figment_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = \"fast\"").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Figment(_))
        ));
    }
}
