use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use recap_engine::{ClientSettings, EngineError, ReconnectPolicy, DEFAULT_SERVER_URL};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "recap.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Contents of `recap.ron`. Every field may be left out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecapConfig {
    pub server_url: String,
    pub connect_timeout_secs: u64,
    /// `0` disables the timeout.
    pub process_timeout_secs: u64,
    pub reconnect: ReconnectConfig,
    pub log_file: PathBuf,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            connect_timeout_secs: 10,
            process_timeout_secs: 60 * 60,
            reconnect: ReconnectConfig::default(),
            log_file: PathBuf::from("./recap.log"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        let policy = ReconnectPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl From<ReconnectConfig> for ReconnectPolicy {
    fn from(config: ReconnectConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RecapConfig {
    pub fn client_settings(&self) -> Result<ClientSettings, EngineError> {
        let mut settings = ClientSettings::new(&self.server_url)?;
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.process_timeout =
            (self.process_timeout_secs > 0).then(|| Duration::from_secs(self.process_timeout_secs));
        settings.reconnect = self.reconnect.into();
        Ok(settings)
    }
}

/// Config plus the file it came from; `source` is `None` when defaults were
/// used because the default file does not exist.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: RecapConfig,
    pub source: Option<PathBuf>,
}

/// Loads `explicit`, or `recap.ron` in `dir` when no path was given.
///
/// Only a missing default file falls back to defaults. A missing explicit
/// file and any file that does not parse are errors.
pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<LoadedConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => dir.join(DEFAULT_CONFIG_FILE),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            return Ok(LoadedConfig {
                config: RecapConfig::default(),
                source: None,
            });
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    match ron::from_str(&content) {
        Ok(config) => Ok(LoadedConfig {
            config,
            source: Some(path),
        }),
        Err(source) => Err(ConfigError::Parse { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_default_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = load(None, dir.path()).expect("defaults");
        assert_eq!(loaded.config, RecapConfig::default());
        assert!(loaded.source.is_none());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("elsewhere.ron");
        let err = load(Some(&path), dir.path()).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"(server_url: "http://recap.lan:8080", reconnect: (max_attempts: 2))"#,
        )
        .expect("write config");

        let loaded = load(None, dir.path()).expect("parsed");
        assert_eq!(loaded.config.server_url, "http://recap.lan:8080");
        assert_eq!(loaded.config.reconnect.max_attempts, 2);
        assert_eq!(loaded.config.reconnect.base_delay_ms, 1000);
        assert_eq!(loaded.config.process_timeout_secs, 3600);
        assert_eq!(
            loaded.source.as_deref(),
            Some(dir.path().join(DEFAULT_CONFIG_FILE).as_path())
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.ron");
        fs::write(&path, "(server_url: ").expect("write config");
        let err = load(Some(&path), dir.path()).expect_err("malformed");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn client_settings_follow_config() {
        let config = RecapConfig {
            process_timeout_secs: 0,
            reconnect: ReconnectConfig {
                max_attempts: 1,
                base_delay_ms: 250,
                max_delay_ms: 500,
            },
            ..RecapConfig::default()
        };
        let settings = config.client_settings().expect("settings");
        assert_eq!(settings.server_url.as_str(), "http://127.0.0.1:5001/");
        assert_eq!(settings.process_timeout, None);
        assert_eq!(settings.reconnect.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let config = RecapConfig {
            server_url: "not a url".to_string(),
            ..RecapConfig::default()
        };
        assert!(config.client_settings().is_err());
    }
}
