//! Server configuration: defaults, then an optional TOML file, then
//! `DOCKCHECK_*` environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;

const ENV_PORT: &str = "DOCKCHECK_PORT";
const ENV_LOG: &str = "DOCKCHECK_LOG";
const ENV_JSON_LOGS: &str = "DOCKCHECK_JSON_LOGS";
const ENV_MAX_WRITE_RETRIES: &str = "DOCKCHECK_MAX_WRITE_RETRIES";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("error reading config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error parsing config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ServerConfig {
    pub(crate) port: u16,
    /// Filter directive used when `RUST_LOG` is unset.
    pub(crate) log_level: String,
    pub(crate) json_logs: bool,
    /// Re-reads after a write conflict before giving up.
    pub(crate) max_write_retries: u32,
    pub(crate) max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            log_level: "info".to_string(),
            json_logs: false,
            max_write_retries: 3,
            // Signatures may arrive as encoded images.
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with the TOML file at `path`, if any.
    pub(crate) fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay environment variables read through `lookup`.
    pub(crate) fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_PORT) {
            self.port = parse_env(ENV_PORT, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG) {
            self.log_level = value;
        }
        if let Some(value) = lookup(ENV_JSON_LOGS) {
            self.json_logs = parse_bool(ENV_JSON_LOGS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_WRITE_RETRIES) {
            self.max_write_retries = parse_env(ENV_MAX_WRITE_RETRIES, &value)?;
        }
        Ok(self)
    }

    /// File, then process environment.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_file(path)?.apply_env(|key| std::env::var(key).ok())
    }

    pub(crate) fn validate(self) -> Result<Self, ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Zero { field: "port" });
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Zero {
                field: "max_body_bytes",
            });
        }
        Ok(self)
    }
}

fn parse_env<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = ServerConfig::from_file(None)
            .unwrap()
            .apply_env(env(&[]))
            .unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_write_retries, 3);
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 9000\nlog_level = \"debug\"\nmax_write_retries = 5").unwrap();

        let from_file = ServerConfig::from_file(Some(file.path())).unwrap();
        assert_eq!(from_file.port, 9000);
        assert_eq!(from_file.log_level, "debug");
        assert!(!from_file.json_logs);

        let layered = from_file
            .apply_env(env(&[
                ("DOCKCHECK_PORT", "9100"),
                ("DOCKCHECK_JSON_LOGS", "true"),
            ]))
            .unwrap();
        assert_eq!(layered.port, 9100);
        assert!(layered.json_logs);
        assert_eq!(layered.max_write_retries, 5);
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let err = ServerConfig::default()
            .apply_env(env(&[("DOCKCHECK_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("DOCKCHECK_PORT"), "{err}");
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prot = 9000").unwrap();
        let err = ServerConfig::from_file(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ServerConfig::from_file(Some(Path::new("/nonexistent/dockcheck.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn zero_body_limit_is_invalid() {
        let config = ServerConfig {
            max_body_bytes: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_port_is_invalid() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero { field: "port" })
        ));
    }
}
