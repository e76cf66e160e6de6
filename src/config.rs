// src/config.rs

use crate::constants::{DEFAULT_API_URL, DEFAULT_PROBE_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::password::PasswordStorage;
use crate::sync::SyncConfig;
use crate::InitError;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Runtime settings, read from `DAYTRACK_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub sync: SyncConfig,
    pub password_storage: PasswordStorage,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InitError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source. Unset variables take defaults;
    /// set but unparsable ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = match var("DAYTRACK_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let api_url = parse_api_url(&var("DAYTRACK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()))?;

        let request_timeout = Duration::from_secs(
            parse_number("DAYTRACK_REQUEST_TIMEOUT_SECS", var("DAYTRACK_REQUEST_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );
        let probe_secs = parse_number("DAYTRACK_PROBE_INTERVAL_SECS", var("DAYTRACK_PROBE_INTERVAL_SECS"))?
            .unwrap_or(DEFAULT_PROBE_INTERVAL_SECS);
        if probe_secs == 0 {
            return Err(InitError::InvalidConfig {
                var: "DAYTRACK_PROBE_INTERVAL_SECS",
                reason: "must be at least 1".into(),
            });
        }
        let probe_interval = Duration::from_secs(probe_secs);
        let max_attempts = parse_number("DAYTRACK_MAX_SYNC_ATTEMPTS", var("DAYTRACK_MAX_SYNC_ATTEMPTS"))?
            .filter(|n| *n > 0);

        let password_storage = match var("DAYTRACK_PASSWORD_STORAGE") {
            Some(value) => PasswordStorage::parse(&value).ok_or_else(|| InitError::InvalidConfig {
                var: "DAYTRACK_PASSWORD_STORAGE",
                reason: format!("expected 'hashed' or 'cleartext', got '{value}'"),
            })?,
            None => PasswordStorage::default(),
        };

        Ok(Self {
            db_path,
            sync: SyncConfig {
                api_url,
                request_timeout,
                probe_interval,
                max_attempts,
            },
            password_storage,
        })
    }
}

/// Default database location in the platform data directory.
pub fn default_db_path() -> Result<PathBuf, InitError> {
    let proj_dirs = ProjectDirs::from("com", "daytrack", "Daytrack").ok_or(InitError::NoProjectDirs)?;
    Ok(proj_dirs.data_dir().join("daytrack.db"))
}

/// Parse the API base URL. A trailing slash is added so endpoint paths join
/// below it rather than replacing its last segment.
fn parse_api_url(raw: &str) -> Result<Url, InitError> {
    let normalized = if raw.ends_with('/') { raw.to_string() } else { format!("{raw}/") };
    let url = Url::parse(&normalized).map_err(|e| InitError::InvalidConfig {
        var: "DAYTRACK_API_URL",
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(InitError::InvalidConfig {
            var: "DAYTRACK_API_URL",
            reason: format!("'{raw}' is not an http(s) base URL"),
        });
    }
    Ok(url)
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: Option<String>) -> Result<Option<T>, InitError>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>().map_err(|e| InitError::InvalidConfig {
                var,
                reason: format!("'{v}': {e}"),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, InitError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DAYTRACK_DB_PATH", "/tmp/daytrack.db")]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/daytrack.db"));
        assert_eq!(config.sync.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.sync.request_timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert_eq!(config.sync.max_attempts, None);
        assert_eq!(config.password_storage, PasswordStorage::Hashed);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DAYTRACK_DB_PATH", "/tmp/x.db"),
            ("DAYTRACK_API_URL", "https://api.example.com/v1"),
            ("DAYTRACK_REQUEST_TIMEOUT_SECS", "30"),
            ("DAYTRACK_MAX_SYNC_ATTEMPTS", "5"),
            ("DAYTRACK_PASSWORD_STORAGE", "cleartext"),
        ])
        .unwrap();
        assert_eq!(config.sync.api_url.as_str(), "https://api.example.com/v1/");
        assert_eq!(config.sync.request_timeout, Duration::from_secs(30));
        assert_eq!(config.sync.max_attempts, Some(5));
        assert_eq!(config.password_storage, PasswordStorage::Cleartext);
    }

    #[test]
    fn test_zero_max_attempts_means_unbounded() {
        let config = config(&[("DAYTRACK_DB_PATH", "/tmp/x.db"), ("DAYTRACK_MAX_SYNC_ATTEMPTS", "0")]).unwrap();
        assert_eq!(config.sync.max_attempts, None);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = config(&[("DAYTRACK_DB_PATH", "/tmp/x.db"), ("DAYTRACK_PROBE_INTERVAL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, InitError::InvalidConfig { var: "DAYTRACK_PROBE_INTERVAL_SECS", .. }));

        let err = config(&[("DAYTRACK_DB_PATH", "/tmp/x.db"), ("DAYTRACK_PROBE_INTERVAL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, InitError::InvalidConfig { var: "DAYTRACK_PROBE_INTERVAL_SECS", .. }));

        let err = config(&[("DAYTRACK_DB_PATH", "/tmp/x.db"), ("DAYTRACK_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, InitError::InvalidConfig { var: "DAYTRACK_API_URL", .. }));

        let err = config(&[("DAYTRACK_DB_PATH", "/tmp/x.db"), ("DAYTRACK_PASSWORD_STORAGE", "rot13")]).unwrap_err();
        assert!(matches!(err, InitError::InvalidConfig { var: "DAYTRACK_PASSWORD_STORAGE", .. }));
    }
}
