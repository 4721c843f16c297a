//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is honoured when the binary calls
//! [`load_dotenv`] before [`Config::from_env`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use log::warn;

use crate::utils::get_database_path;

/// Path of the SQLite key-value database.
pub const DB_PATH_VAR: &str = "HLAR_DB";
/// Base URL of the global notes service.
pub const REMOTE_URL_VAR: &str = "HLAR_REMOTE_URL";
/// Request timeout for the global notes service, in whole seconds.
pub const REMOTE_TIMEOUT_VAR: &str = "HLAR_REMOTE_TIMEOUT_SECS";

pub const DEFAULT_REMOTE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Resolved settings for a CLI session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub remote_url: String,
    pub remote_timeout: Duration,
}

impl Config {
    /// Reads every setting, falling back to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `HLAR_DB` is unset and the platform data
    /// directory cannot be determined.
    pub fn from_env() -> Result<Self> {
        let db_path = match std::env::var_os(DB_PATH_VAR) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => get_database_path()?,
        };

        Ok(Self {
            db_path,
            remote_url: remote_url_from_env(),
            remote_timeout: remote_timeout_from_env(),
        })
    }
}

/// Loads `.env` if present. A missing file is not an error.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        warn!("ignoring unreadable .env file: {e}");
    }
}

/// `HLAR_REMOTE_URL`, or the default service address.
pub fn remote_url_from_env() -> String {
    std::env::var(REMOTE_URL_VAR)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REMOTE_URL.to_string())
}

/// `HLAR_REMOTE_TIMEOUT_SECS`, or the default when unset or not a positive
/// integer.
pub fn remote_timeout_from_env() -> Duration {
    let secs = match std::env::var(REMOTE_TIMEOUT_VAR) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(
                    "{REMOTE_TIMEOUT_VAR}={raw:?} is not a positive number of seconds, using {DEFAULT_REMOTE_TIMEOUT_SECS}"
                );
                DEFAULT_REMOTE_TIMEOUT_SECS
            }
        },
        Err(_) => DEFAULT_REMOTE_TIMEOUT_SECS,
    };
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        // SAFETY: tests touching the environment run serially.
        unsafe {
            std::env::remove_var(DB_PATH_VAR);
            std::env::remove_var(REMOTE_URL_VAR);
            std::env::remove_var(REMOTE_TIMEOUT_VAR);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_when_unset() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.remote_url, DEFAULT_REMOTE_URL);
        assert_eq!(
            config.remote_timeout,
            Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS)
        );
        assert!(config.db_path.ends_with("hlar/notes.db"));
    }

    #[test]
    #[serial]
    fn environment_overrides_defaults() {
        clear_env();
        // SAFETY: tests touching the environment run serially.
        unsafe {
            std::env::set_var(DB_PATH_VAR, "/tmp/hlar-test.db");
            std::env::set_var(REMOTE_URL_VAR, "http://notes.example:8080");
            std::env::set_var(REMOTE_TIMEOUT_VAR, "5");
        }

        let config = Config::from_env().unwrap();
        clear_env();

        assert_eq!(config.db_path, PathBuf::from("/tmp/hlar-test.db"));
        assert_eq!(config.remote_url, "http://notes.example:8080");
        assert_eq!(config.remote_timeout, Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn invalid_timeout_falls_back_to_default() {
        clear_env();
        for raw in ["zero", "0", "-3", ""] {
            // SAFETY: tests touching the environment run serially.
            unsafe { std::env::set_var(REMOTE_TIMEOUT_VAR, raw) };
            assert_eq!(
                remote_timeout_from_env(),
                Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
                "value {raw:?} should fall back"
            );
        }
        clear_env();
    }

    #[test]
    #[serial]
    fn blank_remote_url_uses_default() {
        clear_env();
        // SAFETY: tests touching the environment run serially.
        unsafe { std::env::set_var(REMOTE_URL_VAR, "   ") };

        assert_eq!(remote_url_from_env(), DEFAULT_REMOTE_URL);
        clear_env();
    }
}
