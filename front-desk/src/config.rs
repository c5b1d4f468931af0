//! Front-desk configuration

use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use gym_client::ClientConfig;
use shared::AppError;
use thiserror::Error;

use crate::attendance::WeekStart;
use crate::clock::{self, CivilCalendar};
use crate::session::{DisplayMode, SessionConfig};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::Invalid { var, .. } => {
                AppError::config(err.to_string()).with_detail("var", *var)
            }
        }
    }
}

/// Front-desk configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | API_BASE_URL | http://localhost:3000/api/alumnos | members API base URL |
/// | REQUEST_TIMEOUT_SECS | 30 | HTTP timeout |
/// | TIMEZONE | America/Argentina/Buenos_Aires | civil zone for "today" |
/// | IDLE_TIMEOUT_SECS | 300 | time a record stays on screen |
/// | REFOCUS_INTERVAL_MS | 2000 | scanner input refocus period |
/// | DISPLAY_MODE | kiosk | kiosk or staff |
/// | CHECK_IN_ON_IDENTIFY | true | record attendance on identification |
/// | WEEK_START | sunday | first column of the month grid |
/// | LOG_LEVEL | info | tracing level |
/// | LOG_DIR | (unset) | daily rolling log directory |
/// | OFFLINE | false | use the in-memory store instead of the API |
/// | SEED_FILE | (unset) | JSON member list loaded by the offline store |
///
/// # Example
///
/// ```ignore
/// OFFLINE=true SEED_FILE=members.json DISPLAY_MODE=staff cargo run -p front-desk
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub timezone: Tz,
    pub idle_timeout_secs: u64,
    pub refocus_interval_ms: u64,
    pub display_mode: DisplayMode,
    pub check_in_on_identify: bool,
    pub week_start: WeekStart,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub offline: bool,
    pub seed_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: ClientConfig::default().base_url,
            request_timeout_secs: 30,
            timezone: clock::DEFAULT_TIMEZONE,
            idle_timeout_secs: 300,
            refocus_interval_ms: 2000,
            display_mode: DisplayMode::Kiosk,
            check_in_on_identify: true,
            week_start: WeekStart::Sunday,
            log_level: "info".into(),
            log_dir: None,
            offline: false,
            seed_file: None,
        }
    }
}

impl Config {
    /// Load from environment variables, defaults for anything unset
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            api_base_url: get("API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout_secs: parse_or(
                &get,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            timezone: get("TIMEZONE")
                .map(|tz| clock::parse_timezone(&tz))
                .unwrap_or(defaults.timezone),
            idle_timeout_secs: nonzero_or(
                &get,
                "IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            )?,
            refocus_interval_ms: nonzero_or(
                &get,
                "REFOCUS_INTERVAL_MS",
                defaults.refocus_interval_ms,
            )?,
            display_mode: parse_or(&get, "DISPLAY_MODE", defaults.display_mode)?,
            check_in_on_identify: parse_or(
                &get,
                "CHECK_IN_ON_IDENTIFY",
                defaults.check_in_on_identify,
            )?,
            week_start: parse_or(&get, "WEEK_START", defaults.week_start)?,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: get("LOG_DIR"),
            offline: parse_or(&get, "OFFLINE", defaults.offline)?,
            seed_file: get("SEED_FILE"),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_base_url.clone()).with_timeout(self.request_timeout_secs)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            refocus_interval: Duration::from_millis(self.refocus_interval_ms),
            display_mode: self.display_mode,
            check_in_on_identify: self.check_in_on_identify,
        }
    }

    /// Wall-clock calendar in the configured zone
    pub fn calendar(&self) -> CivilCalendar {
        CivilCalendar::system(self.timezone)
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

/// Durations that drive timers must be positive
fn nonzero_or<G>(get: &G, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match parse_or(get, var, default)? {
        0 => Err(ConfigError::Invalid {
            var,
            value: "0".to_string(),
        }),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:3000/api/alumnos");
        assert_eq!(config.timezone, clock::DEFAULT_TIMEZONE);
        assert_eq!(config.display_mode, DisplayMode::Kiosk);
        assert!(config.check_in_on_identify);
        assert!(!config.offline);

        let session = config.session_config();
        assert_eq!(session.idle_timeout, Duration::from_secs(300));
        assert_eq!(session.refocus_interval, Duration::from_millis(2000));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("API_BASE_URL", "https://gym.example.com/api/alumnos"),
            ("TIMEZONE", "America/Montevideo"),
            ("IDLE_TIMEOUT_SECS", "30"),
            ("DISPLAY_MODE", "Staff"),
            ("CHECK_IN_ON_IDENTIFY", "false"),
            ("WEEK_START", "monday"),
            ("OFFLINE", "true"),
            ("LOG_DIR", ""),
        ]))
        .unwrap();

        assert_eq!(config.client_config().base_url, "https://gym.example.com/api/alumnos");
        assert_eq!(config.timezone, chrono_tz::America::Montevideo);
        assert_eq!(config.idle_timeout_secs, 30);
        assert_eq!(config.display_mode, DisplayMode::Staff);
        assert!(!config.check_in_on_identify);
        assert_eq!(config.week_start, WeekStart::Monday);
        assert!(config.offline);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn test_zero_durations_rejected() {
        for var in ["REFOCUS_INTERVAL_MS", "IDLE_TIMEOUT_SECS"] {
            let err = Config::from_lookup(lookup(&[(var, "0")])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    var,
                    value: "0".into(),
                }
            );
        }

        let config = Config::from_lookup(lookup(&[("REFOCUS_INTERVAL_MS", "250")])).unwrap();
        assert_eq!(config.session_config().refocus_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_timezone_falls_back() {
        let config = Config::from_lookup(lookup(&[("TIMEZONE", "Nowhere/Land")])).unwrap();
        assert_eq!(config.timezone, clock::DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let err = Config::from_lookup(lookup(&[("IDLE_TIMEOUT_SECS", "five")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "IDLE_TIMEOUT_SECS",
                value: "five".into(),
            }
        );

        let err: AppError = Config::from_lookup(lookup(&[("DISPLAY_MODE", "tv")]))
            .unwrap_err()
            .into();
        assert_eq!(err.code, shared::ErrorCode::ConfigError);
    }
}
