use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Default Google Calendar to operate on
pub const DEFAULT_CALENDAR_ID: &str =
    "4906d31abdbbad405d77dbd7f8ec5d26eb6aa8961b169afb43462baad4609a30@group.calendar.google.com";

/// Default location of the service account key
pub const DEFAULT_CREDENTIALS_FILE: &str = "config/credentials.json";

/// Base URL of the Google Calendar v3 REST API
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Timezone used when a request does not name one
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Optional settings file layered between defaults and the environment
pub const DEFAULT_CONFIG_FILE: &str = "config/settings.toml";

/// Which calendar implementation serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarBackend {
    /// Google Calendar REST API
    Google,
    /// Process-local calendar, lost on restart
    Memory,
}

impl FromStr for CalendarBackend {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(CalendarBackend::Google),
            "memory" => Ok(CalendarBackend::Memory),
            other => Err(config_error(&format!("Unknown calendar backend: {}", other))),
        }
    }
}

/// Main configuration structure for the service
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Google service account JSON key
    pub credentials_file: PathBuf,
    /// Google Calendar ID to read and write
    pub calendar_id: String,
    /// Calendar REST API base URL
    pub calendar_api_base: String,
    /// IANA timezone applied when a request omits one
    pub default_timezone: String,
    /// Calendar implementation
    pub backend: CalendarBackend,
    /// Address to bind the HTTP server to
    pub host: String,
    /// Port to bind the HTTP server to
    pub port: u16,
    /// Timeout for outgoing provider requests
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            calendar_api_base: DEFAULT_CALENDAR_API_BASE.to_string(),
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            backend: CalendarBackend::Google,
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 30,
        }
    }
}

/// Subset of the configuration that may be set from the settings file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    credentials_file: Option<PathBuf>,
    calendar_id: Option<String>,
    calendar_api_base: Option<String>,
    default_timezone: Option<String>,
    backend: Option<CalendarBackend>,
    host: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from defaults, the settings file and the environment
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Config::default();

        let config_file =
            env::var("CONFIG_FILE").unwrap_or_else(|_| String::from(DEFAULT_CONFIG_FILE));
        if let Ok(content) = fs::read_to_string(&config_file) {
            config.merge_file(&content)?;
        }

        config.merge_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Overlay values from a TOML settings document
    pub fn merge_file(&mut self, content: &str) -> AppResult<()> {
        let file: FileConfig = toml::from_str(content)?;

        if let Some(v) = file.credentials_file {
            self.credentials_file = v;
        }
        if let Some(v) = file.calendar_id {
            self.calendar_id = v;
        }
        if let Some(v) = file.calendar_api_base {
            self.calendar_api_base = v;
        }
        if let Some(v) = file.default_timezone {
            self.default_timezone = v;
        }
        if let Some(v) = file.backend {
            self.backend = v;
        }
        if let Some(v) = file.host {
            self.host = v;
        }
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }

        Ok(())
    }

    /// Overlay values from environment variables
    fn merge_env(&mut self) -> AppResult<()> {
        if let Ok(v) = env::var("GOOGLE_CREDENTIALS_FILE") {
            self.credentials_file = PathBuf::from(v);
        }
        if let Ok(v) = env::var("GOOGLE_CALENDAR_ID") {
            self.calendar_id = v;
        }
        if let Ok(v) = env::var("GOOGLE_CALENDAR_API_BASE") {
            self.calendar_api_base = v;
        }
        if let Ok(v) = env::var("DEFAULT_TIMEZONE") {
            self.default_timezone = v;
        }
        if let Ok(v) = env::var("CALENDAR_BACKEND") {
            self.backend = v.parse()?;
        }
        if let Ok(v) = env::var("HOST") {
            self.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.port = v.parse::<u16>().map_err(|_| env_error("PORT"))?;
        }
        if let Ok(v) = env::var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = v
                .parse::<u64>()
                .map_err(|_| env_error("REQUEST_TIMEOUT_SECS"))?;
        }

        Ok(())
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> AppResult<()> {
        self.timezone()?;

        if self.calendar_id.trim().is_empty() {
            return Err(config_error("Calendar ID must not be empty"));
        }

        Ok(())
    }

    /// The parsed default timezone
    pub fn timezone(&self) -> AppResult<Tz> {
        self.default_timezone.parse::<Tz>().map_err(|_| {
            config_error(&format!("Unknown default timezone: {}", self.default_timezone))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Kolkata);
        assert_eq!(config.backend, CalendarBackend::Google);
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let mut config = Config::default();
        config
            .merge_file(
                r#"
                calendar_id = "team@group.calendar.google.com"
                backend = "memory"
                port = 9100
                "#,
            )
            .unwrap();

        assert_eq!(config.calendar_id, "team@group.calendar.google.com");
        assert_eq!(config.backend, CalendarBackend::Memory);
        assert_eq!(config.port, 9100);
        assert_eq!(config.default_timezone, DEFAULT_TIMEZONE);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let config = Config {
            default_timezone: "Mars/Olympus_Mons".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(crate::error::Error::Config(_))));
    }

    #[test]
    fn backend_is_read_from_lowercase_settings() {
        let mut config = Config::default();
        assert!(config.merge_file(r#"backend = "outlook""#).is_err());
        config.merge_file(r#"backend = "google""#).unwrap();
        assert_eq!(config.backend, CalendarBackend::Google);
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<CalendarBackend>().unwrap(), CalendarBackend::Memory);
        assert!("outlook".parse::<CalendarBackend>().is_err());
    }
}
