//! Application configuration loaded from environment variables.

use chrono::{FixedOffset, Offset, Utc};
use secrecy::SecretString;

/// Password given to the seeded accounts when `SEED_PASSWORD` is unset.
pub const DEFAULT_SEED_PASSWORD: &str = "1234";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `json` for structured logs, anything else for text
/// - `DATABASE_URL`: PostgreSQL URL; in-memory stores when unset
/// - `WEBHOOK_URL`: chat webhook for order notifications; logged when unset
/// - `DISPLAY_UTC_OFFSET`: offset used to render times, e.g. `+08:00`
/// - `SESSION_SECURE`: `true` to mark the session cookie `Secure`
/// - `SEED_PASSWORD`: password for accounts created on first start
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<SecretString>,
    pub webhook_url: Option<SecretString>,
    pub display_offset: FixedOffset,
    pub session_secure: bool,
    pub seed_password: SecretString,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: std::env::var("LOG_FORMAT")
                .map(|v| LogFormat::from_env_value(&v))
                .unwrap_or(defaults.log_format),
            database_url: non_empty_var("DATABASE_URL").map(SecretString::from),
            webhook_url: non_empty_var("WEBHOOK_URL").map(SecretString::from),
            display_offset: std::env::var("DISPLAY_UTC_OFFSET")
                .ok()
                .and_then(|v| parse_offset(&v))
                .unwrap_or(defaults.display_offset),
            session_secure: std::env::var("SESSION_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_secure),
            seed_password: non_empty_var("SEED_PASSWORD")
                .map(SecretString::from)
                .unwrap_or(defaults.seed_password),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true when the seeded accounts use the built-in password.
    pub fn uses_default_seed_password(&self) -> bool {
        use secrecy::ExposeSecret;
        self.seed_password.expose_secret() == DEFAULT_SEED_PASSWORD
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            webhook_url: None,
            display_offset: Utc.fix(),
            session_secure: false,
            seed_password: SecretString::from(DEFAULT_SEED_PASSWORD.to_string()),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses `+HH:MM`, `-HH:MM` or `Z`.
fn parse_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") {
        return Some(Utc.fix());
    }

    let (sign, rest) = match value.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours = parse_digits(hours)?;
    let minutes = parse_digits(minutes)?;
    if minutes >= 60 {
        return None;
    }

    let seconds = hours.checked_mul(3600)?.checked_add(minutes * 60)?;
    FixedOffset::east_opt(sign * i32::try_from(seconds).ok()?)
}

/// Parses a non-empty run of ASCII digits. Signs are rejected.
fn parse_digits(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
