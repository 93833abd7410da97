use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::auth::session::MAX_SESSION_TTL_SECS;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::with_security_headers;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/wolfevents";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60 * 24;
const DEFAULT_REMEMBER_ME_TTL_SECS: i64 = 60 * 60 * 24 * 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub port: u16,
    pub session_ttl_secs: i64,
    pub remember_me_ttl_secs: i64,
    /// Lowercased; registering with one of these grants the admin flag.
    pub admin_emails: Vec<String>,
    pub cors_allowed_origins: String,
    /// `RUST_ENV=production`: HSTS and `Secure` cookies.
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            storage_backend: StorageBackend::Postgres,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            port: DEFAULT_PORT,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            remember_me_ttl_secs: DEFAULT_REMEMBER_ME_TTL_SECS,
            admin_emails: Vec::new(),
            cors_allowed_origins: cors::DEFAULT_ALLOWED_ORIGINS.to_string(),
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let production = env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            storage_backend: try_load("STORAGE_BACKEND", defaults.storage_backend),
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            acquire_timeout_secs: try_load(
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            ),
            port: try_load("PORT", defaults.port),
            session_ttl_secs: load_ttl("SESSION_TTL_SECS", defaults.session_ttl_secs),
            remember_me_ttl_secs: load_ttl("REMEMBER_ME_TTL_SECS", defaults.remember_me_ttl_secs),
            admin_emails: env::var("ADMIN_EMAILS")
                .map(|raw| parse_admin_emails(&raw))
                .unwrap_or_default(),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            production,
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn load_ttl(key: &str, default: i64) -> i64 {
    checked_ttl(key, try_load(key, default), default)
}

/// Session lifetimes must be positive and at most `MAX_SESSION_TTL_SECS`.
fn checked_ttl(key: &str, value: i64, default: i64) -> i64 {
    if (1..=MAX_SESSION_TTL_SECS).contains(&value) {
        value
    } else {
        warn!(
            "{key} must be between 1 and {MAX_SESSION_TTL_SECS} seconds, got {value}, using default: {default}"
        );
        default
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres => f.write_str("postgres"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!(" Postgres ".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_parse_admin_emails() {
        let emails = parse_admin_emails(" Admin@NCSU.edu, ,ops@ncsu.edu ");
        assert_eq!(emails, vec!["admin@ncsu.edu", "ops@ncsu.edu"]);
    }

    #[test]
    fn test_is_admin_email_ignores_case() {
        let config = Config {
            admin_emails: vec!["admin@ncsu.edu".to_string()],
            ..Config::default()
        };
        assert!(config.is_admin_email("ADMIN@ncsu.edu "));
        assert!(!config.is_admin_email("someone@ncsu.edu"));
    }

    #[test]
    fn test_checked_ttl_falls_back_when_out_of_range() {
        assert_eq!(checked_ttl("SESSION_TTL_SECS", 3600, 86400), 3600);
        assert_eq!(
            checked_ttl("SESSION_TTL_SECS", MAX_SESSION_TTL_SECS, 86400),
            MAX_SESSION_TTL_SECS
        );
        assert_eq!(checked_ttl("SESSION_TTL_SECS", 0, 86400), 86400);
        assert_eq!(checked_ttl("SESSION_TTL_SECS", -60, 86400), 86400);
        assert_eq!(checked_ttl("REMEMBER_ME_TTL_SECS", i64::MAX, 2592000), 2592000);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert!(config.session_ttl_secs < config.remember_me_ttl_secs);
        assert!(config.remember_me_ttl_secs <= MAX_SESSION_TTL_SECS);
        assert!(!config.production);
    }
}
