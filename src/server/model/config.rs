use std::env;
use std::net::{AddrParseError, SocketAddrV4};
use std::time::Duration;

use log::warn;

use crate::server::database::memory::Latency;
use crate::server::database::pool_config::PoolConfig;
use crate::server::model::setting::Theme;

const DEFAULT_DB_TIMEOUT_SECONDS: u64 = 5;
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
const DEFAULT_MOCK_ADMIN_EMAIL: &str = "admin@luxestay.com";
const DEFAULT_HOST_ADDR: &str = "127.0.0.1:8080";

/// Where documents live, chosen once at startup.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BackendConfig {
    Memory { latency: Latency },
    Postgres { read: PoolConfig, write: PoolConfig },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MockAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub(crate) struct AuthConfig {
    pub session_ttl: chrono::Duration,
    /// shared secret a federated provider signs its assertions with
    pub federated_secret: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            federated_secret: None,
        }
    }
}

/// Server configs
#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub addr: SocketAddrV4,
    pub backend: BackendConfig,
    pub db_timeout: Duration,
    pub auth: AuthConfig,
    pub default_theme: Option<Theme>,
    pub mock_admin: Option<MockAdmin>,
}

impl ServerConfig {
    /// In-memory backend with default settings.
    pub fn new(addr: SocketAddrV4) -> Self {
        Self {
            addr,
            backend: BackendConfig::Memory {
                latency: Latency::default(),
            },
            db_timeout: Duration::from_secs(DEFAULT_DB_TIMEOUT_SECONDS),
            auth: AuthConfig::default(),
            default_theme: None,
            mock_admin: None,
        }
    }

    /// Everything but the bind address comes from the environment.
    pub fn from_env(addr: SocketAddrV4) -> Self {
        let mut config = Self::new(addr);

        config.backend = match PoolConfig::from_env() {
            Some((read, write)) => BackendConfig::Postgres { read, write },
            None => BackendConfig::Memory {
                latency: env_parsed("MOCK_LATENCY_MS").unwrap_or_default(),
            },
        };
        if let Some(secs) = env_parsed::<u64>("DB_TIMEOUT_SECONDS") {
            config.db_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(hours) = env_parsed::<i64>("SESSION_TTL_HOURS") {
            config.auth.session_ttl = chrono::Duration::hours(hours.max(1));
        }
        config.auth.federated_secret = env::var("FEDERATED_AUTH_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        config.default_theme = env_parsed("DEFAULT_THEME");

        if matches!(config.backend, BackendConfig::Memory { .. }) {
            config.mock_admin = env::var("MOCK_ADMIN_PASSWORD")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|password| MockAdmin {
                    email: env::var("MOCK_ADMIN_EMAIL")
                        .unwrap_or_else(|_| DEFAULT_MOCK_ADMIN_EMAIL.to_string()),
                    password,
                });
        }
        config
    }
}

/// `HOST`, or the loopback default when unset.
pub(crate) fn bind_addr_from_env() -> Result<SocketAddrV4, AddrParseError> {
    parse_bind_addr(env::var("HOST").ok().as_deref())
}

fn parse_bind_addr(host: Option<&str>) -> Result<SocketAddrV4, AddrParseError> {
    host.filter(|h| !h.trim().is_empty())
        .unwrap_or(DEFAULT_HOST_ADDR)
        .trim()
        .parse()
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring unparsable {}={}", key, raw);
            None
        }
    }
}
