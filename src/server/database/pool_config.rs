use std::env;

const DEFAULT_POOL_SIZE: usize = 10;

/// Settings for one connection pool.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PoolConfig {
    /// pool name, used in log lines
    pub name: String,
    /// connection pool size
    pub size: usize,
    /// connection string
    pub conn_str: String,
}

impl PoolConfig {
    pub fn new(name: impl Into<String>, size: usize, conn_str: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: size.max(1),
            conn_str: conn_str.into(),
        }
    }

    /// Read/write pool configs from `DB_READ_POOL_CONN_STR`, `DB_WRITE_POOL_CONN_STR`
    /// and `DB_POOL_SIZE`; `None` unless both connection strings are set.
    pub fn from_env() -> Option<(PoolConfig, PoolConfig)> {
        let read = env::var("DB_READ_POOL_CONN_STR").ok().filter(|s| !s.is_empty())?;
        let write = env::var("DB_WRITE_POOL_CONN_STR").ok().filter(|s| !s.is_empty())?;
        let size = env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POOL_SIZE);
        Some((
            PoolConfig::new("read", size, read),
            PoolConfig::new("write", size, write),
        ))
    }
}
