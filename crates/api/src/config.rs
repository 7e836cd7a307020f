//! Runtime configuration, read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `BIND_ADDR` | `0.0.0.0:8080` | listen address |
//! | `USE_PERSISTENT_STORES` | `false` | use Postgres instead of the in-memory store |
//! | `DATABASE_URL` | — | required when persistent stores are enabled |
//! | `DATABASE_MAX_CONNECTIONS` | `5` | Postgres pool size |
//! | `SEED_DEMO_DATA` | `false` | preload the in-memory store with sample users/posts |

use std::net::SocketAddr;

use anyhow::{bail, Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which persistence collaborator backs the users router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory { seed_demo_data: bool },
    Postgres { database_url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080))),
            store: StoreConfig::InMemory { seed_demo_data: false },
        }
    }
}

impl ApiConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8080")?;

        let use_persistent = parse_bool(&lookup, "USE_PERSISTENT_STORES")?;
        let seed_demo_data = parse_bool(&lookup, "SEED_DEMO_DATA")?;

        let store = if use_persistent {
            let Some(database_url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) else {
                bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
            };
            if seed_demo_data {
                tracing::warn!("SEED_DEMO_DATA is ignored with persistent stores");
            }
            let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(v) => v
                    .trim()
                    .parse::<u32>()
                    .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            if max_connections == 0 {
                bail!("DATABASE_MAX_CONNECTIONS must be a positive integer");
            }
            StoreConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StoreConfig::InMemory { seed_demo_data }
        };

        Ok(Self { bind_addr, store })
    }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<bool> {
    match lookup(key) {
        None => Ok(false),
        Some(v) => v
            .trim()
            .to_ascii_lowercase()
            .parse::<bool>()
            .with_context(|| format!("{key} must be true or false, got {v:?}")),
    }
}
