//! Service wiring: picks the persistence collaborator handed to the routes.

use std::sync::Arc;

use anyhow::{Context, Result};

use roster_core::NewUser;
use roster_infra::{InMemoryUserStore, PostgresUserStore, UserStore};

use crate::config::{ApiConfig, StoreConfig};

/// Dependencies injected into every handler.
#[derive(Clone)]
pub struct AppServices {
    users: Arc<dyn UserStore>,
}

impl AppServices {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()))
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices> {
    match &config.store {
        StoreConfig::InMemory { seed_demo_data } => {
            let store = Arc::new(InMemoryUserStore::new());
            if *seed_demo_data {
                seed_demo_data_into(&store).await?;
            }
            tracing::info!(seeded = *seed_demo_data, "using in-memory user store");
            Ok(AppServices::new(store))
        }
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresUserStore::connect(database_url, *max_connections)
                .await
                .context("failed to connect to Postgres")?;
            store
                .ensure_schema()
                .await
                .context("failed to prepare the users schema")?;
            tracing::info!(max_connections, "using Postgres user store");
            Ok(AppServices::new(Arc::new(store)))
        }
    }
}

/// Preload a few users with posts so a fresh dev server has something to show.
pub async fn seed_demo_data_into(store: &InMemoryUserStore) -> Result<()> {
    let fixtures: [(&str, &[&str]); 3] = [
        ("Frodo Baggins", &["I wish the ring had never come to me.", "I will take it."]),
        ("Samwise Gamgee", &["Po-tay-toes. Boil 'em, mash 'em, stick 'em in a stew."]),
        ("Gandalf", &[]),
    ];

    for (name, posts) in fixtures {
        let user = store
            .insert(NewUser::new(name).uppercased())
            .await
            .context("failed to seed user")?;
        for text in posts {
            store
                .add_post(user.id, *text)
                .context("failed to seed post")?;
        }
    }
    Ok(())
}
