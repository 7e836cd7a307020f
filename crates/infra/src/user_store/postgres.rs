//! Postgres-backed user store.
//!
//! Queries are checked at runtime (no compile-time database access is needed).
//! Update and remove counts come straight from `rows_affected()`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use roster_core::{NewUser, Post, User, UserChanges, UserId};

use super::columns::UserPatch;
use super::r#trait::{StoreError, UserStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id   BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id      BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        text    TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS posts_user_id_idx ON posts (user_id)",
];

/// Postgres-backed user store.
///
/// `PostgresUserStore` is `Send + Sync`; connection management is left to the
/// SQLx pool.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `users` and `posts` tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for &statement in SCHEMA {
            sqlx::query(statement).execute(&*self.pool).await?;
        }
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id.get())
            .fetch_one(&*self.pool)
            .await?;
        Ok(row.try_get::<bool, _>(0)?)
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        name: row.try_get("name")?,
    })
}

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        user_id: UserId::new(row.try_get("user_id")?),
        text: row.try_get("text")?,
    })
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), err)]
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query("INSERT INTO users (name) VALUES ($1) RETURNING id, name")
            .bind(&user.name)
            .fetch_one(&*self.pool)
            .await?;
        Ok(user_from_row(&row)?)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM users ORDER BY id ASC")
            .fetch_all(&*self.pool)
            .await?;
        let users = rows.iter().map(user_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM users WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn user_posts(&self, id: UserId) -> Result<Option<Vec<Post>>, StoreError> {
        if !self.user_exists(id).await? {
            return Ok(None);
        }

        let rows = sqlx::query("SELECT id, user_id, text FROM posts WHERE user_id = $1 ORDER BY id ASC")
            .bind(id.get())
            .fetch_all(&*self.pool)
            .await?;
        let posts = rows.iter().map(post_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Some(posts))
    }

    #[instrument(skip(self, changes), fields(user_id = %id), err)]
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<u64, StoreError> {
        let patch = UserPatch::from_changes(id, &changes)?;

        // A patch without columns (only the row's own id) still counts the matched row.
        let result = sqlx::query("UPDATE users SET name = COALESCE($1, name) WHERE id = $2")
            .bind(patch.name)
            .bind(id.get())
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn remove(&self, id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs against a live database: `DATABASE_URL=... cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn crud_round_trip_against_postgres() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresUserStore::connect(&url, 2).await.unwrap();
        store.ensure_schema().await.unwrap();

        let created = store.insert(NewUser::new("PG USER")).await.unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(store.user_posts(created.id).await.unwrap(), Some(vec![]));

        let changes = UserChanges::from_value(serde_json::json!({ "name": "Renamed" }));
        assert_eq!(store.update(created.id, changes).await.unwrap(), 1);
        assert_eq!(store.remove(created.id).await.unwrap(), 1);
        assert_eq!(store.get(created.id).await.unwrap(), None);
    }
}
