use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use roster_core::{NewUser, Post, User, UserChanges, UserId};

/// Failure reported by a [`UserStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The change set names a field the users table does not have.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A column was given a value of the wrong JSON type.
    #[error("invalid value for column {column}: expected {expected}")]
    InvalidColumnValue {
        column: String,
        expected: &'static str,
    },

    /// The change set tries to overwrite a store-managed column.
    #[error("column {0} cannot be changed")]
    ImmutableColumn(String),

    /// An update was requested with no fields.
    #[error("empty update")]
    EmptyUpdate,

    /// The store cannot serve requests (e.g. a poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Data-access collaborator for the users resource.
///
/// Every method is a single non-blocking call; callers await it and map the
/// outcome to a response.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user and return the stored record with its assigned id.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// All users, ordered by id.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Posts written by a user; `None` when the user does not exist.
    async fn user_posts(&self, id: UserId) -> Result<Option<Vec<Post>>, StoreError>;

    /// Merge `changes` into a user. Returns the number of records changed.
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<u64, StoreError>;

    /// Remove a user. Returns the number of records removed.
    async fn remove(&self, id: UserId) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        (**self).insert(user).await
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).get(id).await
    }

    async fn user_posts(&self, id: UserId) -> Result<Option<Vec<Post>>, StoreError> {
        (**self).user_posts(id).await
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<u64, StoreError> {
        (**self).update(id, changes).await
    }

    async fn remove(&self, id: UserId) -> Result<u64, StoreError> {
        (**self).remove(id).await
    }
}
