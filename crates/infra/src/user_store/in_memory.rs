use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use roster_core::{NewUser, Post, User, UserChanges, UserId};

use super::columns::UserPatch;
use super::r#trait::{StoreError, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<i64, Post>,
    next_user_id: i64,
    next_post_id: i64,
}

impl Tables {
    fn allocate_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        UserId::new(self.next_user_id)
    }

    fn allocate_post_id(&mut self) -> i64 {
        self.next_post_id += 1;
        self.next_post_id
    }
}

/// In-memory user store.
///
/// Intended for tests/dev. Ids start at 1 and are never reused; removing a
/// user also removes their posts.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    tables: RwLock<Tables>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a post to an existing user. Returns `None` if the user is absent.
    pub fn add_post(&self, user_id: UserId, text: impl Into<String>) -> Result<Option<Post>, StoreError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Ok(None);
        }

        let id = tables.allocate_post_id();
        let post = Post {
            id,
            user_id,
            text: text.into(),
        };
        tables.posts.insert(id, post.clone());
        Ok(Some(post))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        let id = tables.allocate_user_id();
        let stored = user.into_user(id);
        tables.users.insert(id, stored.clone());
        tracing::debug!(user_id = %id, "user inserted");
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_posts(&self, id: UserId) -> Result<Option<Vec<Post>>, StoreError> {
        let tables = self.read()?;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }

        Ok(Some(
            tables
                .posts
                .values()
                .filter(|p| p.user_id == id)
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<u64, StoreError> {
        let patch = UserPatch::from_changes(id, &changes)?;
        let mut tables = self.write()?;
        match tables.users.get_mut(&id) {
            Some(user) => {
                patch.apply(user);
                tracing::debug!(user_id = %id, "user updated");
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, id: UserId) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        if tables.users.remove(&id).is_none() {
            return Ok(0);
        }

        tables.posts.retain(|_, p| p.user_id != id);
        tracing::debug!(user_id = %id, "user removed");
        Ok(1)
    }
}
