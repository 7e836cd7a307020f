//! Persistence boundary for users and their posts.
//!
//! The HTTP layer only sees the [`UserStore`] trait; implementations decide how
//! records are kept.

mod columns;
pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
pub use r#trait::{StoreError, UserStore};
