//! Infrastructure layer: persistence adapters for the users service.

pub mod user_store;

pub use user_store::{InMemoryUserStore, PostgresUserStore, StoreError, UserStore};
