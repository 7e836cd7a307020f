//! `roster-core` — domain primitives for the users service.
//!
//! This crate contains **pure domain** types and checks (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod post;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use id::{numeric_id, UserId};
pub use post::Post;
pub use user::{validate_new_user, NewUser, User, UserChanges, MAX_NAME_LEN};
