use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// A post owned by a user. Read-only from the API's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub text: String,
}
