use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::id::UserId;

/// Longest accepted user name on creation, in characters.
pub const MAX_NAME_LEN: usize = 127;

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// Insertable user shape (the store assigns the id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Copy of this record with the name upper-cased.
    pub fn uppercased(self) -> Self {
        Self {
            name: self.name.to_uppercase(),
        }
    }

    pub fn into_user(self, id: UserId) -> User {
        User { id, name: self.name }
    }
}

/// Arbitrary fields to merge into an existing user.
///
/// No field-level validation happens here; the store decides which fields map
/// onto its columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserChanges(Map<String, Value>);

impl UserChanges {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a change set from any JSON value; non-objects become an empty set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Validate a create-user request body and extract the insertable record.
///
/// `name` must be a JSON string of at most [`MAX_NAME_LEN`] characters.
pub fn validate_new_user(body: &Value) -> DomainResult<NewUser> {
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::validation("name must be a string"))?;

    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name must be shorter than {} characters",
            MAX_NAME_LEN + 1
        )));
    }

    Ok(NewUser::new(name))
}
