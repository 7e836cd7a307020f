//! Mapping of free-form change sets onto the users table columns.
//!
//! Both stores go through [`UserPatch::from_changes`] so they accept and reject
//! exactly the same updates.

use serde_json::Value;

use roster_core::{numeric_id, User, UserChanges, UserId};

use super::StoreError;

/// Column-level view of a validated change set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UserPatch {
    pub name: Option<String>,
}

impl UserPatch {
    /// Map `changes` for the user `id` onto columns.
    ///
    /// An `id` field naming the same user is a no-op; scalar `name` values are
    /// stored in their text form, the way a TEXT column coerces them.
    pub fn from_changes(id: UserId, changes: &UserChanges) -> Result<Self, StoreError> {
        if changes.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let mut patch = UserPatch::default();
        for (column, value) in changes.iter() {
            match column.as_str() {
                "name" => patch.name = Some(text_value(column, value)?),
                "id" if names_user(value, id) => {}
                "id" => return Err(StoreError::ImmutableColumn(column.clone())),
                other => return Err(StoreError::UnknownColumn(other.to_string())),
            }
        }
        Ok(patch)
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
    }
}

fn text_value(column: &str, value: &Value) -> Result<String, StoreError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(StoreError::InvalidColumnValue {
            column: column.to_string(),
            expected: "string",
        }),
    }
}

fn names_user(value: &Value, id: UserId) -> bool {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(v) => v == id.get(),
            None => n.to_string().parse::<f64>().ok() == Some(id.get() as f64),
        },
        Value::String(s) => matches!(numeric_id(s), Ok(Some(v)) if v == id),
        _ => false,
    }
}
