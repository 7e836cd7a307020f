//! User identifiers and the numeric-id gate applied to path parameters.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Identifier of a user, assigned by the persistence layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Numeric-id gate for a raw path parameter.
///
/// The check is loose: anything that reads as a finite number passes
/// (`"7"`, `" 07 "`, `"7.0"`, `"7e0"`). The outcome is
/// - `Err(InvalidId)` when the parameter is not numeric at all,
/// - `Ok(Some(id))` when it denotes an integer that fits a `UserId`,
/// - `Ok(None)` when it is numeric but can never match a stored record
///   (fractional or out of range). Callers treat this like a missed lookup.
pub fn numeric_id(raw: &str) -> DomainResult<Option<UserId>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_id("empty id"));
    }

    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(Some(UserId(v)));
    }

    let v: f64 = trimmed
        .parse()
        .map_err(|_| DomainError::invalid_id(format!("not a number: {raw}")))?;
    if !v.is_finite() {
        return Err(DomainError::invalid_id(format!("not a finite number: {raw}")));
    }

    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Ok(Some(UserId(v as i64)))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_pass_the_gate() {
        assert_eq!(numeric_id("1").unwrap(), Some(UserId::new(1)));
        assert_eq!(numeric_id("007").unwrap(), Some(UserId::new(7)));
        assert_eq!(numeric_id(" 42 ").unwrap(), Some(UserId::new(42)));
        assert_eq!(numeric_id("-3").unwrap(), Some(UserId::new(-3)));
    }

    #[test]
    fn integral_floats_are_coerced() {
        assert_eq!(numeric_id("2.0").unwrap(), Some(UserId::new(2)));
        assert_eq!(numeric_id("1e2").unwrap(), Some(UserId::new(100)));
    }

    #[test]
    fn numeric_values_without_a_matching_key_yield_none() {
        assert_eq!(numeric_id("1.5").unwrap(), None);
        assert_eq!(numeric_id("1e300").unwrap(), None);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        for raw in ["abc", "", "   ", "1a", "NaN", "inf", "-infinity", "0x10"] {
            assert!(
                matches!(numeric_id(raw), Err(DomainError::InvalidId(_))),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn display_matches_inner_value() {
        assert_eq!(UserId::new(12).to_string(), "12");
        assert_eq!(i64::from(UserId::new(12)), 12);
    }
}
