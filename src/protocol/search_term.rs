//! Search term definitions
//!
//! A `(key, condition, value)` clause used by FindOr/FindAnd queries.

use std::fmt;
use std::str::FromStr;

use crate::error::{ChipmunkError, Result};

/// Characters that frame the wire format and may never appear in tokens
pub const FORBIDDEN_DELIMITERS: [char; 3] = ['\n', '|', '#'];

/// Reject `token` if it contains any protocol delimiter
pub fn validate_token(field: &str, token: &str) -> Result<()> {
    if let Some(c) = token.chars().find(|c| FORBIDDEN_DELIMITERS.contains(c)) {
        return Err(ChipmunkError::Validation(format!(
            "{} {:?} contains forbidden delimiter {:?}",
            field, token, c
        )));
    }
    Ok(())
}

/// Comparison applied to a metadata key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// `=`
    Equals,

    /// `!`
    NotEquals,
}

impl Condition {
    /// Wire symbol for the condition
    pub fn symbol(&self) -> char {
        match self {
            Condition::Equals => '=',
            Condition::NotEquals => '!',
        }
    }
}

impl FromStr for Condition {
    type Err = ChipmunkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" => Ok(Condition::Equals),
            "!" => Ok(Condition::NotEquals),
            other => Err(ChipmunkError::Validation(format!(
                "unknown search condition {:?} (expected \"=\" or \"!\")",
                other
            ))),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A metadata search clause
///
/// Serializes as `<key>:<condition>:<value>`. Key and value are checked for
/// delimiter characters on construction and on every setter, so a term that
/// exists is always safe to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    key: String,
    condition: Condition,
    value: String,
}

impl SearchTerm {
    pub fn new(
        key: impl Into<String>,
        condition: Condition,
        value: impl Into<String>,
    ) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        validate_token("search key", &key)?;
        validate_token("search value", &value)?;
        Ok(Self { key, condition, value })
    }

    /// Shorthand for a `key = value` term
    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::new(key, Condition::Equals, value)
    }

    /// Shorthand for a `key ! value` term
    pub fn not_equals(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::new(key, Condition::NotEquals, value)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_key(&mut self, key: impl Into<String>) -> Result<&mut Self> {
        let key = key.into();
        validate_token("search key", &key)?;
        self.key = key;
        Ok(self)
    }

    pub fn set_condition(&mut self, condition: Condition) -> &mut Self {
        self.condition = condition;
        self
    }

    pub fn set_value(&mut self, value: impl Into<String>) -> Result<&mut Self> {
        let value = value.into();
        validate_token("search value", &value)?;
        self.value = value;
        Ok(self)
    }

    /// `<key>:<condition>:<value>`
    pub fn to_protocol_string(&self) -> String {
        format!("{}:{}:{}", self.key, self.condition.symbol(), self.value)
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_protocol_string())
    }
}
