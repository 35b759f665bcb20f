//! Rule identifiers.
//!
//! Identifiers name flex definitions and C token slots, so they are limited to
//! `[A-Za-z_][A-Za-z0-9_]*`; flex rejects a definition name that starts with
//! a digit. Generated sub-rule names (`_<owner>_<index>`) are built from
//! already-validated parts and skip the check.

use std::fmt;

use crate::ValidationError;

/// A validated rule name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `name` and wrap it.
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        if Self::is_valid(name) {
            Ok(Self(name.to_owned()))
        } else {
            Err(ValidationError::InvalidName {
                name: name.to_owned(),
            })
        }
    }

    /// Check `name` against `^[A-Za-z_][A-Za-z0-9_]*$`.
    #[must_use]
    pub fn is_valid(name: &str) -> bool {
        let mut bytes = name.bytes();
        bytes
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == b'_')
            && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
    }

    /// Build `_<owner>_<suffix>` for a sub-rule of `owner`.
    ///
    /// `suffix` must itself be an identifier (an index or a validated group
    /// name), which keeps the result valid.
    pub(crate) fn sub_rule(owner: &Self, suffix: impl fmt::Display) -> Self {
        Self(format!("_{owner}_{suffix}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
