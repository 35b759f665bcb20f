use std::ffi::CStr;
use std::fmt;

use crate::RuntimeError;

/// One match: the name of the emitting rule and the text it matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: String,
    pub text: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
        }
    }

    pub(crate) fn from_raw(kind: &CStr, text: &[u8]) -> Result<Self, RuntimeError> {
        let kind = kind
            .to_str()
            .map_err(|source| RuntimeError::InvalidUtf8 { what: "kind", source })?;
        let text = std::str::from_utf8(text)
            .map_err(|source| RuntimeError::InvalidUtf8 { what: "text", source })?;
        Ok(Self::new(kind, text))
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.text)
    }
}
