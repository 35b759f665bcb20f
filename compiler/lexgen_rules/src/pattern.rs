/// One caller-declared tokenization rule.
///
/// `name` is checked when the list is compiled, not here, so that a rule file
/// with a bad name reports [`ValidationError::InvalidName`](crate::ValidationError)
/// alongside the other configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternSpec {
    pub name: String,
    /// Flex pattern text, optionally with embedded `(?P<name>...)` groups.
    pub pattern: String,
    /// Whether a match produces a token of kind `name`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub emit: bool,
}

impl PatternSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, emit: bool) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            emit,
        }
    }

    /// A rule whose matches become tokens.
    #[must_use]
    pub fn emitting(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(name, pattern, true)
    }

    /// A named definition other rules can reference as `{name}`.
    #[must_use]
    pub fn definition(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(name, pattern, false)
    }
}

impl<N: Into<String>, P: Into<String>> From<(N, P, bool)> for PatternSpec {
    fn from((name, pattern, emit): (N, P, bool)) -> Self {
        Self::new(name, pattern, emit)
    }
}
