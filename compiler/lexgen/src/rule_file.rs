//! JSON rule files.
//!
//! ```json
//! {
//!   "rules": [
//!     { "name": "token", "pattern": "[^\\s]+", "emit": true },
//!     { "name": "line_end", "pattern": "[\\r\\n]", "emit": true }
//!   ]
//! }
//! ```
//!
//! `emit` defaults to `false`. Rule order is significant: it is the order of
//! the definitions and of the actions in the generated grammar.

use std::fs;
use std::path::Path;

use lexgen_rules::PatternSpec;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFile {
    pub rules: Vec<PatternSpec>,
}

impl RuleFile {
    pub fn new(rules: Vec<PatternSpec>) -> Self {
        Self { rules }
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| Error::RuleFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests panic on unexpected state")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn emit_defaults_to_false() {
        let file = RuleFile::parse(
            r#"{"rules": [
                {"name": "digit", "pattern": "[0-9]"},
                {"name": "number", "pattern": "{digit}+", "emit": true}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            file.rules,
            [
                PatternSpec::definition("digit", "[0-9]"),
                PatternSpec::emitting("number", "{digit}+"),
            ]
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = RuleFile::parse(r#"{"rules": [], "extra": 1}"#).unwrap_err();
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn written_files_read_back() {
        let file = RuleFile::new(vec![PatternSpec::emitting("word", "[a-z]+")]);
        assert_eq!(RuleFile::parse(&file.to_json().unwrap()).unwrap(), file);
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "{").unwrap();

        let err = RuleFile::load(&path).unwrap_err();

        assert!(matches!(err, Error::RuleFile { .. }));
        assert!(err.to_string().contains("rules.json"));
    }
}
