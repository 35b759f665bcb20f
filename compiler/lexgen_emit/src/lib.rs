//! Flex grammar emitter.
//!
//! Renders a [`RuleSet`] into the `.l` file the build cache hands to flex.
//! The output has five blocks, in order:
//!
//! 1. **Options**: reentrant, stack-capable, non-wrapping, full-table, 8-bit,
//!    with the output file names derived from the rule set hash
//! 2. **Preamble**: C includes, one `result_token_<name>` slot per emitting
//!    rule, and the `YY_DECL` override that makes the scanner return the slot
//!    of the rule that matched
//! 3. **Definitions**: the rule set's `name<TAB>pattern` lines
//! 4. **Actions**: the rule set's emitting actions, then a catch-all that
//!    skips input no rule matches
//! 5. **Module**: the C entry points `lexgen_init`, `scan_file`,
//!    `scan_string`, `next_token` and `free_scanner`
//!
//! Rendering is pure: the same rule set always renders byte-identical text,
//! which is what lets the build cache key artifacts by hash alone.

mod template;

use lexgen_rules::{ContentHash, RuleSet};

/// File names of one build, all derived from the rule set hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarFiles {
    /// Flex input: `{h}_scanner.l`.
    pub grammar: String,
    /// Flex output: `{h}_scanner.c`.
    pub c_source: String,
    /// Flex output: `{h}_scanner.h`.
    pub c_header: String,
    /// Stem of the compiled module: `{h}_scanner`.
    pub module_stem: String,
}

impl GrammarFiles {
    #[must_use]
    pub fn for_hash(hash: ContentHash) -> Self {
        let stem = format!("{hash}_scanner");
        Self {
            grammar: format!("{stem}.l"),
            c_source: format!("{stem}.c"),
            c_header: format!("{stem}.h"),
            module_stem: stem,
        }
    }

    /// Module file name for a platform shared-library extension.
    #[must_use]
    pub fn module(&self, extension: &str) -> String {
        format!("{}.{extension}", self.module_stem)
    }
}

/// A rendered flex grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarText {
    hash: ContentHash,
    files: GrammarFiles,
    text: String,
}

impl GrammarText {
    /// Hash of the rule set this grammar was rendered from.
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    pub fn files(&self) -> &GrammarFiles {
        &self.files
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Render `rules` into flex input.
#[tracing::instrument(level = "debug", skip_all, fields(hash = %rules.content_hash()))]
pub fn render(rules: &RuleSet) -> GrammarText {
    let hash = rules.content_hash();
    let files = GrammarFiles::for_hash(hash);
    let emitting = rules.emitting_names();

    let mut text = String::with_capacity(
        template::FIXED_SIZE + rules.definitions().len() + rules.actions().len(),
    );
    template::write_options(&mut text, &files);
    template::write_preamble(&mut text, emitting);
    text.push_str(rules.definitions());
    text.push_str("%%\n");
    text.push_str(rules.actions());
    template::write_catch_all(&mut text);
    text.push_str("%%\n");
    template::write_module(&mut text, emitting);

    tracing::debug!(bytes = text.len(), "rendered grammar");
    GrammarText { hash, files, text }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
