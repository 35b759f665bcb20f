//! Pattern compiler: pattern specs to a [`RuleSet`].
//!
//! # Named-group decomposition
//!
//! A pattern with embedded `(?P<name>sub)` groups cannot be a single flex
//! rule: flex has no way to emit a sub-match as its own token. Instead the
//! pattern is split into literal runs and groups and rebuilt as a chain of
//! definitions, each one referencing the previous link:
//!
//! ```text
//! date = "(?P<year>[0-9]{4})-(?P<month>[0-9]{2})"
//!
//! _date_year   [0-9]{4}                  emits `_date_year`
//! _date_0      {_date_year}
//! _date_1      {_date_0}-
//! _date_month  [0-9]{2}                  emits `_date_month`
//! _date_2      {_date_1}{_date_month}
//! date         {_date_2}
//! ```
//!
//! One counter numbers the links of a whole pattern; it only ever grows. The
//! trailing alias keeps the declared name referenceable from other rules.
//!
//! flex wraps every expanded `{name}` in parentheses, so each link has to
//! mean on its own what it meant inside the full pattern:
//!
//! - a postfix operator right after a group (`?`, `*`, `+`, `{n,m}`) moves
//!   into that group's link, `{_x_1}{_x_g}?`, so it still binds to
//!   the group alone;
//! - any other literal text must balance its parentheses and keep `|` inside
//!   them, otherwise [`ValidationError::UnsplittableSegment`] is raised;
//! - a group's own pattern may not embed another named group
//!   ([`ValidationError::NestedGroup`]).

use rustc_hash::FxHashSet;

use crate::dialect::translate_shorthands;
use crate::split::{has_group, is_self_contained, leading_quantifier, split_groups, Segment};
use crate::{Identifier, PatternSpec, RuleNode, RuleSet, ValidationError};

/// Options for [`PatternCompiler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Rewrite `\s`, `\d`, `\w` (and negations) into POSIX classes.
    pub translate_shorthands: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            translate_shorthands: true,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_shorthands(mut self, enable: bool) -> Self {
        self.translate_shorthands = enable;
        self
    }
}

/// Compiles ordered pattern specs into a [`RuleSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternCompiler {
    options: CompileOptions,
}

/// Compile `specs` with default options.
pub fn compile(specs: &[PatternSpec]) -> Result<RuleSet, ValidationError> {
    PatternCompiler::default().compile(specs)
}

impl PatternCompiler {
    #[must_use]
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Validate every spec, then build one rule per spec in order.
    ///
    /// Names are checked for validity and uniqueness before any rule is
    /// built. Names generated by group decomposition are checked against
    /// every other rule afterwards.
    #[tracing::instrument(level = "debug", skip_all, fields(count = specs.len()))]
    pub fn compile(&self, specs: &[PatternSpec]) -> Result<RuleSet, ValidationError> {
        let names = validate_names(specs)?;

        let mut rules = Vec::with_capacity(specs.len());
        let mut links = Vec::new();
        for (spec, name) in specs.iter().zip(names) {
            rules.push(self.build_rule(name, spec, &mut links)?);
        }

        let rule_set = RuleSet::new(rules, links);
        check_unique_leaves(&rule_set)?;

        tracing::debug!(
            hash = %rule_set.content_hash(),
            emitting = rule_set.emitting_names().len(),
            "compiled rule set"
        );
        Ok(rule_set)
    }

    fn build_rule(
        &self,
        name: Identifier,
        spec: &PatternSpec,
        links: &mut Vec<Identifier>,
    ) -> Result<RuleNode, ValidationError> {
        if spec.pattern.is_empty() {
            return Err(ValidationError::EmptyPattern {
                name: name.to_string(),
            });
        }

        let pattern = if self.options.translate_shorthands {
            translate_shorthands(&spec.pattern).into_owned()
        } else {
            spec.pattern.clone()
        };

        match (has_group(&pattern), spec.emit) {
            (true, true) => Err(ValidationError::ConflictingEmit {
                name: name.to_string(),
            }),
            (true, false) => decompose(name, &split_groups(&pattern), links),
            (false, true) => Ok(RuleNode::Emitting {
                owner: name.clone(),
                name,
                pattern,
            }),
            (false, false) => Ok(RuleNode::Literal { name, pattern }),
        }
    }
}

fn validate_names(specs: &[PatternSpec]) -> Result<Vec<Identifier>, ValidationError> {
    let mut seen = FxHashSet::default();
    specs
        .iter()
        .map(|spec| {
            let name = Identifier::new(&spec.name)?;
            if !seen.insert(spec.name.as_str()) {
                return Err(ValidationError::DuplicateName {
                    name: spec.name.clone(),
                });
            }
            Ok(name)
        })
        .collect()
}

fn check_unique_leaves(rule_set: &RuleSet) -> Result<(), ValidationError> {
    let mut seen = FxHashSet::default();
    for name in rule_set.root().leaves().filter_map(RuleNode::name) {
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateName {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn decompose(
    owner: Identifier,
    segments: &[Segment<'_>],
    links: &mut Vec<Identifier>,
) -> Result<RuleNode, ValidationError> {
    let mut chain = Chain::new(owner, links);
    for segment in segments {
        match *segment {
            Segment::Literal(text) => chain.push_literal(text)?,
            Segment::Group { name, pattern } => chain.push_group(name, pattern)?,
        }
    }
    Ok(chain.finish())
}

/// Builder for the link chain of one decomposed pattern.
struct Chain<'a> {
    owner: Identifier,
    /// Index of the next link; shared by literal and group steps.
    next_index: usize,
    /// Reference to the last group, not yet linked: a postfix operator in
    /// the following literal still has to bind to it.
    open_group: Option<String>,
    children: Vec<RuleNode>,
    /// Every link name generated so far, across all patterns.
    links: &'a mut Vec<Identifier>,
}

impl<'a> Chain<'a> {
    fn new(owner: Identifier, links: &'a mut Vec<Identifier>) -> Self {
        Self {
            owner,
            next_index: 0,
            open_group: None,
            children: Vec::new(),
            links,
        }
    }

    fn push_literal(&mut self, text: &str) -> Result<(), ValidationError> {
        let mut rest = text;
        if let Some(reference) = self.open_group.take() {
            let (operator, tail) = text.split_at(leading_quantifier(text));
            self.push_link(&format!("{reference}{operator}"));
            rest = tail;
        }
        if rest.is_empty() {
            return Ok(());
        }
        if !is_self_contained(rest) {
            return Err(ValidationError::UnsplittableSegment {
                name: self.owner.to_string(),
                text: rest.to_owned(),
            });
        }
        self.push_link(rest);
        Ok(())
    }

    fn push_group(&mut self, group: &str, pattern: &str) -> Result<(), ValidationError> {
        let group = Identifier::new(group)?;
        let name = Identifier::sub_rule(&self.owner, &group);
        if pattern.is_empty() {
            return Err(ValidationError::EmptyPattern {
                name: name.to_string(),
            });
        }
        if has_group(pattern) {
            return Err(ValidationError::NestedGroup {
                name: name.to_string(),
            });
        }

        if let Some(reference) = self.open_group.take() {
            self.push_link(&reference);
        }
        self.open_group = Some(format!("{{{name}}}"));
        self.children.push(RuleNode::Emitting {
            owner: self.owner.clone(),
            name,
            pattern: pattern.to_owned(),
        });
        Ok(())
    }

    /// Append `{prev}text`, or plain `text` for the first link.
    fn push_link(&mut self, text: &str) {
        let index = self.next_index;
        let pattern = match index.checked_sub(1) {
            Some(prev) => format!("{{{}}}{text}", Identifier::sub_rule(&self.owner, prev)),
            None => text.to_owned(),
        };
        let name = Identifier::sub_rule(&self.owner, index);
        self.links.push(name.clone());
        self.children.push(RuleNode::Literal { name, pattern });
        self.next_index += 1;
    }

    fn finish(mut self) -> RuleNode {
        if let Some(reference) = self.open_group.take() {
            self.push_link(&reference);
        }
        if let Some(last) = self.next_index.checked_sub(1) {
            let pattern = format!("{{{}}}", Identifier::sub_rule(&self.owner, last));
            self.children.push(RuleNode::Literal {
                name: self.owner,
                pattern,
            });
        }
        RuleNode::Compound {
            children: self.children,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
