//! Compiled rule tree.
//!
//! Every node renders two kinds of flex text:
//!
//! - **definitions**: `name<TAB>pattern` lines for the first section, which
//!   other patterns reference as `{name}`;
//! - **actions**: `pattern<TAB>{ ... }` lines for the rules section; only
//!   emitting rules have one.
//!
//! Compounds render their children in order and nothing of their own.

use std::fmt::Write;

use crate::Identifier;

/// Name of the C variable holding the token kind for emitting rule `name`.
///
/// The grammar preamble declares one per emitting rule and the module's init
/// function fills it in; actions return it.
#[must_use]
pub fn token_slot(name: &Identifier) -> String {
    format!("result_token_{name}")
}

/// A node of the compiled rule tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleNode {
    /// A named definition without an action.
    Literal { name: Identifier, pattern: String },
    /// A definition whose matches produce `(name, matched text)` tokens.
    ///
    /// `owner` is the declared rule this node came from: itself for a plain
    /// emitting rule, the enclosing rule for a named group.
    Emitting {
        owner: Identifier,
        name: Identifier,
        pattern: String,
    },
    /// An ordered container.
    Compound { children: Vec<RuleNode> },
}

impl RuleNode {
    /// Rule name, for leaves.
    pub fn name(&self) -> Option<&Identifier> {
        match self {
            Self::Literal { name, .. } | Self::Emitting { name, .. } => Some(name),
            Self::Compound { .. } => None,
        }
    }

    /// Pattern text, for leaves.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Literal { pattern, .. } | Self::Emitting { pattern, .. } => Some(pattern),
            Self::Compound { .. } => None,
        }
    }

    pub fn is_emitting(&self) -> bool {
        matches!(self, Self::Emitting { .. })
    }

    /// Leaves in render order (depth-first, left to right).
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Append this node's definition lines to `out`.
    pub fn write_definitions(&self, out: &mut String) {
        for leaf in self.leaves() {
            if let (Some(name), Some(pattern)) = (leaf.name(), leaf.pattern()) {
                let _ = writeln!(out, "{name}\t{pattern}");
            }
        }
    }

    /// Append this node's action lines to `out`.
    pub fn write_actions(&self, out: &mut String) {
        for leaf in self.leaves() {
            if let Self::Emitting { name, pattern, .. } = leaf {
                let _ = writeln!(out, "{pattern}\t{{ return {}; }}", token_slot(name));
            }
        }
    }

    #[must_use]
    pub fn definitions(&self) -> String {
        let mut out = String::new();
        self.write_definitions(&mut out);
        out
    }

    #[must_use]
    pub fn actions(&self) -> String {
        let mut out = String::new();
        self.write_actions(&mut out);
        out
    }
}

/// Depth-first iterator over the leaves of a rule tree.
pub struct Leaves<'a> {
    stack: Vec<&'a RuleNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a RuleNode;

    fn next(&mut self) -> Option<&'a RuleNode> {
        while let Some(node) = self.stack.pop() {
            match node {
                RuleNode::Compound { children } => self.stack.extend(children.iter().rev()),
                leaf => return Some(leaf),
            }
        }
        None
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests panic on unexpected state"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name).unwrap()
    }

    fn literal(name: &str, pattern: &str) -> RuleNode {
        RuleNode::Literal {
            name: ident(name),
            pattern: pattern.to_string(),
        }
    }

    fn emitting(name: &str, pattern: &str) -> RuleNode {
        RuleNode::Emitting {
            owner: ident(name),
            name: ident(name),
            pattern: pattern.to_string(),
        }
    }

    #[test]
    fn literal_renders_definition_only() {
        let rule = literal("digit", "[0-9]");
        assert_eq!(rule.definitions(), "digit\t[0-9]\n");
        assert_eq!(rule.actions(), "");
    }

    #[test]
    fn emitting_renders_definition_and_action() {
        let rule = emitting("word", "[a-z]+");
        assert_eq!(rule.definitions(), "word\t[a-z]+\n");
        assert_eq!(rule.actions(), "[a-z]+\t{ return result_token_word; }\n");
    }

    #[test]
    fn compound_concatenates_children_in_order() {
        let rule = RuleNode::Compound {
            children: vec![
                literal("a", "x"),
                RuleNode::Compound {
                    children: vec![emitting("b", "y"), literal("c", "z")],
                },
                emitting("d", "w"),
            ],
        };
        assert_eq!(rule.definitions(), "a\tx\nb\ty\nc\tz\nd\tw\n");
        assert_eq!(
            rule.actions(),
            "y\t{ return result_token_b; }\nw\t{ return result_token_d; }\n"
        );
        let names: Vec<_> = rule.leaves().filter_map(RuleNode::name).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_compound_renders_nothing() {
        let rule = RuleNode::Compound { children: vec![] };
        assert_eq!(rule.definitions(), "");
        assert_eq!(rule.actions(), "");
        assert_eq!(rule.leaves().count(), 0);
    }
}
