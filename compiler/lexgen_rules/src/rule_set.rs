//! The compiled form of one tokenizer's pattern list.

use crate::hash::{hash_parts, ContentHash};
use crate::{Identifier, RuleNode};

/// All rules of one tokenizer, rendered and hashed.
///
/// Built once by the pattern compiler and immutable afterwards. The rendered
/// definitions and actions are computed eagerly since the hash, the grammar
/// emitter and the build cache all need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    root: RuleNode,
    /// Chain links generated by named-group decomposition.
    links: Vec<Identifier>,
    emitting: Vec<Identifier>,
    definitions: String,
    actions: String,
    hash: ContentHash,
}

impl RuleSet {
    pub(crate) fn new(rules: Vec<RuleNode>, links: Vec<Identifier>) -> Self {
        let root = RuleNode::Compound { children: rules };
        let emitting = root
            .leaves()
            .filter(|leaf| leaf.is_emitting())
            .filter_map(RuleNode::name)
            .cloned()
            .collect();
        let definitions = root.definitions();
        let actions = root.actions();
        let hash = hash_parts(&[&definitions, &actions]);

        Self {
            root,
            links,
            emitting,
            definitions,
            actions,
            hash,
        }
    }

    /// The top-level compound.
    pub fn root(&self) -> &RuleNode {
        &self.root
    }

    /// One rule per declared pattern spec, in declaration order.
    pub fn rules(&self) -> &[RuleNode] {
        match &self.root {
            RuleNode::Compound { children } => children,
            leaf => std::slice::from_ref(leaf),
        }
    }

    /// Names of every emitting rule, in render order.
    ///
    /// Each gets one token slot in the generated scanner.
    pub fn emitting_names(&self) -> &[Identifier] {
        &self.emitting
    }

    /// Rendered definitions section.
    pub fn definitions(&self) -> &str {
        &self.definitions
    }

    /// Rendered actions section.
    pub fn actions(&self) -> &str {
        &self.actions
    }

    /// Stable digest of the definitions and actions.
    ///
    /// Everything else in a generated grammar is derived from this hash and
    /// the emitting names, so equal hashes mean interchangeable artifacts.
    pub fn content_hash(&self) -> ContentHash {
        self.hash
    }

    /// The leaf rule called `name`.
    pub fn find(&self, name: &str) -> Option<&RuleNode> {
        self.root
            .leaves()
            .find(|leaf| leaf.name().is_some_and(|n| n == name))
    }

    /// Pattern of the definition called `name`.
    pub fn definition(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(RuleNode::pattern)
    }

    /// Expand every `{ref}` in definition `name` recursively.
    ///
    /// Expansions follow flex: each one is wrapped in parentheses unless the
    /// referenced definition starts with `^` or ends with `$`. The result is
    /// the pattern flex matches for `{name}`. Braces that do not name a
    /// definition (repetition counts such as `{1,3}`) are kept. Returns
    /// `None` for unknown names and for reference cycles.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let mut visiting = Vec::new();
        self.resolve_into(name, &mut visiting)
    }

    /// Whether `name` is a chain link generated by group decomposition.
    pub fn is_link(&self, name: &str) -> bool {
        self.links.iter().any(|link| link == name)
    }

    fn resolve_into<'a>(&'a self, name: &'a str, visiting: &mut Vec<&'a str>) -> Option<String> {
        if visiting.contains(&name) {
            return None;
        }
        let pattern = self.definition(name)?;
        visiting.push(name);

        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) if self.find(&after[..close]).is_some() => {
                    let reference = &after[..close];
                    let expansion = self.resolve_into(reference, visiting)?;
                    if self.definition(reference).is_some_and(is_anchored) {
                        out.push_str(&expansion);
                    } else {
                        out.push('(');
                        out.push_str(&expansion);
                        out.push(')');
                    }
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        visiting.pop();
        Some(out)
    }
}

/// flex leaves an anchored definition unparenthesised when it expands it.
fn is_anchored(pattern: &str) -> bool {
    pattern.starts_with('^') || pattern.ends_with('$')
}
