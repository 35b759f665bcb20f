//! Rule model and pattern compiler for lexgen.
//!
//! Turns a caller's ordered list of [`PatternSpec`]s into a [`RuleSet`]: a
//! flat tree of flex definitions and actions that the grammar emitter renders
//! and the build cache keys on.
//!
//! # Pipeline
//!
//! ```text
//! [PatternSpec] ──validate──▶ names ──translate──▶ patterns ──split──▶ [Segment]
//!                                                                 │
//!                                    RuleSet ◀──build── RuleNode ◀┘
//! ```
//!
//! - [`ident`]: the identifier rules every rule name obeys
//! - [`dialect`]: rewriting of `\s`, `\d`, `\w` shorthands into POSIX classes
//! - [`split`]: interval split of a pattern around its `(?P<name>...)` groups
//! - [`compile`]: validation and decomposition into [`RuleNode`]s
//! - [`rule_set`]: the compiled, hashable result
//!
//! # Example
//!
//! ```
//! use lexgen_rules::{compile, PatternSpec};
//!
//! let rules = compile(&[
//!     PatternSpec::emitting("token", r"[^\s]+"),
//!     PatternSpec::emitting("line_end", r"[\r\n]"),
//! ])
//! .unwrap();
//!
//! assert_eq!(rules.emitting_names().len(), 2);
//! assert!(rules.definitions().starts_with("token\t[^[:space:]]+\n"));
//! ```

pub mod compile;
pub mod dialect;
mod error;
pub mod hash;
pub mod ident;
mod pattern;
pub mod rule;
pub mod rule_set;
pub mod split;

pub use compile::{compile, CompileOptions, PatternCompiler};
pub use error::ValidationError;
pub use hash::ContentHash;
pub use ident::Identifier;
pub use pattern::PatternSpec;
pub use rule::{token_slot, RuleNode};
pub use rule_set::RuleSet;
pub use split::Segment;
