//! Validation errors raised while compiling pattern specs.

use thiserror::Error;

/// A configuration error in the caller's pattern list.
///
/// Raised before any grammar is rendered or any external tool runs. These are
/// never retried: the pattern list itself has to change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two rules (declared or generated) share a name.
    #[error("duplicate definition for `{name}`")]
    DuplicateName { name: String },
    /// A rule or group name is not an identifier.
    #[error(
        "invalid name `{name}`: names must be non-empty, use only A-Z, a-z, 0-9 and `_`, \
         and not start with a digit"
    )]
    InvalidName { name: String },
    /// A rule is marked as emitting but decomposes into named groups.
    #[error("rule `{name}` cannot emit: its named groups already emit their own tokens")]
    ConflictingEmit { name: String },
    /// A named group's pattern embeds another named group.
    #[error("group `{name}` contains another named group; named groups cannot nest")]
    NestedGroup { name: String },
    /// Text between a rule's named groups cannot stand as its own definition.
    #[error(
        "rule `{name}`: `{text}` sits between named groups but does not stand alone; \
         balance its parentheses and keep `|` inside them"
    )]
    UnsplittableSegment { name: String, text: String },
    /// A rule or group has nothing to match.
    #[error("rule `{name}` has an empty pattern")]
    EmptyPattern { name: String },
}
