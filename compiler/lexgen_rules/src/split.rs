//! Interval split of a pattern around its embedded named groups.
//!
//! A group is written `(?P<name>subpattern)`. The subpattern may contain
//! nested parentheses, bracket classes and quoted strings; the group ends at
//! the parenthesis that balances the opening one. Group syntax inside a
//! bracket class or a quoted string is ordinary pattern text.
//!
//! An opener without a name terminator or without a balancing `)` is not a
//! group; it stays in the surrounding literal and flex reports it.

/// One piece of a split pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Pattern text between groups.
    Literal(&'a str),
    /// An embedded `(?P<name>pattern)` group.
    Group { name: &'a str, pattern: &'a str },
}

const GROUP_OPEN: &str = "(?P<";

/// Split `pattern` into literal runs and groups, in source order.
///
/// Concatenating the literal texts and the groups' source spans gives back
/// the input. Empty literal runs are not produced.
#[must_use]
pub fn split_groups(pattern: &str) -> Vec<Segment<'_>> {
    let bytes = pattern.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut in_quote = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'"' => in_quote = !in_quote,
            b'[' if !in_quote => match class_end(bytes, i) {
                Some(end) => {
                    i = end;
                    continue;
                }
                None => break,
            },
            b'(' if !in_quote && pattern[i..].starts_with(GROUP_OPEN) => {
                if let Some((name, body, end)) = parse_group(pattern, i) {
                    if i > literal_start {
                        segments.push(Segment::Literal(&pattern[literal_start..i]));
                    }
                    segments.push(Segment::Group {
                        name,
                        pattern: body,
                    });
                    i = end;
                    literal_start = end;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if literal_start < pattern.len() {
        segments.push(Segment::Literal(&pattern[literal_start..]));
    }
    segments
}

/// Whether `pattern` embeds at least one named group.
#[must_use]
pub fn has_group(pattern: &str) -> bool {
    split_groups(pattern)
        .iter()
        .any(|segment| matches!(segment, Segment::Group { .. }))
}

/// Whether `text` stands alone as a concatenation term.
///
/// Parentheses must balance and no `|` may sit outside them, so wrapping the
/// text in parentheses and concatenating it with its neighbours keeps the
/// meaning it had inside the full pattern.
pub(crate) fn is_self_contained(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'"' => in_quote = !in_quote,
            b'[' if !in_quote => match class_end(bytes, i) {
                Some(end) => {
                    i = end;
                    continue;
                }
                None => return false,
            },
            b'(' if !in_quote => depth += 1,
            b')' if !in_quote => match depth.checked_sub(1) {
                Some(outer) => depth = outer,
                None => return false,
            },
            b'|' if !in_quote && depth == 0 => return false,
            _ => {}
        }
        i += 1;
    }
    depth == 0 && !in_quote
}

/// Length of the postfix operator `text` starts with, or 0.
///
/// Recognises `?`, `*`, `+` and a counted repetition `{n}`, `{n,}` or
/// `{n,m}`. A braced name such as `{digit}` is a reference, not an operator.
pub(crate) fn leading_quantifier(text: &str) -> usize {
    match text.as_bytes().first() {
        Some(b'?' | b'*' | b'+') => 1,
        Some(b'{') => match text.find('}') {
            Some(close) => {
                let body = &text[1..close];
                let (low, high) = body.split_once(',').unwrap_or((body, ""));
                let counted = !low.is_empty()
                    && low.bytes().all(|b| b.is_ascii_digit())
                    && high.bytes().all(|b| b.is_ascii_digit());
                if counted {
                    close + 1
                } else {
                    0
                }
            }
            None => 0,
        },
        _ => 0,
    }
}

/// Parse a group whose opener starts at `open`.
///
/// Returns the name, the subpattern and the index just past the closing `)`.
fn parse_group(pattern: &str, open: usize) -> Option<(&str, &str, usize)> {
    let name_start = open + GROUP_OPEN.len();
    let name_len = pattern[name_start..].find('>')?;
    let name = &pattern[name_start..name_start + name_len];
    let body_start = name_start + name_len + 1;

    let bytes = pattern.as_bytes();
    let mut depth = 1usize;
    let mut in_quote = false;
    let mut i = body_start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'"' => in_quote = !in_quote,
            b'[' if !in_quote => {
                i = class_end(bytes, i)?;
                continue;
            }
            b'(' if !in_quote => depth += 1,
            b')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    return Some((name, &pattern[body_start..i], i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index just past the `]` closing the bracket class opened at `open`.
///
/// A `]` directly after `[` or `[^` is a member, not the terminator, and
/// POSIX classes such as `[:alpha:]` are skipped whole.
pub(crate) fn class_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut i = open + 1;
    if bytes.get(i) == Some(&b'^') {
        i += 1;
    }
    if bytes.get(i) == Some(&b']') {
        i += 1;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'[' if bytes.get(i + 1) == Some(&b':') => {
                i = match find(bytes, i + 2, b":]") {
                    Some(close) => close + 2,
                    None => i + 1,
                };
            }
            b']' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}
