//! Shorthand class translation.
//!
//! Rule authors write `\s`, `\d` and `\w` out of habit; flex reads `\s` as a
//! plain `s`. Before a pattern reaches the grammar, each shorthand is
//! rewritten into the POSIX bracket expression flex understands:
//!
//! | Shorthand | Outside a class  | Inside a class |
//! |-----------|------------------|----------------|
//! | `\s`      | `[[:space:]]`    | `[:space:]`    |
//! | `\S`      | `[^[:space:]]`   | unchanged      |
//! | `\d`      | `[[:digit:]]`    | `[:digit:]`    |
//! | `\D`      | `[^[:digit:]]`   | unchanged      |
//! | `\w`      | `[[:alnum:]_]`   | `[:alnum:]_`   |
//! | `\W`      | `[^[:alnum:]_]`  | unchanged      |
//!
//! A negated shorthand inside a class has no single-class flex equivalent and
//! is passed through with a warning. Quoted strings are never rewritten.

use std::borrow::Cow;

/// Rewrite Perl-style shorthand classes in `pattern`.
///
/// Borrows when there is nothing to rewrite.
#[must_use]
pub fn translate_shorthands(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains('\\') {
        return Cow::Borrowed(pattern);
    }

    let bytes = pattern.as_bytes();
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut in_class = false;
    let mut in_quote = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let escaped_len = pattern[i + 1..].chars().next().map_or(0, char::len_utf8);
                let end = i + 1 + escaped_len;
                let escaped = &pattern[i + 1..end];
                let replacement = if in_quote {
                    None
                } else {
                    shorthand(escaped, in_class)
                };
                match replacement {
                    Some(expansion) => out.push_str(expansion),
                    None => {
                        if in_class && matches!(escaped, "S" | "D" | "W") {
                            tracing::warn!(
                                pattern,
                                shorthand = escaped,
                                "negated shorthand inside a bracket class is passed through unchanged"
                            );
                        }
                        out.push_str(&pattern[i..end]);
                    }
                }
                i = end;
                continue;
            }
            b'"' if !in_class => in_quote = !in_quote,
            b'[' if !in_class && !in_quote => {
                in_class = true;
                out.push('[');
                i += 1;
                if bytes.get(i) == Some(&b'^') {
                    out.push('^');
                    i += 1;
                }
                if bytes.get(i) == Some(&b']') {
                    out.push(']');
                    i += 1;
                }
                continue;
            }
            b'[' if in_class && bytes.get(i + 1) == Some(&b':') => {
                if let Some(close) = pattern[i + 2..].find(":]") {
                    let end = i + 2 + close + 2;
                    out.push_str(&pattern[i..end]);
                    i = end;
                    continue;
                }
            }
            b']' if in_class => in_class = false,
            _ => {}
        }

        let char_len = pattern[i..].chars().next().map_or(1, char::len_utf8);
        out.push_str(&pattern[i..i + char_len]);
        i += char_len;
    }

    Cow::Owned(out)
}

fn shorthand(escaped: &str, in_class: bool) -> Option<&'static str> {
    let expansion = match (escaped, in_class) {
        ("s", false) => "[[:space:]]",
        ("S", false) => "[^[:space:]]",
        ("d", false) => "[[:digit:]]",
        ("D", false) => "[^[:digit:]]",
        ("w", false) => "[[:alnum:]_]",
        ("W", false) => "[^[:alnum:]_]",
        ("s", true) => "[:space:]",
        ("d", true) => "[:digit:]",
        ("w", true) => "[:alnum:]_",
        _ => return None,
    };
    Some(expansion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn untouched_without_backslash() {
        assert!(matches!(translate_shorthands("[a-z]+"), Cow::Borrowed("[a-z]+")));
    }

    #[test]
    fn negated_space_class() {
        assert_eq!(translate_shorthands(r"[^\s]+"), "[^[:space:]]+");
    }

    #[test]
    fn shorthands_outside_classes() {
        assert_eq!(
            translate_shorthands(r"\d+\s\w\S\D\W"),
            "[[:digit:]]+[[:space:]][[:alnum:]_][^[:space:]][^[:digit:]][^[:alnum:]_]"
        );
    }

    #[test]
    fn positive_shorthands_inside_classes() {
        assert_eq!(translate_shorthands(r"[\w\-.]+"), r"[[:alnum:]_\-.]+");
        assert_eq!(translate_shorthands(r"[\d\s]"), "[[:digit:][:space:]]");
    }

    #[test]
    fn negated_shorthands_inside_classes_pass_through() {
        assert_eq!(translate_shorthands(r"[^\W\d_]"), r"[^\W[:digit:]_]");
    }

    #[test]
    fn other_escapes_pass_through() {
        assert_eq!(translate_shorthands(r"[\r\n]\.\\s"), r"[\r\n]\.\\s");
    }

    #[test]
    fn quoted_strings_are_not_rewritten() {
        assert_eq!(translate_shorthands(r#""\s"\s"#), r#""\s"[[:space:]]"#);
    }

    #[test]
    fn posix_classes_and_leading_bracket_survive() {
        assert_eq!(translate_shorthands(r"[][:alpha:]\s]"), "[][:alpha:][:space:]]");
    }

    #[test]
    fn trailing_backslash_is_kept() {
        assert_eq!(translate_shorthands("a\\"), "a\\");
    }

    #[test]
    fn escaped_multibyte_character() {
        assert_eq!(translate_shorthands("\\é\\s"), "\\é[[:space:]]");
    }
}
