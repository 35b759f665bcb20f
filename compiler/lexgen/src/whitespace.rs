//! Whitespace tokenizer: words grouped into lines.
//!
//! Two rules, `token = [^\s]+` and `line_end = [\r\n]`. Every `line_end`
//! closes the current line, so blank lines come out as empty vectors. A final
//! line without a trailing newline is still produced.

use lexgen_rt::{RuntimeError, TokenStream};
use lexgen_rules::PatternSpec;

use crate::{Error, Lexgen, Scanner};

pub const TOKEN: &str = "token";
pub const LINE_END: &str = "line_end";

/// The pattern list behind [`WhitespaceTokenizer`].
pub fn rules() -> [PatternSpec; 2] {
    [
        PatternSpec::emitting(TOKEN, r"[^\s]+"),
        PatternSpec::emitting(LINE_END, r"[\r\n]"),
    ]
}

#[derive(Debug, Clone)]
pub struct WhitespaceTokenizer {
    scanner: Scanner,
}

impl WhitespaceTokenizer {
    pub fn new(lexgen: &Lexgen) -> Result<Self, Error> {
        Ok(Self {
            scanner: lexgen.compile(&rules())?,
        })
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Lines of `input`, lazily.
    pub fn lines(&self, input: impl AsRef<[u8]>) -> Result<Lines, Error> {
        Ok(Lines::new(self.scanner.scan_string(input)?))
    }

    /// Every line of `input`.
    pub fn tokenize(&self, input: impl AsRef<[u8]>) -> Result<Vec<Vec<String>>, Error> {
        Ok(self.lines(input)?.collect::<Result<_, _>>()?)
    }
}

/// Groups a token stream into lines.
#[derive(Debug)]
pub struct Lines {
    tokens: TokenStream,
    line: Vec<String>,
    /// Whether `line` holds tokens not yet followed by a `line_end`.
    pending: bool,
}

impl Lines {
    pub fn new(tokens: TokenStream) -> Self {
        Self {
            tokens,
            line: Vec::new(),
            pending: false,
        }
    }
}

impl Iterator for Lines {
    type Item = Result<Vec<String>, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.tokens.next() {
                Some(Ok(token)) if token.is(LINE_END) => {
                    self.pending = false;
                    return Some(Ok(std::mem::take(&mut self.line)));
                }
                Some(Ok(token)) => {
                    self.line.push(token.text);
                    self.pending = true;
                }
                Some(Err(e)) => return Some(Err(e)),
                None if self.pending => {
                    self.pending = false;
                    return Some(Ok(std::mem::take(&mut self.line)));
                }
                None => return None,
            }
        }
    }
}
