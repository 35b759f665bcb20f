//! Lazy token sequences.

use std::iter::FusedIterator;

use crate::{RuntimeError, ScannerHandle, Token};

/// The tokens of one input, pulled from its scanner session on demand.
///
/// Single pass: once the input is exhausted the session is released and
/// every further call to `next` returns `None`. Dropping the stream early
/// releases the session too.
///
/// An item is an error only when a match is not valid UTF-8; the stream can
/// be advanced past it.
pub struct TokenStream {
    handle: Option<ScannerHandle>,
}

impl TokenStream {
    pub(crate) fn new(handle: ScannerHandle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Whether end of input was reached (or the stream was released).
    pub fn is_finished(&self) -> bool {
        self.handle.is_none()
    }

    /// Stop scanning and free the session now.
    pub fn release(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.release();
        }
    }

    /// Give up the stream for its underlying session, if still open.
    pub fn into_handle(mut self) -> Option<ScannerHandle> {
        self.handle.take()
    }
}

impl Iterator for TokenStream {
    type Item = Result<Token, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.handle.as_mut()?;
        match handle.next_token() {
            Some(item) => {
                if let Ok(token) = &item {
                    tracing::trace!(kind = %token.kind, text = ?token.text, "token");
                }
                Some(item)
            }
            None => {
                if let Some(handle) = self.handle.take() {
                    handle.release();
                }
                None
            }
        }
    }
}

impl FusedIterator for TokenStream {}

impl std::fmt::Debug for TokenStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStream")
            .field("finished", &self.is_finished())
            .finish()
    }
}
