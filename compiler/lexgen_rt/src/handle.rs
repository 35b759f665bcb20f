//! Native scanner sessions.

use std::ffi::{c_char, c_void, CStr};
use std::ptr::{self, NonNull};
use std::sync::Arc;

use crate::{RuntimeError, ScannerModule, Token};

/// One scanner session inside a loaded module: the flex scanner state and
/// the input buffer it reads from.
///
/// Owned by exactly one [`TokenStream`](crate::TokenStream). The session is
/// freed exactly once, either by [`release`](Self::release) or on drop.
/// Because `release` takes the handle by value, using a handle after
/// releasing it, or releasing it twice, does not compile:
///
/// ```compile_fail
/// fn twice(handle: lexgen_rt::ScannerHandle) {
///     handle.release();
///     handle.release();
/// }
/// ```
pub struct ScannerHandle {
    raw: NonNull<c_void>,
    module: Arc<ScannerModule>,
}

// SAFETY: a session is only touched through `&mut self` or by value, and the
// module code keeps no thread-local state, so moving it between threads is
// sound. It is deliberately not `Sync`.
unsafe impl Send for ScannerHandle {}

impl ScannerHandle {
    pub(crate) fn new(module: Arc<ScannerModule>, raw: NonNull<c_void>) -> Self {
        Self { raw, module }
    }

    pub fn module(&self) -> &Arc<ScannerModule> {
        &self.module
    }

    /// Pull the next match, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Result<Token, RuntimeError>> {
        let mut text: *const c_char = ptr::null();
        let mut len: usize = 0;
        let next_token = self.module.entry().next_token;
        // SAFETY: `raw` is a live session of this module; `text` and `len`
        // are valid out-pointers.
        let kind = unsafe { next_token(self.raw.as_ptr(), &mut text, &mut len) };
        if kind.is_null() {
            return None;
        }

        // SAFETY: `kind` points at one of the module's NUL-terminated rule
        // names, which live as long as the module.
        let kind = unsafe { CStr::from_ptr(kind) };
        let bytes: &[u8] = if text.is_null() || len == 0 {
            &[]
        } else {
            // SAFETY: the scanner reports `len` bytes of matched text at
            // `text`, valid until the next call on this session.
            unsafe { std::slice::from_raw_parts(text.cast::<u8>(), len) }
        };
        Some(Token::from_raw(kind, bytes))
    }

    /// Free the session now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ScannerHandle {
    fn drop(&mut self) {
        tracing::trace!(module = %self.module.path().display(), "releasing scanner session");
        // SAFETY: `raw` is live and this is the only place it is freed; after
        // `drop` the handle no longer exists.
        unsafe { (self.module.entry().free_scanner)(self.raw.as_ptr()) };
    }
}
