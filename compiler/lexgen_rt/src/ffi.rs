//! C entry points of a scanner module.

use std::ffi::{c_char, c_int, c_void};

use libloading::Library;

use crate::RuntimeError;

pub(crate) type InitFn = unsafe extern "C" fn();
pub(crate) type ScanFileFn = unsafe extern "C" fn(fd: c_int, mode: *const c_char) -> *mut c_void;
pub(crate) type ScanStringFn =
    unsafe extern "C" fn(bytes: *const c_char, len: usize) -> *mut c_void;
pub(crate) type NextTokenFn = unsafe extern "C" fn(
    handle: *mut c_void,
    text: *mut *const c_char,
    len: *mut usize,
) -> *const c_char;
pub(crate) type FreeScannerFn = unsafe extern "C" fn(handle: *mut c_void);

/// Function pointers resolved from a loaded module.
///
/// The pointers are only valid while the [`Library`] they came from stays
/// loaded; `ScannerModule` keeps the two together.
#[derive(Clone, Copy)]
pub(crate) struct EntryPoints {
    pub init: InitFn,
    #[cfg_attr(not(unix), allow(dead_code, reason = "file sessions are unix-only"))]
    pub scan_file: ScanFileFn,
    pub scan_string: ScanStringFn,
    pub next_token: NextTokenFn,
    pub free_scanner: FreeScannerFn,
}

impl EntryPoints {
    /// Resolve every entry point.
    ///
    /// # Safety
    ///
    /// `library` must be a module rendered by `lexgen_emit`, so that each
    /// symbol has the signature of its alias above.
    pub(crate) unsafe fn resolve(library: &Library) -> Result<Self, RuntimeError> {
        // SAFETY: forwarded from the caller.
        unsafe {
            Ok(Self {
                init: symbol(library, "lexgen_init")?,
                scan_file: symbol(library, "scan_file")?,
                scan_string: symbol(library, "scan_string")?,
                next_token: symbol(library, "next_token")?,
                free_scanner: symbol(library, "free_scanner")?,
            })
        }
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T, RuntimeError> {
    // SAFETY: the caller guarantees `T` matches the exported symbol.
    unsafe { library.get::<T>(name.as_bytes()) }
        .map(|symbol| *symbol)
        .map_err(|source| RuntimeError::MissingSymbol {
            symbol: name,
            source,
        })
}
