//! Loaded scanner modules.

use std::ffi::c_char;
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

use lexgen_build::BuildArtifact;
use libloading::Library;

use crate::ffi::EntryPoints;
use crate::{RuntimeError, ScannerHandle, TokenStream};

/// How a file is opened on the C side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    /// `"r"`
    #[default]
    Text,
    /// `"rb"`
    Binary,
}

impl FileMode {
    /// NUL-terminated `fopen` mode.
    #[cfg_attr(not(unix), allow(dead_code, reason = "file sessions are unix-only"))]
    pub(crate) fn as_c_mode(self) -> *const c_char {
        let mode: &'static [u8] = match self {
            Self::Text => b"r\0",
            Self::Binary => b"rb\0",
        };
        mode.as_ptr().cast()
    }
}

/// A scanner module mapped into this process.
///
/// Shared through an [`Arc`]: every scanner session holds a reference, so the
/// library stays loaded until the last session is released.
pub struct ScannerModule {
    path: PathBuf,
    entry: EntryPoints,
    _library: Library,
}

impl fmt::Debug for ScannerModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerModule")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ScannerModule {
    /// Load the module a build produced.
    pub fn load(artifact: &BuildArtifact) -> Result<Arc<Self>, RuntimeError> {
        Self::load_path(artifact.module_path())
    }

    /// Load a module from `path`, resolve its entry points and initialise its
    /// token slots.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load_path(path: &Path) -> Result<Arc<Self>, RuntimeError> {
        // SAFETY: scanner modules have no load-time initialisers beyond the C
        // runtime's own.
        let library = unsafe { Library::new(path) }.map_err(|source| RuntimeError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        // SAFETY: the module was rendered by `lexgen_emit`.
        let entry = unsafe { EntryPoints::resolve(&library)? };
        // SAFETY: `lexgen_init` takes no arguments and is idempotent.
        unsafe { (entry.init)() };

        tracing::debug!("loaded scanner module");
        Ok(Arc::new(Self {
            path: path.to_path_buf(),
            entry,
            _library: library,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a session over an in-memory input.
    ///
    /// The bytes are copied into the session; `input` need not outlive the
    /// returned stream.
    pub fn scan_string(
        self: &Arc<Self>,
        input: impl AsRef<[u8]>,
    ) -> Result<TokenStream, RuntimeError> {
        let input = input.as_ref();
        // SAFETY: pointer and length describe `input`, which the module copies
        // before returning.
        let raw = unsafe { (self.entry.scan_string)(input.as_ptr().cast(), input.len()) };
        self.session(raw, "a string").map(TokenStream::new)
    }

    /// Start a session reading from an open file.
    ///
    /// The module duplicates the descriptor, so `file` may be closed while
    /// the stream is still in use.
    #[cfg(unix)]
    pub fn scan_file(
        self: &Arc<Self>,
        file: &impl std::os::fd::AsFd,
        mode: FileMode,
    ) -> Result<TokenStream, RuntimeError> {
        use std::os::fd::AsRawFd;

        let fd = file.as_fd().as_raw_fd();
        // SAFETY: `fd` is open for the duration of the call and `mode` is a
        // NUL-terminated literal.
        let raw = unsafe { (self.entry.scan_file)(fd, mode.as_c_mode()) };
        self.session(raw, "a file").map(TokenStream::new)
    }

    /// Start a session over the file at `path`.
    pub fn scan_path(
        self: &Arc<Self>,
        path: impl AsRef<Path>,
    ) -> Result<TokenStream, RuntimeError> {
        #[cfg(unix)]
        {
            let file = std::fs::File::open(path)?;
            self.scan_file(&file, FileMode::Binary)
        }
        #[cfg(not(unix))]
        {
            let bytes = std::fs::read(path)?;
            self.scan_string(bytes)
        }
    }

    fn session(
        self: &Arc<Self>,
        raw: *mut std::ffi::c_void,
        input: &'static str,
    ) -> Result<ScannerHandle, RuntimeError> {
        let raw = NonNull::new(raw).ok_or(RuntimeError::Init { input })?;
        Ok(ScannerHandle::new(Arc::clone(self), raw))
    }

    pub(crate) fn entry(&self) -> &EntryPoints {
        &self.entry
    }
}
