//! Runtime for lexgen scanner modules.
//!
//! A [`ScannerModule`] is a built scanner loaded into the process. Each call
//! to [`scan_string`](ScannerModule::scan_string),
//! [`scan_file`](ScannerModule::scan_file) or
//! [`scan_path`](ScannerModule::scan_path) opens a fresh native session and
//! wraps it in a [`TokenStream`], an iterator of [`Token`]s that frees the
//! session at end of input or when dropped.
//!
//! Sessions are independent: many streams, on one thread or several, can
//! draw from the same module at once. A single stream is `Send` but not
//! `Sync`.
//!
//! ```no_run
//! # fn demo(artifact: &lexgen_build::BuildArtifact) -> Result<(), lexgen_rt::RuntimeError> {
//! use lexgen_rt::ScannerModule;
//!
//! let module = ScannerModule::load(artifact)?;
//! for token in module.scan_string("This is a line.\n")? {
//!     let token = token?;
//!     println!("{} {:?}", token.kind, token.text);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod ffi;
mod handle;
mod module;
mod stream;
mod token;

pub use error::RuntimeError;
pub use handle::ScannerHandle;
pub use module::{FileMode, ScannerModule};
pub use stream::TokenStream;
pub use token::Token;
