//! ACS Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, text decoding, and logging for the ACS loader workspace.
//!
//! - **Error Handling**: [`AcsError`] and the crate [`Result`] alias
//! - **Encoding**: label resolution and strict decoding of non-UTF-8 source text
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use acs_common::encoding::{decode_bytes, resolve_encoding};
//!
//! fn title(raw: &[u8]) -> acs_common::Result<String> {
//!     let cp1252 = resolve_encoding(Some("windows-1252"))?;
//!     decode_bytes(raw, cp1252)
//! }
//! ```

pub mod encoding;
pub mod error;
pub mod logging;

pub use error::{AcsError, Result};
