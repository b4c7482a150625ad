//! Source text decoding
//!
//! The Census lookup catalog ships as Windows-1252 while everything handed to
//! PostgreSQL must be UTF-8. Files are read as raw bytes and decoded here so a
//! bad byte sequence surfaces as an error instead of a mangled comment.

use encoding_rs::{Encoding, UTF_8};

use crate::error::{AcsError, Result};

const CONTEXT_CHARS: usize = 80;

/// Encoding label used by the Census Bureau for the sequence/table lookup file
pub const CATALOG_ENCODING_LABEL: &str = "windows-1252";

/// Resolve an encoding label, falling back to UTF-8 when none is given
pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| AcsError::UnknownEncoding(value.to_string())),
        None => Ok(UTF_8),
    }
}

/// Decode bytes, failing on any malformed sequence
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        let context: String = String::from_utf8_lossy(bytes).chars().take(CONTEXT_CHARS).collect();
        return Err(AcsError::Decode {
            encoding: encoding.name().to_string(),
            context,
        });
    }
    Ok(text.into_owned())
}
