//! Error types for the bute crate

use thiserror::Error;

/// Result type alias for bute operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, querying or saving attribute files
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed literal or character the scanner cannot classify
    #[error("lexical error at line {line}: {message}")]
    Lex { line: usize, message: String },

    /// A specific token class was required but something else was found
    #[error("syntax error at line {line}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },

    /// Queried tag (group) does not exist
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// Queried attribute does not exist within the tag
    #[error("attribute not found: {tag}.{attr}")]
    AttrNotFound { tag: String, attr: String },

    /// Stored value cannot be read as the requested type
    #[error("type error: expected {expected}, got {actual}")]
    TypeError { expected: String, actual: String },

    /// Cipher key was rejected by the key schedule
    #[error("invalid cipher key length")]
    BadKey,

    /// Encrypted payload is structurally invalid
    #[error("cipher error: {0}")]
    Cipher(String),

    /// Source bytes are not valid UTF-8
    #[error("invalid utf-8 in source: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// I/O error from the underlying byte stream
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
