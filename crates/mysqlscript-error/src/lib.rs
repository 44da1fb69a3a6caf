use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for script splitting, scanning and rewriting.
///
/// Per-statement syntax failures are normally reported through the
/// front-end callback rather than as `Err`; the variants here cover the
/// conditions that abort a whole run or a library call.
#[derive(Error, Debug)]
pub enum ScriptError {
    // === Input Errors ===
    /// The script is not valid UTF-8 under a multi-byte charset.
    #[error("script is not valid UTF-8 at byte offset {offset}")]
    Encoding { offset: usize },

    /// Script file could not be read.
    #[error("cannot read script '{path}': {source}")]
    ScriptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// A statement delimiter must contain at least one non-blank byte.
    #[error("invalid statement delimiter: {delimiter:?}")]
    InvalidDelimiter { delimiter: String },

    /// Parser options could not be decoded.
    #[error("invalid parser options: {detail}")]
    InvalidOptions { detail: String },

    /// Unknown character set name.
    #[error("unknown character set: {name}")]
    UnknownCharset { name: String },

    // === Parse Errors ===
    /// Syntax error in a single statement.
    #[error("line {line}, column {column}: {message}")]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },

    // === Rewrite Errors ===
    /// An edit started before the end of the previous edit.
    #[error("rewrite at offset {offset} overlaps previous edit ending at {previous_end}")]
    RewriteOutOfOrder { offset: usize, previous_end: usize },

    /// An edit range does not fit the original text.
    #[error("rewrite range {begin}..{end} is invalid for text of {len} bytes")]
    RewriteRange { begin: usize, end: usize, len: usize },

    // === Control ===
    /// The run was cancelled through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal logic error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Numeric error codes, stable across releases for tooling that logs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Generic failure.
    Error = 1,
    /// Internal logic error.
    Internal = 2,
    /// Operation interrupted.
    Interrupt = 9,
    /// I/O failure.
    IoErr = 10,
    /// Library used incorrectly (bad options, bad rewrite range).
    Misuse = 21,
    /// Input is not in the expected encoding.
    Format = 24,
}

impl ScriptError {
    /// Map this error to its numeric code.
    #[allow(clippy::match_same_arms)]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Encoding { .. } => ErrorCode::Format,
            Self::ScriptFile { .. } => ErrorCode::IoErr,
            Self::InvalidDelimiter { .. }
            | Self::InvalidOptions { .. }
            | Self::UnknownCharset { .. }
            | Self::RewriteOutOfOrder { .. }
            | Self::RewriteRange { .. } => ErrorCode::Misuse,
            Self::Syntax { .. } => ErrorCode::Error,
            Self::Cancelled => ErrorCode::Interrupt,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the user can likely fix this without code changes.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Encoding { .. }
                | Self::ScriptFile { .. }
                | Self::InvalidDelimiter { .. }
                | Self::InvalidOptions { .. }
                | Self::UnknownCharset { .. }
                | Self::Syntax { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Encoding { .. } => Some("Convert the script to UTF-8 or select a single-byte charset"),
            Self::ScriptFile { .. } => Some("Check the script path and its permissions"),
            Self::InvalidDelimiter { .. } => Some("Use a non-empty delimiter such as ';' or '$$'"),
            Self::UnknownCharset { .. } => Some("Use utf8, utf8mb4, latin1, ascii or binary"),
            Self::RewriteOutOfOrder { .. } => Some("Apply rewrites in ascending source order"),
            _ => None,
        }
    }

    /// Get the process exit code for this error (for CLI use).
    pub const fn exit_code(&self) -> i32 {
        self.error_code() as i32
    }

    /// Create a syntax error.
    pub fn syntax(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an encoding error.
    pub const fn encoding(offset: usize) -> Self {
        Self::Encoding { offset }
    }

    /// Create an invalid-options error.
    pub fn invalid_options(detail: impl Into<String>) -> Self {
        Self::InvalidOptions {
            detail: detail.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using `ScriptError`.
pub type Result<T> = std::result::Result<T, ScriptError>;
