//! The CLI's own error type, wrapping [`rlzip_core::error::Error`] with the
//! argument/usage mistakes that never reach the codec.
//!
//! This is what lets `main` pick one of the exit-status codes from the
//! ambient stack's §6 convention instead of always exiting `1` on any
//! `Err`: a usage mistake is `1` (environmental), but a codec `DataError`
//! or friends is `2` (corrupt input), and an `InternalError` is `3`.

use std::fmt;

/// Errors `rlzip-cli` commands can return.
#[derive(Debug)]
pub enum CliError {
    /// A command-line usage mistake (no files, `--output` with several
    /// inputs, an unrecognized suffix with no `--output` override).
    Usage(String),
    /// Anything from the codec/format stack.
    Codec(rlzip_core::error::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "{msg}"),
            Self::Codec(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Usage(_) => None,
            Self::Codec(e) => Some(e),
        }
    }
}

impl From<rlzip_core::error::Error> for CliError {
    fn from(e: rlzip_core::error::Error) -> Self {
        Self::Codec(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Codec(rlzip_core::error::Error::Io(e))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Codec(rlzip_core::error::Error::Io(e.into()))
    }
}

impl From<&str> for CliError {
    fn from(msg: &str) -> Self {
        Self::Usage(msg.to_string())
    }
}

impl From<String> for CliError {
    fn from(msg: String) -> Self {
        Self::Usage(msg)
    }
}

impl CliError {
    /// The process exit status this error maps to, per the core's exit-code
    /// convention: `1` environmental, `2` corrupt input, `3` internal.
    pub fn exit_code(&self) -> i32 {
        use rlzip_core::error::Error::*;
        match self {
            Self::Usage(_) => 1,
            Self::Codec(Io(_) | OutOfMemory { .. }) => 1,
            Self::Codec(BadMagic { .. } | UnsupportedVersion { .. } | BadDictionarySize { .. }) => 2,
            Self::Codec(DataError { .. } | TrailingGarbage { .. }) => 2,
            Self::Codec(InternalError { .. }) => 3,
        }
    }
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
