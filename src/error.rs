use crate::model::FileFormat;

/// Errors that abort a read.
///
/// Only unrecoverable conditions surface here. Damage inside a single entity
/// category (calendars, resources, tasks, relations, assignments) is captured
/// as a [`Diagnostic`](crate::model::Diagnostic) on the returned project
/// instead, and malformed individual fields silently decode to defaults.
#[derive(Debug, thiserror::Error)]
pub enum MppError {
    /// The container has no entry under the requested name, even after the
    /// prefix/suffix fallback chain.
    #[error("stream not found: {0}")]
    StreamNotFound(String),

    /// The container has no sub-storage under the requested name.
    #[error("storage not found: {0}")]
    StorageNotFound(String),

    /// The format-identifying entry is present but carries no recognizable
    /// format string.
    #[error("file format could not be determined")]
    UndetectableFormat,

    /// The file identifies as a format generation this crate does not read.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file is password protected and the read options honor protection.
    #[error("file is password protected")]
    PasswordProtected,

    /// A mandatory stream is too short to contain its own header.
    #[error("truncated {0} stream")]
    Truncated(&'static str),

    /// A mandatory stream failed structural validation.
    #[error("invalid {stream} stream: {detail}")]
    InvalidStream {
        stream: &'static str,
        detail: String,
    },
}

impl MppError {
    /// Convenience constructor for the generation-8 rejection and friends.
    pub(crate) fn unsupported(format: FileFormat) -> Self {
        MppError::UnsupportedFormat(format.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MppError>;
