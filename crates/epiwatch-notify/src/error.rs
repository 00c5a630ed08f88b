/// Errors raised by the alert sink.
///
/// # Examples
///
/// ```rust
/// use epiwatch_notify::error::SinkError;
///
/// let err = SinkError::Poisoned;
/// assert!(err.to_string().contains("poisoned"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The log file (or a parent directory) could not be opened/created.
    #[error("Could not open log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Appending a line to the log file failed.
    #[error("Could not write log file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file lock was poisoned by a panicking writer.
    #[error("Log file lock poisoned")]
    Poisoned,
}

/// Convenience `Result` alias for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;
