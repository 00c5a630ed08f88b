/// Errors raised at the data-source boundary.
///
/// # Examples
///
/// ```rust
/// use epiwatch_source::error::SourceError;
///
/// let err = SourceError::MissingColumn("cases".to_string());
/// assert!(err.to_string().contains("cases"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// An underlying HTTP transport error from `reqwest`.
    #[error("Network error: {0}")]
    Retrieval(#[from] reqwest::Error),

    /// The dashboard answered with a non-success status code.
    #[error("Dashboard API HTTP error: status={status}, body={body}")]
    Status { status: u16, body: String },

    /// The response header row does not contain a requested column.
    #[error("Response is missing column '{0}'")]
    MissingColumn(String),

    /// A data row has a different number of columns than the header.
    #[error("Row {row}: expected {expected} columns, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A non-empty numeric field failed to parse as a float.
    #[error("Row {row}: malformed value '{value}' in column '{column}'")]
    MalformedValue {
        row: usize,
        column: String,
        value: String,
    },

    /// The date field failed to parse.
    #[error("Row {row}: malformed date '{value}'")]
    MalformedDate { row: usize, value: String },
}

/// Convenience `Result` alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
