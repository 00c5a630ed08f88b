use chrono::NaiveDate;

/// Errors raised by the rolling statistics core.
///
/// # Examples
///
/// ```rust
/// use epiwatch_alert::error::StatsError;
///
/// let err = StatsError::InsufficientData { required: 15, available: 4 };
/// assert!(err.to_string().contains("15"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Windowing was asked for a zero-length rolling period.
    #[error("A rolling period of 0 is not permitted")]
    ZeroPeriod,

    /// The series is too short for the requested window.
    #[error("Series has {available} usable rows, windowing needs {required}")]
    InsufficientData { required: usize, available: usize },

    /// A positivity rate was requested over a window with no test data.
    /// Distinct from a zero rate: nothing was measured.
    #[error("No test data in the rolling window ending {date}")]
    ZeroTestDenominator { date: NaiveDate },
}

/// Convenience `Result` alias for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;
