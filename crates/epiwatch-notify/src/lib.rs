//! Alert and progress-message delivery.
//!
//! Every message a run produces (raised alerts, progress lines,
//! diagnostics) goes through an [`AlertSink`]. The production
//! implementation is [`log::LogFileSink`], which appends to a persistent
//! log file and mirrors each line to the console.

pub mod error;
pub mod log;

use epiwatch_common::types::Severity;

/// Destination for alert and progress messages.
///
/// A sink records; it never decides. Error-severity messages do not
/// terminate the process from inside the sink; fatality is signalled by
/// the caller propagating its own error to the top level.
pub trait AlertSink: Send + Sync {
    /// Records one message for `component` at the given severity.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying medium cannot be written;
    /// callers treat that as fatal, since an unrecordable run is blind.
    fn record(&self, component: &str, severity: Severity, message: &str) -> error::Result<()>;
}
