use crate::config::RunConfig;
use chrono::NaiveDate;
use epiwatch_notify::AlertSink;

/// Everything one invocation needs: the open sink, the parsed
/// configuration, the run date and the failure policy. Constructed once
/// in `main` and passed by reference, never a global.
pub struct RunContext<'a> {
    pub config: &'a RunConfig,
    pub sink: &'a dyn AlertSink,
    pub today: NaiveDate,
    /// When set, a failed region fetch aborts the whole run instead of
    /// being isolated to that region.
    pub fail_fast: bool,
}
