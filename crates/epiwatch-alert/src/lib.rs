//! Rolling statistics and alerting engine.
//!
//! The engine turns cumulative count series into rolling totals, rolling
//! deltas, positivity rates and an exponential-growth classification, and
//! evaluates the derived values through registered [`AlertRule`]
//! implementations. Built-in rule types cover absolute limits, increase
//! limits, zero counts and exponential growth.

pub mod engine;
pub mod error;
pub mod growth;
pub mod rules;
pub mod window;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use engine::MetricObservation;
use epiwatch_common::types::{AlertEvent, Metric, RegionClass};

/// A threshold rule that inspects one derived metric observation and
/// produces zero or more [`AlertEvent`]s.
///
/// Implementations are registered in the [`engine::AlertEngine`] and
/// evaluated for each observation whose metric and region class match the
/// rule's criteria. Rules are independent: several may fire for the same
/// observation. A rule whose input value is missing produces nothing:
/// missing data is reported by the caller, not alerted on.
pub trait AlertRule: Send + Sync {
    /// Short rule name used for logging (e.g. `"cases-increase"`).
    fn name(&self) -> &str;

    /// The metric this rule applies to.
    fn metric(&self) -> Metric;

    /// The region class this rule applies to.
    fn scope(&self) -> RegionClass;

    /// Evaluates the observation and returns any alerts raised.
    fn evaluate(&self, observation: &MetricObservation, now: DateTime<Utc>) -> Vec<AlertEvent>;
}
