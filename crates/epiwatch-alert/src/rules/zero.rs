use crate::engine::MetricObservation;
use crate::AlertRule;
use chrono::{DateTime, Utc};
use epiwatch_common::types::{AlertEvent, AlertKind, Metric, RegionClass, Severity};

/// Fires an informational event when a sub-region's rolling value is
/// exactly zero. Informational only, never a warning.
pub struct ZeroRule {
    pub name: String,
    pub metric: Metric,
    pub scope: RegionClass,
}

impl AlertRule for ZeroRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn scope(&self) -> RegionClass {
        self.scope
    }

    fn evaluate(&self, observation: &MetricObservation, now: DateTime<Utc>) -> Vec<AlertEvent> {
        match observation.value {
            Some(value) if value == 0.0 => vec![AlertEvent {
                region: observation.region.clone(),
                scope: self.scope,
                metric: self.metric,
                kind: AlertKind::Zero,
                severity: Severity::Info,
                message: format!(
                    "The {} for {} on {} was 0",
                    self.metric.phrase(),
                    observation.region,
                    observation.sample_date,
                ),
                value,
                threshold: 0.0,
                sample_date: observation.sample_date,
                timestamp: now,
            }],
            _ => Vec::new(),
        }
    }
}
