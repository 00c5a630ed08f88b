use crate::engine::MetricObservation;
use crate::AlertRule;
use chrono::{DateTime, Utc};
use epiwatch_common::types::{AlertEvent, AlertKind, Metric, RegionClass, Severity};

/// Fires when the rolling delta exceeds the configured increase limit.
pub struct IncreaseRule {
    pub name: String,
    pub metric: Metric,
    pub scope: RegionClass,
    pub limit: f64,
}

impl AlertRule for IncreaseRule {
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
        let delta = match observation.delta {
            Some(delta) => delta,
            None => return Vec::new(),
        };
        if delta <= self.limit {
            return Vec::new();
        }

        let message = format!(
            "The {} for {} on {} increased by {} which is greater than {}",
            self.metric.phrase(),
            observation.region,
            observation.sample_date,
            self.metric.format_value(delta),
            self.metric.format_value(self.limit),
        );

        vec![AlertEvent {
            region: observation.region.clone(),
            scope: self.scope,
            metric: self.metric,
            kind: AlertKind::Increase,
            severity: Severity::Warning,
            message,
            value: delta,
            threshold: self.limit,
            sample_date: observation.sample_date,
            timestamp: now,
        }]
    }
}
