use crate::engine::MetricObservation;
use crate::AlertRule;
use chrono::{DateTime, Utc};
use epiwatch_common::types::{AlertEvent, AlertKind, Metric, RegionClass, Severity};

/// Fires when the growth detector classifies the region's smoothed daily
/// case series as exponential. Only case series are analysed.
pub struct ExponentialRule {
    pub name: String,
    pub scope: RegionClass,
    pub sensitivity: u32,
}

impl AlertRule for ExponentialRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric(&self) -> Metric {
        Metric::Cases
    }

    fn scope(&self) -> RegionClass {
        self.scope
    }

    fn evaluate(&self, observation: &MetricObservation, now: DateTime<Utc>) -> Vec<AlertEvent> {
        let classification = match observation.growth {
            Some(classification) if classification.exponential => classification,
            _ => return Vec::new(),
        };

        vec![AlertEvent {
            region: observation.region.clone(),
            scope: self.scope,
            metric: Metric::Cases,
            kind: AlertKind::Exponential,
            severity: Severity::Warning,
            message: format!(
                "The rolling average of new cases for {} on {} appears to be growing exponentially",
                observation.region, observation.sample_date,
            ),
            value: classification.above.abs_diff(classification.below) as f64,
            threshold: self.sensitivity as f64,
            sample_date: observation.sample_date,
            timestamp: now,
        }]
    }
}
