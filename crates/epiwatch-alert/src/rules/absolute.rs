use crate::engine::MetricObservation;
use crate::AlertRule;
use chrono::{DateTime, Utc};
use epiwatch_common::types::{AlertEvent, AlertKind, Metric, RegionClass, Severity};

/// Fires when the rolling value exceeds the configured absolute limit.
///
/// For the nationwide cases and deaths checks the same firing also emits
/// an informational daily-average event (`value / period`), so a breach
/// reads both as a rolling total and as a per-day rate.
pub struct AbsoluteRule {
    pub name: String,
    pub metric: Metric,
    pub scope: RegionClass,
    pub limit: f64,
    /// `Some(period)` enables the daily-average adjunct.
    pub daily_average_period: Option<usize>,
}

impl AlertRule for AbsoluteRule {
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
        let value = match observation.value {
            Some(value) => value,
            None => return Vec::new(),
        };
        if value <= self.limit {
            return Vec::new();
        }

        let message = format!(
            "The {} for {} on {} was {} which is greater than {}",
            self.metric.phrase(),
            observation.region,
            observation.sample_date,
            self.metric.format_value(value),
            self.metric.format_value(self.limit),
        );

        let mut events = vec![AlertEvent {
            region: observation.region.clone(),
            scope: self.scope,
            metric: self.metric,
            kind: AlertKind::Absolute,
            severity: Severity::Warning,
            message,
            value,
            threshold: self.limit,
            sample_date: observation.sample_date,
            timestamp: now,
        }];

        if let Some(period) = self.daily_average_period {
            let noun = match self.metric {
                Metric::Cases => "case",
                Metric::Deaths => "death",
                Metric::Positivity => "positive test",
            };
            let daily_average = value / period as f64;
            events.push(AlertEvent {
                region: observation.region.clone(),
                scope: self.scope,
                metric: self.metric,
                kind: AlertKind::Absolute,
                severity: Severity::Info,
                message: format!(
                    "The average daily {noun} rate for {} on {} was {daily_average:.0}",
                    observation.region, observation.sample_date,
                ),
                value: daily_average,
                threshold: self.limit,
                sample_date: observation.sample_date,
                timestamp: now,
            });
        }

        events
    }
}
