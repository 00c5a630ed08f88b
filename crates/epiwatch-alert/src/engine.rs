use crate::growth::GrowthClassification;
use crate::rules::absolute::AbsoluteRule;
use crate::rules::exponential::ExponentialRule;
use crate::rules::increase::IncreaseRule;
use crate::rules::zero::ZeroRule;
use crate::AlertRule;
use chrono::{NaiveDate, Utc};
use epiwatch_common::types::{AlertEvent, Metric, RegionClass};
use serde::{Deserialize, Serialize};

/// An `(increase, absolute)` limit pair for one metric and region class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitPair {
    pub increase: f64,
    pub absolute: f64,
}

/// The full configured threshold set for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub rolling_period: usize,
    pub national_cases: LimitPair,
    pub national_deaths: LimitPair,
    pub national_positivity: LimitPair,
    pub region_cases: LimitPair,
    pub region_deaths: LimitPair,
    pub exponential_sensitivity: u32,
}

/// One derived reading handed to the engine: the rolling value and delta
/// for a region's metric (either may be missing when the underlying
/// samples are unpublished) and, for case series, the growth
/// classification of the smoothed daily counts.
#[derive(Debug, Clone)]
pub struct MetricObservation {
    pub region: String,
    pub scope: RegionClass,
    pub metric: Metric,
    pub sample_date: NaiveDate,
    pub value: Option<f64>,
    pub delta: Option<f64>,
    pub growth: Option<GrowthClassification>,
}

/// Evaluates observations through the rule set built from one
/// [`AlertThresholds`] record.
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
}

impl AlertEngine {
    pub fn new(thresholds: &AlertThresholds) -> Self {
        let period = thresholds.rolling_period;
        let sensitivity = thresholds.exponential_sensitivity;

        let rules: Vec<Box<dyn AlertRule>> = vec![
            // Nationwide: cases and deaths carry the daily-average adjunct,
            // positivity does not (it is already a rate).
            Box::new(IncreaseRule {
                name: "uk-cases-increase".to_string(),
                metric: Metric::Cases,
                scope: RegionClass::National,
                limit: thresholds.national_cases.increase,
            }),
            Box::new(AbsoluteRule {
                name: "uk-cases-limit".to_string(),
                metric: Metric::Cases,
                scope: RegionClass::National,
                limit: thresholds.national_cases.absolute,
                daily_average_period: Some(period),
            }),
            Box::new(IncreaseRule {
                name: "uk-deaths-increase".to_string(),
                metric: Metric::Deaths,
                scope: RegionClass::National,
                limit: thresholds.national_deaths.increase,
            }),
            Box::new(AbsoluteRule {
                name: "uk-deaths-limit".to_string(),
                metric: Metric::Deaths,
                scope: RegionClass::National,
                limit: thresholds.national_deaths.absolute,
                daily_average_period: Some(period),
            }),
            Box::new(IncreaseRule {
                name: "uk-positivity-increase".to_string(),
                metric: Metric::Positivity,
                scope: RegionClass::National,
                limit: thresholds.national_positivity.increase,
            }),
            Box::new(AbsoluteRule {
                name: "uk-positivity-limit".to_string(),
                metric: Metric::Positivity,
                scope: RegionClass::National,
                limit: thresholds.national_positivity.absolute,
                daily_average_period: None,
            }),
            Box::new(ExponentialRule {
                name: "uk-cases-exponential".to_string(),
                scope: RegionClass::National,
                sensitivity,
            }),
            // Sub-regions: no daily-average adjunct, zero counts are worth
            // an informational line.
            Box::new(IncreaseRule {
                name: "region-cases-increase".to_string(),
                metric: Metric::Cases,
                scope: RegionClass::SubRegion,
                limit: thresholds.region_cases.increase,
            }),
            Box::new(AbsoluteRule {
                name: "region-cases-limit".to_string(),
                metric: Metric::Cases,
                scope: RegionClass::SubRegion,
                limit: thresholds.region_cases.absolute,
                daily_average_period: None,
            }),
            Box::new(ZeroRule {
                name: "region-cases-zero".to_string(),
                metric: Metric::Cases,
                scope: RegionClass::SubRegion,
            }),
            Box::new(IncreaseRule {
                name: "region-deaths-increase".to_string(),
                metric: Metric::Deaths,
                scope: RegionClass::SubRegion,
                limit: thresholds.region_deaths.increase,
            }),
            Box::new(AbsoluteRule {
                name: "region-deaths-limit".to_string(),
                metric: Metric::Deaths,
                scope: RegionClass::SubRegion,
                limit: thresholds.region_deaths.absolute,
                daily_average_period: None,
            }),
            Box::new(ZeroRule {
                name: "region-deaths-zero".to_string(),
                metric: Metric::Deaths,
                scope: RegionClass::SubRegion,
            }),
            Box::new(ExponentialRule {
                name: "region-cases-exponential".to_string(),
                scope: RegionClass::SubRegion,
                sensitivity,
            }),
        ];

        Self { rules }
    }

    pub fn rules(&self) -> &[Box<dyn AlertRule>] {
        &self.rules
    }

    /// Runs every rule registered for the observation's metric and region
    /// class. Rules are independent; the result may hold several events.
    pub fn evaluate(&self, observation: &MetricObservation) -> Vec<AlertEvent> {
        let now = Utc::now();
        let mut events = Vec::new();

        for rule in &self.rules {
            if rule.metric() != observation.metric || rule.scope() != observation.scope {
                continue;
            }
            let fired = rule.evaluate(observation, now);
            if !fired.is_empty() {
                tracing::debug!(
                    rule = rule.name(),
                    region = %observation.region,
                    count = fired.len(),
                    "Rule fired"
                );
            }
            events.extend(fired);
        }

        events
    }
}
