use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical name of a numeric series field.
///
/// The mapping from a logical field to the dashboard's column identifier
/// (e.g. `Cases` -> `cumCasesBySpecimenDate`) is resolved once at the data
/// source boundary; everything past the parser works with these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Cumulative case count.
    Cases,
    /// Cumulative death count.
    Deaths,
    /// Cumulative pillar-1 test count.
    PillarOneTests,
    /// Cumulative pillar-2 test count.
    PillarTwoTests,
    /// Daily (non-cumulative) new count.
    New,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Cases => write!(f, "cases"),
            Field::Deaths => write!(f, "deaths"),
            Field::PillarOneTests => write!(f, "pillar_one_tests"),
            Field::PillarTwoTests => write!(f, "pillar_two_tests"),
            Field::New => write!(f, "new"),
        }
    }
}

/// One published day of a series, typed at the source boundary.
///
/// A `None` value is an empty field in the published CSV: the figure for
/// that day has not been released yet. A value that is present but does not
/// parse as a float never reaches this type; the parser rejects the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub values: HashMap<Field, Option<f64>>,
}

impl SeriesRow {
    /// The value of `field`, if published for this day.
    pub fn value(&self, field: Field) -> Option<f64> {
        self.values.get(&field).copied().flatten()
    }

    /// Whether `field` carries a published value on this day.
    pub fn has_value(&self, field: Field) -> bool {
        self.value(field).is_some()
    }
}

/// The metric a rolling check or alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cases,
    Deaths,
    Positivity,
}

impl Metric {
    /// Noun phrase used in alert messages (e.g. "rolling number of cases").
    pub fn phrase(&self) -> &'static str {
        match self {
            Metric::Cases => "rolling number of cases",
            Metric::Deaths => "rolling number of deaths",
            Metric::Positivity => "rolling positive test rate",
        }
    }

    /// Format an observed value the way the log messages expect it:
    /// whole counts for cases/deaths, two decimals for a percentage.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Metric::Positivity => format!("{value:.2}"),
            _ => format!("{value:.0}"),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Cases => write!(f, "cases"),
            Metric::Deaths => write!(f, "deaths"),
            Metric::Positivity => write!(f, "positivity"),
        }
    }
}

/// Whether an observation covers the whole nation or one monitored
/// sub-region. Separate threshold pairs apply to each class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionClass {
    National,
    SubRegion,
}

/// What condition an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Rolling value above its absolute limit.
    Absolute,
    /// Rolling delta above its increase limit.
    Increase,
    /// Rolling value exactly zero (sub-regions, informational).
    Zero,
    /// Smoothed daily series classified as growing exponentially.
    Exponential,
}

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use epiwatch_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert!(Severity::Error > Severity::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// One raised alert. Produced by the engine, handed to the sink, not
/// retained anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub region: String,
    pub scope: RegionClass,
    pub metric: Metric,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    /// Specimen/publish date of the newest sample the check was made on.
    pub sample_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}
