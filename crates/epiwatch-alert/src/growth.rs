//! Exponential-growth detection over smoothed daily counts.
//!
//! Log-linear growth corresponds to a geometric process, so a short
//! rolling-average sub-series of daily counts is log-transformed and its
//! successive increments examined: increments clustering evenly above and
//! below their own mean approximate a straight line in log space without
//! any curve fitting. The heuristic deliberately trades precision for
//! simplicity and can mis-classify short noisy sequences.

use chrono::NaiveDate;
use epiwatch_common::types::{Field, SeriesRow};
use serde::{Deserialize, Serialize};

/// One centered rolling-average point of a daily series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Centered `period`-day arithmetic means of a daily series.
///
/// `daily` must be in chronological order. A mean is produced only for
/// indices with at least `period / 2` rows of lookback and lookahead;
/// rows near either edge of the window are dropped. Unpublished daily
/// values contribute zero, matching the rolling-value policy.
pub fn centered_rolling_averages(
    daily: &[SeriesRow],
    field: Field,
    period: usize,
) -> Vec<SmoothedPoint> {
    if period == 0 {
        return Vec::new();
    }
    let half = period / 2;
    let mut points = Vec::new();
    for center in half..daily.len() {
        if center + half >= daily.len() {
            break;
        }
        let window = &daily[center - half..=center + half];
        let sum: f64 = window
            .iter()
            .map(|row| row.value(field).unwrap_or(0.0))
            .sum();
        points.push(SmoothedPoint {
            date: daily[center].date,
            value: sum / window.len() as f64,
        });
    }
    points
}

/// Natural-log transform of a smoothed sub-series.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialSample {
    /// Logs of the positive points, in order. Zero or negative points
    /// cannot contribute a log and are excluded entirely.
    pub logs: Vec<f64>,
    /// Whether the raw (non-logged) sequence's last value exceeds its
    /// first.
    pub increasing: bool,
}

impl ExponentialSample {
    pub fn from_points(points: &[SmoothedPoint]) -> Self {
        let logs = points
            .iter()
            .filter(|point| point.value > 0.0)
            .map(|point| point.value.ln())
            .collect();
        let increasing = match (points.first(), points.last()) {
            (Some(first), Some(last)) => last.value > first.value,
            _ => false,
        };
        Self { logs, increasing }
    }
}

/// Verdict of the increment-balance classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthClassification {
    /// Log increments strictly above their mean.
    pub above: usize,
    /// Log increments strictly below their mean.
    pub below: usize,
    pub exponential: bool,
}

/// Classifies a log-transformed sample.
///
/// Successive increments of the log sequence are counted against their
/// own mean: strictly above, strictly below, ties toward neither. The
/// series is exponential when it is increasing end-to-end and
/// `|above - below| <= sensitivity`. Sensitivity 0 demands an exact
/// balance; larger values relax the classifier. With fewer than two
/// increments the mean defaults to 0 and the verdict is never
/// exponential.
pub fn classify(sample: &ExponentialSample, sensitivity: u32) -> GrowthClassification {
    let increments: Vec<f64> = sample
        .logs
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect();

    let average = if increments.len() < 2 {
        0.0
    } else {
        increments.iter().sum::<f64>() / increments.len() as f64
    };

    let above = increments
        .iter()
        .filter(|&&increment| increment > average)
        .count();
    let below = increments
        .iter()
        .filter(|&&increment| increment < average)
        .count();

    let exponential = increments.len() >= 2
        && sample.increasing
        && above.abs_diff(below) <= sensitivity as usize;

    GrowthClassification {
        above,
        below,
        exponential,
    }
}
