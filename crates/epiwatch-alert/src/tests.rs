use crate::engine::{AlertEngine, AlertThresholds, LimitPair, MetricObservation};
use crate::error::StatsError;
use crate::growth::{
    centered_rolling_averages, classify, ExponentialSample, GrowthClassification, SmoothedPoint,
};
use crate::window::{skip_leading_incomplete, RollingWindow};
use chrono::NaiveDate;
use epiwatch_common::types::{AlertKind, Field, Metric, RegionClass, SeriesRow, Severity};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 11, day).unwrap()
}

fn row(day: u32, values: &[(Field, Option<f64>)]) -> SeriesRow {
    SeriesRow {
        date: date(day),
        values: values.iter().cloned().collect(),
    }
}

/// Newest-first cumulative rows for one field, one day apart, newest on
/// 2020-11-30.
fn cumulative_rows(field: Field, newest_first: &[Option<f64>]) -> Vec<SeriesRow> {
    newest_first
        .iter()
        .enumerate()
        .map(|(offset, value)| row(30 - offset as u32, &[(field, *value)]))
        .collect()
}

fn observation(
    region: &str,
    scope: RegionClass,
    metric: Metric,
    value: Option<f64>,
    delta: Option<f64>,
) -> MetricObservation {
    MetricObservation {
        region: region.to_string(),
        scope,
        metric,
        sample_date: date(30),
        value,
        delta,
        growth: None,
    }
}

fn thresholds() -> AlertThresholds {
    AlertThresholds {
        rolling_period: 7,
        national_cases: LimitPair {
            increase: 500.0,
            absolute: 3500.0,
        },
        national_deaths: LimitPair {
            increase: 0.0,
            absolute: 10.0,
        },
        national_positivity: LimitPair {
            increase: 0.02,
            absolute: 0.6,
        },
        region_cases: LimitPair {
            increase: 3.0,
            absolute: 3.0,
        },
        region_deaths: LimitPair {
            increase: 0.0,
            absolute: 10.0,
        },
        exponential_sensitivity: 0,
    }
}

// ---- Windowing and rolling arithmetic ----

#[test]
fn window_samples_expected_rows() {
    // Newest-first cumulative series with samples (A, B, C) = (100, 145, 210)
    let rows = cumulative_rows(
        Field::Cases,
        &[Some(210.0), Some(175.0), Some(145.0), Some(120.0), Some(100.0)],
    );
    let window = RollingWindow::from_rows(&rows, 2).unwrap();

    assert_eq!(window.sample_date(), date(30));
    assert_eq!(window.rolling_value(Field::Cases), 65.0);
    assert_eq!(window.penultimate_rolling_value(Field::Cases), 45.0);
    assert_eq!(window.rolling_delta(Field::Cases), Some(20.0));
}

#[test]
fn window_rejects_short_series() {
    let rows = cumulative_rows(
        Field::Cases,
        &[Some(210.0), Some(175.0), Some(145.0), Some(120.0)],
    );
    let err = RollingWindow::from_rows(&rows, 2).unwrap_err();

    assert!(matches!(
        err,
        StatsError::InsufficientData {
            required: 5,
            available: 4,
        }
    ));
}

#[test]
fn window_rejects_zero_period() {
    let rows = cumulative_rows(Field::Cases, &[Some(210.0)]);
    assert!(matches!(
        RollingWindow::from_rows(&rows, 0).unwrap_err(),
        StatsError::ZeroPeriod
    ));
}

#[test]
fn constant_increment_yields_flat_delta() {
    // Daily increment of 5: rolling value must be 5 * period, delta 0.
    let values: Vec<Option<f64>> = (0..7).map(|offset| Some(130.0 - 5.0 * offset as f64)).collect();
    let rows = cumulative_rows(Field::Cases, &values);
    let window = RollingWindow::from_rows(&rows, 3).unwrap();

    assert_eq!(window.rolling_value(Field::Cases), 15.0);
    assert_eq!(window.rolling_delta(Field::Cases), Some(0.0));
}

#[test]
fn delta_is_difference_of_rolling_values() {
    let rows = cumulative_rows(
        Field::Deaths,
        &[Some(500.0), Some(430.0), Some(380.0), Some(300.0), Some(250.0)],
    );
    let window = RollingWindow::from_rows(&rows, 2).unwrap();

    let latest = window.rolling_value(Field::Deaths);
    let penultimate = window.penultimate_rolling_value(Field::Deaths);
    assert_eq!(window.rolling_delta(Field::Deaths), Some(latest - penultimate));
}

#[test]
fn rolling_value_is_soft_zero_on_missing_sample() {
    let rows = cumulative_rows(
        Field::Cases,
        &[Some(210.0), Some(175.0), None, Some(120.0), Some(100.0)],
    );
    let window = RollingWindow::from_rows(&rows, 2).unwrap();

    // Middle sample unpublished: value degrades to 0, delta is unknowable.
    assert_eq!(window.rolling_value(Field::Cases), 0.0);
    assert_eq!(window.rolling_delta(Field::Cases), None);
}

#[test]
fn skip_leading_incomplete_drops_unpublished_rows() {
    let rows = cumulative_rows(
        Field::Cases,
        &[None, None, Some(145.0), Some(120.0), Some(100.0)],
    );
    let usable = skip_leading_incomplete(&rows, Field::Cases);

    assert_eq!(usable.len(), 3);
    assert_eq!(usable[0].value(Field::Cases), Some(145.0));
}

#[test]
fn skip_leading_incomplete_handles_fully_unpublished_series() {
    let rows = cumulative_rows(Field::Cases, &[None, None, None]);
    assert!(skip_leading_incomplete(&rows, Field::Cases).is_empty());
}

// ---- Positivity rates ----

fn positivity_rows(scale: f64) -> Vec<SeriesRow> {
    let cases = [150.0, 120.0, 100.0, 80.0, 60.0];
    let pillar_one = [1400.0, 1200.0, 1000.0, 850.0, 700.0];
    let pillar_two = [2600.0, 2300.0, 2000.0, 1600.0, 1200.0];

    (0..5)
        .map(|offset| {
            row(
                30 - offset as u32,
                &[
                    (Field::Cases, Some(cases[offset] * scale)),
                    (Field::PillarOneTests, Some(pillar_one[offset] * scale)),
                    (Field::PillarTwoTests, Some(pillar_two[offset] * scale)),
                ],
            )
        })
        .collect()
}

#[test]
fn positivity_rate_combines_both_test_pillars() {
    // Rolling cases 50 over rolling tests 400 + 600 -> 5.0 percent.
    let window = RollingWindow::from_rows(&positivity_rows(1.0), 2).unwrap();
    let rates = window
        .positivity_rates(Field::Cases, Field::PillarOneTests, Field::PillarTwoTests)
        .unwrap();

    assert!((rates.latest - 5.0).abs() < 1e-9);
    assert!((rates.penultimate - 40.0 / 1100.0 * 100.0).abs() < 1e-9);
}

#[test]
fn positivity_rate_is_scale_invariant() {
    let base = RollingWindow::from_rows(&positivity_rows(1.0), 2)
        .unwrap()
        .positivity_rates(Field::Cases, Field::PillarOneTests, Field::PillarTwoTests)
        .unwrap();
    let doubled = RollingWindow::from_rows(&positivity_rows(2.0), 2)
        .unwrap()
        .positivity_rates(Field::Cases, Field::PillarOneTests, Field::PillarTwoTests)
        .unwrap();

    assert!((base.latest - doubled.latest).abs() < 1e-9);
    assert!((base.penultimate - doubled.penultimate).abs() < 1e-9);
}

#[test]
fn positivity_with_no_tests_is_a_distinct_failure() {
    // Test counters frozen: every rolling test total is 0.
    let rows: Vec<SeriesRow> = (0..5)
        .map(|offset| {
            row(
                30 - offset as u32,
                &[
                    (Field::Cases, Some(100.0 + offset as f64)),
                    (Field::PillarOneTests, Some(5000.0)),
                    (Field::PillarTwoTests, Some(8000.0)),
                ],
            )
        })
        .collect();
    let window = RollingWindow::from_rows(&rows, 2).unwrap();

    let err = window
        .positivity_rates(Field::Cases, Field::PillarOneTests, Field::PillarTwoTests)
        .unwrap_err();
    assert!(matches!(err, StatsError::ZeroTestDenominator { .. }));
}

// ---- Growth detection ----

/// Chronological daily rows with the given new-count values, one day
/// apart, oldest on 2020-11-01.
fn daily_rows(values: &[f64]) -> Vec<SeriesRow> {
    values
        .iter()
        .enumerate()
        .map(|(offset, value)| row(1 + offset as u32, &[(Field::New, Some(*value))]))
        .collect()
}

/// Smoothed points with the given values, one day apart, oldest on
/// 2020-11-01.
fn smoothed_points(values: &[f64]) -> Vec<SmoothedPoint> {
    values
        .iter()
        .enumerate()
        .map(|(offset, value)| SmoothedPoint {
            date: date(1 + offset as u32),
            value: *value,
        })
        .collect()
}

#[test]
fn centered_averages_drop_window_edges() {
    let daily = daily_rows(&[
        1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0,
    ]);
    let points = centered_rolling_averages(&daily, Field::New, 7);

    // 13 rows, 3 dropped at each edge: 7 centered means.
    assert_eq!(points.len(), 7);
    assert_eq!(points[0].date, date(4));
    assert!((points[0].value - 4.0).abs() < 1e-9);
    assert!((points[6].value - 10.0).abs() < 1e-9);
}

#[test]
fn centered_averages_need_enough_lookback() {
    let daily = daily_rows(&[1.0, 2.0, 3.0]);
    assert!(centered_rolling_averages(&daily, Field::New, 7).is_empty());
}

#[test]
fn geometric_sequence_is_exponential_at_zero_sensitivity() {
    // Perfect doubling: log increments are all ln(2), so none sits
    // strictly above or below the mean.
    let points = smoothed_points(&[1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]);
    let sample = ExponentialSample::from_points(&points);
    let classification = classify(&sample, 0);

    assert!(sample.increasing);
    assert_eq!(classification.above, 0);
    assert_eq!(classification.below, 0);
    assert!(classification.exponential);
}

#[test]
fn decreasing_sequence_is_never_exponential() {
    let points = smoothed_points(&[64.0, 32.0, 16.0, 8.0, 4.0, 2.0, 1.0]);
    let sample = ExponentialSample::from_points(&points);

    assert!(!sample.increasing);
    assert!(!classify(&sample, 0).exponential);
}

#[test]
fn tie_increments_count_toward_neither_side() {
    // Log values 0, 1, 3, 6: increments 1, 2, 3 with mean 2. The middle
    // increment ties the mean and must not be counted either way.
    let points = smoothed_points(&[1.0, 1.0_f64.exp(), 3.0_f64.exp(), 6.0_f64.exp()]);
    let classification = classify(&ExponentialSample::from_points(&points), 0);

    assert_eq!(classification.above, 1);
    assert_eq!(classification.below, 1);
    assert!(classification.exponential);
}

#[test]
fn single_increment_is_never_exponential() {
    let points = smoothed_points(&[1.0, 2.0]);
    let classification = classify(&ExponentialSample::from_points(&points), 5);

    assert!(!classification.exponential);
}

#[test]
fn nonpositive_points_are_excluded_from_logs() {
    let points = smoothed_points(&[0.0, 1.0, 2.0, 4.0, 8.0]);
    let sample = ExponentialSample::from_points(&points);

    assert_eq!(sample.logs.len(), 4);
    assert!(sample.increasing);
}

// ---- Alert engine ----

#[test]
fn increase_alert_fires_above_limit() {
    let engine = AlertEngine::new(&thresholds());
    let obs = observation(
        "UK",
        RegionClass::National,
        Metric::Cases,
        Some(1000.0),
        Some(600.0),
    );
    let events = engine.evaluate(&obs);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::Increase);
    assert_eq!(events[0].severity, Severity::Warning);
    assert!(events[0].message.contains("greater than"));
}

#[test]
fn national_absolute_breach_adds_daily_average() {
    let engine = AlertEngine::new(&thresholds());
    let obs = observation(
        "UK",
        RegionClass::National,
        Metric::Cases,
        Some(4200.0),
        Some(100.0),
    );
    let events = engine.evaluate(&obs);

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, AlertKind::Absolute);
    assert_eq!(events[0].severity, Severity::Warning);
    assert_eq!(events[1].severity, Severity::Info);
    assert_eq!(events[1].value, 600.0);
    assert!(events[1].message.contains("average daily case rate"));
}

#[test]
fn flat_rolling_totals_never_raise_increase_alert() {
    // Identical rolling totals across consecutive windows: delta 0 can
    // never clear a non-negative limit.
    let engine = AlertEngine::new(&thresholds());
    let obs = observation(
        "Worthing",
        RegionClass::SubRegion,
        Metric::Cases,
        Some(2.0),
        Some(0.0),
    );
    let events = engine.evaluate(&obs);

    assert!(!events.iter().any(|event| event.kind == AlertKind::Increase));
}

#[test]
fn zero_rolling_count_is_informational() {
    let engine = AlertEngine::new(&thresholds());
    let obs = observation(
        "Adur",
        RegionClass::SubRegion,
        Metric::Cases,
        Some(0.0),
        Some(0.0),
    );
    let events = engine.evaluate(&obs);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::Zero);
    assert_eq!(events[0].severity, Severity::Info);
}

#[test]
fn missing_observation_raises_nothing() {
    let engine = AlertEngine::new(&thresholds());
    let obs = observation("Arun", RegionClass::SubRegion, Metric::Deaths, None, None);

    assert!(engine.evaluate(&obs).is_empty());
}

#[test]
fn exponential_classification_raises_warning() {
    let engine = AlertEngine::new(&thresholds());
    let mut obs = observation("UK", RegionClass::National, Metric::Cases, None, None);
    obs.growth = Some(GrowthClassification {
        above: 2,
        below: 2,
        exponential: true,
    });
    let events = engine.evaluate(&obs);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::Exponential);
    assert_eq!(events[0].severity, Severity::Warning);
    assert!(events[0].message.contains("exponentially"));
}

#[test]
fn sub_region_observation_uses_sub_region_limits() {
    // 4000 rolling cases clears the sub-region limit (3) but the national
    // daily-average adjunct must not appear for a sub-region.
    let engine = AlertEngine::new(&thresholds());
    let obs = observation(
        "Oxford",
        RegionClass::SubRegion,
        Metric::Cases,
        Some(4000.0),
        Some(0.0),
    );
    let events = engine.evaluate(&obs);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AlertKind::Absolute);
    assert!(!events.iter().any(|event| event.severity == Severity::Info));
}

#[test]
fn positivity_breaches_fire_without_daily_average() {
    let engine = AlertEngine::new(&thresholds());
    let obs = observation(
        "UK",
        RegionClass::National,
        Metric::Positivity,
        Some(0.7),
        Some(0.03),
    );
    let events = engine.evaluate(&obs);

    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|event| event.kind == AlertKind::Increase));
    assert!(events.iter().any(|event| event.kind == AlertKind::Absolute));
    assert!(!events.iter().any(|event| event.severity == Severity::Info));
}
