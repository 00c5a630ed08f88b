//! Series windowing and rolling arithmetic.
//!
//! A [`RollingWindow`] holds three samples of a cumulative series spaced
//! exactly one rolling period apart:
//!
//! ```text
//!                     Sample date A          Sample date B          Sample date C
//!                     |                      |                      |
//!                     +<- rolling period  ->+<-  rolling period  ->+
//!                     |                      |                      |
//! Cumulative value -> A                      B                      C
//! ```
//!
//! Rolling value = `C - B`, the count accumulated in the most recent
//! period. Rolling delta = `(C - B) - (B - A) = C - 2B + A`, the change in
//! rolling value between the two most recent periods. The delta is a
//! difference of differences, not a percentage.

use crate::error::{Result, StatsError};
use chrono::NaiveDate;
use epiwatch_common::types::{Field, SeriesRow};

/// Drops rows from the front of a newest-first series until the first row
/// whose `field` value is published.
///
/// Cumulative series lead with rows for days whose figures have not been
/// released yet; those rows must not take part in windowing. Returns the
/// empty slice when no row carries a value.
pub fn skip_leading_incomplete(rows: &[SeriesRow], field: Field) -> &[SeriesRow] {
    match rows.iter().position(|row| row.has_value(field)) {
        Some(first) => &rows[first..],
        None => &[],
    }
}

/// Positivity rates for the two most recent rolling windows, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositivityRates {
    pub penultimate: f64,
    pub latest: f64,
}

/// Three samples of a cumulative series spaced one rolling period apart.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    oldest: SeriesRow,
    middle: SeriesRow,
    newest: SeriesRow,
}

impl RollingWindow {
    /// Samples rows `2*period`, `period` and `0` of a newest-first series.
    ///
    /// # Errors
    ///
    /// `ZeroPeriod` when `period == 0`; `InsufficientData` when the series
    /// holds fewer than `2*period + 1` rows. Never indexes out of bounds.
    pub fn from_rows(rows: &[SeriesRow], period: usize) -> Result<Self> {
        if period == 0 {
            return Err(StatsError::ZeroPeriod);
        }
        let required = 2 * period + 1;
        if rows.len() < required {
            return Err(StatsError::InsufficientData {
                required,
                available: rows.len(),
            });
        }
        Ok(Self {
            oldest: rows[2 * period].clone(),
            middle: rows[period].clone(),
            newest: rows[0].clone(),
        })
    }

    /// Date of the newest sample; alerts are stamped with it.
    pub fn sample_date(&self) -> NaiveDate {
        self.newest.date
    }

    /// Whether the newest sample publishes a value for `field`. Used to
    /// guard the positivity calculation before it can divide by zero.
    pub fn has_latest_value(&self, field: Field) -> bool {
        self.newest.has_value(field)
    }

    /// `C - B`: the count accumulated in the most recent period.
    ///
    /// An unpublished value in either sample yields `0.0` with a
    /// diagnostic log line; real series contain such days and they must
    /// not abort the run.
    pub fn rolling_value(&self, field: Field) -> f64 {
        rolling_difference(&self.middle, &self.newest, field)
    }

    /// `B - A`: the count accumulated in the preceding period. Same
    /// soft-zero policy as [`RollingWindow::rolling_value`].
    pub fn penultimate_rolling_value(&self, field: Field) -> f64 {
        rolling_difference(&self.oldest, &self.middle, field)
    }

    /// `C - 2B + A`: the change in rolling value between the two most
    /// recent periods. `None` when any sample is unpublished; the caller
    /// reports the gap instead of alerting on it.
    pub fn rolling_delta(&self, field: Field) -> Option<f64> {
        let a = self.oldest.value(field)?;
        let b = self.middle.value(field)?;
        let c = self.newest.value(field)?;
        Some(c - 2.0 * b + a)
    }

    /// Rolling positivity rates: cases over summed pillar-1 and pillar-2
    /// tests, times 100, for both the latest and penultimate windows.
    ///
    /// # Errors
    ///
    /// `ZeroTestDenominator` when either window's rolling test total is
    /// zero. Callers are expected to check test-field presence with
    /// [`RollingWindow::has_latest_value`] first; the error is the
    /// backstop, not the control flow.
    pub fn positivity_rates(
        &self,
        cases: Field,
        pillar_one: Field,
        pillar_two: Field,
    ) -> Result<PositivityRates> {
        let latest_cases = self.rolling_value(cases);
        let penultimate_cases = self.penultimate_rolling_value(cases);
        let latest_tests = self.rolling_value(pillar_one) + self.rolling_value(pillar_two);
        let penultimate_tests =
            self.penultimate_rolling_value(pillar_one) + self.penultimate_rolling_value(pillar_two);

        if latest_tests == 0.0 || penultimate_tests == 0.0 {
            return Err(StatsError::ZeroTestDenominator {
                date: self.newest.date,
            });
        }

        Ok(PositivityRates {
            penultimate: penultimate_cases / penultimate_tests * 100.0,
            latest: latest_cases / latest_tests * 100.0,
        })
    }
}

fn rolling_difference(older: &SeriesRow, newer: &SeriesRow, field: Field) -> f64 {
    match (older.value(field), newer.value(field)) {
        (Some(older_value), Some(newer_value)) => newer_value - older_value,
        _ => {
            tracing::warn!(
                field = %field,
                older = %older.date,
                newer = %newer.date,
                "Empty value in rolling sample, treating rolling value as 0"
            );
            0.0
        }
    }
}
