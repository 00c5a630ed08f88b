//! Region iteration driver.
//!
//! One national pass, then one pass per configured sub-region. Each
//! region is processed independently: a data failure for one region is
//! recorded and the remaining regions still run, unless the context asks
//! for fail-fast.

use crate::context::RunContext;
use epiwatch_alert::engine::{AlertEngine, MetricObservation};
use epiwatch_alert::growth::{centered_rolling_averages, classify, ExponentialSample};
use epiwatch_alert::window::{skip_leading_incomplete, RollingWindow};
use epiwatch_common::types::{AlertEvent, Field, Metric, RegionClass, Severity, SeriesRow};
use epiwatch_notify::error::SinkError;
use epiwatch_source::error::SourceError;
use epiwatch_source::{AreaFilter, FieldStructure, SeriesSource};

const COMPONENT: &str = "runner";
const NATIONAL_REGION: &str = "UK";

/// Nationwide cumulative series: cases and deaths by publish date plus
/// both testing pillars.
fn overview_structure() -> FieldStructure {
    FieldStructure::new("date")
        .with(Field::Cases, "cumCasesByPublishDate")
        .with(Field::PillarOneTests, "cumPillarOneTestsByPublishDate")
        .with(Field::PillarTwoTests, "cumPillarTwoTestsByPublishDate")
        .with(Field::Deaths, "cumDeaths28DaysByPublishDate")
}

/// Sub-region cumulative cases, keyed by specimen date.
fn area_cases_structure() -> FieldStructure {
    FieldStructure::new("date").with(Field::Cases, "cumCasesBySpecimenDate")
}

/// Sub-region cumulative deaths within 28 days of a positive test.
fn area_deaths_structure() -> FieldStructure {
    FieldStructure::new("date").with(Field::Deaths, "cumDeaths28DaysByPublishDate")
}

/// Daily new cases, feeding the growth detector.
fn daily_cases_structure() -> FieldStructure {
    FieldStructure::new("date").with(Field::New, "newCasesByPublishDate")
}

/// What one run did, logged on completion.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub regions_processed: usize,
    pub regions_failed: usize,
    pub alerts_raised: usize,
}

#[derive(Debug, thiserror::Error)]
enum ProcessError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

pub struct Runner<'a> {
    ctx: &'a RunContext<'a>,
    source: &'a dyn SeriesSource,
    engine: AlertEngine,
}

impl<'a> Runner<'a> {
    pub fn new(ctx: &'a RunContext<'a>, source: &'a dyn SeriesSource) -> Self {
        let engine = AlertEngine::new(&ctx.config.thresholds);
        Self {
            ctx,
            source,
            engine,
        }
    }

    pub fn run(&self) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();

        self.info("Processing national data")?;
        match self.process_national() {
            Ok(count) => summary.alerts_raised += count,
            Err(ProcessError::Sink(error)) => return Err(error.into()),
            Err(ProcessError::Source(error)) => {
                self.warn(&format!("Processing failed for {NATIONAL_REGION}: {error}"))?;
                if self.ctx.fail_fast {
                    anyhow::bail!("processing failed for {NATIONAL_REGION}: {error}");
                }
            }
        }

        self.info("Processing sub-region data")?;
        for region in &self.ctx.config.regions {
            match self.process_region(region) {
                Ok(count) => {
                    summary.regions_processed += 1;
                    summary.alerts_raised += count;
                }
                Err(ProcessError::Sink(error)) => return Err(error.into()),
                Err(ProcessError::Source(error)) => {
                    summary.regions_failed += 1;
                    self.warn(&format!("Processing failed for {region}: {error}"))?;
                    if self.ctx.fail_fast {
                        anyhow::bail!("processing failed for {region}: {error}");
                    }
                }
            }
        }

        Ok(summary)
    }

    fn process_national(&self) -> Result<usize, ProcessError> {
        let rows = self
            .source
            .fetch_series(&AreaFilter::overview(), &overview_structure())?;

        let mut alerts = 0;
        alerts += self.evaluate_cumulative(
            NATIONAL_REGION,
            RegionClass::National,
            Metric::Cases,
            Field::Cases,
            &rows,
        )?;
        alerts += self.evaluate_cumulative(
            NATIONAL_REGION,
            RegionClass::National,
            Metric::Deaths,
            Field::Deaths,
            &rows,
        )?;
        alerts += self.evaluate_positivity(&rows)?;
        alerts += self.evaluate_growth(NATIONAL_REGION, RegionClass::National, &AreaFilter::overview())?;
        Ok(alerts)
    }

    fn process_region(&self, region: &str) -> Result<usize, ProcessError> {
        let filter = AreaFilter::ltla(region);
        let mut alerts = 0;

        let case_rows = self.source.fetch_series(&filter, &area_cases_structure())?;
        alerts += self.evaluate_cumulative(
            region,
            RegionClass::SubRegion,
            Metric::Cases,
            Field::Cases,
            &case_rows,
        )?;

        let death_rows = self.source.fetch_series(&filter, &area_deaths_structure())?;
        if let Some(total) = skip_leading_incomplete(&death_rows, Field::Deaths)
            .first()
            .and_then(|row| row.value(Field::Deaths))
        {
            self.info(&format!(
                "The total number of deaths for {region} is now {total:.0}"
            ))?;
        }
        alerts += self.evaluate_cumulative(
            region,
            RegionClass::SubRegion,
            Metric::Deaths,
            Field::Deaths,
            &death_rows,
        )?;

        alerts += self.evaluate_growth(region, RegionClass::SubRegion, &filter)?;
        Ok(alerts)
    }

    /// Windows a cumulative series and evaluates the rolling value and
    /// delta checks for one metric.
    fn evaluate_cumulative(
        &self,
        region: &str,
        scope: RegionClass,
        metric: Metric,
        field: Field,
        rows: &[SeriesRow],
    ) -> Result<usize, ProcessError> {
        let period = self.ctx.config.thresholds.rolling_period;
        let usable = skip_leading_incomplete(rows, field);

        let window = match RollingWindow::from_rows(usable, period) {
            Ok(window) => window,
            Err(error) => {
                self.info(&format!("Skipping {metric} checks for {region}: {error}"))?;
                return Ok(0);
            }
        };

        let age = (self.ctx.today - window.sample_date()).num_days();
        if age > period as i64 {
            self.info(&format!(
                "The latest {metric} sample for {region} was published {age} days ago"
            ))?;
        }

        let delta = window.rolling_delta(field);
        if delta.is_none() {
            self.info(&format!(
                "The rolling increase in {metric} for {region} could not be computed from unpublished samples"
            ))?;
        }

        let observation = MetricObservation {
            region: region.to_string(),
            scope,
            metric,
            sample_date: window.sample_date(),
            value: Some(window.rolling_value(field)),
            delta,
            growth: None,
        };
        self.emit(&self.engine.evaluate(&observation))
    }

    /// Positivity checks run only when the newest sample publishes both
    /// testing pillars; a reporting gap skips them with an informational
    /// line instead of dividing by zero.
    fn evaluate_positivity(&self, rows: &[SeriesRow]) -> Result<usize, ProcessError> {
        let period = self.ctx.config.thresholds.rolling_period;
        let usable = skip_leading_incomplete(rows, Field::Cases);

        let window = match RollingWindow::from_rows(usable, period) {
            Ok(window) => window,
            Err(error) => {
                self.info(&format!(
                    "Skipping positivity checks for {NATIONAL_REGION}: {error}"
                ))?;
                return Ok(0);
            }
        };

        if !window.has_latest_value(Field::PillarOneTests)
            || !window.has_latest_value(Field::PillarTwoTests)
        {
            self.info(&format!(
                "Testing data unavailable for {}, skipping positivity checks",
                window.sample_date()
            ))?;
            return Ok(0);
        }

        let rates = match window.positivity_rates(
            Field::Cases,
            Field::PillarOneTests,
            Field::PillarTwoTests,
        ) {
            Ok(rates) => rates,
            Err(error) => {
                self.warn(&format!("Positivity rate could not be computed: {error}"))?;
                return Ok(0);
            }
        };

        let observation = MetricObservation {
            region: NATIONAL_REGION.to_string(),
            scope: RegionClass::National,
            metric: Metric::Positivity,
            sample_date: window.sample_date(),
            value: Some(rates.latest),
            delta: Some(rates.latest - rates.penultimate),
            growth: None,
        };
        self.emit(&self.engine.evaluate(&observation))
    }

    /// Smooths the most recent daily new-case rows and runs the
    /// exponential-growth classifier.
    fn evaluate_growth(
        &self,
        region: &str,
        scope: RegionClass,
        filter: &AreaFilter,
    ) -> Result<usize, ProcessError> {
        let period = self.ctx.config.thresholds.rolling_period;
        let rows = self.source.fetch_series(filter, &daily_cases_structure())?;
        let usable = skip_leading_incomplete(&rows, Field::New);

        let needed = 2 * period - 1;
        if usable.len() < needed {
            self.info(&format!(
                "Skipping growth analysis for {region}: {} daily rows available, {needed} needed",
                usable.len()
            ))?;
            return Ok(0);
        }

        let mut recent: Vec<SeriesRow> = usable[..needed].to_vec();
        recent.reverse();
        let points = centered_rolling_averages(&recent, Field::New, period);
        let sample = ExponentialSample::from_points(&points);
        let classification = classify(&sample, self.ctx.config.thresholds.exponential_sensitivity);

        let observation = MetricObservation {
            region: region.to_string(),
            scope,
            metric: Metric::Cases,
            sample_date: usable[0].date,
            value: None,
            delta: None,
            growth: Some(classification),
        };
        self.emit(&self.engine.evaluate(&observation))
    }

    fn emit(&self, events: &[AlertEvent]) -> Result<usize, ProcessError> {
        for event in events {
            self.ctx
                .sink
                .record(COMPONENT, event.severity, &event.message)?;
        }
        Ok(events.len())
    }

    fn info(&self, message: &str) -> Result<(), ProcessError> {
        self.ctx
            .sink
            .record(COMPONENT, Severity::Info, message)
            .map_err(ProcessError::from)
    }

    fn warn(&self, message: &str) -> Result<(), ProcessError> {
        self.ctx
            .sink
            .record(COMPONENT, Severity::Warning, message)
            .map_err(ProcessError::from)
    }
}
