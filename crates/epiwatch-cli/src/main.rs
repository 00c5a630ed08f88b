mod config;
mod context;
mod runner;

use anyhow::Result;
use chrono::Utc;
use config::RunConfig;
use context::RunContext;
use epiwatch_common::types::Severity;
use epiwatch_notify::log::LogFileSink;
use epiwatch_notify::AlertSink;
use epiwatch_source::client::DashboardClient;
use runner::Runner;
use tracing_subscriber::EnvFilter;

const COMPONENT: &str = "main";
const DEFAULT_CONFIG_PATH: &str = "config/epiwatch.csv";
const DEFAULT_LOG_PATH: &str = "log/epiwatch.log";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut fail_fast = false;
    for argument in std::env::args().skip(1) {
        match argument.as_str() {
            "--fail-fast" => fail_fast = true,
            other => config_path = other.to_string(),
        }
    }

    tracing::debug!(config = %config_path, fail_fast, "epiwatch starting");

    let sink = LogFileSink::open(DEFAULT_LOG_PATH)?;
    sink.record(COMPONENT, Severity::Info, "Started")?;
    sink.record(
        COMPONENT,
        Severity::Info,
        &format!("Reading configuration file {config_path}"),
    )?;

    // Configuration is validated in full before the HTTP client exists:
    // a malformed file can never reach the network.
    let config = match RunConfig::load(&config_path) {
        Ok(config) => config,
        Err(error) => {
            sink.record(COMPONENT, Severity::Error, &error.to_string())?;
            return Err(error.into());
        }
    };

    let source = match DashboardClient::new() {
        Ok(source) => source,
        Err(error) => {
            sink.record(COMPONENT, Severity::Error, &error.to_string())?;
            return Err(error.into());
        }
    };

    let context = RunContext {
        config: &config,
        sink: &sink,
        today: Utc::now().date_naive(),
        fail_fast,
    };

    match Runner::new(&context, &source).run() {
        Ok(summary) => {
            sink.record(
                COMPONENT,
                Severity::Info,
                &format!(
                    "Completed: {} regions processed, {} failed, {} alerts raised",
                    summary.regions_processed, summary.regions_failed, summary.alerts_raised
                ),
            )?;
            Ok(())
        }
        Err(error) => {
            sink.record(COMPONENT, Severity::Error, &format!("{error:#}"))?;
            Err(error)
        }
    }
}
