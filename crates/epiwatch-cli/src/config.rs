//! Two-line CSV configuration.
//!
//! Line 1 lists the monitored sub-region names. Line 2 carries exactly
//! twelve non-negative numeric parameters:
//!
//! ```text
//! <rolling period>,<uk cases increase limit>,<uk cases limit>,
//! <uk deaths increase limit>,<uk deaths limit>,
//! <uk positivity increase limit>,<uk positivity limit>,
//! <region cases increase limit>,<region cases limit>,
//! <region deaths increase limit>,<region deaths limit>,
//! <exponential sensitivity>
//! ```
//!
//! Any violation is fatal and reported before the first network call.

use epiwatch_alert::engine::{AlertThresholds, LimitPair};

pub const EXPECTED_PARAMETERS: usize = 12;
const EXPECTED_LINES: usize = 2;

/// Fatal configuration problems. Raised once at startup and surfaced only
/// at the top level.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file {path} has {found} lines, expected {expected}")]
    LineCount {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("Line 1 of {path} contains no region names")]
    NoRegions { path: String },

    #[error("Line 1 of {path} contains a region name of zero length")]
    EmptyRegionName { path: String },

    #[error("Line 1 of {path} names region '{name}' more than once")]
    DuplicateRegion { path: String, name: String },

    #[error("Line 2 of {path} contains {found} parameters, expected {expected}")]
    ParameterCount {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("Line 2 of {path} contains a non-numeric parameter '{value}'")]
    NonNumeric { path: String, value: String },

    #[error("Line 2 of {path} contains a negative parameter '{value}'")]
    Negative { path: String, value: String },

    #[error("A rolling period of 0 is not permitted")]
    ZeroRollingPeriod,
}

/// Parsed and validated configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub regions: Vec<String>,
    pub thresholds: AlertThresholds,
}

impl RunConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Parses file content. Takes no collaborators: validation completes
    /// before any network client exists.
    fn parse(path: &str, content: &str) -> Result<Self, ConfigError> {
        let lines: Vec<&str> = content.lines().collect();
        if lines.len() < EXPECTED_LINES {
            return Err(ConfigError::LineCount {
                path: path.to_string(),
                expected: EXPECTED_LINES,
                found: lines.len(),
            });
        }

        let regions = Self::parse_regions(path, lines[0])?;
        let thresholds = Self::parse_parameters(path, lines[1])?;

        Ok(Self {
            regions,
            thresholds,
        })
    }

    fn parse_regions(path: &str, line: &str) -> Result<Vec<String>, ConfigError> {
        if line.trim().is_empty() {
            return Err(ConfigError::NoRegions {
                path: path.to_string(),
            });
        }

        let mut regions: Vec<String> = Vec::new();
        for name in line.split(',') {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyRegionName {
                    path: path.to_string(),
                });
            }
            if regions.iter().any(|existing| existing == name) {
                return Err(ConfigError::DuplicateRegion {
                    path: path.to_string(),
                    name: name.to_string(),
                });
            }
            regions.push(name.to_string());
        }
        Ok(regions)
    }

    fn parse_parameters(path: &str, line: &str) -> Result<AlertThresholds, ConfigError> {
        let cleaned = line.replace(' ', "");
        let parameters: Vec<&str> = cleaned.split(',').collect();
        if parameters.len() != EXPECTED_PARAMETERS {
            return Err(ConfigError::ParameterCount {
                path: path.to_string(),
                expected: EXPECTED_PARAMETERS,
                found: parameters.len(),
            });
        }

        let mut numbers = Vec::with_capacity(EXPECTED_PARAMETERS);
        for parameter in &parameters {
            let value: f64 = parameter.parse().map_err(|_| ConfigError::NonNumeric {
                path: path.to_string(),
                value: parameter.to_string(),
            })?;
            if !value.is_finite() {
                return Err(ConfigError::NonNumeric {
                    path: path.to_string(),
                    value: parameter.to_string(),
                });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative {
                    path: path.to_string(),
                    value: parameter.to_string(),
                });
            }
            numbers.push(value);
        }

        // The rolling period and sensitivity are whole numbers; "7.5" is
        // rejected here even though it parsed as a float above.
        let rolling_period: usize =
            parameters[0].parse().map_err(|_| ConfigError::NonNumeric {
                path: path.to_string(),
                value: parameters[0].to_string(),
            })?;
        if rolling_period == 0 {
            return Err(ConfigError::ZeroRollingPeriod);
        }
        let exponential_sensitivity: u32 =
            parameters[11].parse().map_err(|_| ConfigError::NonNumeric {
                path: path.to_string(),
                value: parameters[11].to_string(),
            })?;

        Ok(AlertThresholds {
            rolling_period,
            national_cases: LimitPair {
                increase: numbers[1],
                absolute: numbers[2],
            },
            national_deaths: LimitPair {
                increase: numbers[3],
                absolute: numbers[4],
            },
            national_positivity: LimitPair {
                increase: numbers[5],
                absolute: numbers[6],
            },
            region_cases: LimitPair {
                increase: numbers[7],
                absolute: numbers[8],
            },
            region_deaths: LimitPair {
                increase: numbers[9],
                absolute: numbers[10],
            },
            exponential_sensitivity,
        })
    }
}
