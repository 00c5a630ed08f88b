//! Append-only log file sink with a console mirror.

use crate::error::{Result, SinkError};
use crate::AlertSink;
use chrono::Utc;
use epiwatch_common::types::Severity;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// [`AlertSink`] writing `timestamp LEVEL component: message` lines to a
/// persistent log file, echoing each line to the console through
/// `tracing` at the matching level.
pub struct LogFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogFileSink {
    /// Opens the log file in append mode, creating it and any missing
    /// parent directories first.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| SinkError::Open {
                    path: path.display().to_string(),
                    source,
                })?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SinkError::Open {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlertSink for LogFileSink {
    fn record(&self, component: &str, severity: Severity, message: &str) -> Result<()> {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let level = severity.to_string().to_uppercase();
        let line = format!("{timestamp} {level} {component}: {message}");

        {
            let mut file = self.file.lock().map_err(|_| SinkError::Poisoned)?;
            writeln!(file, "{line}").map_err(|source| SinkError::Write {
                path: self.path.display().to_string(),
                source,
            })?;
        }

        match severity {
            Severity::Info => tracing::info!(component, "{message}"),
            Severity::Warning => tracing::warn!(component, "{message}"),
            Severity::Error => tracing::error!(component, "{message}"),
        }

        Ok(())
    }
}
