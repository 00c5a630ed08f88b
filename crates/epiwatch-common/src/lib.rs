//! Shared value types for the epiwatch workspace.
//!
//! Series rows, logical field names, alert events and severity levels are
//! defined here so the source, engine and sink crates agree on one
//! vocabulary without depending on each other.

pub mod types;
