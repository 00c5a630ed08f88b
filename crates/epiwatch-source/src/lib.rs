//! Data-source collaborator for epiwatch.
//!
//! A [`SeriesSource`] returns ordered cumulative-count records for a named
//! field structure and area filter. The production implementation is
//! [`client::DashboardClient`], which queries the coronavirus dashboard API
//! and types each CSV row at this boundary; nothing past the parser works
//! with raw strings or positional columns.

pub mod client;
pub mod error;
pub mod parse;


use epiwatch_common::types::{Field, SeriesRow};

/// A source of epidemiological series data.
///
/// Rows are returned newest-first, header removed, exactly as the
/// dashboard publishes them. Implementations own their transport policy
/// (timeouts, retries); callers only see [`error::SourceError`].
pub trait SeriesSource: Send + Sync {
    /// Fetches the series selected by `filter`, shaped by `structure`.
    ///
    /// # Errors
    ///
    /// Returns an error when the remote call fails or a row cannot be
    /// typed. Retrieval failures are expected to be isolated to the
    /// current metric/region by the caller, not treated as fatal.
    fn fetch_series(
        &self,
        filter: &AreaFilter,
        structure: &FieldStructure,
    ) -> error::Result<Vec<SeriesRow>>;
}

/// Granularity of the area a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaType {
    /// Whole-nation aggregate.
    Overview,
    /// Lower-tier local authority.
    Ltla,
}

impl std::fmt::Display for AreaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AreaType::Overview => write!(f, "overview"),
            AreaType::Ltla => write!(f, "ltla"),
        }
    }
}

/// Area selector for a series query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaFilter {
    pub area_type: AreaType,
    pub area_name: Option<String>,
}

impl AreaFilter {
    /// Nationwide aggregate filter.
    pub fn overview() -> Self {
        Self {
            area_type: AreaType::Overview,
            area_name: None,
        }
    }

    /// Filter for one named lower-tier local authority.
    pub fn ltla(name: &str) -> Self {
        Self {
            area_type: AreaType::Ltla,
            area_name: Some(name.to_string()),
        }
    }

    /// The dashboard `filters` query parameter, e.g.
    /// `areaType=ltla;areaName=Worthing`.
    pub fn to_query(&self) -> String {
        match &self.area_name {
            Some(name) => format!("areaType={};areaName={name}", self.area_type),
            None => format!("areaType={}", self.area_type),
        }
    }
}

/// Mapping from logical field names to the source's column identifiers,
/// resolved once per query.
///
/// The same mapping drives both directions: it is serialised into the
/// dashboard's JSON `structure` parameter, and the returned CSV header is
/// matched back against it when rows are typed.
#[derive(Debug, Clone)]
pub struct FieldStructure {
    date_column: String,
    fields: Vec<(Field, String)>,
}

impl FieldStructure {
    pub fn new(date_column: &str) -> Self {
        Self {
            date_column: date_column.to_string(),
            fields: Vec::new(),
        }
    }

    /// Adds one logical field backed by the named source column.
    pub fn with(mut self, field: Field, column: &str) -> Self {
        self.fields.push((field, column.to_string()));
        self
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn fields(&self) -> &[(Field, String)] {
        &self.fields
    }

    /// The dashboard `structure` query parameter: a JSON object keyed by
    /// the logical names, valued by the source column identifiers.
    pub fn to_structure_json(&self) -> String {
        let mut object = serde_json::Map::new();
        object.insert(
            "date".to_string(),
            serde_json::Value::String(self.date_column.clone()),
        );
        for (field, column) in &self.fields {
            object.insert(field.to_string(), serde_json::Value::String(column.clone()));
        }
        serde_json::Value::Object(object).to_string()
    }
}
