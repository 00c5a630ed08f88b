//! CSV-to-typed-row parsing for dashboard responses.

use crate::error::{Result, SourceError};
use crate::FieldStructure;
use chrono::NaiveDate;
use epiwatch_common::types::{Field, SeriesRow};
use std::collections::HashMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a dashboard CSV body into typed rows, newest-first.
///
/// The header row is matched against the structure's logical names and
/// then discarded. Empty numeric fields become `None` (the figure is not
/// yet published); any non-empty field that fails to parse rejects the
/// whole response, so malformed data never crosses this boundary.
pub fn parse_csv(body: &str, structure: &FieldStructure) -> Result<Vec<SeriesRow>> {
    let mut lines = body.lines().filter(|line| !line.trim().is_empty());

    let header = match lines.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    let date_index = column_index(&columns, "date")?;
    let mut field_indices = Vec::with_capacity(structure.fields().len());
    for (field, _) in structure.fields() {
        field_indices.push((*field, column_index(&columns, &field.to_string())?));
    }

    let mut rows = Vec::new();
    for (number, line) in lines.enumerate() {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != columns.len() {
            return Err(SourceError::ColumnCount {
                row: number + 1,
                expected: columns.len(),
                found: cells.len(),
            });
        }

        let date_cell = cells[date_index];
        let date = NaiveDate::parse_from_str(date_cell, DATE_FORMAT).map_err(|_| {
            SourceError::MalformedDate {
                row: number + 1,
                value: date_cell.to_string(),
            }
        })?;

        let mut values = HashMap::with_capacity(field_indices.len());
        for (field, index) in &field_indices {
            values.insert(*field, parse_value(cells[*index], number + 1, *field)?);
        }

        rows.push(SeriesRow { date, values });
    }

    Ok(rows)
}

fn column_index(columns: &[&str], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|column| *column == name)
        .ok_or_else(|| SourceError::MissingColumn(name.to_string()))
}

fn parse_value(cell: &str, row: usize, field: Field) -> Result<Option<f64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| SourceError::MalformedValue {
            row,
            column: field.to_string(),
            value: cell.to_string(),
        })
}
