//! Row shape and type conformance checks.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Column, DataType, TableDefinition};
use crate::error::{QueryError, QueryResult};
use crate::value::{is_null_literal, DATE_FORMAT};

/// Record field delimiter
pub const FIELD_DELIMITER: char = '|';

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

/// Split a raw record and check arity and per-field type conformance.
///
/// Blank and `NULL` fields skip type checks; NOT NULL is enforced by the
/// constraint validator.
pub fn validate_row(definition: &TableDefinition, raw: &str) -> QueryResult<Vec<String>> {
    let fields: Vec<String> = raw.split(FIELD_DELIMITER).map(str::to_string).collect();
    if fields.len() != definition.columns.len() {
        return Err(QueryError::Arity {
            expected: definition.columns.len(),
            found: fields.len(),
        });
    }

    for (column, field) in definition.columns.iter().zip(&fields) {
        validate_field(column, field)?;
    }
    Ok(fields)
}

/// Type conformance of a single field
pub fn validate_field(column: &Column, raw: &str) -> QueryResult<()> {
    if is_null_literal(raw) {
        return Ok(());
    }
    let value = raw.trim();
    let conforms = match &column.data_type {
        DataType::Int => value.parse::<i64>().is_ok(),
        DataType::Float => value.parse::<f64>().is_ok(),
        DataType::Bool => value == "true" || value == "false",
        DataType::Date => {
            DATE_SHAPE.is_match(value) && NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
        }
        DataType::Char(max) => value.chars().count() <= *max,
        DataType::Enum(allowed) => allowed.iter().any(|a| a == value),
        DataType::String | DataType::Text => true,
    };

    if conforms {
        Ok(())
    } else {
        Err(QueryError::Type {
            column: column.name.clone(),
            expected: column.data_type.to_string(),
            value: raw.to_string(),
        })
    }
}
