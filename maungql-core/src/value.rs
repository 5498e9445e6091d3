//! Typed field values.
//!
//! Records are stored as text; each field is parsed once against its
//! column's declared type when a record is loaded.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::schema::DataType;

/// Sentinel written for absent values.
pub const NULL_LITERAL: &str = "NULL";

/// Format of DATE columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
}

/// True for blank fields and the `NULL` sentinel.
pub fn is_null_literal(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw.eq_ignore_ascii_case(NULL_LITERAL)
}

impl Value {
    /// Parse a raw field against a declared type.
    ///
    /// Fields that do not conform are carried as `Text`, so typed
    /// comparisons against them fail instead of erroring.
    pub fn parse(raw: &str, data_type: &DataType) -> Value {
        if is_null_literal(raw) {
            return Value::Null;
        }
        let trimmed = raw.trim();
        match data_type {
            DataType::Int => trimmed
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            DataType::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            DataType::Bool => match trimmed {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Text(raw.to_string()),
            },
            DataType::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(Value::Date)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            DataType::Char(_) | DataType::Enum(_) | DataType::String | DataType::Text => {
                Value::Text(raw.to_string())
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used by ordering and aggregation
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Ordering used by ORDER BY: numeric when both sides are numbers,
    /// otherwise by displayed text.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(NULL_LITERAL),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Date(_) | Value::Text(_) => serializer.collect_str(self),
        }
    }
}
