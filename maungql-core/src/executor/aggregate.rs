//! Aggregate functions over filtered rows.

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregateFunc {
    pub fn lookup(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "JUMLAH" | "COUNT" => Some(AggregateFunc::Count),
            "TOTAL" | "SUM" => Some(AggregateFunc::Sum),
            "RATA" | "AVG" => Some(AggregateFunc::Avg),
            "PANGGEDENA" | "MAX" => Some(AggregateFunc::Max),
            "PANGLEUTIKNA" | "MIN" => Some(AggregateFunc::Min),
            _ => None,
        }
    }

    /// Fold the values of one column.
    ///
    /// `values` holds one entry per filtered row; `None` marks a row where
    /// the target column could not be resolved. COUNT ignores the values.
    pub fn compute<'a, I>(self, values: I) -> Value
    where
        I: IntoIterator<Item = Option<&'a Value>>,
    {
        let mut rows = 0usize;
        let mut numbers = Vec::new();
        for value in values {
            rows += 1;
            if let Some(n) = value.and_then(Value::as_f64) {
                numbers.push(n);
            }
        }

        if rows == 0 {
            return Value::Int(0);
        }
        if self == AggregateFunc::Count {
            return Value::Int(rows as i64);
        }
        if numbers.is_empty() {
            return match self {
                AggregateFunc::Sum => Value::Float(0.0),
                _ => Value::Int(0),
            };
        }

        let result = match self {
            AggregateFunc::Sum => numbers.iter().sum::<f64>(),
            AggregateFunc::Avg => numbers.iter().sum::<f64>() / numbers.len() as f64,
            AggregateFunc::Max => numbers.iter().copied().fold(f64::MIN, f64::max),
            AggregateFunc::Min => numbers.iter().copied().fold(f64::MAX, f64::min),
            AggregateFunc::Count => unreachable!("handled above"),
        };
        Value::Float(result)
    }
}

/// One entry of a SELECT field list
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSelection {
    Column(String),
    Aggregate {
        func: AggregateFunc,
        target: String,
        /// Field text as written, used as the output header
        text: String,
    },
}

impl FieldSelection {
    pub fn text(&self) -> &str {
        match self {
            FieldSelection::Column(name) => name,
            FieldSelection::Aggregate { text, .. } => text,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, FieldSelection::Aggregate { .. })
    }
}

/// Classify a field as `FUNC(target)` or a plain column reference.
pub fn parse_field(field: &str) -> FieldSelection {
    let parsed = field.find('(').and_then(|open| {
        let close = field.rfind(')')?;
        if close < open {
            return None;
        }
        let func = AggregateFunc::lookup(&field[..open])?;
        Some(FieldSelection::Aggregate {
            func,
            target: field[open + 1..close].trim().to_string(),
            text: field.to_string(),
        })
    });
    parsed.unwrap_or_else(|| FieldSelection::Column(field.to_string()))
}
