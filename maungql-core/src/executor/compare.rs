//! Value comparison and condition-chain evaluation.

use std::cmp::Ordering;

use crate::ast::{CompareOp, Condition, LogicOp};
use crate::schema::DataType;
use crate::value::Value;

fn holds(ordering: Ordering, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::NotEq => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::GtEq => ordering != Ordering::Less,
        CompareOp::LtEq => ordering != Ordering::Greater,
        CompareOp::Like => false,
    }
}

fn like(lhs: &Value, pattern: &str) -> bool {
    !lhs.is_null() && lhs.to_string().to_lowercase().contains(&pattern.to_lowercase())
}

/// Compare two typed values.
///
/// `Null` equals only `Null`; ordering against `Null` is false. Values of
/// different variants never match, except Int against Float.
pub fn compare(lhs: &Value, op: CompareOp, rhs: &Value) -> bool {
    if op == CompareOp::Like {
        return like(lhs, &rhs.to_string());
    }

    let ordering = match (lhs, rhs) {
        (Value::Null, Value::Null) => return op == CompareOp::Eq,
        (Value::Null, _) | (_, Value::Null) => return op == CompareOp::NotEq,
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Bool(a), Value::Bool(b)) => match op {
            CompareOp::Eq | CompareOp::NotEq => Some(a.cmp(b)),
            _ => None,
        },
        _ => None,
    };

    ordering.map(|o| holds(o, op)).unwrap_or(false)
}

/// Compare a stored value against a query literal.
///
/// The literal is parsed with the column's type first; LIKE matches the
/// literal text as written. A DATE compared with a partial literal such as
/// `2021` or `2024-05` falls back to `YYYY-MM-DD` text order. A BOOL is
/// never equal to a literal other than `true` or `false`.
pub fn matches_literal(lhs: &Value, op: CompareOp, literal: &str, data_type: &DataType) -> bool {
    if op == CompareOp::Like {
        return like(lhs, literal);
    }
    let rhs = Value::parse(literal, data_type);
    match (lhs, &rhs) {
        (Value::Date(_), Value::Text(raw)) => compare(
            &Value::Text(lhs.to_string()),
            op,
            &Value::Text(raw.trim().to_string()),
        ),
        (Value::Bool(_), Value::Text(_)) => op == CompareOp::NotEq,
        _ => compare(lhs, op, &rhs),
    }
}

/// Compare two column values, falling back to displayed text when the
/// variants differ.
pub(crate) fn compare_columns(lhs: &Value, op: CompareOp, rhs: &Value) -> bool {
    let comparable = matches!(
        (lhs, rhs),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_))
    ) || std::mem::discriminant(lhs) == std::mem::discriminant(rhs);

    if comparable || lhs.is_null() || rhs.is_null() {
        compare(lhs, op, rhs)
    } else {
        compare(
            &Value::Text(lhs.to_string()),
            op,
            &Value::Text(rhs.to_string()),
        )
    }
}

/// Fold a condition chain strictly left to right.
///
/// There is no precedence between AND and OR. A condition without a logic
/// link ends the chain; later conditions are ignored. An empty chain holds.
pub fn evaluate_chain<F>(conditions: &[Condition], mut check: F) -> bool
where
    F: FnMut(&Condition) -> bool,
{
    let Some(first) = conditions.first() else {
        return true;
    };

    let mut result = check(first);
    for pair in conditions.windows(2) {
        let Some(logic) = pair[0].logic else {
            break;
        };
        let next = check(&pair[1]);
        result = match logic {
            LogicOp::And => result && next,
            LogicOp::Or => result || next,
        };
    }
    result
}
