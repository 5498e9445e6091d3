//! Joined row sets and nested-loop joins.

use serde::Serialize;

use super::compare::{compare_columns, matches_literal};
use super::{split_stored, typed_values};
use crate::ast::{Condition, JoinKind};
use crate::error::QueryResult;
use crate::schema::{DataType, TableDefinition};
use crate::value::Value;

/// One column of a joined row, tagged with its source table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderColumn {
    pub table: String,
    pub name: String,
    pub data_type: DataType,
}

impl HeaderColumn {
    /// `table.column`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }

    fn matches(&self, field: &str) -> bool {
        match field.split_once('.') {
            Some((table, name)) => self.table == table && self.name == name,
            None => false,
        }
    }
}

pub(crate) fn resolve_in(header: &[HeaderColumn], field: &str) -> Option<usize> {
    header
        .iter()
        .position(|h| h.matches(field))
        .or_else(|| header.iter().position(|h| h.name == field))
}

/// Like `resolve_in`, but a bare name shared by several tables resolves
/// to the last joined table.
pub(crate) fn resolve_last_in(header: &[HeaderColumn], field: &str) -> Option<usize> {
    header
        .iter()
        .position(|h| h.matches(field))
        .or_else(|| header.iter().rposition(|h| h.name == field))
}

/// Rows of one or more tables, flattened side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRows {
    pub header: Vec<HeaderColumn>,
    pub rows: Vec<Vec<Value>>,
}

impl JoinedRows {
    /// Typed rows of a single table. Blank record lines are skipped.
    pub fn from_table(definition: &TableDefinition, records: &[String]) -> QueryResult<Self> {
        let header = definition
            .columns
            .iter()
            .map(|c| HeaderColumn {
                table: definition.name.clone(),
                name: c.name.clone(),
                data_type: c.data_type.clone(),
            })
            .collect();

        let rows = records
            .iter()
            .filter(|r| !r.trim().is_empty())
            .map(|r| split_stored(definition, r).map(|f| typed_values(definition, &f)))
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Self { header, rows })
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Find a field by qualified name, then by bare column name.
    ///
    /// A bare name that exists in several tables resolves to the first,
    /// which is always a column of the main table when it has one.
    pub fn resolve(&self, field: &str) -> Option<usize> {
        resolve_in(&self.header, field)
    }

    /// Find a field by qualified name, then by bare column name, letting
    /// later tables shadow earlier ones. Used for filters and projection.
    pub fn resolve_last(&self, field: &str) -> Option<usize> {
        resolve_last_in(&self.header, field)
    }

    /// Nested-loop join against the rows of one more table.
    ///
    /// Unmatched rows are padded with `Null` on the other side when the
    /// join kind keeps them. `Null` join keys never match.
    pub fn join(self, kind: JoinKind, target: JoinedRows, on: &Condition) -> JoinedRows {
        let mut field = on.field.as_str();
        let mut other = on.value.as_str();

        // `ON target.col = main.col` is accepted by swapping sides
        if self.resolve(field).is_none()
            && target.resolve(field).is_some()
            && self.resolve(other).is_some()
        {
            std::mem::swap(&mut field, &mut other);
        }

        let left_idx = self.resolve(field);
        let right_idx = target.resolve(other);
        tracing::debug!(
            table = %target.header.first().map(|h| h.table.as_str()).unwrap_or(""),
            ?kind,
            ?left_idx,
            ?right_idx,
            "Joining"
        );

        let matches = |left: &[Value], right: &[Value]| -> bool {
            let Some(l) = left_idx else {
                return false;
            };
            let lhs = &left[l];
            if lhs.is_null() {
                return false;
            }
            match right_idx {
                Some(r) => !right[r].is_null() && compare_columns(lhs, on.op, &right[r]),
                None => matches_literal(lhs, on.op, other, &self.header[l].data_type),
            }
        };

        let left_width = self.width();
        let right_width = target.width();
        let mut matched_right = vec![false; target.rows.len()];
        let mut rows = Vec::new();

        for left in &self.rows {
            let mut matched = false;
            for (i, right) in target.rows.iter().enumerate() {
                if matches(left, right) {
                    matched = true;
                    matched_right[i] = true;
                    rows.push(left.iter().chain(right).cloned().collect());
                }
            }
            if !matched && kind.keeps_unmatched_left() {
                let mut row = left.clone();
                row.resize(left_width + right_width, Value::Null);
                rows.push(row);
            }
        }

        if kind.keeps_unmatched_right() {
            for (right, _) in target
                .rows
                .iter()
                .zip(&matched_right)
                .filter(|(_, matched)| !**matched)
            {
                let mut row = vec![Value::Null; left_width];
                row.extend(right.iter().cloned());
                rows.push(row);
            }
        }

        let mut header = self.header;
        header.extend(target.header);
        JoinedRows { header, rows }
    }
}
