//! SELECT execution.
//!
//! Pipeline: join, filter, then either aggregate into one row or
//! order, paginate and project.

use super::aggregate::{parse_field, FieldSelection};
use super::compare::{evaluate_chain, matches_literal};
use super::join::{resolve_last_in, HeaderColumn, JoinedRows};
use super::locks::LockMode;
use super::{ExecutionResult, Executor, ResultSet, Storage};
use crate::ast::{Condition, SelectCommand};
use crate::context::SessionContext;
use crate::error::QueryResult;
use crate::schema::{self, Action};
use crate::value::Value;

impl<S: Storage> Executor<S> {
    pub(super) fn execute_select(
        &self,
        ctx: &SessionContext,
        cmd: &SelectCommand,
    ) -> QueryResult<ExecutionResult> {
        let database = ctx.database.as_str();
        let definition = schema::load(&self.storage, database, &cmd.table)?;
        definition.require(&ctx.role, Action::Read)?;

        let mut lock_set = vec![(cmd.table.as_str(), LockMode::Read)];
        lock_set.extend(cmd.joins.iter().map(|j| (j.table.as_str(), LockMode::Read)));

        self.locks.with_locked(database, &lock_set, || -> QueryResult<ExecutionResult> {
            let records = self.storage.read_all(database, &cmd.table)?;
            let fields: Vec<FieldSelection> = if cmd.is_select_all() {
                Vec::new()
            } else {
                cmd.fields.iter().map(|f| parse_field(f)).collect()
            };
            let has_aggregate = fields.iter().any(FieldSelection::is_aggregate);

            let mut rows = JoinedRows::from_table(&definition, &records)?;
            if rows.rows.is_empty() && cmd.joins.is_empty() && !has_aggregate {
                tracing::debug!(table = %cmd.table, "Empty table");
                let columns = header_names(cmd, &rows, &fields);
                return Ok(ExecutionResult::Rows(ResultSet::new(columns, Vec::new())));
            }

            for join in &cmd.joins {
                let target_def = schema::load(&self.storage, database, &join.table)?;
                target_def.require(&ctx.role, Action::Read)?;
                let target_records = self.storage.read_all(database, &join.table)?;
                let target = JoinedRows::from_table(&target_def, &target_records)?;
                rows = rows.join(join.kind, target, &join.on);
            }

            let header = &rows.header;
            rows.rows
                .retain(|row| evaluate_chain(&cmd.conditions, |c| matches_named(header, row, c)));
            tracing::debug!(table = %cmd.table, matched = rows.rows.len(), "Filtered rows");

            let result = if has_aggregate {
                aggregate_row(&rows, &fields)
            } else {
                order_and_project(cmd, rows, &fields)
            };
            Ok(ExecutionResult::Rows(result))
        })
    }
}

fn matches_named(header: &[HeaderColumn], row: &[Value], condition: &Condition) -> bool {
    match resolve_last_in(header, &condition.field) {
        Some(idx) => matches_literal(
            &row[idx],
            condition.op,
            &condition.value,
            &header[idx].data_type,
        ),
        None => false,
    }
}

fn header_names(cmd: &SelectCommand, rows: &JoinedRows, fields: &[FieldSelection]) -> Vec<String> {
    if cmd.is_select_all() {
        rows.header.iter().map(|h| h.qualified()).collect()
    } else {
        fields.iter().map(|f| f.text().to_string()).collect()
    }
}

/// Single output row of aggregates. Plain fields take the first row's value.
fn aggregate_row(rows: &JoinedRows, fields: &[FieldSelection]) -> ResultSet {
    let values = fields
        .iter()
        .map(|field| match field {
            FieldSelection::Aggregate { func, target, .. } => {
                let idx = rows.resolve_last(target);
                func.compute(rows.rows.iter().map(|row| idx.map(|i| &row[i])))
            }
            FieldSelection::Column(name) => rows
                .resolve_last(name)
                .and_then(|i| rows.rows.first().map(|row| row[i].clone()))
                .unwrap_or(Value::Null),
        })
        .collect();

    let columns = fields.iter().map(|f| f.text().to_string()).collect();
    ResultSet::new(columns, vec![values])
}

fn order_and_project(cmd: &SelectCommand, mut rows: JoinedRows, fields: &[FieldSelection]) -> ResultSet {
    if let Some(order) = &cmd.order_by {
        match rows.resolve(&order.column) {
            Some(idx) if order.descending => rows.rows.sort_by(|a, b| b[idx].sort_cmp(&a[idx])),
            Some(idx) => rows.rows.sort_by(|a, b| a[idx].sort_cmp(&b[idx])),
            None => tracing::debug!(column = %order.column, "ORDER BY column not found"),
        }
    }

    let total = rows.rows.len();
    let start = cmd.offset.min(total);
    let end = match cmd.limit {
        Some(limit) => start.saturating_add(limit).min(total),
        None => total,
    };
    let page: Vec<Vec<Value>> = rows.rows.drain(start..end).collect();

    let columns = header_names(cmd, &rows, fields);
    if cmd.is_select_all() {
        return ResultSet::new(columns, page);
    }

    let indices: Vec<Option<usize>> = fields.iter().map(|f| rows.resolve_last(f.text())).collect();
    let projected = page
        .into_iter()
        .map(|row| {
            indices
                .iter()
                .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    ResultSet::new(columns, projected)
}
