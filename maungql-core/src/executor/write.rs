//! CREATE, INSERT, UPDATE and DELETE execution.
//!
//! UPDATE and DELETE compute the full replacement record set in memory and
//! rewrite the table once; any error before the rewrite leaves the stored
//! records untouched.

use super::compare::{evaluate_chain, matches_literal};
use super::constraints::ConstraintValidator;
use super::locks::LockMode;
use super::{split_record, split_stored, typed_values, ExecutionResult, Executor, Storage};
use crate::ast::{Condition, CreateCommand, DeleteCommand, InsertCommand, UpdateCommand};
use crate::context::SessionContext;
use crate::error::{QueryError, QueryResult};
use crate::schema::{self, Action, Permissions, TableDefinition, FIELD_DELIMITER};
use crate::value::Value;

/// Evaluate a condition against a record by column position.
fn matches_positional(definition: &TableDefinition, values: &[Value], condition: &Condition) -> bool {
    match definition.resolve_field(&condition.field) {
        Some(idx) => matches_literal(
            &values[idx],
            condition.op,
            &condition.value,
            &definition.columns[idx].data_type,
        ),
        None => false,
    }
}

/// Write lock on the table, read locks on its foreign key parents.
fn write_lock_set(definition: &TableDefinition) -> Vec<(&str, LockMode)> {
    let mut locks = vec![(definition.name.as_str(), LockMode::Write)];
    locks.extend(
        definition
            .referenced_tables()
            .into_iter()
            .map(|table| (table, LockMode::Read)),
    );
    locks
}

impl<S: Storage> Executor<S> {
    pub(super) fn execute_create(
        &self,
        ctx: &SessionContext,
        cmd: &CreateCommand,
    ) -> QueryResult<ExecutionResult> {
        schema::validate_name("table", &cmd.table)?;
        let columns = schema::parse_columns(&cmd.columns)?;
        let permissions = cmd
            .permissions
            .clone()
            .unwrap_or_else(Permissions::defaults);
        let database = ctx.database.as_str();

        self.locks.with_locked(
            database,
            &[(cmd.table.as_str(), LockMode::Write)],
            || -> QueryResult<ExecutionResult> {
                schema::create(&self.storage, database, &cmd.table, columns, permissions)?;
                self.storage.init_table(database, &cmd.table)?;
                Ok(ExecutionResult::Status(format!(
                    "Table '{}' created",
                    cmd.table
                )))
            },
        )
    }

    pub(super) fn execute_insert(
        &self,
        ctx: &SessionContext,
        cmd: &InsertCommand,
    ) -> QueryResult<ExecutionResult> {
        let database = ctx.database.as_str();
        let definition = schema::load(&self.storage, database, &cmd.table)?;
        definition.require(&ctx.role, Action::Write)?;

        let lock_set = write_lock_set(&definition);
        self.locks
            .with_locked(database, &lock_set, || -> QueryResult<ExecutionResult> {
                let fields = schema::validate_row(&definition, &cmd.data)?;
                ConstraintValidator::new(&self.storage, database, &definition).validate(&fields)?;
                self.storage.append(database, &cmd.table, &cmd.data)?;
                tracing::debug!(table = %cmd.table, "Row inserted");
                Ok(ExecutionResult::Status(format!(
                    "1 row inserted into '{}'",
                    cmd.table
                )))
            })
    }

    pub(super) fn execute_update(
        &self,
        ctx: &SessionContext,
        cmd: &UpdateCommand,
    ) -> QueryResult<ExecutionResult> {
        let database = ctx.database.as_str();
        let definition = schema::load(&self.storage, database, &cmd.table)?;
        definition.require(&ctx.role, Action::Write)?;

        let assignments = cmd
            .assignments
            .iter()
            .map(|(column, value)| {
                definition
                    .resolve_field(column)
                    .map(|idx| (idx, value.as_str()))
                    .ok_or_else(|| {
                        QueryError::NotFound(format!(
                            "column '{}' in table '{}'",
                            column, cmd.table
                        ))
                    })
            })
            .collect::<QueryResult<Vec<_>>>()?;

        let lock_set = write_lock_set(&definition);
        self.locks
            .with_locked(database, &lock_set, || -> QueryResult<ExecutionResult> {
                let records = self.storage.read_all(database, &cmd.table)?;
                let mut lines = Vec::with_capacity(records.len());
                let mut modified = Vec::new();

                for raw in records.iter().filter(|r| !r.trim().is_empty()) {
                    let mut fields = split_stored(&definition, raw)?;
                    let values = typed_values(&definition, &fields);
                    if !evaluate_chain(&cmd.conditions, |c| {
                        matches_positional(&definition, &values, c)
                    }) {
                        lines.push(raw.clone());
                        continue;
                    }

                    // Untouched fields keep their raw text
                    for &(idx, value) in &assignments {
                        fields[idx] = value.to_string();
                    }
                    let line = fields.join(FIELD_DELIMITER.to_string().as_str());
                    schema::validate_row(&definition, &line)?;
                    modified.push(lines.len());
                    lines.push(line);
                }

                if !modified.is_empty() {
                    let validator = ConstraintValidator::new(&self.storage, database, &definition);
                    let mut rows: Vec<Vec<String>> = lines.iter().map(|l| split_record(l)).collect();
                    for &i in &modified {
                        // Compare each modified row against every other row
                        let row = std::mem::take(&mut rows[i]);
                        validator.validate_against(&row, &rows)?;
                        rows[i] = row;
                    }
                    self.storage.rewrite(database, &cmd.table, &lines)?;
                }

                tracing::debug!(table = %cmd.table, updated = modified.len(), "Rows updated");
                Ok(ExecutionResult::Status(format!(
                    "{} row(s) updated",
                    modified.len()
                )))
            })
    }

    pub(super) fn execute_delete(
        &self,
        ctx: &SessionContext,
        cmd: &DeleteCommand,
    ) -> QueryResult<ExecutionResult> {
        let database = ctx.database.as_str();
        let definition = schema::load(&self.storage, database, &cmd.table)?;
        definition.require(&ctx.role, Action::Write)?;

        self.locks.with_locked(
            database,
            &[(cmd.table.as_str(), LockMode::Write)],
            || -> QueryResult<ExecutionResult> {
                let records = self.storage.read_all(database, &cmd.table)?;
                let mut kept = Vec::with_capacity(records.len());
                let mut deleted = 0usize;

                for raw in records.iter().filter(|r| !r.trim().is_empty()) {
                    let fields = split_stored(&definition, raw)?;
                    let values = typed_values(&definition, &fields);
                    if evaluate_chain(&cmd.conditions, |c| {
                        matches_positional(&definition, &values, c)
                    }) {
                        deleted += 1;
                    } else {
                        kept.push(raw.clone());
                    }
                }

                if deleted > 0 {
                    self.storage.rewrite(database, &cmd.table, &kept)?;
                }
                tracing::debug!(table = %cmd.table, deleted, "Rows deleted");
                Ok(ExecutionResult::Status(format!("{} row(s) deleted", deleted)))
            },
        )
    }
}
