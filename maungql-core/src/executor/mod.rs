//! Executor module for MaungQL commands.
//!
//! The executor runs parsed commands against any record store implementing
//! the [`Storage`] trait. It owns a per-table lock registry so concurrent
//! callers never interleave a read-modify-rewrite on the same table.

mod aggregate;
mod compare;
mod constraints;
mod join;
mod locks;
mod select;
mod write;

pub use aggregate::{parse_field, AggregateFunc, FieldSelection};
pub use compare::{compare, evaluate_chain, matches_literal};
pub use constraints::ConstraintValidator;
pub use join::{HeaderColumn, JoinedRows};
pub use locks::{LockMode, TableLocks};

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;

use crate::ast::Command;
use crate::context::SessionContext;
use crate::error::{QueryError, QueryResult};
use crate::parser;
use crate::schema::{TableDefinition, FIELD_DELIMITER};
use crate::value::Value;

/// Record and schema storage the executor reads and writes.
///
/// Every call names the database explicitly; the executor never relies on
/// ambient session state.
pub trait Storage {
    /// Encoded schema text of a table, or `None` if the table has none.
    fn read_schema(&self, database: &str, table: &str) -> QueryResult<Option<String>>;

    /// Persist encoded schema text, replacing any previous text.
    fn write_schema(&self, database: &str, table: &str, encoded: &str) -> QueryResult<()>;

    /// Provision an empty record store for a table. Existing data is kept.
    fn init_table(&self, database: &str, table: &str) -> QueryResult<()>;

    /// All raw record lines of a table, in stored order.
    fn read_all(&self, database: &str, table: &str) -> QueryResult<Vec<String>>;

    /// Append one raw record.
    fn append(&self, database: &str, table: &str, record: &str) -> QueryResult<()>;

    /// Replace every record of a table.
    fn rewrite(&self, database: &str, table: &str, records: &[String]) -> QueryResult<()>;

    /// Names of tables with a schema in a database.
    fn list_tables(&self, _database: &str) -> QueryResult<Vec<String>> {
        Ok(vec![])
    }
}

type TableKey = (String, String);

fn key(database: &str, table: &str) -> TableKey {
    (database.to_string(), table.to_string())
}

/// In-memory storage for testing
#[derive(Default)]
pub struct InMemoryStorage {
    schemas: Mutex<HashMap<TableKey, String>>,
    records: Mutex<HashMap<TableKey, Vec<String>>>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw records for a table, bypassing validation
    pub fn insert_raw(&self, database: &str, table: &str, records: &[&str]) {
        self.records
            .lock()
            .entry(key(database, table))
            .or_default()
            .extend(records.iter().map(|r| r.to_string()));
    }
}

impl Storage for InMemoryStorage {
    fn read_schema(&self, database: &str, table: &str) -> QueryResult<Option<String>> {
        Ok(self.schemas.lock().get(&key(database, table)).cloned())
    }

    fn write_schema(&self, database: &str, table: &str, encoded: &str) -> QueryResult<()> {
        self.schemas
            .lock()
            .insert(key(database, table), encoded.to_string());
        Ok(())
    }

    fn init_table(&self, database: &str, table: &str) -> QueryResult<()> {
        self.records.lock().entry(key(database, table)).or_default();
        Ok(())
    }

    fn read_all(&self, database: &str, table: &str) -> QueryResult<Vec<String>> {
        self.records
            .lock()
            .get(&key(database, table))
            .cloned()
            .ok_or_else(|| QueryError::NotFound(format!("records of table '{}'", table)))
    }

    fn append(&self, database: &str, table: &str, record: &str) -> QueryResult<()> {
        match self.records.lock().get_mut(&key(database, table)) {
            Some(rows) => {
                rows.push(record.to_string());
                Ok(())
            }
            None => Err(QueryError::NotFound(format!("records of table '{}'", table))),
        }
    }

    fn rewrite(&self, database: &str, table: &str, records: &[String]) -> QueryResult<()> {
        self.records
            .lock()
            .insert(key(database, table), records.to_vec());
        Ok(())
    }

    fn list_tables(&self, database: &str) -> QueryResult<Vec<String>> {
        let mut tables: Vec<String> = self
            .schemas
            .lock()
            .keys()
            .filter(|(db, _)| db == database)
            .map(|(_, table)| table.clone())
            .collect();
        tables.sort();
        Ok(tables)
    }
}

/// Tabular output of a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub message: String,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let message = format!("{} row(s) found", rows.len());
        Self {
            columns,
            rows,
            message,
        }
    }
}

/// Outcome of one command: a status message or a result set, never both
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionResult {
    Status(String),
    Rows(ResultSet),
}

impl ExecutionResult {
    pub fn message(&self) -> &str {
        match self {
            ExecutionResult::Status(message) => message,
            ExecutionResult::Rows(set) => &set.message,
        }
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            ExecutionResult::Rows(set) => Some(set),
            ExecutionResult::Status(_) => None,
        }
    }
}

/// Split a raw record into its fields.
pub(crate) fn split_record(raw: &str) -> Vec<String> {
    raw.split(FIELD_DELIMITER).map(str::to_string).collect()
}

/// Split a stored record and check its arity against the definition.
pub(crate) fn split_stored(definition: &TableDefinition, raw: &str) -> QueryResult<Vec<String>> {
    let fields = split_record(raw);
    if fields.len() != definition.columns.len() {
        tracing::warn!(
            table = %definition.name,
            record = raw,
            "Stored record does not match schema arity"
        );
        return Err(QueryError::Arity {
            expected: definition.columns.len(),
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Parse split fields into typed values by column type.
pub(crate) fn typed_values(definition: &TableDefinition, fields: &[String]) -> Vec<Value> {
    definition
        .columns
        .iter()
        .zip(fields)
        .map(|(column, raw)| Value::parse(raw, &column.data_type))
        .collect()
}

/// Executes MaungQL commands against a [`Storage`].
pub struct Executor<S: Storage> {
    storage: S,
    locks: TableLocks,
}

impl<S: Storage> Executor<S> {
    /// Create a new executor over the given storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            locks: TableLocks::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn locks(&self) -> &TableLocks {
        &self.locks
    }

    /// Parse and execute a query string.
    pub fn execute(&self, ctx: &SessionContext, query: &str) -> QueryResult<ExecutionResult> {
        let command = parser::parse(query)?;
        self.execute_command(ctx, &command)
    }

    /// Execute a parsed command.
    pub fn execute_command(
        &self,
        ctx: &SessionContext,
        command: &Command,
    ) -> QueryResult<ExecutionResult> {
        tracing::debug!(
            user = %ctx.username,
            database = %ctx.database,
            verb = command.verb(),
            table = command.table(),
            "Executing command"
        );
        match command {
            Command::Create(cmd) => self.execute_create(ctx, cmd),
            Command::Insert(cmd) => self.execute_insert(ctx, cmd),
            Command::Select(cmd) => self.execute_select(ctx, cmd),
            Command::Update(cmd) => self.execute_update(ctx, cmd),
            Command::Delete(cmd) => self.execute_delete(ctx, cmd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_storage() {
        let storage = InMemoryStorage::new();
        assert!(storage.read_all("db", "t").is_err());
        assert!(storage.append("db", "t", "1").is_err());

        storage.init_table("db", "t").unwrap();
        storage.append("db", "t", "1|a").unwrap();
        storage.append("db", "t", "2|b").unwrap();
        assert_eq!(storage.read_all("db", "t").unwrap(), vec!["1|a", "2|b"]);

        storage.rewrite("db", "t", &["3|c".to_string()]).unwrap();
        assert_eq!(storage.read_all("db", "t").unwrap(), vec!["3|c"]);
    }

    #[test]
    fn test_init_table_keeps_data() {
        let storage = InMemoryStorage::new();
        storage.insert_raw("db", "t", &["1"]);
        storage.init_table("db", "t").unwrap();
        assert_eq!(storage.read_all("db", "t").unwrap().len(), 1);
    }

    #[test]
    fn test_execution_result_accessors() {
        let status = ExecutionResult::Status("ok".to_string());
        assert_eq!(status.message(), "ok");
        assert!(status.result_set().is_none());

        let rows = ExecutionResult::Rows(ResultSet::new(vec!["a".into()], vec![vec![Value::Int(1)]]));
        assert_eq!(rows.message(), "1 row(s) found");
        assert_eq!(rows.result_set().unwrap().rows.len(), 1);
    }

    #[test]
    fn test_execution_result_json() {
        let result = ExecutionResult::Rows(ResultSet::new(
            vec!["t.a".into()],
            vec![vec![Value::Null]],
        ));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rows"]["columns"][0], "t.a");
        assert!(json["rows"]["rows"][0][0].is_null());
    }
}
