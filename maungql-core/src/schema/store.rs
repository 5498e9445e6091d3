//! Schema persistence over a [`Storage`] collaborator.

use super::{Column, Permissions, TableDefinition};
use crate::error::{QueryError, QueryResult};
use crate::executor::Storage;

/// Persist a new table definition. Fails if the table already has one.
pub fn create<S: Storage + ?Sized>(
    storage: &S,
    database: &str,
    table: &str,
    columns: Vec<Column>,
    permissions: Permissions,
) -> QueryResult<TableDefinition> {
    if storage.read_schema(database, table)?.is_some() {
        return Err(QueryError::AlreadyExists(format!("table '{}'", table)));
    }
    let definition = TableDefinition::new(table, columns, permissions);
    storage.write_schema(database, table, &definition.encode())?;
    tracing::info!(database, table, "Schema created");
    Ok(definition)
}

/// Load a table definition.
pub fn load<S: Storage + ?Sized>(
    storage: &S,
    database: &str,
    table: &str,
) -> QueryResult<TableDefinition> {
    match storage.read_schema(database, table)? {
        Some(text) => TableDefinition::decode(table, &text),
        None => Err(QueryError::NotFound(format!("table '{}'", table))),
    }
}
