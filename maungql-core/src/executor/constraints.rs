//! NOT NULL, PRIMARY KEY / UNIQUE and FOREIGN KEY checks.
//!
//! Checks run column by column in schema order and stop at the first
//! violation. Uniqueness and foreign keys are full table scans.

use super::{split_record, Storage};
use crate::error::{ConstraintViolation, ForeignKeyFailure, KeyKind, QueryError, QueryResult};
use crate::schema::{self, Column, ForeignKey, TableDefinition};
use crate::value::is_null_literal;

pub struct ConstraintValidator<'a, S: Storage + ?Sized> {
    storage: &'a S,
    database: &'a str,
    definition: &'a TableDefinition,
}

impl<'a, S: Storage + ?Sized> ConstraintValidator<'a, S> {
    pub fn new(storage: &'a S, database: &'a str, definition: &'a TableDefinition) -> Self {
        Self {
            storage,
            database,
            definition,
        }
    }

    /// Validate a new row against every row currently stored in the table.
    pub fn validate(&self, fields: &[String]) -> QueryResult<()> {
        let existing: Vec<Vec<String>> = self
            .storage
            .read_all(self.database, &self.definition.name)?
            .iter()
            .filter(|r| !r.trim().is_empty())
            .map(|r| split_record(r))
            .collect();
        self.validate_against(fields, &existing)
    }

    /// Validate a row against an explicit set of other rows.
    pub fn validate_against(&self, fields: &[String], others: &[Vec<String>]) -> QueryResult<()> {
        for (idx, (column, raw)) in self.definition.columns.iter().zip(fields).enumerate() {
            let value = raw.trim();
            let is_null = is_null_literal(value);

            if column.is_not_null && is_null {
                return Err(ConstraintViolation::NotNull {
                    column: column.name.clone(),
                }
                .into());
            }
            if is_null {
                continue;
            }

            if column.is_primary || column.is_unique {
                let taken = others
                    .iter()
                    .any(|row| row.get(idx).map(|v| v.trim() == value).unwrap_or(false));
                if taken {
                    let kind = if column.is_primary {
                        KeyKind::Primary
                    } else {
                        KeyKind::Unique
                    };
                    return Err(ConstraintViolation::Duplicate {
                        kind,
                        column: column.name.clone(),
                        value: value.to_string(),
                    }
                    .into());
                }
            }

            if let Some(fk) = &column.foreign_key {
                self.check_foreign_key(column, fk, value)?;
            }
        }
        Ok(())
    }

    fn check_foreign_key(&self, column: &Column, fk: &ForeignKey, value: &str) -> QueryResult<()> {
        let violation = |failure| -> QueryError {
            ConstraintViolation::ForeignKey {
                column: column.name.clone(),
                reference: fk.to_string(),
                failure,
            }
            .into()
        };

        let parent = match schema::load(self.storage, self.database, &fk.table) {
            Ok(parent) => parent,
            Err(QueryError::NotFound(_)) => {
                return Err(violation(ForeignKeyFailure::ParentTableMissing))
            }
            Err(e) => return Err(e),
        };
        let Some(parent_idx) = parent.column_index_loose(&fk.column) else {
            return Err(violation(ForeignKeyFailure::ParentColumnMissing));
        };

        let found = self
            .storage
            .read_all(self.database, &fk.table)?
            .iter()
            .any(|r| {
                split_record(r)
                    .get(parent_idx)
                    .map(|v| v.trim() == value)
                    .unwrap_or(false)
            });
        if found {
            Ok(())
        } else {
            Err(violation(ForeignKeyFailure::ValueMissing(value.to_string())))
        }
    }
}
