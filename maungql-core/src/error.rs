//! Error types for maungql-core.
//!
//! Minimal error types without filesystem or server dependencies.

use std::fmt;

use thiserror::Error;

/// MaungQL error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: role '{role}' cannot {action} table '{table}'")]
    PermissionDenied {
        role: String,
        action: String,
        table: String,
    },

    #[error("Arity error: expected {expected} fields, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("Type error: column '{column}' expects {expected}, got '{value}'")]
    Type {
        column: String,
        expected: String,
        value: String,
    },

    #[error("Constraint violation: {0}")]
    Constraint(#[from] ConstraintViolation),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for MaungQL operations
pub type QueryResult<T> = Result<T, QueryError>;

impl serde::Serialize for QueryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        QueryError::Storage(err.to_string())
    }
}

/// Which uniqueness constraint a duplicate value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Primary,
    Unique,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Primary => f.write_str("PRIMARY KEY"),
            KeyKind::Unique => f.write_str("UNIQUE"),
        }
    }
}

/// Why a foreign key check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignKeyFailure {
    ParentTableMissing,
    ParentColumnMissing,
    ValueMissing(String),
}

impl fmt::Display for ForeignKeyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignKeyFailure::ParentTableMissing => f.write_str("parent table not found"),
            ForeignKeyFailure::ParentColumnMissing => f.write_str("parent column not found"),
            ForeignKeyFailure::ValueMissing(value) => {
                write!(f, "value '{}' not found in parent", value)
            }
        }
    }
}

/// A rejected write, naming the offending column and constraint kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintViolation {
    #[error("NOT NULL on column '{column}'")]
    NotNull { column: String },

    #[error("{kind} on column '{column}': value '{value}' already exists")]
    Duplicate {
        kind: KeyKind,
        column: String,
        value: String,
    },

    #[error("FOREIGN KEY on column '{column}' referencing {reference}: {failure}")]
    ForeignKey {
        column: String,
        reference: String,
        failure: ForeignKeyFailure,
    },
}

impl ConstraintViolation {
    /// Column the violation was reported against.
    pub fn column(&self) -> &str {
        match self {
            ConstraintViolation::NotNull { column }
            | ConstraintViolation::Duplicate { column, .. }
            | ConstraintViolation::ForeignKey { column, .. } => column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::Syntax("unknown verb".to_string());
        assert_eq!(err.to_string(), "Syntax error: unknown verb");

        let err = QueryError::NotFound("table 'users'".to_string());
        assert_eq!(err.to_string(), "Not found: table 'users'");

        let err = QueryError::Arity {
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "Arity error: expected 3 fields, found 2");

        let err = QueryError::PermissionDenied {
            role: "user".to_string(),
            action: "write".to_string(),
            table: "pegawai".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Permission denied: role 'user' cannot write table 'pegawai'"
        );
    }

    #[test]
    fn test_constraint_messages() {
        let err = ConstraintViolation::Duplicate {
            kind: KeyKind::Primary,
            column: "id".to_string(),
            value: "1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "PRIMARY KEY on column 'id': value '1' already exists"
        );
        assert_eq!(err.column(), "id");

        let err = ConstraintViolation::ForeignKey {
            column: "divisi_id".to_string(),
            reference: "divisi.id".to_string(),
            failure: ForeignKeyFailure::ValueMissing("9".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "FOREIGN KEY on column 'divisi_id' referencing divisi.id: value '9' not found in parent"
        );
    }

    #[test]
    fn test_serialize_as_string() {
        let err = QueryError::Syntax("bad".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Syntax error: bad\"");
    }
}
