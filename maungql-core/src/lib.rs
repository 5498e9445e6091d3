//! MaungQL Core - Storage-independent MaungQL parser, schema engine and executor.
//!
//! This crate provides the core components for parsing and executing MaungQL
//! queries without any filesystem dependency. Records and schemas are read and
//! written through the [`Storage`] trait.
//!
//! # Main Components
//!
//! - **Lexer / Parser**: Turn query text (Sundanese or English keywords) into a [`Command`]
//! - **Schema**: Column types, constraints, permissions and their text encoding
//! - **Executor**: Runs commands against a `Storage` under per-table locks
//!
//! # Example
//!
//! ```rust
//! use maungql_core::{Executor, InMemoryStorage, SessionContext, Value};
//!
//! let executor = Executor::new(InMemoryStorage::new());
//! let ctx = SessionContext::new("asep", "supermaung", "kantor");
//!
//! executor.execute(&ctx, "DAMEL pegawai id:INT:PK,nama:STRING").unwrap();
//! executor.execute(&ctx, "SIMPEN pegawai 1|Asep").unwrap();
//!
//! let result = executor.execute(&ctx, "TINGALI nama TI pegawai DIMANA id = 1").unwrap();
//! let rows = &result.result_set().unwrap().rows;
//! assert_eq!(rows[0][0], Value::Text("Asep".to_string()));
//! ```

pub mod ast;
pub mod context;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod value;

// Re-export main types for convenience
pub use ast::{
    Command, CompareOp, Condition, CreateCommand, DeleteCommand, InsertCommand, JoinClause,
    JoinKind, LogicOp, OrderBy, SelectCommand, UpdateCommand,
};
pub use context::{SessionContext, ADMIN_ROLE, SUPER_ROLE, USER_ROLE};
pub use error::{ConstraintViolation, ForeignKeyFailure, KeyKind, QueryError, QueryResult};
pub use executor::{ExecutionResult, Executor, InMemoryStorage, ResultSet, Storage, TableLocks};
pub use parser::{parse, Parser};
pub use schema::{Action, Column, DataType, ForeignKey, Permissions, TableDefinition};
pub use value::Value;
