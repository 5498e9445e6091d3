//! # maungdb
//!
//! File-backed storage, configuration and CLI plumbing around the
//! `maungql-core` query engine.
//!
//! ```no_run
//! use maungdb::{Executor, SessionContext, StorageEngine};
//!
//! let engine = StorageEngine::new("maung_data")?;
//! engine.initialize("default")?;
//! let executor = Executor::new(engine);
//!
//! let ctx = SessionContext::new("maung", "supermaung", "default");
//! let result = executor.execute(&ctx, "TINGALI * TI pegawai")?;
//! println!("{}", maungdb::render::render(&result));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod render;
pub mod shell;
pub mod storage;

pub use auth::{require_role, role_level};
pub use config::Config;
pub use error::{DbError, DbResult};
pub use storage::StorageEngine;

pub use maungql_core::{
    ExecutionResult, Executor, QueryError, QueryResult, ResultSet, SessionContext, Value,
};
