//! File-backed storage.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/db_<database>/<table>.schema   schema text
//! <data_dir>/db_<database>/<table>.mg       one pipe-delimited record per line
//! ```

pub mod engine;
mod files;

pub use engine::{StorageEngine, DATABASE_PREFIX, RECORD_EXTENSION, SCHEMA_EXTENSION};
