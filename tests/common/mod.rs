//! Common test utilities for maungdb integration tests
//!
//! Provides shared helpers for:
//! - Creating file-backed executors in a temp data directory
//! - Seeding a small `kantor` database
//! - Reading query results

#![allow(dead_code)]

use maungdb::{ExecutionResult, Executor, ResultSet, SessionContext, StorageEngine, Value};
use tempfile::TempDir;

pub const DATABASE: &str = "kantor";

pub fn create_test_executor() -> (Executor<StorageEngine>, TempDir) {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let engine = StorageEngine::new(tmp_dir.path()).expect("Failed to create storage engine");
    engine.initialize(DATABASE).expect("Failed to initialize database");
    (Executor::new(engine), tmp_dir)
}

pub fn super_ctx() -> SessionContext {
    SessionContext::new("asep", "supermaung", DATABASE)
}

pub fn user_ctx() -> SessionContext {
    SessionContext::new("budi", "user", DATABASE)
}

/// Executor with `divisi` and `pegawai` tables (pegawai.divisi_id references divisi.id)
pub fn create_seeded_executor() -> (Executor<StorageEngine>, TempDir) {
    let (executor, tmp) = create_test_executor();
    let ctx = super_ctx();
    for query in [
        "DAMEL divisi id:INT:PK,nama:STRING:UNIQUE",
        "DAMEL pegawai id:INT:PK,nama:STRING:NOT NULL,gaji:FLOAT,aktif:BOOL,lebet:DATE,divisi_id:INT:FK(divisi.id)",
        "SIMPEN divisi 10|IT",
        "SIMPEN divisi 20|HRD",
        "SIMPEN divisi 30|Keuangan",
        "SIMPEN pegawai 1|Asep|5000|true|2020-01-15|10",
        "SIMPEN pegawai 2|Ujang|7000|true|2019-06-01|10",
        "SIMPEN pegawai 3|Euis|6000|false|2021-03-20|20",
        "SIMPEN pegawai 4|Dadang|NULL|true|2022-11-11|NULL",
    ] {
        executor
            .execute(&ctx, query)
            .unwrap_or_else(|e| panic!("seed query '{}' failed: {}", query, e));
    }
    (executor, tmp)
}

pub fn query(executor: &Executor<StorageEngine>, ctx: &SessionContext, q: &str) -> ResultSet {
    match executor.execute(ctx, q).expect("Query failed") {
        ExecutionResult::Rows(set) => set,
        other => panic!("Expected rows, got {:?}", other),
    }
}

pub fn status(executor: &Executor<StorageEngine>, ctx: &SessionContext, q: &str) -> String {
    match executor.execute(ctx, q).expect("Query failed") {
        ExecutionResult::Status(message) => message,
        other => panic!("Expected status, got {:?}", other),
    }
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// First column of every row
pub fn column(set: &ResultSet) -> Vec<Value> {
    set.rows.iter().map(|row| row[0].clone()).collect()
}

pub fn record_file(tmp: &TempDir, table: &str) -> String {
    std::fs::read_to_string(tmp.path().join(format!("db_{}/{}.mg", DATABASE, table)))
        .expect("Failed to read record file")
}
