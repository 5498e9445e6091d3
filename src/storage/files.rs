//! `Storage` implementation over schema and record files.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use maungql_core::schema::validate_name;
use maungql_core::{QueryError, QueryResult, Storage};

use super::engine::{StorageEngine, RECORD_EXTENSION, SCHEMA_EXTENSION};

/// Replace a file's contents via a temp file and rename, so readers never
/// see a partially written file.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)
}

impl StorageEngine {
    fn table_file(&self, database: &str, table: &str, extension: &str) -> QueryResult<PathBuf> {
        validate_name("database", database)?;
        validate_name("table", table)?;
        let dir = self.database_path(database);
        if !dir.is_dir() {
            return Err(QueryError::NotFound(format!("database '{}'", database)));
        }
        Ok(dir.join(format!("{}.{}", table, extension)))
    }

    fn records_missing(table: &str) -> QueryError {
        QueryError::NotFound(format!("records of table '{}'", table))
    }
}

impl Storage for StorageEngine {
    fn read_schema(&self, database: &str, table: &str) -> QueryResult<Option<String>> {
        let path = self.table_file(database, table, SCHEMA_EXTENSION)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_schema(&self, database: &str, table: &str, encoded: &str) -> QueryResult<()> {
        let path = self.table_file(database, table, SCHEMA_EXTENSION)?;
        write_atomic(&path, encoded)?;
        Ok(())
    }

    fn init_table(&self, database: &str, table: &str) -> QueryResult<()> {
        let path = self.table_file(database, table, RECORD_EXTENSION)?;
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(())
    }

    fn read_all(&self, database: &str, table: &str) -> QueryResult<Vec<String>> {
        let path = self.table_file(database, table, RECORD_EXTENSION)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::records_missing(table)),
            Err(e) => Err(e.into()),
        }
    }

    fn append(&self, database: &str, table: &str, record: &str) -> QueryResult<()> {
        let path = self.table_file(database, table, RECORD_EXTENSION)?;
        let mut file = match OpenOptions::new().append(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Self::records_missing(table)),
            Err(e) => return Err(e.into()),
        };
        // One write call per line
        file.write_all(format!("{}\n", record).as_bytes())?;
        Ok(())
    }

    fn rewrite(&self, database: &str, table: &str, records: &[String]) -> QueryResult<()> {
        let path = self.table_file(database, table, RECORD_EXTENSION)?;
        let mut contents = records.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        write_atomic(&path, &contents)?;
        Ok(())
    }

    fn list_tables(&self, database: &str) -> QueryResult<Vec<String>> {
        validate_name("database", database)?;
        let dir = self.database_path(database);
        if !dir.is_dir() {
            return Err(QueryError::NotFound(format!("database '{}'", database)));
        }

        let mut tables = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(SCHEMA_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    tables.push(stem.to_string());
                }
            }
        }
        tables.sort();
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine() -> (StorageEngine, TempDir) {
        let tmp = TempDir::new().unwrap();
        let engine = StorageEngine::new(tmp.path()).unwrap();
        engine.initialize("kantor").unwrap();
        (engine, tmp)
    }

    #[test]
    fn test_schema_files() {
        let (engine, tmp) = engine();
        assert_eq!(engine.read_schema("kantor", "pegawai").unwrap(), None);

        engine.write_schema("kantor", "pegawai", "id:INT\n").unwrap();
        assert_eq!(
            engine.read_schema("kantor", "pegawai").unwrap().as_deref(),
            Some("id:INT\n")
        );
        assert!(tmp.path().join("db_kantor/pegawai.schema").is_file());
        assert!(!tmp.path().join("db_kantor/pegawai.tmp").exists());
    }

    #[test]
    fn test_record_files() {
        let (engine, tmp) = engine();
        assert!(matches!(
            engine.read_all("kantor", "pegawai"),
            Err(QueryError::NotFound(_))
        ));
        assert!(engine.append("kantor", "pegawai", "1|Asep").is_err());

        engine.init_table("kantor", "pegawai").unwrap();
        assert!(engine.read_all("kantor", "pegawai").unwrap().is_empty());

        engine.append("kantor", "pegawai", "1|Asep").unwrap();
        engine.append("kantor", "pegawai", "2|Ujang").unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("db_kantor/pegawai.mg")).unwrap(),
            "1|Asep\n2|Ujang\n"
        );

        // Re-initializing keeps existing records
        engine.init_table("kantor", "pegawai").unwrap();
        engine
            .rewrite("kantor", "pegawai", &["2|Ujang".to_string()])
            .unwrap();
        assert_eq!(engine.read_all("kantor", "pegawai").unwrap(), vec!["2|Ujang"]);

        engine.rewrite("kantor", "pegawai", &[]).unwrap();
        assert!(engine.read_all("kantor", "pegawai").unwrap().is_empty());
    }

    #[test]
    fn test_missing_database() {
        let (engine, _tmp) = engine();
        assert!(matches!(
            engine.read_schema("euweuh", "t"),
            Err(QueryError::NotFound(_))
        ));
        assert!(engine.list_tables("euweuh").is_err());
    }

    #[test]
    fn test_names_cannot_escape_data_dir() {
        let (engine, _tmp) = engine();
        assert!(matches!(
            engine.read_schema("kantor", "../../etc/passwd"),
            Err(QueryError::Syntax(_))
        ));
        assert!(engine.read_all("..", "t").is_err());
    }

    #[test]
    fn test_list_tables() {
        let (engine, _tmp) = engine();
        engine.write_schema("kantor", "pegawai", "id:INT").unwrap();
        engine.write_schema("kantor", "divisi", "id:INT").unwrap();
        engine.init_table("kantor", "divisi").unwrap();
        assert_eq!(engine.list_tables("kantor").unwrap(), vec!["divisi", "pegawai"]);
    }
}
