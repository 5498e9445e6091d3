use std::fs;
use std::path::{Path, PathBuf};

use maungql_core::schema::validate_name;
use maungql_core::{SessionContext, ADMIN_ROLE};

use crate::auth::require_role;
use crate::error::{DbError, DbResult};

/// Directory prefix of a database folder
pub const DATABASE_PREFIX: &str = "db_";
/// Extension of record files
pub const RECORD_EXTENSION: &str = "mg";
/// Extension of schema files
pub const SCHEMA_EXTENSION: &str = "schema";

/// Storage engine rooted at a data directory
#[derive(Debug, Clone)]
pub struct StorageEngine {
    root: PathBuf,
}

impl StorageEngine {
    /// Create a new storage engine, creating the data directory if needed
    pub fn new<P: AsRef<Path>>(data_dir: P) -> DbResult<Self> {
        let root = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Folder of a database
    pub fn database_path(&self, database: &str) -> PathBuf {
        self.root.join(format!("{}{}", DATABASE_PREFIX, database))
    }

    pub fn database_exists(&self, database: &str) -> bool {
        self.database_path(database).is_dir()
    }

    /// Make sure a database folder exists, without any role check.
    ///
    /// Used at startup for the configured database.
    pub fn initialize(&self, database: &str) -> DbResult<()> {
        validate_name("database", database)?;
        let path = self.database_path(database);
        if !path.is_dir() {
            fs::create_dir_all(&path)?;
            tracing::info!(database, path = %path.display(), "Database initialized");
        }
        Ok(())
    }

    /// Provision a new database. Requires the admin role or better.
    pub fn create_database(&self, ctx: &SessionContext, database: &str) -> DbResult<()> {
        require_role(ctx, ADMIN_ROLE)?;
        validate_name("database", database)?;

        let path = self.database_path(database);
        if path.exists() {
            return Err(DbError::DatabaseAlreadyExists(database.to_string()));
        }
        fs::create_dir_all(&path)?;
        tracing::info!(database, user = %ctx.username, "Database created");
        Ok(())
    }

    /// Names of all databases, sorted
    pub fn list_databases(&self) -> DbResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|n| n.strip_prefix(DATABASE_PREFIX))
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Fail unless the database exists
    pub fn require_database(&self, database: &str) -> DbResult<()> {
        if self.database_exists(database) {
            Ok(())
        } else {
            Err(DbError::DatabaseNotFound(database.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine() -> (StorageEngine, TempDir) {
        let tmp = TempDir::new().unwrap();
        let engine = StorageEngine::new(tmp.path().join("data")).unwrap();
        (engine, tmp)
    }

    #[test]
    fn test_create_database() {
        let (engine, _tmp) = engine();
        let admin = SessionContext::new("ani", "admin", "default");
        engine.create_database(&admin, "kantor").unwrap();
        assert!(engine.path().join("db_kantor").is_dir());
        assert!(matches!(
            engine.create_database(&admin, "kantor"),
            Err(DbError::DatabaseAlreadyExists(_))
        ));
        assert_eq!(engine.list_databases().unwrap(), vec!["kantor"]);
    }

    #[test]
    fn test_create_database_requires_admin() {
        let (engine, _tmp) = engine();
        let user = SessionContext::new("budi", "user", "default");
        assert!(matches!(
            engine.create_database(&user, "kantor"),
            Err(DbError::InsufficientPrivilege { .. })
        ));
        assert!(!engine.database_exists("kantor"));
    }

    #[test]
    fn test_database_names_are_checked() {
        let (engine, _tmp) = engine();
        let admin = SessionContext::new("ani", "supermaung", "default");
        assert!(engine.create_database(&admin, "../luar").is_err());
        assert!(engine.initialize("").is_err());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (engine, _tmp) = engine();
        engine.initialize("default").unwrap();
        engine.initialize("default").unwrap();
        assert!(engine.require_database("default").is_ok());
        assert!(matches!(
            engine.require_database("euweuh"),
            Err(DbError::DatabaseNotFound(_))
        ));
    }
}
