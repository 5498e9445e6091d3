use maungql_core::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Database '{0}' not found")]
    DatabaseNotFound(String),

    #[error("Database '{0}' already exists")]
    DatabaseAlreadyExists(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    // Authorization errors
    #[error("Insufficient privilege: role '{role}' requires at least '{required}'")]
    InsufficientPrivilege { role: String, required: String },

    #[error("Role not found: {0}")]
    RoleNotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl serde::Serialize for DbError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl From<DbError> for QueryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Query(e) => e,
            other => QueryError::Storage(other.to_string()),
        }
    }
}
