//! Request-scoped identity threaded through every schema and executor call.

use serde::{Deserialize, Serialize};

/// Role that bypasses every permission check.
pub const SUPER_ROLE: &str = "supermaung";
/// Administrative role, allowed to write by default.
pub const ADMIN_ROLE: &str = "admin";
/// Ordinary role, read-only by default.
pub const USER_ROLE: &str = "user";

/// Identity and active database of the caller issuing a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub username: String,
    pub role: String,
    pub database: String,
}

impl SessionContext {
    pub fn new(
        username: impl Into<String>,
        role: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
            database: database.into(),
        }
    }

    /// Check if the caller holds the super-role
    pub fn is_super(&self) -> bool {
        self.role == SUPER_ROLE
    }

    /// Same identity against another database
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..self.clone()
        }
    }
}
