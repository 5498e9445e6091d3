//! Role levels and role checks.
//!
//! Lower levels are more privileged. Per-table read/write permissions are
//! checked by the executor; these helpers gate operations outside any table,
//! such as provisioning a database.

use maungql_core::{SessionContext, ADMIN_ROLE, SUPER_ROLE, USER_ROLE};

use crate::error::{DbError, DbResult};

/// Privilege level of a known role
pub fn role_level(role: &str) -> Option<u8> {
    match role {
        SUPER_ROLE => Some(0),
        ADMIN_ROLE => Some(1),
        USER_ROLE => Some(2),
        _ => None,
    }
}

/// Succeed when the session's role is at least as privileged as `min_role`.
pub fn require_role(ctx: &SessionContext, min_role: &str) -> DbResult<()> {
    let required =
        role_level(min_role).ok_or_else(|| DbError::RoleNotFound(min_role.to_string()))?;
    let actual = role_level(&ctx.role).ok_or_else(|| DbError::RoleNotFound(ctx.role.clone()))?;

    if actual <= required {
        Ok(())
    } else {
        tracing::debug!(user = %ctx.username, role = %ctx.role, required = min_role, "Role check failed");
        Err(DbError::InsufficientPrivilege {
            role: ctx.role.clone(),
            required: min_role.to_string(),
        })
    }
}
