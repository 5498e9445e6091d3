//! Table definitions: columns, types, constraints and permissions.

mod codec;
mod store;
mod validate;

pub use codec::{parse_column_def, parse_columns, split_columns, validate_name};
pub use store::{create, load};
pub use validate::{validate_field, validate_row, FIELD_DELIMITER};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::context::{ADMIN_ROLE, SUPER_ROLE, USER_ROLE};
use crate::error::{QueryError, QueryResult};

/// Declared column type with its arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DataType {
    Int,
    Float,
    Bool,
    Date,
    /// Maximum length in characters
    Char(usize),
    /// Allowed values
    Enum(Vec<String>),
    String,
    Text,
}

impl DataType {
    /// Build a type from its base name and argument list.
    pub fn from_parts(base: &str, args: &[String]) -> QueryResult<Self> {
        let data_type = match base.to_uppercase().as_str() {
            "INT" => DataType::Int,
            "FLOAT" => DataType::Float,
            "BOOL" => DataType::Bool,
            "DATE" => DataType::Date,
            "STRING" => DataType::String,
            "TEXT" => DataType::Text,
            "CHAR" => {
                let len = args
                    .first()
                    .and_then(|a| a.trim().parse::<usize>().ok())
                    .ok_or_else(|| {
                        QueryError::Syntax("CHAR requires a length, e.g. CHAR(10)".to_string())
                    })?;
                DataType::Char(len)
            }
            "ENUM" => {
                let values: Vec<String> = args
                    .iter()
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect();
                if values.is_empty() {
                    return Err(QueryError::Syntax(
                        "ENUM requires at least one value, e.g. ENUM(a,b)".to_string(),
                    ));
                }
                DataType::Enum(values)
            }
            other => {
                return Err(QueryError::Syntax(format!("unknown type '{}'", other)));
            }
        };
        Ok(data_type)
    }

    /// Base type name without arguments
    pub fn base_name(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Float => "FLOAT",
            DataType::Bool => "BOOL",
            DataType::Date => "DATE",
            DataType::Char(_) => "CHAR",
            DataType::Enum(_) => "ENUM",
            DataType::String => "STRING",
            DataType::Text => "TEXT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Char(len) => write!(f, "CHAR({})", len),
            DataType::Enum(values) => write!(f, "ENUM({})", values.join(",")),
            other => f.write_str(other.base_name()),
        }
    }
}

/// Target of a foreign key, written `table.column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

impl ForeignKey {
    pub fn parse(reference: &str) -> QueryResult<Self> {
        match reference.trim().split_once('.') {
            Some((table, column)) if !table.is_empty() && !column.is_empty() => Ok(Self {
                table: table.trim().to_string(),
                column: column.trim().to_string(),
            }),
            _ => Err(QueryError::Syntax(format!(
                "foreign key '{}' must be written table.column",
                reference
            ))),
        }
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub is_primary: bool,
    pub is_unique: bool,
    pub is_not_null: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_primary: false,
            is_unique: false,
            is_not_null: false,
            foreign_key: None,
        }
    }

    /// Mark as primary key; implies UNIQUE and NOT NULL
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_unique = true;
        self.is_not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_not_null = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// Actions gated by table permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Action {
    Read,
    Write,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "read" => Some(Action::Read),
            "write" => Some(Action::Write),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action → roles allowed to perform it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Permissions {
    roles: BTreeMap<Action, BTreeSet<String>>,
}

impl Permissions {
    /// Empty mapping: every action denied to everyone but the super-role
    pub fn new() -> Self {
        Self::default()
    }

    /// `read` for every role, `write` for admin and the super-role
    pub fn defaults() -> Self {
        Self::new()
            .allow(Action::Read, [USER_ROLE, ADMIN_ROLE, SUPER_ROLE])
            .allow(Action::Write, [ADMIN_ROLE, SUPER_ROLE])
    }

    /// Add roles to an action
    pub fn allow<I, R>(mut self, action: Action, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.grant(action, roles);
        self
    }

    pub fn grant<I, R>(&mut self, action: Action, roles: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let granted: BTreeSet<String> = roles
            .into_iter()
            .map(|role| {
                let role: String = role.into();
                role.trim().to_string()
            })
            .filter(|role| !role.is_empty())
            .collect();
        if !granted.is_empty() {
            self.roles.entry(action).or_default().extend(granted);
        }
    }

    /// Replace the role set of an action. An empty set removes the action,
    /// which denies it the same way.
    pub fn set(&mut self, action: Action, roles: BTreeSet<String>) {
        if roles.is_empty() {
            self.roles.remove(&action);
        } else {
            self.roles.insert(action, roles);
        }
    }

    pub fn roles(&self, action: Action) -> Option<&BTreeSet<String>> {
        self.roles.get(&action)
    }

    /// Iterate (action, roles) in action order
    pub fn iter(&self) -> impl Iterator<Item = (Action, &BTreeSet<String>)> {
        self.roles.iter().map(|(action, roles)| (*action, roles))
    }

    /// The super-role always passes; an action with no roles denies everyone else.
    pub fn can(&self, role: &str, action: Action) -> bool {
        if role == SUPER_ROLE {
            return true;
        }
        self.roles
            .get(&action)
            .map(|roles| roles.contains(role))
            .unwrap_or(false)
    }
}

/// Persisted definition of one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDefinition {
    pub name: String,
    /// Order is the positional contract for records
    pub columns: Vec<Column>,
    pub permissions: Permissions,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, permissions: Permissions) -> Self {
        Self {
            name: name.into(),
            columns,
            permissions,
        }
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Exact match first, then case-insensitive
    pub fn column_index_loose(&self, name: &str) -> Option<usize> {
        self.column_index(name).or_else(|| {
            self.columns
                .iter()
                .position(|c| c.name.eq_ignore_ascii_case(name))
        })
    }

    /// Resolve a possibly table-qualified field (`table.col` or `col`)
    pub fn resolve_field(&self, field: &str) -> Option<usize> {
        if let Some(idx) = self.column_index(field) {
            return Some(idx);
        }
        match field.split_once('.') {
            Some((table, column)) if table == self.name => self.column_index(column),
            _ => None,
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn can(&self, role: &str, action: Action) -> bool {
        self.permissions.can(role, action)
    }

    /// Fail with `PermissionDenied` unless the role may perform the action
    pub fn require(&self, role: &str, action: Action) -> QueryResult<()> {
        if self.can(role, action) {
            Ok(())
        } else {
            Err(QueryError::PermissionDenied {
                role: role.to_string(),
                action: action.to_string(),
                table: self.name.clone(),
            })
        }
    }

    /// Foreign key parents referenced by this table
    pub fn referenced_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self
            .columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref().map(|fk| fk.table.as_str()))
            .collect();
        tables.sort_unstable();
        tables.dedup();
        tables
    }
}
