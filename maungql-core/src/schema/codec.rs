//! On-disk schema encoding.
//!
//! Line 1 holds the `|`-joined column descriptors
//! (`name:TYPE[(args)][:CONSTRAINT]*`); every following line is
//! `role=action,action`.

use std::collections::{BTreeMap, BTreeSet};

use super::{Action, Column, DataType, ForeignKey, Permissions, TableDefinition};
use crate::error::{QueryError, QueryResult};

/// Split column definitions on commas outside parentheses.
///
/// `id:INT,jk:ENUM(L,P)` yields `["id:INT", "jk:ENUM(L,P)"]`.
pub fn split_columns(input: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;

    for ch in input.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth <= 0 => {
                let field = current.trim();
                if !field.is_empty() {
                    fields.push(field.to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let field = current.trim();
    if !field.is_empty() {
        fields.push(field.to_string());
    }
    fields
}

/// Parse comma-separated column definitions, rejecting duplicate names.
pub fn parse_columns(input: &str) -> QueryResult<Vec<Column>> {
    let mut columns: Vec<Column> = Vec::new();
    for def in split_columns(input) {
        let column = parse_column_def(&def)?;
        if columns.iter().any(|c| c.name == column.name) {
            return Err(QueryError::Syntax(format!(
                "duplicate column '{}'",
                column.name
            )));
        }
        columns.push(column);
    }
    if columns.is_empty() {
        return Err(QueryError::Syntax(
            "at least one column definition is required".to_string(),
        ));
    }
    Ok(columns)
}

/// Split on `:` outside parentheses so `FK(a.b)` and `ENUM(x:y)` stay whole.
fn split_descriptor(def: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    for (i, ch) in def.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ':' if depth <= 0 => {
                parts.push(&def[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&def[start..]);
    parts
}

/// Parse one `name:TYPE[(args)][:CONSTRAINT]*` descriptor.
pub fn parse_column_def(def: &str) -> QueryResult<Column> {
    let parts = split_descriptor(def.trim());
    if parts.len() < 2 {
        return Err(QueryError::Syntax(format!(
            "column '{}' must be written name:TYPE",
            def
        )));
    }

    let name = parts[0].trim();
    if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '.' || c == '|') {
        return Err(QueryError::Syntax(format!("invalid column name '{}'", name)));
    }

    let data_type = parse_type(parts[1].trim())?;
    let mut column = Column::new(name, data_type);

    for constraint in &parts[2..] {
        apply_constraint(&mut column, constraint)?;
    }
    Ok(column)
}

fn parse_type(text: &str) -> QueryResult<DataType> {
    match text.find('(') {
        Some(open) => {
            let close = text.rfind(')').filter(|c| *c > open).ok_or_else(|| {
                QueryError::Syntax(format!("unbalanced parentheses in type '{}'", text))
            })?;
            let args: Vec<String> = text[open + 1..close]
                .split(',')
                .map(|a| a.trim().to_string())
                .collect();
            DataType::from_parts(text[..open].trim(), &args)
        }
        None => DataType::from_parts(text, &[]),
    }
}

fn apply_constraint(column: &mut Column, constraint: &str) -> QueryResult<()> {
    let normalized: String = constraint
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    match normalized.as_str() {
        "PK" | "PRIMARY" | "PRIMARYKEY" => {
            column.is_primary = true;
            column.is_unique = true;
            column.is_not_null = true;
        }
        "UNIQUE" => column.is_unique = true,
        "NOTNULL" => column.is_not_null = true,
        "" => {}
        _ if normalized.starts_with("FK(") && normalized.ends_with(')') => {
            let trimmed = constraint.trim();
            let open = trimmed.find('(').unwrap_or(2);
            let inner = &trimmed[open + 1..trimmed.len() - 1];
            column.foreign_key = Some(ForeignKey::parse(inner)?);
        }
        _ => {
            return Err(QueryError::Syntax(format!(
                "unknown constraint '{}' on column '{}'",
                constraint.trim(),
                column.name
            )));
        }
    }
    Ok(())
}

/// Encode a column as `name:TYPE[:CONSTRAINT]*`.
pub(crate) fn encode_column(column: &Column) -> String {
    let mut out = format!("{}:{}", column.name, column.data_type);
    if column.is_primary {
        out.push_str(":PK");
    } else {
        if column.is_unique {
            out.push_str(":UNIQUE");
        }
        if column.is_not_null {
            out.push_str(":NOT NULL");
        }
    }
    if let Some(fk) = &column.foreign_key {
        out.push_str(&format!(":FK({})", fk));
    }
    out
}

impl TableDefinition {
    /// Encode the definition as schema file text.
    pub fn encode(&self) -> String {
        let mut out = self
            .columns
            .iter()
            .map(encode_column)
            .collect::<Vec<_>>()
            .join("|");
        out.push('\n');

        // action -> roles is stored inverted, one line per role
        let mut by_role: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (action, roles) in self.permissions.iter() {
            for role in roles {
                by_role.entry(role.as_str()).or_default().push(action.as_str());
            }
        }
        for (role, actions) in by_role {
            out.push_str(&format!("{}={}\n", role, actions.join(",")));
        }
        out
    }

    /// Decode schema file text for `table`.
    pub fn decode(table: &str, text: &str) -> QueryResult<Self> {
        let mut lines = text.lines();
        let header = lines.next().unwrap_or("").trim();
        if header.is_empty() {
            return Err(QueryError::Storage(format!(
                "schema for table '{}' is empty",
                table
            )));
        }

        let columns = header
            .split('|')
            .map(parse_column_def)
            .collect::<QueryResult<Vec<_>>>()?;

        let mut grants: BTreeMap<Action, BTreeSet<String>> = BTreeMap::new();
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((role, actions)) = line.split_once('=') else {
                tracing::warn!(table, line, "Skipping malformed permission line");
                continue;
            };
            for action in actions.split(',') {
                match Action::parse(action) {
                    Some(action) => {
                        grants
                            .entry(action)
                            .or_default()
                            .insert(role.trim().to_string());
                    }
                    None => {
                        tracing::warn!(table, action, "Skipping unknown permission action");
                    }
                }
            }
        }

        let mut permissions = Permissions::new();
        for (action, roles) in grants {
            permissions.set(action, roles);
        }

        Ok(TableDefinition::new(table, columns, permissions))
    }
}

/// Table and database names double as file names.
pub fn validate_name(kind: &str, name: &str) -> QueryResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(QueryError::Syntax(format!("invalid {} name '{}'", kind, name)))
    }
}
