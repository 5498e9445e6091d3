//! Command tree produced by the parser.

use std::fmt;

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::schema::Permissions;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create(CreateCommand),
    Insert(InsertCommand),
    Select(SelectCommand),
    Update(UpdateCommand),
    Delete(DeleteCommand),
}

impl Command {
    /// Table the command targets
    pub fn table(&self) -> &str {
        match self {
            Command::Create(c) => &c.table,
            Command::Insert(c) => &c.table,
            Command::Select(c) => &c.table,
            Command::Update(c) => &c.table,
            Command::Delete(c) => &c.table,
        }
    }

    /// Canonical verb, for logging
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Create(_) => "CREATE",
            Command::Insert(_) => "INSERT",
            Command::Select(_) => "SELECT",
            Command::Update(_) => "UPDATE",
            Command::Delete(_) => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCommand {
    pub table: String,
    /// Raw column definition text, e.g. `id:INT:PK,nama:STRING`
    pub columns: String,
    /// Explicit role sets; `None` means the defaults
    pub permissions: Option<Permissions>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertCommand {
    pub table: String,
    /// Raw pipe-delimited record
    pub data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectCommand {
    pub table: String,
    /// Requested fields; `["*"]` selects every column
    pub fields: Vec<String>,
    pub joins: Vec<JoinClause>,
    pub conditions: Vec<Condition>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl SelectCommand {
    pub fn is_select_all(&self) -> bool {
        self.fields.is_empty() || self.fields[0] == "*"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCommand {
    pub table: String,
    /// Assignments in the order written
    pub assignments: Vec<(String, String)>,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCommand {
    pub table: String,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    /// Unmatched rows of the current result are kept with NULL padding
    pub fn keeps_unmatched_left(self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::Full)
    }

    /// Unmatched target rows are appended with NULL padding
    pub fn keeps_unmatched_right(self) -> bool {
        matches!(self, JoinKind::Right | JoinKind::Full)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: String,
    /// Both sides name columns; the right side falls back to a literal
    pub on: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    /// Case-insensitive substring (`JIGA` / `LIKE`)
    Like,
}

impl CompareOp {
    pub fn parse(text: &str) -> QueryResult<Self> {
        match text.to_uppercase().as_str() {
            "=" | "==" => Ok(CompareOp::Eq),
            "!=" | "<>" => Ok(CompareOp::NotEq),
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            ">=" => Ok(CompareOp::GtEq),
            "<=" => Ok(CompareOp::LtEq),
            "JIGA" | "LIKE" => Ok(CompareOp::Like),
            other => Err(QueryError::Syntax(format!("unknown operator '{}'", other))),
        }
    }

    /// Only equality operators are meaningful for BOOL columns
    pub fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::NotEq)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::GtEq => ">=",
            CompareOp::LtEq => "<=",
            CompareOp::Like => "JIGA",
        };
        f.write_str(s)
    }
}

/// One link of a condition chain.
///
/// `logic` joins this condition to the next one; `None` ends the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: CompareOp,
    pub value: String,
    pub logic: Option<LogicOp>,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
            logic: None,
        }
    }

    pub fn with_logic(mut self, logic: LogicOp) -> Self {
        self.logic = Some(logic);
        self
    }
}
