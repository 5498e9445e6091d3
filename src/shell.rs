//! Line handling for the interactive shell.
//!
//! Lines starting with `.` are shell commands; anything else is a query.
//! Errors are rendered into the output and never end the session.

use colored::Colorize;
use maungql_core::{Executor, SessionContext, Storage};

use crate::error::DbResult;
use crate::render;
use crate::storage::StorageEngine;

/// What the caller should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Exit,
}

/// One interactive session: the executor plus the caller's identity
pub struct Session {
    executor: Executor<StorageEngine>,
    ctx: SessionContext,
    json: bool,
}

impl Session {
    pub fn new(executor: Executor<StorageEngine>, ctx: SessionContext, json: bool) -> Self {
        Self {
            executor,
            ctx,
            json,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn executor(&self) -> &Executor<StorageEngine> {
        &self.executor
    }

    /// Execute a query and render its result or error
    pub fn run_query(&self, query: &str) -> String {
        self.try_query(query).unwrap_or_else(|text| text)
    }

    /// Execute a query; the error side carries the rendered error text
    pub fn try_query(&self, query: &str) -> Result<String, String> {
        match self.executor.execute(&self.ctx, query) {
            Ok(result) if self.json => render::to_json(&result).map_err(error_text),
            Ok(result) => Ok(render::render(&result)),
            Err(e) => Err(error_text(e)),
        }
    }

    /// Handle one input line
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::Output(String::new());
        }
        if !line.starts_with('.') {
            return Outcome::Output(self.run_query(line));
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        let output = match (command, arg) {
            (".exit" | ".quit" | ".q", _) => return Outcome::Exit,
            (".help" | ".h" | ".?", _) => help_text(),
            (".whoami", _) => format!(
                "{} {} ({}) on {}",
                "User:".dimmed(),
                self.ctx.username,
                self.ctx.role,
                self.ctx.database.cyan()
            ),
            (".use", Some(name)) => self.switch_database(name).unwrap_or_else(error_text),
            (".tables", _) => self.tables().unwrap_or_else(error_text),
            (".databases", _) => self.databases().unwrap_or_else(error_text),
            (".createdb", Some(name)) => self.create_database(name).unwrap_or_else(error_text),
            (".use", None) => "Usage: .use <database>".yellow().to_string(),
            (".createdb", None) => "Usage: .createdb <name>".yellow().to_string(),
            (other, _) => format!(
                "{} {}\nType {} for help",
                "Unknown command:".red(),
                other,
                ".help".yellow()
            ),
        };
        Outcome::Output(output)
    }

    fn switch_database(&mut self, name: &str) -> DbResult<String> {
        self.executor.storage().require_database(name)?;
        self.ctx = self.ctx.with_database(name);
        tracing::debug!(database = name, "Switched database");
        Ok(format!("{} {}", "Switched to database:".dimmed(), name.cyan()))
    }

    fn tables(&self) -> DbResult<String> {
        let tables = self.executor.storage().list_tables(&self.ctx.database)?;
        if tables.is_empty() {
            return Ok("(no tables)".dimmed().to_string());
        }
        Ok(tables.join("\n"))
    }

    fn databases(&self) -> DbResult<String> {
        let names = self.executor.storage().list_databases()?;
        let lines: Vec<String> = names
            .iter()
            .map(|name| {
                if *name == self.ctx.database {
                    format!("{} {}", name.cyan(), "(current)".dimmed())
                } else {
                    name.clone()
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn create_database(&self, name: &str) -> DbResult<String> {
        self.executor.storage().create_database(&self.ctx, name)?;
        Ok(format!("Database '{}' created", name).green().to_string())
    }
}

fn error_text(err: impl std::fmt::Display) -> String {
    format!("{} {}", "Error:".red().bold(), err)
}

/// Help text listing shell commands and query forms
pub fn help_text() -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Commands:".white().bold()));
    for (cmd, about) in [
        (".help", "Show this help"),
        (".exit", "Exit the shell"),
        (".use <db>", "Switch database"),
        (".whoami", "Show the current user, role and database"),
        (".tables", "List tables of the current database"),
        (".databases", "List databases"),
        (".createdb <name>", "Create a database (admin)"),
    ] {
        out.push_str(&format!("  {:<18} {}\n", cmd.yellow(), about));
    }

    out.push_str(&format!("\n{}\n", "Queries:".white().bold()));
    for example in [
        "DAMEL pegawai id:INT:PK,nama:STRING:NOTNULL,gaji:FLOAT",
        "SIMPEN pegawai 1|Asep|5000000",
        "TINGALI nama,gaji TI pegawai DIMANA gaji > 4000000 RUNTUYKEUN gaji TURUN SAKADAR 10",
        "TINGALI JUMLAH(*),RATA(gaji) TI pegawai",
        "OMEAN pegawai JADI gaji=6000000 DIMANA id = 1",
        "MICEUN TI pegawai DIMANA id = 1",
    ] {
        out.push_str(&format!("  {}\n", example.green()));
    }
    out
}
