//! MaungQL parser.
//!
//! Turns query text into a [`Command`]. The grammar is keyword driven: the
//! first word selects the statement, and every keyword accepts the dialect
//! spellings listed in [`crate::lexer`].

mod conditions;


pub use conditions::parse_conditions;

use std::collections::BTreeSet;

use crate::ast::*;
use crate::error::{QueryError, QueryResult};
use crate::lexer::{is_keyword, strip_quotes, tokenize, Keyword};
use crate::schema::{Action, Permissions};

/// Parse a query string into a command tree.
pub fn parse(query: &str) -> QueryResult<Command> {
    Parser::new(query)?.parse()
}

/// Cursor over the words of one query
pub struct Parser {
    words: Vec<String>,
    position: usize,
}

impl Parser {
    pub fn new(query: &str) -> QueryResult<Self> {
        Ok(Self {
            words: tokenize(query)?,
            position: 0,
        })
    }

    fn current(&self) -> Option<&str> {
        self.words.get(self.position).map(String::as_str)
    }

    fn peek(&self, offset: usize) -> Option<&str> {
        self.words.get(self.position + offset).map(String::as_str)
    }

    fn current_keyword(&self) -> Option<Keyword> {
        self.current().and_then(Keyword::lookup)
    }

    fn advance(&mut self) {
        if self.position < self.words.len() {
            self.position += 1;
        }
    }

    fn is_done(&self) -> bool {
        self.position >= self.words.len()
    }

    /// Consume the current word as a name, or fail with `usage`.
    fn expect_name(&mut self, usage: &str) -> QueryResult<String> {
        match self.current() {
            Some(word) => {
                let word = word.to_string();
                self.advance();
                Ok(word)
            }
            None => Err(QueryError::Syntax(usage.to_string())),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, usage: &str) -> QueryResult<()> {
        if self.current_keyword() == Some(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(QueryError::Syntax(usage.to_string()))
        }
    }

    fn expect_count(&mut self, clause: &str) -> QueryResult<usize> {
        let word = self
            .current()
            .ok_or_else(|| QueryError::Syntax(format!("{} needs a number", clause)))?;
        let count = word.parse::<usize>().map_err(|_| {
            QueryError::Syntax(format!("{} must be a non-negative number, got '{}'", clause, word))
        })?;
        self.advance();
        Ok(count)
    }

    pub fn parse(&mut self) -> QueryResult<Command> {
        let verb_word = self.current().unwrap_or_default().to_string();
        let verb = Keyword::lookup(&verb_word)
            .filter(|kw| kw.is_verb())
            .ok_or_else(|| QueryError::Syntax(format!("unknown command '{}'", verb_word)))?;
        self.advance();

        let command = match verb {
            Keyword::Create => self.parse_create()?,
            Keyword::Insert => self.parse_insert()?,
            Keyword::Select => self.parse_select()?,
            Keyword::Update => self.parse_update()?,
            Keyword::Delete => self.parse_delete()?,
            _ => unreachable!("lookup filtered to verbs"),
        };
        tracing::debug!(verb = command.verb(), table = command.table(), "Parsed command");
        Ok(command)
    }

    // ==================== CREATE ====================

    fn parse_create(&mut self) -> QueryResult<Command> {
        const USAGE: &str = "format: DAMEL <table> <name:TYPE[:CONSTRAINT],...>";

        // `SCHEMA CREATE <table> ...`
        if self.current_keyword() == Some(Keyword::Create) {
            self.advance();
        }
        let table = self.expect_name(USAGE)?;

        let mut definition = Vec::new();
        let mut read_roles: Option<BTreeSet<String>> = None;
        let mut write_roles: Option<BTreeSet<String>> = None;
        while let Some(word) = self.current() {
            if let Some(roles) = strip_flag(word, "--read=") {
                read_roles = Some(split_roles(roles));
            } else if let Some(roles) = strip_flag(word, "--write=") {
                write_roles = Some(split_roles(roles));
            } else {
                definition.push(word.to_string());
            }
            self.advance();
        }

        if definition.is_empty() {
            return Err(QueryError::Syntax(USAGE.to_string()));
        }

        let permissions = if read_roles.is_some() || write_roles.is_some() {
            let mut perms = Permissions::defaults();
            if let Some(roles) = read_roles {
                perms.set(Action::Read, roles);
            }
            if let Some(roles) = write_roles {
                perms.set(Action::Write, roles);
            }
            Some(perms)
        } else {
            None
        };

        // Words are glued back without spaces: `NOT NULL` becomes `NOTNULL`
        Ok(Command::Create(CreateCommand {
            table,
            columns: definition.concat(),
            permissions,
        }))
    }

    // ==================== INSERT ====================

    fn parse_insert(&mut self) -> QueryResult<Command> {
        const USAGE: &str = "format: SIMPEN <table> <val|val|val>";
        let table = self.expect_name(USAGE)?;
        if self.is_done() {
            return Err(QueryError::Syntax(USAGE.to_string()));
        }
        let data = self.words[self.position..].join(" ");
        self.position = self.words.len();
        Ok(Command::Insert(InsertCommand { table, data }))
    }

    // ==================== SELECT ====================

    fn parse_select(&mut self) -> QueryResult<Command> {
        let from_index = self
            .words
            .iter()
            .position(|w| is_keyword(w, Keyword::From));

        let (fields, table) = match from_index {
            Some(idx) => {
                if idx < 2 {
                    return Err(QueryError::Syntax(
                        "no columns named before TI/FROM".to_string(),
                    ));
                }
                let fields: Vec<String> = self.words[1..idx]
                    .join(" ")
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
                self.position = idx + 1;
                let table = self.expect_name("table name missing after TI/FROM")?;
                (fields, table)
            }
            None => {
                let table = self.expect_name("format: TINGALI <table>")?;
                (vec!["*".to_string()], table)
            }
        };

        let mut select = SelectCommand {
            table,
            fields,
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: None,
            limit: None,
            offset: 0,
        };

        // Clauses may come in any order; unknown words are skipped
        while let Some(word) = self.current() {
            match Keyword::lookup(word) {
                Some(Keyword::Where) => {
                    self.advance();
                    let end = self.where_end();
                    select.conditions = parse_conditions(&self.words[self.position..end])?;
                    self.position = end;
                }
                Some(Keyword::Order) => {
                    self.advance();
                    if self.current_keyword() == Some(Keyword::By) {
                        self.advance();
                    }
                    let column = self.expect_name("RUNTUYKEUN needs a column name")?;
                    let mut descending = false;
                    match self.current_keyword() {
                        Some(Keyword::Desc) => {
                            descending = true;
                            self.advance();
                        }
                        Some(Keyword::Asc) => self.advance(),
                        _ => {}
                    }
                    select.order_by = Some(OrderBy { column, descending });
                }
                Some(Keyword::Limit) => {
                    self.advance();
                    select.limit = Some(self.expect_count("SAKADAR")?);
                }
                Some(Keyword::Offset) => {
                    self.advance();
                    select.offset = self.expect_count("LIWATAN")?;
                }
                Some(Keyword::Join) => {
                    let join = self.parse_join(JoinKind::Inner)?;
                    select.joins.push(join);
                }
                Some(kw) if kw.is_join_kind() && self.peek_is(1, Keyword::Join) => {
                    let kind = match kw {
                        Keyword::Left => JoinKind::Left,
                        Keyword::Right => JoinKind::Right,
                        Keyword::Full => JoinKind::Full,
                        _ => JoinKind::Inner,
                    };
                    self.advance();
                    let join = self.parse_join(kind)?;
                    select.joins.push(join);
                }
                _ => {
                    tracing::debug!(word, "Skipping unrecognized token");
                    self.advance();
                }
            }
        }

        Ok(Command::Select(select))
    }

    fn peek_is(&self, offset: usize, keyword: Keyword) -> bool {
        self.peek(offset)
            .map(|w| is_keyword(w, keyword))
            .unwrap_or(false)
    }

    /// Index where a SELECT's WHERE clause stops.
    fn where_end(&self) -> usize {
        (self.position..self.words.len())
            .find(|&i| match Keyword::lookup(&self.words[i]) {
                Some(Keyword::Order | Keyword::Limit | Keyword::Offset | Keyword::Join) => true,
                Some(kw) if kw.is_join_kind() => self
                    .words
                    .get(i + 1)
                    .map(|next| is_keyword(next, Keyword::Join))
                    .unwrap_or(false),
                _ => false,
            })
            .unwrap_or(self.words.len())
    }

    /// `JOIN <table> ON <field> <op> <field>`, cursor on the JOIN word.
    fn parse_join(&mut self, kind: JoinKind) -> QueryResult<JoinClause> {
        const USAGE: &str = "format: GABUNG <table> DINA <field> <op> <field>";
        self.expect_keyword(Keyword::Join, USAGE)?;
        let table = self.expect_name(USAGE)?;
        self.expect_keyword(Keyword::On, USAGE)?;

        let field = self.expect_name(USAGE)?;
        let op = CompareOp::parse(&self.expect_name(USAGE)?)?;
        let value = self.expect_name(USAGE)?;

        Ok(JoinClause {
            kind,
            table,
            on: Condition::new(field, op, strip_quotes(&value)),
        })
    }

    // ==================== UPDATE ====================

    fn parse_update(&mut self) -> QueryResult<Command> {
        const USAGE: &str = "format: OMEAN <table> JADI <col>=<val>[,...] [DIMANA ...]";
        if self.words.len() < 4 {
            return Err(QueryError::Syntax(USAGE.to_string()));
        }
        let table = self.expect_name(USAGE)?;
        self.expect_keyword(Keyword::Set, "OMEAN needs JADI/JANTEN/SET")?;

        let where_index = (self.position..self.words.len())
            .find(|&i| is_keyword(&self.words[i], Keyword::Where))
            .unwrap_or(self.words.len());

        let assignments: Vec<(String, String)> = self.words[self.position..where_index]
            .join(" ")
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(col, val)| (col.trim().to_string(), strip_quotes(val.trim()).to_string()))
            .filter(|(col, _)| !col.is_empty())
            .collect();
        if assignments.is_empty() {
            return Err(QueryError::Syntax(USAGE.to_string()));
        }

        let conditions = if where_index < self.words.len() {
            parse_conditions(&self.words[where_index + 1..])?
        } else {
            Vec::new()
        };
        self.position = self.words.len();

        Ok(Command::Update(UpdateCommand {
            table,
            assignments,
            conditions,
        }))
    }

    // ==================== DELETE ====================

    fn parse_delete(&mut self) -> QueryResult<Command> {
        const USAGE: &str = "format: MICEUN TI <table> [DIMANA ...]";
        self.expect_keyword(Keyword::From, USAGE)?;
        let table = self.expect_name(USAGE)?;

        let conditions = if self.is_done() {
            Vec::new()
        } else {
            self.expect_keyword(Keyword::Where, "MICEUN needs DIMANA before conditions")?;
            parse_conditions(&self.words[self.position..])?
        };
        self.position = self.words.len();

        Ok(Command::Delete(DeleteCommand { table, conditions }))
    }
}

fn strip_flag<'a>(word: &'a str, flag: &str) -> Option<&'a str> {
    word.get(..flag.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(flag))
        .map(|_| &word[flag.len()..])
}

fn split_roles(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}
