//! Lexer for MaungQL.
//!
//! The language is whitespace-delimited: a query is split into words and
//! each word may be looked up in the keyword table. Every keyword has
//! several dialect spellings that map to the same canonical keyword.

use crate::error::{QueryError, QueryResult};

/// Canonical keywords. Several spellings map onto each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Verbs
    Create,
    Insert,
    Select,
    Update,
    Delete,

    // Clauses
    From,
    Where,
    Set,
    Order,
    By,
    Limit,
    Offset,

    // Sort direction
    Asc,
    Desc,

    // Joins
    Join,
    On,
    Left,
    Right,
    Inner,
    Full,

    // Logical
    And,
    Or,
}

/// Spelling table: every accepted word and the keyword it means.
const KEYWORDS: &[(&str, Keyword)] = &[
    ("DAMEL", Keyword::Create),
    ("BIKIN", Keyword::Create),
    ("NYIEUN", Keyword::Create),
    ("SCHEMA", Keyword::Create),
    ("LAHAN", Keyword::Create),
    ("CREATE", Keyword::Create),
    ("SIMPEN", Keyword::Insert),
    ("TENDEUN", Keyword::Insert),
    ("INSERT", Keyword::Insert),
    ("TINGALI", Keyword::Select),
    ("TENJO", Keyword::Select),
    ("SELECT", Keyword::Select),
    ("OMEAN", Keyword::Update),
    ("ROBIH", Keyword::Update),
    ("UPDATE", Keyword::Update),
    ("MICEUN", Keyword::Delete),
    ("PICEUN", Keyword::Delete),
    ("DELETE", Keyword::Delete),
    ("TI", Keyword::From),
    ("FROM", Keyword::From),
    ("DIMANA", Keyword::Where),
    ("WHERE", Keyword::Where),
    ("JADI", Keyword::Set),
    ("JANTEN", Keyword::Set),
    ("SET", Keyword::Set),
    ("RUNTUYKEUN", Keyword::Order),
    ("ORDER", Keyword::Order),
    ("BY", Keyword::By),
    ("SAKADAR", Keyword::Limit),
    ("LIMIT", Keyword::Limit),
    ("LIWATAN", Keyword::Offset),
    ("OFFSET", Keyword::Offset),
    ("TI_HANDAP", Keyword::Asc),
    ("NAEK", Keyword::Asc),
    ("ASC", Keyword::Asc),
    ("TI_LUHUR", Keyword::Desc),
    ("TURUN", Keyword::Desc),
    ("DESC", Keyword::Desc),
    ("GABUNG", Keyword::Join),
    ("JOIN", Keyword::Join),
    ("DINA", Keyword::On),
    ("ON", Keyword::On),
    ("KENCA", Keyword::Left),
    ("LEFT", Keyword::Left),
    ("KATUHU", Keyword::Right),
    ("RIGHT", Keyword::Right),
    ("INNER", Keyword::Inner),
    ("FULL", Keyword::Full),
    ("SARENG", Keyword::And),
    ("AND", Keyword::And),
    ("ATAWA", Keyword::Or),
    ("OR", Keyword::Or),
];

impl Keyword {
    /// Look a word up in the spelling table (case-insensitive).
    pub fn lookup(word: &str) -> Option<Keyword> {
        let upper = word.to_uppercase();
        KEYWORDS
            .iter()
            .find(|(spelling, _)| *spelling == upper)
            .map(|(_, kw)| *kw)
    }

    /// All spellings of this keyword, in table order.
    pub fn spellings(self) -> impl Iterator<Item = &'static str> {
        KEYWORDS
            .iter()
            .filter(move |(_, kw)| *kw == self)
            .map(|(spelling, _)| *spelling)
    }

    /// Keywords that can begin a top-level statement.
    pub fn is_verb(self) -> bool {
        matches!(
            self,
            Keyword::Create | Keyword::Insert | Keyword::Select | Keyword::Update | Keyword::Delete
        )
    }

    /// Join-kind prefixes (`LEFT`, `RIGHT`, `INNER`, `FULL`).
    pub fn is_join_kind(self) -> bool {
        matches!(
            self,
            Keyword::Left | Keyword::Right | Keyword::Inner | Keyword::Full
        )
    }
}

/// True when `word` spells `keyword`.
pub fn is_keyword(word: &str, keyword: Keyword) -> bool {
    Keyword::lookup(word) == Some(keyword)
}

/// Every accepted keyword spelling.
pub fn all_spellings() -> impl Iterator<Item = &'static str> {
    KEYWORDS.iter().map(|(spelling, _)| *spelling)
}

/// Split a query into words.
///
/// Strips surrounding whitespace and a trailing `;`. Quoting is not
/// understood: a quoted literal containing spaces becomes several words.
pub fn tokenize(query: &str) -> QueryResult<Vec<String>> {
    let trimmed = query.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed);
    let words: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        return Err(QueryError::Syntax("empty query".to_string()));
    }
    Ok(words)
}

/// Remove surrounding single or double quotes from a literal.
pub fn strip_quotes(word: &str) -> &str {
    word.trim_matches(|c| c == '\'' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_synonyms() {
        for word in ["DAMEL", "bikin", "Nyieun", "SCHEMA", "lahan", "create"] {
            assert_eq!(Keyword::lookup(word), Some(Keyword::Create), "{}", word);
        }
        for word in ["tingali", "TENJO", "select"] {
            assert_eq!(Keyword::lookup(word), Some(Keyword::Select));
        }
        assert_eq!(Keyword::lookup("miceun"), Some(Keyword::Delete));
        assert_eq!(Keyword::lookup("robih"), Some(Keyword::Update));
        assert_eq!(Keyword::lookup("tendeun"), Some(Keyword::Insert));
    }

    #[test]
    fn test_non_keywords() {
        assert_eq!(Keyword::lookup("pegawai"), None);
        assert_eq!(Keyword::lookup("nama,gaji"), None);
    }

    #[test]
    fn test_spellings() {
        let spellings: Vec<_> = Keyword::Desc.spellings().collect();
        assert_eq!(spellings, vec!["TI_LUHUR", "TURUN", "DESC"]);
    }

    #[test]
    fn test_tokenize() {
        let words = tokenize("  TINGALI   pegawai DIMANA umur > 18;  ").unwrap();
        assert_eq!(words, vec!["TINGALI", "pegawai", "DIMANA", "umur", ">", "18"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(matches!(tokenize(" ; "), Err(QueryError::Syntax(_))));
        assert!(tokenize("").is_err());
    }

    #[test]
    fn test_quoted_literal_is_split() {
        let words = tokenize("TINGALI t DIMANA nama = 'Asep Sunandar'").unwrap();
        assert_eq!(words.len(), 7);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'Asep'"), "Asep");
        assert_eq!(strip_quotes("\"Bandung\""), "Bandung");
        assert_eq!(strip_quotes("plain"), "plain");
    }
}
