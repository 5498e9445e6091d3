//! Condition chains shared by WHERE and JOIN ON.

use crate::ast::{CompareOp, Condition, LogicOp};
use crate::error::QueryResult;
use crate::lexer::{strip_quotes, Keyword};

/// Parse `field op value [AND|OR field op value]...`.
///
/// Values lose their surrounding quotes. A trailing partial triple is
/// dropped rather than reported.
pub fn parse_conditions(words: &[String]) -> QueryResult<Vec<Condition>> {
    let mut conditions = Vec::new();
    let mut i = 0;

    while i + 2 < words.len() {
        let mut condition = Condition::new(
            words[i].as_str(),
            CompareOp::parse(&words[i + 1])?,
            strip_quotes(&words[i + 2]),
        );

        if let Some(next) = words.get(i + 3) {
            match Keyword::lookup(next) {
                Some(Keyword::And) => {
                    condition.logic = Some(LogicOp::And);
                    i += 1;
                }
                Some(Keyword::Or) => {
                    condition.logic = Some(LogicOp::Or);
                    i += 1;
                }
                _ => {}
            }
        }

        conditions.push(condition);
        i += 3;
    }

    Ok(conditions)
}
