//! The `$search` option.

use smol_str::SmolStr;
use std::fmt;

/// A free-text search expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchExpression {
    /// A bare word.
    Term(SmolStr),
    /// A double-quoted phrase, stored unescaped.
    Phrase(SmolStr),
    Not(Box<SearchExpression>),
    And(Box<SearchExpression>, Box<SearchExpression>),
    Or(Box<SearchExpression>, Box<SearchExpression>),
}

impl fmt::Display for SearchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchExpression::Term(word) => write!(f, "{word}"),
            SearchExpression::Phrase(phrase) => {
                write!(f, "\"{}\"", phrase.replace('\\', "\\\\").replace('"', "\\\""))
            }
            SearchExpression::Not(operand) => write!(f, "NOT {operand}"),
            SearchExpression::And(left, right) => write!(f, "({left} AND {right})"),
            SearchExpression::Or(left, right) => write!(f, "({left} OR {right})"),
        }
    }
}

/// `$search`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOption {
    pub expression: SearchExpression,
}

impl fmt::Display for SearchOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parenthesizes_binary_terms() {
        let expr = SearchExpression::Or(
            Box::new(SearchExpression::Term("blue".into())),
            Box::new(SearchExpression::And(
                Box::new(SearchExpression::Phrase("red \"hot\"".into())),
                Box::new(SearchExpression::Not(Box::new(SearchExpression::Term(
                    "green".into(),
                )))),
            )),
        );
        assert_eq!(
            expr.to_string(),
            "(blue OR (\"red \\\"hot\\\"\" AND NOT green))"
        );
    }
}
