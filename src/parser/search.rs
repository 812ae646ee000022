//! `$search`
//!
//! `NOT` binds tighter than `AND`, which binds tighter than `OR`. Adjacent
//! terms without an operator are joined by an implicit `AND`.

use super::base::TokenStream;
use crate::ast::{SearchExpression, SearchOption};
use crate::config::ParserConfig;
use crate::error::ParseResult;
use crate::lexer::token::TokenKind;
use smol_str::SmolStr;
use tracing::debug;

/// Parses free-text search expressions. Needs no schema.
#[derive(Debug, Clone, Copy)]
pub struct SearchParser {
    max_depth: usize,
}

impl Default for SearchParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchParser {
    pub fn new() -> Self {
        Self {
            max_depth: ParserConfig::default().max_expression_depth,
        }
    }

    /// Applies the expression depth limit of `config` to groups and `NOT`.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.max_depth = config.max_expression_depth;
        self
    }

    pub fn parse(&self, stream: &mut TokenStream<'_>) -> ParseResult<SearchOption> {
        debug!("parsing $search");
        let expression = self.parse_or(stream)?;
        Ok(SearchOption { expression })
    }

    fn parse_or(&self, stream: &mut TokenStream<'_>) -> ParseResult<SearchExpression> {
        let mut left = self.parse_and(stream)?;
        while stream.try_consume_word("OR") {
            let right = self.parse_and(stream)?;
            left = SearchExpression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&self, stream: &mut TokenStream<'_>) -> ParseResult<SearchExpression> {
        let mut left = self.parse_not(stream)?;
        loop {
            if !stream.try_consume_word("AND") && !starts_operand(stream) {
                return Ok(left);
            }
            let right = self.parse_not(stream)?;
            left = SearchExpression::And(Box::new(left), Box::new(right));
        }
    }

    fn parse_not(&self, stream: &mut TokenStream<'_>) -> ParseResult<SearchExpression> {
        if !stream.check_word("NOT") {
            return self.parse_primary(stream);
        }
        stream.nested(self.max_depth, |stream| {
            stream.advance();
            let operand = self.parse_not(stream)?;
            Ok(SearchExpression::Not(Box::new(operand)))
        })
    }

    fn parse_primary(&self, stream: &mut TokenStream<'_>) -> ParseResult<SearchExpression> {
        if stream.check(TokenKind::Open) {
            return stream.nested(self.max_depth, |stream| {
                stream.advance();
                let inner = self.parse_or(stream)?;
                stream.require(TokenKind::Close)?;
                Ok(inner)
            });
        }
        if stream.try_consume(TokenKind::QuotedPhrase) {
            return Ok(SearchExpression::Phrase(unescape_phrase(
                stream.current_lexeme(),
            )));
        }
        if is_word(stream) {
            stream.advance();
            return Ok(SearchExpression::Term(SmolStr::new(stream.current_lexeme())));
        }
        Err(stream.unexpected("search term"))
    }
}

fn is_word(stream: &TokenStream<'_>) -> bool {
    match stream.current().kind {
        TokenKind::Identifier => !["AND", "OR", "NOT"]
            .iter()
            .any(|keyword| stream.check_word(keyword)),
        TokenKind::Integer
        | TokenKind::Decimal
        | TokenKind::Date
        | TokenKind::DateTimeOffset
        | TokenKind::Guid => true,
        _ => false,
    }
}

fn starts_operand(stream: &TokenStream<'_>) -> bool {
    is_word(stream)
        || stream.check_word("NOT")
        || stream.check(TokenKind::Open)
        || stream.check(TokenKind::QuotedPhrase)
}

/// Strips the double quotes of a phrase and resolves backslash escapes.
fn unescape_phrase(text: &str) -> SmolStr {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    SmolStr::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageKey;
    use crate::parser::fixtures::lex;

    fn parse(source: &str) -> ParseResult<SearchOption> {
        let tokens = lex(source)?;
        let mut stream = TokenStream::new(&tokens);
        let option = SearchParser::new().parse(&mut stream)?;
        assert!(stream.is_at_end(), "unconsumed input in {source:?}");
        Ok(option)
    }

    #[test]
    fn implicit_and() {
        let search = parse("blue green").unwrap();
        assert_eq!(search.to_string(), "(blue AND green)");
    }

    #[test]
    fn precedence() {
        let search = parse("blue OR green AND NOT red").unwrap();
        assert_eq!(search.to_string(), "(blue OR (green AND NOT red))");
    }

    #[test]
    fn phrases_and_groups() {
        let search = parse("(\"light blue\" OR navy) 42").unwrap();
        assert_eq!(search.to_string(), "((\"light blue\" OR navy) AND 42)");
        let search = parse(r#""say \"hi\"""#).unwrap();
        assert_eq!(
            search.expression,
            SearchExpression::Phrase("say \"hi\"".into())
        );
    }

    #[test]
    fn dangling_operator() {
        assert!(parse("blue AND").is_err());
        assert!(parse("OR blue").is_err());
    }

    #[test]
    fn dates_and_guids_are_terms() {
        let search = parse("2024-03-01 OR 01234567-89ab-cdef-0123-456789abcdef").unwrap();
        assert_eq!(
            search.expression,
            SearchExpression::Or(
                Box::new(SearchExpression::Term("2024-03-01".into())),
                Box::new(SearchExpression::Term(
                    "01234567-89ab-cdef-0123-456789abcdef".into()
                )),
            )
        );
    }

    #[test]
    fn nesting_depth_is_limited() {
        fn limited(source: &str) -> ParseResult<SearchOption> {
            let tokens = lex(source)?;
            let mut stream = TokenStream::new(&tokens);
            SearchParser::new()
                .with_config(ParserConfig::default().with_max_expression_depth(2))
                .parse(&mut stream)
        }

        assert!(limited("(NOT blue) OR (red green)").is_ok());
        let err = limited("((NOT blue))").unwrap_err();
        assert_eq!(err.key(), MessageKey::MaxExpressionDepthExceeded);
        assert_eq!(err.span(), &(2..5));
        assert!(limited("NOT NOT NOT blue").is_err());

        let deep = format!("{}blue{}", "(".repeat(1000), ")".repeat(1000));
        let err = parse(&deep).unwrap_err();
        assert_eq!(err.key(), MessageKey::MaxExpressionDepthExceeded);
        assert!(parse(&"NOT ".repeat(1000)).is_err());
    }

    #[test]
    fn stops_before_option_delimiters() {
        let tokens = lex("blue;$top=1").unwrap();
        let mut stream = TokenStream::new(&tokens);
        SearchParser::new().parse(&mut stream).unwrap();
        assert_eq!(stream.current().kind, TokenKind::Semicolon);
    }
}
