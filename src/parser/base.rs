//! Shared parser infrastructure for token stream navigation and error handling.
//!
//! Every option parser borrows the same [`TokenStream`] mutably; recursive
//! re-entry (a nested `$expand`, a `$filter` inside expand options) continues
//! on the cursor of the caller.

use crate::ast::Span;
use crate::error::{MessageKey, ParseResult, UriParserError};
use crate::lexer::token::{Token, TokenKind};
use std::fmt;

/// Cursor over the tokens of one option value.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
    depth: usize,
}

impl<'a> TokenStream<'a> {
    /// Creates a new token stream from a token slice.
    ///
    /// The slice normally ends in [`TokenKind::Eof`]; positions past the end
    /// read as an EOF token placed after the last token.
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, "", end..end),
            depth: 0,
        }
    }

    /// Returns the current token.
    pub fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Returns the token after the current one.
    pub fn peek(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&self.eof)
    }

    /// Advances to the next token. Does nothing at EOF.
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() && self.current().kind != TokenKind::Eof {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches `kind`, honoring contextual kinds.
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current().matches(kind)
    }

    /// Returns true once the cursor reached EOF.
    pub fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    /// Consumes the current token if it matches `kind`.
    ///
    /// On success the token's text becomes [`TokenStream::current_lexeme`];
    /// otherwise the position is unchanged.
    pub fn try_consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns true if the current token is an identifier spelled exactly `word`.
    pub fn check_word(&self, word: &str) -> bool {
        let token = self.current();
        token.kind == TokenKind::Identifier && token.text == word
    }

    /// Consumes an identifier spelled exactly `word`, e.g. the `and` operator.
    pub fn try_consume_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Requires the current token to match `kind` and consumes it.
    pub fn require(&mut self, kind: TokenKind) -> ParseResult<()> {
        self.expect(kind).map(|_| ())
    }

    /// Like [`TokenStream::require`] but returns the consumed token's span.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Span> {
        if self.check(kind) {
            let span = self.current().span.clone();
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(kind))
        }
    }

    /// Text of the most recently consumed token.
    pub fn current_lexeme(&self) -> &str {
        self.previous().map(|t| t.text.as_str()).unwrap_or("")
    }

    /// The most recently consumed token.
    pub fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Span of the current token.
    pub fn current_span(&self) -> Span {
        self.current().span.clone()
    }

    /// Returns the span of the previous token (useful after consuming a token).
    pub fn previous_span(&self) -> Span {
        match self.previous() {
            Some(token) => token.span.clone(),
            None => self.current_span(),
        }
    }

    /// Builds an "expected X, found Y" error at the current token.
    pub fn unexpected(&self, expected: impl fmt::Display) -> UriParserError {
        let found = self.current();
        UriParserError::new(
            MessageKey::UnexpectedToken,
            format!("expected {expected}, found {}", found.describe()),
            found.span.clone(),
        )
        .with_param(expected.to_string())
        .with_param(found.text.clone())
    }

    /// Creates an error at the current token position.
    pub fn error_here(&self, key: MessageKey, message: impl Into<String>) -> UriParserError {
        UriParserError::new(key, message, self.current_span())
    }

    /// Returns the current position in the token stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Runs `parse` one expression level deeper.
    ///
    /// Fails at the current token, before `parse` runs, once `max_depth`
    /// levels are open.
    pub fn nested<T>(
        &mut self,
        max_depth: usize,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= max_depth {
            return Err(self
                .error_here(
                    MessageKey::MaxExpressionDepthExceeded,
                    format!("Expression is nested deeper than the allowed {max_depth} levels."),
                )
                .with_param(max_depth.to_string()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }
}

/// Merges two spans into a single span covering both.
pub fn merge_spans(start: &Span, end: &Span) -> Span {
    start.start..end.end
}

/// Parses the integer value of `$top`, `$skip` or `$levels`.
///
/// Negative and overflowing values are rejected, and zero unless
/// `zero_allowed` is set.
pub fn parse_integer_value(
    stream: &mut TokenStream<'_>,
    option: &str,
    zero_allowed: bool,
) -> ParseResult<u32> {
    let span = stream.expect(TokenKind::Integer)?;
    let text = stream.current_lexeme();
    match text.parse::<u32>() {
        Ok(value) if value > 0 || zero_allowed => Ok(value),
        _ => Err(UriParserError::new(
            MessageKey::WrongValueForSystemQueryOption,
            format!("Wrong value for system query option '{option}': '{text}'."),
            span,
        )
        .with_param(option)
        .with_param(text)),
    }
}

/// Parses the `true`/`false` value of `$count`.
pub fn parse_boolean_value(stream: &mut TokenStream<'_>) -> ParseResult<bool> {
    stream.require(TokenKind::Boolean)?;
    Ok(stream.current_lexeme().eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn lex(source: &str) -> Vec<Token> {
        tokenize(source).tokens
    }

    #[test]
    fn token_stream_navigation() {
        let tokens = lex("Orders/$ref");
        let mut stream = TokenStream::new(&tokens);

        assert_eq!(stream.current().kind, TokenKind::Identifier);
        assert_eq!(stream.peek().kind, TokenKind::Slash);

        stream.advance();
        assert_eq!(stream.current().kind, TokenKind::Slash);
        assert_eq!(stream.current_lexeme(), "Orders");
    }

    #[test]
    fn try_consume_leaves_position_on_mismatch() {
        let tokens = lex("*/$ref");
        let mut stream = TokenStream::new(&tokens);

        assert!(!stream.try_consume(TokenKind::Slash));
        assert_eq!(stream.position(), 0);
        assert!(stream.try_consume(TokenKind::Star));
        assert_eq!(stream.current_lexeme(), "*");
        assert!(stream.try_consume(TokenKind::Slash));
        assert!(stream.try_consume(TokenKind::Ref));
        assert!(stream.is_at_end());
    }

    #[test]
    fn contextual_kinds_consume_identifiers() {
        let tokens = lex("MAX");
        let mut stream = TokenStream::new(&tokens);
        assert!(stream.try_consume(TokenKind::Max));
        assert_eq!(stream.current_lexeme(), "MAX");
    }

    #[test]
    fn require_failure_names_expected_and_found() {
        let tokens = lex("Orders");
        let mut stream = TokenStream::new(&tokens);

        let err = stream.require(TokenKind::Open).unwrap_err();
        assert_eq!(err.key(), MessageKey::UnexpectedToken);
        assert_eq!(err.message(), "expected (, found 'Orders'");
        assert_eq!(err.span(), &(0..6));
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn stays_at_eof() {
        let tokens = lex("*");
        let mut stream = TokenStream::new(&tokens);
        stream.advance();
        stream.advance();
        stream.advance();
        assert!(stream.is_at_end());
        assert_eq!(stream.current_span(), 1..1);
    }

    #[test]
    fn empty_slice_reads_as_eof() {
        let stream = TokenStream::new(&[]);
        assert!(stream.is_at_end());
        assert_eq!(stream.current_lexeme(), "");
    }

    #[test]
    fn words_match_exact_identifier_text() {
        let tokens = lex("and AND");
        let mut stream = TokenStream::new(&tokens);
        assert!(!stream.check_word("or"));
        assert!(stream.try_consume_word("and"));
        assert!(!stream.try_consume_word("and"));
        assert!(stream.try_consume_word("AND"));
    }

    #[test]
    fn nesting_is_bounded_and_released() {
        let tokens = lex("( ( (");
        let mut stream = TokenStream::new(&tokens);

        fn open(stream: &mut TokenStream<'_>) -> ParseResult<usize> {
            if !stream.check(TokenKind::Open) {
                return Ok(0);
            }
            stream.nested(2, |stream| {
                stream.advance();
                open(stream).map(|inner| inner + 1)
            })
        }

        let err = open(&mut stream).unwrap_err();
        assert_eq!(err.key(), MessageKey::MaxExpressionDepthExceeded);
        assert_eq!(err.span(), &(4..5));
        assert_eq!(err.params()[0], "2");

        let tokens = lex("( (");
        let mut stream = TokenStream::new(&tokens);
        assert_eq!(open(&mut stream).unwrap(), 2);
        // Every level is released on the way out.
        assert!(stream.nested(1, |_| Ok(())).is_ok());
    }

    #[test]
    fn boolean_values() {
        let tokens = lex("TRUE");
        let mut stream = TokenStream::new(&tokens);
        assert!(parse_boolean_value(&mut stream).unwrap());

        let tokens = lex("1");
        let mut stream = TokenStream::new(&tokens);
        assert!(parse_boolean_value(&mut stream).is_err());
    }

    #[test]
    fn integer_values() {
        let tokens = lex("5");
        let mut stream = TokenStream::new(&tokens);
        assert_eq!(parse_integer_value(&mut stream, "$top", true).unwrap(), 5);

        let tokens = lex("0");
        let mut stream = TokenStream::new(&tokens);
        let err = parse_integer_value(&mut stream, "$levels", false).unwrap_err();
        assert_eq!(err.key(), MessageKey::WrongValueForSystemQueryOption);
        assert_eq!(err.params()[0], "$levels");

        let tokens = lex("-1");
        let mut stream = TokenStream::new(&tokens);
        assert!(parse_integer_value(&mut stream, "$skip", true).is_err());

        let tokens = lex("99999999999");
        let mut stream = TokenStream::new(&tokens);
        assert!(parse_integer_value(&mut stream, "$top", true).is_err());
    }
}
