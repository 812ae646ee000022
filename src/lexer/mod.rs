//! Lexical analysis for OData query option values.
//!
//! Scanning is delegated to a `logos` automaton; this module turns its output
//! into [`Token`]s carrying their source text and span, and appends the EOF
//! token every parser relies on.

pub mod token;

use crate::error::{MessageKey, UriParserError};
use logos::Logos;
use token::{Token, TokenKind};

/// Result of lexical analysis.
///
/// Contains both the tokens produced and any errors encountered during scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens produced, including an EOF token at the end.
    pub tokens: Vec<Token>,
    /// Invalid characters encountered while scanning.
    pub errors: Vec<UriParserError>,
}

impl LexerResult {
    /// Returns the tokens, or the first lexical error if there was one.
    pub fn into_tokens(self) -> Result<Vec<Token>, UriParserError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.tokens),
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum Lexeme {
    #[token("$count", ignore(ascii_case))]
    Count,
    #[token("$expand", ignore(ascii_case))]
    Expand,
    #[token("$filter", ignore(ascii_case))]
    Filter,
    #[token("$levels", ignore(ascii_case))]
    Levels,
    #[token("$orderby", ignore(ascii_case))]
    OrderBy,
    #[token("$search", ignore(ascii_case))]
    Search,
    #[token("$select", ignore(ascii_case))]
    Select,
    #[token("$skip", ignore(ascii_case))]
    Skip,
    #[token("$top", ignore(ascii_case))]
    Top,
    #[token("$ref", ignore(ascii_case))]
    Ref,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)+")]
    QualifiedName,
    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*")]
    Alias,

    #[regex(r"-?[0-9]+")]
    Integer,
    #[regex(r"-?[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Decimal,
    #[regex(r"'([^']|'')*'")]
    String,
    #[regex(r"[0-9]{4}-[0-9]{2}-[0-9]{2}")]
    Date,
    #[regex(r"[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?(Z|[+-][0-9]{2}:[0-9]{2})")]
    DateTimeOffset,
    #[regex(r"[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}")]
    Guid,
    #[regex(r#""([^"\\]|\\.)*""#)]
    QuotedPhrase,

    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    Open,
    #[token(")")]
    Close,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Eq,
}

impl From<Lexeme> for TokenKind {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::Count => TokenKind::Count,
            Lexeme::Expand => TokenKind::Expand,
            Lexeme::Filter => TokenKind::Filter,
            Lexeme::Levels => TokenKind::Levels,
            Lexeme::OrderBy => TokenKind::OrderBy,
            Lexeme::Search => TokenKind::Search,
            Lexeme::Select => TokenKind::Select,
            Lexeme::Skip => TokenKind::Skip,
            Lexeme::Top => TokenKind::Top,
            Lexeme::Ref => TokenKind::Ref,
            Lexeme::Identifier => TokenKind::Identifier,
            Lexeme::QualifiedName => TokenKind::QualifiedName,
            Lexeme::Alias => TokenKind::Alias,
            Lexeme::Integer => TokenKind::Integer,
            Lexeme::Decimal => TokenKind::Decimal,
            Lexeme::String => TokenKind::String,
            Lexeme::Date => TokenKind::Date,
            Lexeme::DateTimeOffset => TokenKind::DateTimeOffset,
            Lexeme::Guid => TokenKind::Guid,
            Lexeme::QuotedPhrase => TokenKind::QuotedPhrase,
            Lexeme::Star => TokenKind::Star,
            Lexeme::Slash => TokenKind::Slash,
            Lexeme::Open => TokenKind::Open,
            Lexeme::Close => TokenKind::Close,
            Lexeme::Comma => TokenKind::Comma,
            Lexeme::Semicolon => TokenKind::Semicolon,
            Lexeme::Eq => TokenKind::Eq,
        }
    }
}

/// Tokenizes a query option value.
///
/// Scanning continues past invalid characters so every one of them is
/// reported; the token vector always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> LexerResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let mut lexer = Lexeme::lexer(source);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(lexeme) => tokens.push(Token::new(lexeme.into(), lexer.slice(), span)),
            Err(()) => {
                let text = lexer.slice();
                errors.push(
                    UriParserError::new(
                        MessageKey::InvalidCharacter,
                        format!("invalid character '{text}'"),
                        span,
                    )
                    .with_param(text),
                );
            }
        }
    }

    let eof_pos = source.len();
    tokens.push(Token::new(TokenKind::Eof, "", eof_pos..eof_pos));

    LexerResult { tokens, errors }
}
