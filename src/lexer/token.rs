//! Token types for OData query option lexing.

use crate::ast::Span;
use smol_str::SmolStr;
use std::fmt;

/// The kind of a lexical token in an OData query option value.
///
/// `Max`, `Boolean` and `Null` are contextual kinds: the lexer never emits
/// them. It produces plain identifiers and the token stream matches these
/// kinds by text when a parser asks for them, so `max` or `true` remain usable
/// as property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // System query option keywords
    Count,
    Expand,
    Filter,
    Levels,
    OrderBy,
    Search,
    Select,
    Skip,
    Top,

    // Path-segment keywords
    Ref,

    // Contextual keywords
    Max,
    Boolean,
    Null,

    // Names
    Identifier,
    QualifiedName,
    Alias,

    // Literals
    Integer,
    Decimal,
    String,
    Date,
    DateTimeOffset,
    Guid,
    QuotedPhrase,

    // Punctuation
    Star,
    Slash,
    Open,
    Close,
    Comma,
    Semicolon,
    Eq,

    // Special
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Count => write!(f, "$count"),
            TokenKind::Expand => write!(f, "$expand"),
            TokenKind::Filter => write!(f, "$filter"),
            TokenKind::Levels => write!(f, "$levels"),
            TokenKind::OrderBy => write!(f, "$orderby"),
            TokenKind::Search => write!(f, "$search"),
            TokenKind::Select => write!(f, "$select"),
            TokenKind::Skip => write!(f, "$skip"),
            TokenKind::Top => write!(f, "$top"),
            TokenKind::Ref => write!(f, "$ref"),
            TokenKind::Max => write!(f, "max"),
            TokenKind::Boolean => write!(f, "boolean literal"),
            TokenKind::Null => write!(f, "null"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::QualifiedName => write!(f, "qualified name"),
            TokenKind::Alias => write!(f, "parameter alias"),
            TokenKind::Integer => write!(f, "integer literal"),
            TokenKind::Decimal => write!(f, "decimal literal"),
            TokenKind::String => write!(f, "string literal"),
            TokenKind::Date => write!(f, "date literal"),
            TokenKind::DateTimeOffset => write!(f, "date-time literal"),
            TokenKind::Guid => write!(f, "guid literal"),
            TokenKind::QuotedPhrase => write!(f, "quoted phrase"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Open => write!(f, "("),
            TokenKind::Close => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::Eof => write!(f, "<EOF>"),
        }
    }
}

/// A lexical token with its kind, source text and span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub text: SmolStr,
    /// The span in source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, text: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns true if the token matches `kind`, honoring contextual kinds.
    pub fn matches(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Max => {
                self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case("max")
            }
            TokenKind::Boolean => {
                self.kind == TokenKind::Identifier
                    && (self.text.eq_ignore_ascii_case("true")
                        || self.text.eq_ignore_ascii_case("false"))
            }
            TokenKind::Null => {
                self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case("null")
            }
            other => self.kind == other,
        }
    }

    /// Returns a short description used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}
