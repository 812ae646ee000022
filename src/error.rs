//! Error type shared by the lexer and every query option parser.

use crate::ast::Span;
use crate::diag::{Diag, DiagLabel};
use smol_str::SmolStr;
use std::fmt;

/// Result type for all parsing operations.
pub type ParseResult<T> = Result<T, UriParserError>;

/// The two failure classes of query option parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An expected token or shape was absent.
    Syntax,
    /// The text is well formed but names something invalid for the schema or context.
    Semantic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax"),
            ErrorKind::Semantic => write!(f, "semantic"),
        }
    }
}

/// Stable identifiers for every diagnostic the parsers can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Generic grammar violation, e.g. "allowed query option expected".
    Syntax,
    /// A specific token was required but another one was found.
    UnexpectedToken,
    /// Unrecognized character in the query text.
    InvalidCharacter,
    /// Tokens left over after an option value was parsed.
    TrailingTokens,
    /// A `$`-prefixed option name that is not a system query option.
    UnknownSystemQueryOption,
    /// A numeric option value out of range.
    WrongValueForSystemQueryOption,
    /// The raw query string exceeds the configured limit.
    QueryTooLong,
    /// The same system query option was given twice.
    DoubleSystemQueryOption,
    /// A qualified name that does not resolve to a type.
    UnknownPart,
    /// A type cast to a type outside the expected hierarchy.
    IncompatibleTypeFilter,
    /// A property name that does not exist on the searched type.
    PropertyNotInType,
    /// A navigation property used where only its end may appear.
    NavigationNotAllowed,
    /// Operand types that do not fit the operator or method.
    TypeMismatch,
    /// A method name the filter grammar does not know.
    UnknownMethod,
    /// Nested `$expand` deeper than the configured limit.
    MaxExpandDepthExceeded,
    /// Parentheses, `not` or method calls nested deeper than the configured limit.
    MaxExpressionDepthExceeded,
}

impl MessageKey {
    /// The error class this key belongs to.
    pub fn kind(self) -> ErrorKind {
        match self {
            MessageKey::Syntax
            | MessageKey::UnexpectedToken
            | MessageKey::InvalidCharacter
            | MessageKey::TrailingTokens
            | MessageKey::UnknownSystemQueryOption
            | MessageKey::WrongValueForSystemQueryOption
            | MessageKey::QueryTooLong => ErrorKind::Syntax,
            MessageKey::DoubleSystemQueryOption
            | MessageKey::UnknownPart
            | MessageKey::IncompatibleTypeFilter
            | MessageKey::PropertyNotInType
            | MessageKey::NavigationNotAllowed
            | MessageKey::TypeMismatch
            | MessageKey::UnknownMethod
            | MessageKey::MaxExpandDepthExceeded
            | MessageKey::MaxExpressionDepthExceeded => ErrorKind::Semantic,
        }
    }

    /// Stable diagnostic code, prefixed with the error class.
    pub fn code(self) -> &'static str {
        match self {
            MessageKey::Syntax => "syntax::syntax",
            MessageKey::UnexpectedToken => "syntax::unexpected_token",
            MessageKey::InvalidCharacter => "syntax::invalid_character",
            MessageKey::TrailingTokens => "syntax::trailing_tokens",
            MessageKey::UnknownSystemQueryOption => "syntax::unknown_system_query_option",
            MessageKey::WrongValueForSystemQueryOption => {
                "syntax::wrong_value_for_system_query_option"
            }
            MessageKey::QueryTooLong => "syntax::query_too_long",
            MessageKey::DoubleSystemQueryOption => "semantic::double_system_query_option",
            MessageKey::UnknownPart => "semantic::unknown_part",
            MessageKey::IncompatibleTypeFilter => "semantic::incompatible_type_filter",
            MessageKey::PropertyNotInType => "semantic::property_not_in_type",
            MessageKey::NavigationNotAllowed => "semantic::navigation_not_allowed",
            MessageKey::TypeMismatch => "semantic::type_mismatch",
            MessageKey::UnknownMethod => "semantic::unknown_method",
            MessageKey::MaxExpandDepthExceeded => "semantic::max_expand_depth_exceeded",
            MessageKey::MaxExpressionDepthExceeded => "semantic::max_expression_depth_exceeded",
        }
    }
}

/// A syntax or semantic error raised while parsing a query option.
///
/// Errors are raised at the point of detection and propagate unchanged to the
/// top-level caller. `params` carries the names a message was built from (the
/// offending option, property or type) so callers can localize messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriParserError {
    key: MessageKey,
    message: String,
    span: Span,
    params: Vec<SmolStr>,
    related: Option<(Span, String)>,
}

impl UriParserError {
    /// Creates an error for `key`; its class follows from the key.
    pub fn new(key: MessageKey, message: impl Into<String>, span: Span) -> Self {
        Self {
            key,
            message: message.into(),
            span,
            params: Vec::new(),
            related: None,
        }
    }

    /// Adds a message parameter.
    pub fn with_param(mut self, param: impl Into<SmolStr>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Points at a second location that contributed to the error.
    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related = Some((span, message.into()));
        self
    }

    /// The error class.
    pub fn kind(&self) -> ErrorKind {
        self.key.kind()
    }

    /// Returns true for syntax errors.
    pub fn is_syntax(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }

    /// Returns true for semantic errors.
    pub fn is_semantic(&self) -> bool {
        self.kind() == ErrorKind::Semantic
    }

    /// The message key.
    pub fn key(&self) -> MessageKey {
        self.key
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte span of the offending token within the option value.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Message parameters, in the order they were added.
    pub fn params(&self) -> &[SmolStr] {
        &self.params
    }

    /// Lowers the error into a renderer-independent diagnostic.
    pub fn to_diag(&self) -> Diag {
        let mut diag = Diag::error(self.message.clone())
            .with_label(DiagLabel::primary(self.span.clone(), "here"))
            .with_code(self.key.code());
        if let Some((span, message)) = &self.related {
            diag = diag.with_label(DiagLabel::secondary(span.clone(), message.clone()));
        }
        if self.key == MessageKey::Syntax {
            diag = diag.with_help(
                "allowed options are $count, $expand, $filter, $levels, $orderby, $search, $select, $skip and $top",
            );
        }
        diag
    }

    /// Renders the error as a miette report over the text that produced it.
    pub fn to_report(&self, source: &str) -> miette::Report {
        self.to_diag().to_report(source)
    }
}

impl fmt::Display for UriParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind(), self.message)
    }
}

impl std::error::Error for UriParserError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_key() {
        let err = UriParserError::new(MessageKey::UnexpectedToken, "expected ')'", 3..4);
        assert!(err.is_syntax());
        assert!(!err.is_semantic());

        let err = UriParserError::new(MessageKey::DoubleSystemQueryOption, "double", 0..1);
        assert!(err.is_semantic());
    }

    #[test]
    fn display_prefixes_class() {
        let err = UriParserError::new(MessageKey::UnknownPart, "Type 'NS.Nope' not found.", 0..7)
            .with_param("NS.Nope");
        assert_eq!(err.to_string(), "semantic error: Type 'NS.Nope' not found.");
        assert_eq!(err.params().len(), 1);
        assert_eq!(err.params()[0], "NS.Nope");
    }

    #[test]
    fn to_diag_includes_related_location() {
        let err = UriParserError::new(MessageKey::DoubleSystemQueryOption, "double", 14..18)
            .with_related(7..11, "first given here");
        let diag = err.to_diag();
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.labels[1].span, 7..11);
        assert_eq!(
            diag.code.as_deref(),
            Some("semantic::double_system_query_option")
        );
    }

    #[test]
    fn syntax_key_gets_help() {
        let err = UriParserError::new(MessageKey::Syntax, "Allowed query option expected.", 0..4);
        assert!(err.to_diag().help.is_some());
    }
}
