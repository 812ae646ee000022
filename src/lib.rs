//! OData system query option parser with schema-aware validation.
//!
//! Turns the values of `$expand`, `$filter`, `$select`, `$orderby`,
//! `$search`, `$top`, `$skip`, `$count` and `$levels` into a validated,
//! strongly typed query plan. Names are resolved against an entity data
//! model while parsing, so `$expand=Orders($select=Id;$expand=Lines)` comes
//! back with `Orders` known to be a collection navigation property and
//! `Lines` resolved against its target type. Errors convert into miette
//! reports for display.
//!
//! # Example
//!
//! ```
//! use odata_query_parser::edm::{Edm, FullQualifiedName, InMemoryEdm, PrimitiveKind};
//! use odata_query_parser::parse_expand;
//!
//! let edm = InMemoryEdm::builder("Sales")
//!     .entity_type("Customer", |t| {
//!         t.property("Id", PrimitiveKind::Int32)
//!             .collection_navigation("Orders", "Order")
//!     })
//!     .entity_type("Order", |t| t.property("Id", PrimitiveKind::Int32))
//!     .build();
//! let customer = edm
//!     .entity_type(&FullQualifiedName::new("Sales", "Customer"))
//!     .unwrap();
//!
//! let expand = parse_expand("Orders($select=Id;$top=5)", &edm, &customer).unwrap();
//! assert_eq!(expand.to_string(), "Orders($select=Id;$top=5)");
//!
//! let err = parse_expand("Orders($top=1;$top=2)", &edm, &customer).unwrap_err();
//! assert!(err.is_semantic());
//! ```

pub mod ast;
pub mod config;
pub mod diag;
pub mod edm;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::Span;
pub use config::ParserConfig;
pub use diag::{Diag, DiagLabel, LabelRole};
pub use error::{ErrorKind, MessageKey, ParseResult, UriParserError};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{LexerResult, tokenize};
pub use parser::{AliasTable, ExpandParser, QueryOptionParser, QueryOptions, TokenStream};

use ast::ExpandOption;
use edm::{Edm, StructuredType};

/// Parses a complete `$expand` value against `referenced`.
///
/// Uses an empty alias table and the default [`ParserConfig`]. The whole
/// text must be consumed.
pub fn parse_expand(
    text: &str,
    edm: &dyn Edm,
    referenced: &StructuredType,
) -> ParseResult<ExpandOption> {
    let tokens = tokenize(text).into_tokens()?;
    let mut stream = TokenStream::new(&tokens);
    let aliases = AliasTable::new();
    let expand = ExpandParser::new(edm, &aliases).parse(&mut stream, referenced)?;
    if !stream.is_at_end() {
        let token = stream.current();
        return Err(UriParserError::new(
            MessageKey::TrailingTokens,
            format!("Unexpected {} after the value of '$expand'.", token.describe()),
            token.span.clone(),
        )
        .with_param("$expand")
        .with_param(token.text.clone()));
    }
    Ok(expand)
}

/// Parses a complete query string with the default [`ParserConfig`].
pub fn parse_query_options(
    query: &str,
    edm: &dyn Edm,
    resource_type: &StructuredType,
    is_collection: bool,
) -> ParseResult<QueryOptions> {
    QueryOptionParser::new(edm).parse_query(query, resource_type, is_collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::fixtures::{entity, sales};

    #[test]
    fn public_api_accessible() {
        let _span: Span = 0..5;
        let _config = ParserConfig::default();
        assert_eq!(MessageKey::UnknownPart.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn parse_expand_rejects_trailing_input() {
        let edm = sales();
        let err = parse_expand("Orders Manager", &edm, &entity("Customer")).unwrap_err();
        assert_eq!(err.key(), MessageKey::TrailingTokens);
        assert_eq!(err.span(), &(7..14));
    }

    #[test]
    fn errors_render_as_reports() {
        let edm = sales();
        let text = "Orders($top=1;$top=2)";
        let err = parse_expand(text, &edm, &entity("Customer")).unwrap_err();
        let report = err.to_report(text);
        assert!(report.to_string().contains("Double system query option"));
    }
}
