//! `$filter`

use super::AliasTable;
use super::base::TokenStream;
use super::expression::{ExprType, ExpressionParser};
use crate::ast::FilterOption;
use crate::config::ParserConfig;
use crate::edm::{Edm, StructuredType};
use crate::error::{MessageKey, ParseResult, UriParserError};
use tracing::debug;

/// Parses a `$filter` value into a boolean expression.
pub struct FilterParser<'a> {
    edm: &'a dyn Edm,
    aliases: &'a AliasTable,
    config: ParserConfig,
}

impl<'a> FilterParser<'a> {
    pub fn new(edm: &'a dyn Edm, aliases: &'a AliasTable) -> Self {
        Self {
            edm,
            aliases,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Parses the filter expression; it must be boolean or untyped.
    pub fn parse(
        &self,
        stream: &mut TokenStream<'_>,
        referenced: &StructuredType,
    ) -> ParseResult<FilterOption> {
        debug!(referenced = %referenced, "parsing $filter");
        let typed = ExpressionParser::new(self.edm, self.aliases, referenced)
            .with_max_depth(self.config.max_expression_depth)
            .parse(stream)?;
        if !typed.ty.accepts(ExprType::Boolean) {
            return Err(UriParserError::new(
                MessageKey::TypeMismatch,
                format!(
                    "The $filter expression must be of type Edm.Boolean, found {}.",
                    typed.ty
                ),
                typed.span,
            )
            .with_param("$filter"));
        }
        Ok(FilterOption {
            expression: typed.expression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::fixtures::{entity, lex, sales};

    fn parse(source: &str) -> ParseResult<FilterOption> {
        let edm = sales();
        let aliases = AliasTable::new();
        let tokens = lex(source)?;
        let mut stream = TokenStream::new(&tokens);
        FilterParser::new(&edm, &aliases).parse(&mut stream, &entity("Order"))
    }

    #[test]
    fn boolean_filter() {
        let filter = parse("Total gt 100 and Customer/Active").unwrap();
        assert_eq!(filter.to_string(), "((Total gt 100) and Customer/Active)");
    }

    #[test]
    fn non_boolean_filter_is_rejected() {
        let err = parse("Total add 1").unwrap_err();
        assert_eq!(err.key(), MessageKey::TypeMismatch);
        assert_eq!(err.span(), &(0..11));
    }

    #[test]
    fn alias_filter_is_accepted() {
        assert!(parse("@flag").is_ok());
    }

    #[test]
    fn configured_depth_applies() {
        let edm = sales();
        let aliases = AliasTable::new();
        let tokens = lex("not (Placed lt 2024-01-01T00:00:00Z)").unwrap();
        let config = ParserConfig::default().with_max_expression_depth(1);

        let mut stream = TokenStream::new(&tokens);
        let err = FilterParser::new(&edm, &aliases)
            .with_config(config)
            .parse(&mut stream, &entity("Order"))
            .unwrap_err();
        assert_eq!(err.key(), MessageKey::MaxExpressionDepthExceeded);

        let mut stream = TokenStream::new(&tokens);
        assert!(
            FilterParser::new(&edm, &aliases)
                .parse(&mut stream, &entity("Order"))
                .is_ok()
        );
    }
}
