//! `$orderby`

use super::AliasTable;
use super::base::TokenStream;
use super::expression::{ExprType, ExpressionParser};
use crate::ast::{OrderByItem, OrderByOption};
use crate::config::ParserConfig;
use crate::edm::{Edm, StructuredType};
use crate::error::{MessageKey, ParseResult, UriParserError};
use crate::lexer::token::TokenKind;
use tracing::debug;

/// Parses comma-separated sort keys, each optionally followed by `asc` or `desc`.
pub struct OrderByParser<'a> {
    edm: &'a dyn Edm,
    aliases: &'a AliasTable,
    config: ParserConfig,
}

impl<'a> OrderByParser<'a> {
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

    pub fn parse(
        &self,
        stream: &mut TokenStream<'_>,
        referenced: &StructuredType,
    ) -> ParseResult<OrderByOption> {
        debug!(referenced = %referenced, "parsing $orderby");
        let expressions = ExpressionParser::new(self.edm, self.aliases, referenced)
            .with_max_depth(self.config.max_expression_depth);
        let mut items = Vec::new();
        loop {
            let typed = expressions.parse(stream)?;
            if typed.ty == ExprType::Structured {
                return Err(UriParserError::new(
                    MessageKey::TypeMismatch,
                    format!("Cannot order by '{}': it is not a primitive value.", typed.expression),
                    typed.span,
                )
                .with_param("$orderby"));
            }
            let descending = if stream.try_consume_word("desc") {
                true
            } else {
                stream.try_consume_word("asc");
                false
            };
            items.push(OrderByItem {
                expression: typed.expression,
                descending,
            });
            if !stream.try_consume(TokenKind::Comma) {
                break;
            }
        }
        Ok(OrderByOption { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::fixtures::{entity, lex, sales};

    fn parse(source: &str) -> ParseResult<OrderByOption> {
        let edm = sales();
        let aliases = AliasTable::new();
        let tokens = lex(source)?;
        let mut stream = TokenStream::new(&tokens);
        OrderByParser::new(&edm, &aliases).parse(&mut stream, &entity("Customer"))
    }

    #[test]
    fn directions() {
        let orderby = parse("Name desc,Address/City asc,Id").unwrap();
        assert_eq!(orderby.items.len(), 3);
        assert!(orderby.items[0].descending);
        assert!(!orderby.items[1].descending);
        assert_eq!(orderby.to_string(), "Name desc,Address/City,Id");
    }

    #[test]
    fn structured_keys_are_rejected() {
        let err = parse("Address").unwrap_err();
        assert_eq!(err.key(), MessageKey::TypeMismatch);
    }

    #[test]
    fn trailing_comma_needs_a_key() {
        assert!(parse("Name,").is_err());
    }

    #[test]
    fn each_key_gets_the_full_depth() {
        let edm = sales();
        let aliases = AliasTable::new();
        let tokens = lex("length(trim(Name)),(Id) desc,((Id))").unwrap();
        let config = ParserConfig::default().with_max_expression_depth(2);

        let mut stream = TokenStream::new(&tokens);
        let orderby = OrderByParser::new(&edm, &aliases)
            .with_config(config)
            .parse(&mut stream, &entity("Customer"))
            .unwrap();
        assert_eq!(orderby.items.len(), 3);

        let tokens = lex("(((Id)))").unwrap();
        let mut stream = TokenStream::new(&tokens);
        let err = OrderByParser::new(&edm, &aliases)
            .with_config(config)
            .parse(&mut stream, &entity("Customer"))
            .unwrap_err();
        assert_eq!(err.key(), MessageKey::MaxExpressionDepthExceeded);
    }
}
