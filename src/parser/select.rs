//! `$select`

use super::base::TokenStream;
use super::type_cast::parse_type_cast;
use crate::ast::{SelectItem, SelectOption, SelectProperty, SelectSegment};
use crate::edm::{Edm, StructuredType};
use crate::error::{MessageKey, ParseResult, UriParserError};
use crate::lexer::token::TokenKind;
use smol_str::SmolStr;
use tracing::debug;

/// Parses comma-separated `*` and property paths.
///
/// Paths walk complex properties, each optionally narrowed by a type cast.
/// A navigation property may only end a path.
pub struct SelectParser<'a> {
    edm: &'a dyn Edm,
}

impl<'a> SelectParser<'a> {
    pub fn new(edm: &'a dyn Edm) -> Self {
        Self { edm }
    }

    pub fn parse(
        &self,
        stream: &mut TokenStream<'_>,
        referenced: &StructuredType,
        is_collection: bool,
    ) -> ParseResult<SelectOption> {
        debug!(referenced = %referenced, is_collection, "parsing $select");
        let mut items = Vec::new();
        loop {
            items.push(self.parse_item(stream, referenced)?);
            if !stream.try_consume(TokenKind::Comma) {
                break;
            }
        }
        Ok(SelectOption { items })
    }

    fn parse_item(
        &self,
        stream: &mut TokenStream<'_>,
        referenced: &StructuredType,
    ) -> ParseResult<SelectItem> {
        if stream.try_consume(TokenKind::Star) {
            return Ok(SelectItem::Star);
        }

        let type_filter = parse_type_cast(stream, self.edm, referenced)?;
        let mut owner = match &type_filter {
            Some(cast) => {
                stream.require(TokenKind::Slash)?;
                cast.clone()
            }
            None => referenced.clone(),
        };

        let mut segments = Vec::new();
        loop {
            let span = stream.expect(TokenKind::Identifier)?;
            let name = SmolStr::new(stream.current_lexeme());

            if let Some(property) = self.edm.structural_property(&owner, &name) {
                let complex = property.complex_type();
                let property = SelectProperty::Structural(property);
                let Some(complex) = complex.filter(|_| stream.try_consume(TokenKind::Slash))
                else {
                    segments.push(SelectSegment {
                        property,
                        type_filter: None,
                    });
                    break;
                };
                let cast = parse_type_cast(stream, self.edm, &complex)?;
                segments.push(SelectSegment {
                    property,
                    type_filter: cast.clone(),
                });
                match cast {
                    // `Address/Sales.GeoAddress` may end the path
                    Some(cast) if stream.try_consume(TokenKind::Slash) => owner = cast,
                    Some(_) => break,
                    None => owner = complex,
                }
            } else if let Some(navigation) = self.edm.navigation_property(&owner, &name) {
                segments.push(SelectSegment {
                    property: SelectProperty::Navigation(navigation),
                    type_filter: None,
                });
                if stream.check(TokenKind::Slash) {
                    return Err(stream
                        .error_here(
                            MessageKey::NavigationNotAllowed,
                            format!("Navigation property '{name}' must end a $select path."),
                        )
                        .with_param(name));
                }
                break;
            } else {
                return Err(UriParserError::new(
                    MessageKey::PropertyNotInType,
                    format!("Property '{name}' not found in type '{owner}'."),
                    span,
                )
                .with_param(owner.to_string())
                .with_param(name));
            }
        }

        Ok(SelectItem::Path {
            type_filter,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::fixtures::{entity, lex, sales};

    fn parse(source: &str) -> ParseResult<SelectOption> {
        let edm = sales();
        let tokens = lex(source)?;
        let mut stream = TokenStream::new(&tokens);
        let select = SelectParser::new(&edm).parse(&mut stream, &entity("Customer"), true)?;
        assert!(stream.is_at_end(), "unconsumed input in {source:?}");
        Ok(select)
    }

    #[test]
    fn star_and_paths() {
        let select = parse("*,Name,Address/City").unwrap();
        assert_eq!(select.items.len(), 3);
        assert_eq!(select.items[0], SelectItem::Star);
        assert_eq!(select.to_string(), "*,Name,Address/City");
    }

    #[test]
    fn casts_narrow_complex_segments() {
        let select = parse("Address/Sales.GeoAddress/Latitude").unwrap();
        assert_eq!(select.to_string(), "Address/Sales.GeoAddress/Latitude");

        let select = parse("Address/Sales.GeoAddress").unwrap();
        let SelectItem::Path { segments, .. } = &select.items[0] else {
            panic!("expected a path");
        };
        assert_eq!(segments.len(), 1);
        assert!(segments[0].type_filter.is_some());
    }

    #[test]
    fn navigation_ends_the_path() {
        assert!(parse("Orders").is_ok());
        let err = parse("Orders/Id").unwrap_err();
        assert_eq!(err.key(), MessageKey::NavigationNotAllowed);
    }

    #[test]
    fn unknown_property() {
        let err = parse("Address/Latitude").unwrap_err();
        assert_eq!(err.key(), MessageKey::PropertyNotInType);
        assert_eq!(err.params()[0], "Sales.Address");
    }

    #[test]
    fn leading_cast() {
        let edm = sales();
        let tokens = lex("Sales.SpecialOrder/Priority").unwrap();
        let mut stream = TokenStream::new(&tokens);
        let select = SelectParser::new(&edm)
            .parse(&mut stream, &entity("Order"), true)
            .unwrap();
        assert_eq!(select.to_string(), "Sales.SpecialOrder/Priority");
    }
}
