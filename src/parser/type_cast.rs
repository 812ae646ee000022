//! Qualified-name type casts shared by `$expand` and `$select` paths.

use super::base::TokenStream;
use crate::edm::{Edm, FullQualifiedName, StructuredType};
use crate::error::{MessageKey, ParseResult, UriParserError};
use crate::lexer::token::TokenKind;
use tracing::trace;

/// Consumes a qualified-name type cast against `referenced`, if one is present.
///
/// The name is looked up as an entity type when `referenced` is an entity
/// type and as a complex type otherwise, and must equal or derive from
/// `referenced`. Returns `Ok(None)` without consuming anything when the
/// current token is not a qualified name.
pub fn parse_type_cast(
    stream: &mut TokenStream<'_>,
    edm: &dyn Edm,
    referenced: &StructuredType,
) -> ParseResult<Option<StructuredType>> {
    if !stream.try_consume(TokenKind::QualifiedName) {
        return Ok(None);
    }
    let span = stream.previous_span();
    let text = stream.current_lexeme();

    let resolved = FullQualifiedName::parse(text).and_then(|name| edm.same_kind_type(referenced, &name));
    let Some(cast) = resolved else {
        return Err(UriParserError::new(
            MessageKey::UnknownPart,
            format!("Type '{text}' not found."),
            span,
        )
        .with_param(text));
    };

    if !edm.is_compatible(&cast, referenced) {
        return Err(UriParserError::new(
            MessageKey::IncompatibleTypeFilter,
            format!("The type cast '{cast}' is not compatible with '{referenced}'."),
            span,
        )
        .with_param(cast.to_string()));
    }

    trace!(cast = %cast, referenced = %referenced, "resolved type cast");
    Ok(Some(cast))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::{InMemoryEdm, PrimitiveKind};
    use crate::lexer::tokenize;

    fn edm() -> InMemoryEdm {
        InMemoryEdm::builder("Sales")
            .entity_type("Order", |t| t.property("Id", PrimitiveKind::Int32))
            .entity_type("SpecialOrder", |t| t.base("Order"))
            .entity_type("Customer", |t| t.property("Id", PrimitiveKind::Int32))
            .complex_type("Address", |t| t.property("City", PrimitiveKind::String))
            .build()
    }

    fn order() -> StructuredType {
        StructuredType::Entity(FullQualifiedName::new("Sales", "Order"))
    }

    #[test]
    fn absent_cast_consumes_nothing() {
        let tokens = tokenize("Orders").tokens;
        let mut stream = TokenStream::new(&tokens);
        assert_eq!(parse_type_cast(&mut stream, &edm(), &order()).unwrap(), None);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn derived_type_resolves() {
        let tokens = tokenize("Sales.SpecialOrder").tokens;
        let mut stream = TokenStream::new(&tokens);
        let cast = parse_type_cast(&mut stream, &edm(), &order()).unwrap();
        assert_eq!(
            cast,
            Some(StructuredType::Entity(FullQualifiedName::new(
                "Sales",
                "SpecialOrder"
            )))
        );
    }

    #[test]
    fn unrelated_type_is_incompatible() {
        let tokens = tokenize("Sales.Customer").tokens;
        let mut stream = TokenStream::new(&tokens);
        let err = parse_type_cast(&mut stream, &edm(), &order()).unwrap_err();
        assert_eq!(err.key(), MessageKey::IncompatibleTypeFilter);
        assert!(err.message().contains("Sales.Customer"));
    }

    #[test]
    fn cast_uses_lookup_of_same_kind() {
        let tokens = tokenize("Sales.Address").tokens;
        let mut stream = TokenStream::new(&tokens);
        let err = parse_type_cast(&mut stream, &edm(), &order()).unwrap_err();
        assert_eq!(err.key(), MessageKey::UnknownPart);
        assert_eq!(err.params()[0], "Sales.Address");
    }
}
