//! Schema-aware parsers for OData system query options.
//!
//! Each option value is lexed once and parsed over a shared [`TokenStream`].
//! Parsers resolve names against the [`Edm`](crate::edm::Edm) as they go, so
//! every returned tree is fully validated. Errors are raised at the point of
//! detection and returned unchanged; there is no recovery.

pub mod base;
mod expand;
mod expression;
mod filter;
mod orderby;
mod query_options;
mod search;
mod select;
mod type_cast;

use smol_str::SmolStr;
use std::collections::HashMap;

pub use base::TokenStream;
pub use expand::{ExpandParser, OptionContext, parse_levels};
pub use expression::{ExprType, ExpressionParser, TypedExpression};
pub use filter::FilterParser;
pub use orderby::OrderByParser;
pub use query_options::{QueryOptionParser, QueryOptions};
pub use search::SearchParser;
pub use select::SelectParser;
pub use type_cast::parse_type_cast;

/// Parameter aliases of a request: `@p1=5` is stored as `p1 -> "5"`.
pub type AliasTable = HashMap<SmolStr, SmolStr>;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::edm::{FullQualifiedName, InMemoryEdm, PrimitiveKind, StructuredType};
    use crate::error::ParseResult;
    use crate::lexer::token::Token;
    use crate::lexer::tokenize;

    pub fn sales() -> InMemoryEdm {
        InMemoryEdm::builder("Sales")
            .complex_type("Address", |t| {
                t.property("Street", PrimitiveKind::String)
                    .property("City", PrimitiveKind::String)
                    .navigation("Country", "Country")
            })
            .complex_type("GeoAddress", |t| {
                t.base("Address")
                    .property("Latitude", PrimitiveKind::Double)
                    .navigation("Region", "Region")
            })
            .entity_type("Customer", |t| {
                t.property("Id", PrimitiveKind::Int32)
                    .property("Name", PrimitiveKind::String)
                    .property("Active", PrimitiveKind::Boolean)
                    .property("Since", PrimitiveKind::Date)
                    .collection_property("Tags", PrimitiveKind::String)
                    .complex_property("Address", "Address")
                    .collection_navigation("Orders", "Order")
                    .navigation("Manager", "Customer")
            })
            .entity_type("Order", |t| {
                t.property("Id", PrimitiveKind::Int32)
                    .property("Total", PrimitiveKind::Decimal)
                    .property("Placed", PrimitiveKind::DateTimeOffset)
                    .collection_navigation("Lines", "OrderLine")
                    .navigation("Customer", "Customer")
            })
            .entity_type("SpecialOrder", |t| {
                t.base("Order").property("Priority", PrimitiveKind::Int32)
            })
            .entity_type("OrderLine", |t| {
                t.property("Quantity", PrimitiveKind::Int32)
                    .property("Product", PrimitiveKind::String)
            })
            .entity_type("Country", |t| t.property("Code", PrimitiveKind::String))
            .entity_type("Region", |t| t.property("Code", PrimitiveKind::String))
            .entity_type("Warehouse", |t| t.property("Id", PrimitiveKind::Int32))
            .build()
    }

    pub fn entity(name: &str) -> StructuredType {
        StructuredType::Entity(FullQualifiedName::new("Sales", name))
    }

    pub fn lex(source: &str) -> ParseResult<Vec<Token>> {
        tokenize(source).into_tokens()
    }
}
