//! Shared fixtures for the integration tests.
//!
//! # Fixtures
//! - [`sales_edm`] - a small order-management model in namespace `Sales`
//! - [`entity`] / [`complex`] - type handles into that model
//!
//! # Parsing Helpers
//! - [`parse_expand_ok`] - parse `$expand`, panicking with the rendered report
//! - [`parse_expand_err`] - parse `$expand`, expecting failure

#![allow(dead_code)]

use odata_query_parser::ast::ExpandOption;
use odata_query_parser::edm::{FullQualifiedName, InMemoryEdm, PrimitiveKind, StructuredType};
use odata_query_parser::{UriParserError, parse_expand};

/// Builds the `Sales` model used across the integration tests.
pub fn sales_edm() -> InMemoryEdm {
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
        .entity_type("Country", |t| {
            t.property("Id", PrimitiveKind::Int32)
                .property("Code", PrimitiveKind::String)
        })
        .entity_type("Region", |t| {
            t.property("Id", PrimitiveKind::Int32)
                .property("Code", PrimitiveKind::String)
        })
        .entity_type("Warehouse", |t| t.property("Id", PrimitiveKind::Int32))
        .build()
}

pub fn entity(name: &str) -> StructuredType {
    StructuredType::Entity(FullQualifiedName::new("Sales", name))
}

pub fn complex(name: &str) -> StructuredType {
    StructuredType::Complex(FullQualifiedName::new("Sales", name))
}

/// Parses `source` as `$expand` on `Sales.Customer`.
///
/// Panics with the rendered diagnostic when parsing fails, so test output
/// shows where in the input the parser gave up.
pub fn parse_expand_ok(source: &str) -> ExpandOption {
    parse_expand_on(source, "Customer")
}

pub fn parse_expand_on(source: &str, ty: &str) -> ExpandOption {
    let edm = sales_edm();
    match parse_expand(source, &edm, &entity(ty)) {
        Ok(expand) => expand,
        Err(err) => panic!("{:?}", err.to_report(source)),
    }
}

/// Parses `source` as `$expand` on `Sales.Customer`, expecting an error.
pub fn parse_expand_err(source: &str) -> UriParserError {
    let edm = sales_edm();
    match parse_expand(source, &edm, &entity("Customer")) {
        Ok(expand) => panic!("expected {source:?} to fail, parsed as {expand}"),
        Err(err) => err,
    }
}
