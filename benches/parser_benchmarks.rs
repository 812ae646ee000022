//! End-to-End Parser Benchmarks
//!
//! Measures the query option parser across value shapes and sizes:
//!
//! - **Expand**: flat lists, typed paths and nested options
//! - **Deep Nesting**: `$expand` nested inside `$expand`
//! - **Query Strings**: complete requests including decoding and aliases
//! - **Lexer Only**: tokenization without parsing
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench expand
//! cargo bench query_strings
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use odata_query_parser::edm::{FullQualifiedName, InMemoryEdm, PrimitiveKind, StructuredType};
use odata_query_parser::{ParserConfig, QueryOptionParser, parse_expand, tokenize};

fn sales() -> InMemoryEdm {
    InMemoryEdm::builder("Sales")
        .complex_type("Address", |t| {
            t.property("City", PrimitiveKind::String)
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
                .complex_property("Address", "Address")
                .collection_navigation("Orders", "Order")
                .navigation("Manager", "Customer")
        })
        .entity_type("Order", |t| {
            t.property("Id", PrimitiveKind::Int32)
                .property("Total", PrimitiveKind::Decimal)
                .collection_navigation("Lines", "OrderLine")
                .navigation("Customer", "Customer")
        })
        .entity_type("OrderLine", |t| {
            t.property("Quantity", PrimitiveKind::Int32)
                .property("Product", PrimitiveKind::String)
        })
        .entity_type("Country", |t| t.property("Code", PrimitiveKind::String))
        .entity_type("Region", |t| t.property("Code", PrimitiveKind::String))
        .build()
}

fn customer() -> StructuredType {
    StructuredType::Entity(FullQualifiedName::new("Sales", "Customer"))
}

// ============================================================================
// Expand Benchmarks
// ============================================================================

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");
    let edm = sales();
    let customer = customer();

    let values = vec![
        ("star", "*"),
        ("single_navigation", "Orders"),
        ("list", "Orders,Manager,Address/Country"),
        ("typed_path", "Address/Sales.GeoAddress/Region/$ref"),
        ("ref_with_options", "Orders/$ref($filter=Total gt 100;$top=10)"),
        (
            "nested_options",
            "Orders($filter=Total gt 100 and contains(Customer/Name,'Ann');$orderby=Total desc;\
             $select=Id,Total;$expand=Lines($select=Quantity);$top=20;$count=true)",
        ),
    ];

    for (name, value) in values {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &value, |b, v| {
            b.iter(|| parse_expand(black_box(v), &edm, &customer));
        });
    }

    group.finish();
}

fn bench_deep_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_nesting");
    group.sample_size(50);
    let edm = sales();
    let customer = customer();

    for depth in [2, 4, 8, 16].iter() {
        let mut value = String::from("Manager");
        for _ in 1..*depth {
            value = format!("Manager($expand={value})");
        }
        let parser = QueryOptionParser::new(&edm)
            .with_config(ParserConfig::default().with_max_expand_depth(*depth));
        let query = format!("$expand={value}");

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{depth}_levels")),
            &query,
            |b, q| {
                b.iter(|| parser.parse_query(black_box(q), &customer, true));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Query String Benchmarks
// ============================================================================

fn bench_query_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_strings");
    let edm = sales();
    let customer = customer();
    let parser = QueryOptionParser::new(&edm);

    let queries = vec![
        ("paging", "$top=10&$skip=20&$count=true"),
        (
            "encoded_filter",
            "$filter=Name%20eq%20'Ann'%20and%20Active%20eq%20true&$orderby=Name",
        ),
        (
            "aliases",
            "$filter=Id gt @min and Id lt @max&@min=10&@max=500&$select=Id,Name",
        ),
        (
            "full_request",
            "?$filter=Active&$select=Id,Name&$expand=Orders($filter=Total gt 10;$top=5)\
             &$orderby=Name desc&$search=blue OR \"light red\"&$top=50",
        ),
    ];

    for (name, query) in queries {
        group.bench_with_input(BenchmarkId::from_parameter(name), &query, |b, q| {
            b.iter(|| parser.parse_query(black_box(q), &customer, true));
        });
    }

    group.finish();
}

// ============================================================================
// Lexer Benchmarks
// ============================================================================

fn bench_lexer_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_only");

    let values = vec![
        ("simple", "Orders($top=5)"),
        (
            "filter_heavy",
            "Total gt 100.5 and (contains(Name,'it''s') or Id eq @id) and not Active",
        ),
        ("search", "blue OR \"light red\" AND NOT green"),
    ];

    for (name, value) in values {
        group.bench_with_input(BenchmarkId::from_parameter(name), &value, |b, v| {
            b.iter(|| tokenize(black_box(v)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_expand,
    bench_deep_nesting,
    bench_query_strings,
    bench_lexer_only
);
criterion_main!(benches);
