//! In-memory entity data model and its fluent builder.

use super::Edm;
use super::types::{
    FullQualifiedName, NavigationPropertyMeta, PrimitiveKind, PropertyMeta, PropertyType,
    StructuredType, TypeKind,
};
use smol_str::SmolStr;
use std::collections::{BTreeMap, HashMap};

/// Declared members of one structured type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredTypeMeta {
    /// Qualified type name.
    pub name: FullQualifiedName,
    /// Entity or complex.
    pub kind: TypeKind,
    /// Direct base type, which must be of the same kind.
    pub base: Option<FullQualifiedName>,
    /// Declared structural properties (inherited ones are not repeated).
    pub properties: BTreeMap<SmolStr, PropertyMeta>,
    /// Declared navigation properties (inherited ones are not repeated).
    pub navigation: BTreeMap<SmolStr, NavigationPropertyMeta>,
}

impl StructuredTypeMeta {
    /// The handle parsers use for this type.
    pub fn handle(&self) -> StructuredType {
        match self.kind {
            TypeKind::Entity => StructuredType::Entity(self.name.clone()),
            TypeKind::Complex => StructuredType::Complex(self.name.clone()),
        }
    }
}

/// An entity data model held in memory.
///
/// Suitable for tests, tooling and services whose model is known at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEdm {
    types: HashMap<FullQualifiedName, StructuredTypeMeta>,
}

impl InMemoryEdm {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a model whose unqualified names live in `namespace`.
    pub fn builder(namespace: impl Into<SmolStr>) -> EdmBuilder {
        EdmBuilder::new(namespace)
    }

    /// Adds or replaces a type definition.
    pub fn add_type(&mut self, meta: StructuredTypeMeta) {
        self.types.insert(meta.name.clone(), meta);
    }

    /// Returns the definition of a type.
    pub fn type_meta(&self, name: &FullQualifiedName) -> Option<&StructuredTypeMeta> {
        self.types.get(name)
    }

    /// Iterates `ty` and its base types, most derived first.
    ///
    /// Stops on an unknown base or when a base repeats.
    fn lineage<'a>(&'a self, ty: &StructuredType) -> Vec<&'a StructuredTypeMeta> {
        let mut chain: Vec<&StructuredTypeMeta> = Vec::new();
        let mut next = self.lookup(ty.name(), ty.kind());
        while let Some(meta) = next {
            if chain.iter().any(|seen| seen.name == meta.name) {
                break;
            }
            chain.push(meta);
            next = meta
                .base
                .as_ref()
                .and_then(|base| self.lookup(base, meta.kind));
        }
        chain
    }

    fn lookup(&self, name: &FullQualifiedName, kind: TypeKind) -> Option<&StructuredTypeMeta> {
        self.types.get(name).filter(|meta| meta.kind == kind)
    }
}

impl Edm for InMemoryEdm {
    fn entity_type(&self, name: &FullQualifiedName) -> Option<StructuredType> {
        self.lookup(name, TypeKind::Entity)
            .map(StructuredTypeMeta::handle)
    }

    fn complex_type(&self, name: &FullQualifiedName) -> Option<StructuredType> {
        self.lookup(name, TypeKind::Complex)
            .map(StructuredTypeMeta::handle)
    }

    fn structural_property(&self, owner: &StructuredType, name: &str) -> Option<PropertyMeta> {
        self.lineage(owner)
            .into_iter()
            .find_map(|meta| meta.properties.get(name).cloned())
    }

    fn navigation_property(
        &self,
        owner: &StructuredType,
        name: &str,
    ) -> Option<NavigationPropertyMeta> {
        self.lineage(owner)
            .into_iter()
            .find_map(|meta| meta.navigation.get(name).cloned())
    }

    fn base_type(&self, ty: &StructuredType) -> Option<StructuredType> {
        let meta = self.lookup(ty.name(), ty.kind())?;
        let base = meta.base.as_ref()?;
        self.lookup(base, meta.kind).map(StructuredTypeMeta::handle)
    }
}

/// Builder for creating in-memory models with a fluent API.
///
/// # Example
///
/// ```
/// use odata_query_parser::edm::{Edm, InMemoryEdm, PrimitiveKind, FullQualifiedName};
///
/// let edm = InMemoryEdm::builder("Sales")
///     .complex_type("Address", |t| t.property("City", PrimitiveKind::String))
///     .entity_type("Customer", |t| {
///         t.property("Id", PrimitiveKind::Int32)
///             .complex_property("Address", "Address")
///             .collection_navigation("Orders", "Order")
///     })
///     .entity_type("Order", |t| t.property("Id", PrimitiveKind::Int32))
///     .build();
///
/// let customer = edm.entity_type(&FullQualifiedName::new("Sales", "Customer")).unwrap();
/// assert!(edm.navigation_property(&customer, "Orders").unwrap().collection);
/// ```
#[derive(Debug)]
pub struct EdmBuilder {
    namespace: SmolStr,
    edm: InMemoryEdm,
}

impl EdmBuilder {
    /// Creates a builder for `namespace`.
    pub fn new(namespace: impl Into<SmolStr>) -> Self {
        Self {
            namespace: namespace.into(),
            edm: InMemoryEdm::new(),
        }
    }

    /// Adds an entity type using a builder closure.
    pub fn entity_type<F>(self, name: &str, build: F) -> Self
    where
        F: FnOnce(StructuredTypeBuilder) -> StructuredTypeBuilder,
    {
        self.add(name, TypeKind::Entity, build)
    }

    /// Adds a complex type using a builder closure.
    pub fn complex_type<F>(self, name: &str, build: F) -> Self
    where
        F: FnOnce(StructuredTypeBuilder) -> StructuredTypeBuilder,
    {
        self.add(name, TypeKind::Complex, build)
    }

    fn add<F>(mut self, name: &str, kind: TypeKind, build: F) -> Self
    where
        F: FnOnce(StructuredTypeBuilder) -> StructuredTypeBuilder,
    {
        let builder = StructuredTypeBuilder::new(self.namespace.clone(), name, kind);
        self.edm.add_type(build(builder).build());
        self
    }

    /// Builds the model.
    pub fn build(self) -> InMemoryEdm {
        self.edm
    }
}

/// Builder for a single entity or complex type.
///
/// Type references accept either qualified names (`Sales.Order`) or names
/// relative to the builder's namespace (`Order`).
#[derive(Debug)]
pub struct StructuredTypeBuilder {
    namespace: SmolStr,
    meta: StructuredTypeMeta,
}

impl StructuredTypeBuilder {
    fn new(namespace: SmolStr, name: &str, kind: TypeKind) -> Self {
        Self {
            meta: StructuredTypeMeta {
                name: FullQualifiedName::new(namespace.clone(), name),
                kind,
                base: None,
                properties: BTreeMap::new(),
                navigation: BTreeMap::new(),
            },
            namespace,
        }
    }

    fn qualify(&self, name: &str) -> FullQualifiedName {
        FullQualifiedName::parse(name)
            .unwrap_or_else(|| FullQualifiedName::new(self.namespace.clone(), name))
    }

    /// Derives this type from `base`.
    pub fn base(mut self, base: &str) -> Self {
        self.meta.base = Some(self.qualify(base));
        self
    }

    /// Adds a primitive property.
    pub fn property(self, name: &str, kind: PrimitiveKind) -> Self {
        self.structural(name, PropertyType::Primitive(kind), false)
    }

    /// Adds a collection of primitives.
    pub fn collection_property(self, name: &str, kind: PrimitiveKind) -> Self {
        self.structural(name, PropertyType::Primitive(kind), true)
    }

    /// Adds a complex-typed property.
    pub fn complex_property(self, name: &str, complex_type: &str) -> Self {
        let ty = PropertyType::Complex(self.qualify(complex_type));
        self.structural(name, ty, false)
    }

    /// Adds a collection of complex values.
    pub fn complex_collection_property(self, name: &str, complex_type: &str) -> Self {
        let ty = PropertyType::Complex(self.qualify(complex_type));
        self.structural(name, ty, true)
    }

    fn structural(mut self, name: &str, ty: PropertyType, collection: bool) -> Self {
        self.meta.properties.insert(
            name.into(),
            PropertyMeta {
                name: name.into(),
                ty,
                collection,
            },
        );
        self
    }

    /// Adds a single-valued navigation property.
    pub fn navigation(self, name: &str, target: &str) -> Self {
        self.nav(name, target, false)
    }

    /// Adds a collection-valued navigation property.
    pub fn collection_navigation(self, name: &str, target: &str) -> Self {
        self.nav(name, target, true)
    }

    fn nav(mut self, name: &str, target: &str, collection: bool) -> Self {
        let target = self.qualify(target);
        self.meta.navigation.insert(
            name.into(),
            NavigationPropertyMeta {
                name: name.into(),
                target,
                collection,
            },
        );
        self
    }

    /// Builds the type definition.
    pub fn build(self) -> StructuredTypeMeta {
        self.meta
    }
}
