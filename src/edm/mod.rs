//! Entity data model access for schema-aware parsing.
//!
//! Parsers never see how a model is stored. They ask the [`Edm`] trait for
//! properties and type relationships of the type they are currently resolving
//! against, which lets a server back the model with generated code, a CSDL
//! document or the [`InMemoryEdm`] used in tests.

mod in_memory;
mod types;

pub use in_memory::{EdmBuilder, InMemoryEdm, StructuredTypeBuilder, StructuredTypeMeta};
pub use types::{
    FullQualifiedName, NavigationPropertyMeta, PrimitiveKind, PropertyMeta, PropertyType,
    StructuredType, TypeKind,
};

/// Schema queries the query option parsers depend on.
///
/// Property lookups are expected to include inherited members.
///
/// # Example
///
/// ```ignore
/// struct CsdlModel { document: csdl::Document }
///
/// impl Edm for CsdlModel {
///     fn entity_type(&self, name: &FullQualifiedName) -> Option<StructuredType> {
///         self.document.entity_type(name).map(|_| StructuredType::Entity(name.clone()))
///     }
///     // ... remaining lookups
/// }
/// ```
pub trait Edm: Send + Sync {
    /// Looks up an entity type by qualified name.
    fn entity_type(&self, name: &FullQualifiedName) -> Option<StructuredType>;

    /// Looks up a complex type by qualified name.
    fn complex_type(&self, name: &FullQualifiedName) -> Option<StructuredType>;

    /// Resolves a structural property of `owner`, including inherited ones.
    fn structural_property(&self, owner: &StructuredType, name: &str) -> Option<PropertyMeta>;

    /// Resolves a navigation property of `owner`, including inherited ones.
    fn navigation_property(
        &self,
        owner: &StructuredType,
        name: &str,
    ) -> Option<NavigationPropertyMeta>;

    /// Returns the direct base type of `ty`, if it derives from one.
    fn base_type(&self, ty: &StructuredType) -> Option<StructuredType>;

    /// Returns true if `candidate` equals `expected` or derives from it.
    ///
    /// # Default Implementation
    ///
    /// Walks [`Edm::base_type`] upwards from `candidate`, stopping on a cycle.
    fn is_compatible(&self, candidate: &StructuredType, expected: &StructuredType) -> bool {
        let mut current = Some(candidate.clone());
        let mut visited = Vec::new();
        while let Some(ty) = current {
            if &ty == expected {
                return true;
            }
            if visited.contains(&ty) {
                return false;
            }
            current = self.base_type(&ty);
            visited.push(ty);
        }
        false
    }

    /// Looks up `name` in the same kind of type as `expected`.
    ///
    /// This is the lookup behind every type cast: entity positions cast to
    /// entity types, complex positions to complex types.
    fn same_kind_type(
        &self,
        expected: &StructuredType,
        name: &FullQualifiedName,
    ) -> Option<StructuredType> {
        match expected.kind() {
            TypeKind::Entity => self.entity_type(name),
            TypeKind::Complex => self.complex_type(name),
        }
    }
}
