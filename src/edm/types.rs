//! Type handles and property metadata exposed by an entity data model.

use smol_str::SmolStr;
use std::fmt;

/// A namespace-qualified type name such as `Sales.Order`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullQualifiedName {
    /// The namespace, e.g. `Sales` or `Com.Example.Sales`.
    pub namespace: SmolStr,
    /// The unqualified type name.
    pub name: SmolStr,
}

impl FullQualifiedName {
    /// Creates a name from its namespace and local part.
    pub fn new(namespace: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parses `Namespace.Name`, splitting at the last dot.
    ///
    /// Returns `None` when there is no dot or either side is empty.
    pub fn parse(text: &str) -> Option<Self> {
        let (namespace, name) = text.rsplit_once('.')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, name))
    }
}

impl fmt::Display for FullQualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Whether a structured type is an entity type or a complex type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Entity,
    Complex,
}

/// Handle to a structured type of the model.
///
/// The variant decides which lookup a type cast uses: a cast on an
/// entity-typed position must name an entity type, a cast on a complex-typed
/// position a complex type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructuredType {
    Entity(FullQualifiedName),
    Complex(FullQualifiedName),
}

impl StructuredType {
    /// The qualified name of the type.
    pub fn name(&self) -> &FullQualifiedName {
        match self {
            StructuredType::Entity(name) | StructuredType::Complex(name) => name,
        }
    }

    /// The kind of the type.
    pub fn kind(&self) -> TypeKind {
        match self {
            StructuredType::Entity(_) => TypeKind::Entity,
            StructuredType::Complex(_) => TypeKind::Complex,
        }
    }

    /// Returns true for entity types.
    pub fn is_entity(&self) -> bool {
        matches!(self, StructuredType::Entity(_))
    }
}

impl fmt::Display for StructuredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Primitive types understood by the expression type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Decimal,
    Double,
    String,
    Guid,
    Date,
    DateTimeOffset,
}

impl PrimitiveKind {
    /// Returns true for the integral and floating point kinds.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
                | PrimitiveKind::Decimal
                | PrimitiveKind::Double
        )
    }

    /// Returns true for kinds that carry a calendar date.
    pub fn is_temporal(self) -> bool {
        matches!(self, PrimitiveKind::Date | PrimitiveKind::DateTimeOffset)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::Decimal => "Decimal",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::String => "String",
            PrimitiveKind::Guid => "Guid",
            PrimitiveKind::Date => "Date",
            PrimitiveKind::DateTimeOffset => "DateTimeOffset",
        };
        write!(f, "Edm.{name}")
    }
}

/// The declared type of a structural property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Primitive(PrimitiveKind),
    Complex(FullQualifiedName),
}

/// A structural (non-navigation) property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyMeta {
    /// The property name.
    pub name: SmolStr,
    /// The declared type.
    pub ty: PropertyType,
    /// Whether the property is collection-valued.
    pub collection: bool,
}

impl PropertyMeta {
    /// Returns the complex type of this property, if it is complex-typed.
    pub fn complex_type(&self) -> Option<StructuredType> {
        match &self.ty {
            PropertyType::Complex(name) => Some(StructuredType::Complex(name.clone())),
            PropertyType::Primitive(_) => None,
        }
    }

    /// Returns the primitive kind of this property, if it is primitive-typed.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match &self.ty {
            PropertyType::Primitive(kind) => Some(*kind),
            PropertyType::Complex(_) => None,
        }
    }
}

/// A navigation property: a typed relationship to an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationPropertyMeta {
    /// The property name.
    pub name: SmolStr,
    /// The target entity type.
    pub target: FullQualifiedName,
    /// Whether the navigation is collection-valued.
    pub collection: bool,
}

impl NavigationPropertyMeta {
    /// The target entity type as a structured type handle.
    pub fn target_type(&self) -> StructuredType {
        StructuredType::Entity(self.target.clone())
    }
}
