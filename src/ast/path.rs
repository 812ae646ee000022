//! Resource path segments produced by `$expand` path resolution.

use crate::edm::{NavigationPropertyMeta, PropertyMeta, StructuredType};
use std::fmt;

/// One segment of an expand path.
///
/// The last structural segment of a path decides the type and cardinality
/// nested options are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePathSegment {
    /// A complex-typed structural property, optionally narrowed by a cast.
    ComplexProperty {
        property: PropertyMeta,
        type_filter: Option<StructuredType>,
    },
    /// A navigation property. A suffix cast lands in `entry_type_filter` for
    /// single-valued and in `collection_type_filter` for collection-valued
    /// navigation.
    NavigationProperty {
        property: NavigationPropertyMeta,
        entry_type_filter: Option<StructuredType>,
        collection_type_filter: Option<StructuredType>,
    },
    /// `/$ref`
    Ref,
    /// `/$count`
    Count,
}

impl ResourcePathSegment {
    /// Creates a navigation segment without type filters.
    pub fn navigation(property: NavigationPropertyMeta) -> Self {
        ResourcePathSegment::NavigationProperty {
            property,
            entry_type_filter: None,
            collection_type_filter: None,
        }
    }

    /// The type this segment addresses: its cast if one was given, else the declared type.
    ///
    /// `Ref` and `Count` address no structured type.
    pub fn referenced_type(&self) -> Option<StructuredType> {
        match self {
            ResourcePathSegment::ComplexProperty {
                property,
                type_filter,
            } => type_filter.clone().or_else(|| property.complex_type()),
            ResourcePathSegment::NavigationProperty {
                property,
                entry_type_filter,
                collection_type_filter,
            } => Some(
                entry_type_filter
                    .as_ref()
                    .or(collection_type_filter.as_ref())
                    .cloned()
                    .unwrap_or_else(|| property.target_type()),
            ),
            ResourcePathSegment::Ref | ResourcePathSegment::Count => None,
        }
    }

    /// Whether the segment addresses a collection.
    pub fn is_collection(&self) -> bool {
        match self {
            ResourcePathSegment::ComplexProperty { property, .. } => property.collection,
            ResourcePathSegment::NavigationProperty { property, .. } => property.collection,
            ResourcePathSegment::Ref | ResourcePathSegment::Count => false,
        }
    }

    /// Returns true for the `$ref` and `$count` suffix segments.
    pub fn is_suffix(&self) -> bool {
        matches!(self, ResourcePathSegment::Ref | ResourcePathSegment::Count)
    }
}

impl fmt::Display for ResourcePathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourcePathSegment::ComplexProperty {
                property,
                type_filter,
            } => {
                write!(f, "{}", property.name)?;
                if let Some(cast) = type_filter {
                    write!(f, "/{cast}")?;
                }
                Ok(())
            }
            ResourcePathSegment::NavigationProperty {
                property,
                entry_type_filter,
                collection_type_filter,
            } => {
                write!(f, "{}", property.name)?;
                if let Some(cast) = entry_type_filter.as_ref().or(collection_type_filter.as_ref()) {
                    write!(f, "/{cast}")?;
                }
                Ok(())
            }
            ResourcePathSegment::Ref => write!(f, "$ref"),
            ResourcePathSegment::Count => write!(f, "$count"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::{FullQualifiedName, PropertyType};

    fn orders() -> NavigationPropertyMeta {
        NavigationPropertyMeta {
            name: "Orders".into(),
            target: FullQualifiedName::new("Sales", "Order"),
            collection: true,
        }
    }

    #[test]
    fn navigation_type_prefers_filter() {
        let special = StructuredType::Entity(FullQualifiedName::new("Sales", "SpecialOrder"));
        let plain = ResourcePathSegment::navigation(orders());
        assert_eq!(
            plain.referenced_type(),
            Some(StructuredType::Entity(FullQualifiedName::new("Sales", "Order")))
        );
        assert!(plain.is_collection());

        let cast = ResourcePathSegment::NavigationProperty {
            property: orders(),
            entry_type_filter: None,
            collection_type_filter: Some(special.clone()),
        };
        assert_eq!(cast.referenced_type(), Some(special));
        assert_eq!(cast.to_string(), "Orders/Sales.SpecialOrder");
    }

    #[test]
    fn complex_segment_display() {
        let segment = ResourcePathSegment::ComplexProperty {
            property: PropertyMeta {
                name: "Address".into(),
                ty: PropertyType::Complex(FullQualifiedName::new("Sales", "Address")),
                collection: false,
            },
            type_filter: None,
        };
        assert_eq!(segment.to_string(), "Address");
        assert!(!segment.is_suffix());
        assert!(ResourcePathSegment::Ref.is_suffix());
        assert_eq!(ResourcePathSegment::Count.to_string(), "$count");
    }
}
