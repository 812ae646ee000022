//! The `$select` option.

use crate::edm::{NavigationPropertyMeta, PropertyMeta, StructuredType};
use std::fmt;

/// A property reached by a select path step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectProperty {
    Structural(PropertyMeta),
    Navigation(NavigationPropertyMeta),
}

/// One step of a select path, with its optional type cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectSegment {
    pub property: SelectProperty,
    pub type_filter: Option<StructuredType>,
}

impl fmt::Display for SelectSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            SelectProperty::Structural(property) => write!(f, "{}", property.name)?,
            SelectProperty::Navigation(navigation) => write!(f, "{}", navigation.name)?,
        }
        if let Some(cast) = &self.type_filter {
            write!(f, "/{cast}")?;
        }
        Ok(())
    }
}

/// One comma-separated entry of `$select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    Star,
    Path {
        type_filter: Option<StructuredType>,
        segments: Vec<SelectSegment>,
    },
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Star => write!(f, "*"),
            SelectItem::Path {
                type_filter,
                segments,
            } => {
                if let Some(cast) = type_filter {
                    write!(f, "{cast}/")?;
                }
                for (index, segment) in segments.iter().enumerate() {
                    if index > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{segment}")?;
                }
                Ok(())
            }
        }
    }
}

/// `$select`: the properties to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub items: Vec<SelectItem>,
}

impl fmt::Display for SelectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}
