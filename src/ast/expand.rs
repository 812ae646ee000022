//! The `$expand` query plan.

use super::options::{LevelsOption, OptionSet};
use super::path::ResourcePathSegment;
use crate::edm::StructuredType;
use std::fmt;

/// A parsed `$expand` option: items in the order the client wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandOption {
    pub items: Vec<ExpandItem>,
}

impl ExpandOption {
    /// Creates an expand option from its items.
    pub fn new(items: Vec<ExpandItem>) -> Self {
        Self { items }
    }

    /// Iterates the items.
    pub fn iter(&self) -> impl Iterator<Item = &ExpandItem> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items. Never the case for parsed options.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for ExpandOption {
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

/// One comma-separated entry of `$expand`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandItem {
    /// `*`, `*/$ref` or `*($levels=...)`.
    Star(StarExpandItem),
    /// A resolved path with its nested options.
    Path(PathExpandItem),
}

impl ExpandItem {
    /// Returns the star item, if this is one.
    pub fn as_star(&self) -> Option<&StarExpandItem> {
        match self {
            ExpandItem::Star(star) => Some(star),
            ExpandItem::Path(_) => None,
        }
    }

    /// Returns the path item, if this is one.
    pub fn as_path(&self) -> Option<&PathExpandItem> {
        match self {
            ExpandItem::Path(path) => Some(path),
            ExpandItem::Star(_) => None,
        }
    }
}

impl fmt::Display for ExpandItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandItem::Star(star) => write!(f, "{star}"),
            ExpandItem::Path(path) => write!(f, "{path}"),
        }
    }
}

/// The wildcard item. At most one of `is_ref` and `levels` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarExpandItem {
    pub is_ref: bool,
    pub levels: Option<LevelsOption>,
}

impl fmt::Display for StarExpandItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*")?;
        if self.is_ref {
            write!(f, "/$ref")?;
        } else if let Some(levels) = self.levels {
            write!(f, "($levels={levels})")?;
        }
        Ok(())
    }
}

/// A path item such as `Orders/$ref` or `Address/Sales.GeoAddress/Region`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpandItem {
    /// Leading type cast applied before the path.
    pub type_filter: Option<StructuredType>,
    /// Resolved segments, ending in a navigation property or (with `is_star`)
    /// a complex property, optionally followed by `$ref` or `$count`.
    pub path: Vec<ResourcePathSegment>,
    /// Set when the path ends in the `*` wildcard, e.g. `Address/*`.
    pub is_star: bool,
    /// Options from the parenthesized list.
    pub options: OptionSet,
}

impl PathExpandItem {
    /// The last navigation or complex segment, skipping `$ref`/`$count`.
    pub fn last_property(&self) -> Option<&ResourcePathSegment> {
        self.path.iter().rev().find(|segment| !segment.is_suffix())
    }

    /// Returns true if the path ends in `/$ref`.
    pub fn is_ref(&self) -> bool {
        matches!(self.path.last(), Some(ResourcePathSegment::Ref))
    }

    /// Returns true if the path ends in `/$count`.
    pub fn is_count(&self) -> bool {
        matches!(self.path.last(), Some(ResourcePathSegment::Count))
    }
}

impl fmt::Display for PathExpandItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(cast) = &self.type_filter {
            parts.push(cast.to_string());
        }
        parts.extend(
            self.path
                .iter()
                .filter(|segment| !segment.is_suffix())
                .map(ToString::to_string),
        );
        if self.is_star {
            parts.push("*".to_string());
        }
        parts.extend(
            self.path
                .iter()
                .filter(|segment| segment.is_suffix())
                .map(ToString::to_string),
        );
        write!(f, "{}", parts.join("/"))?;
        if !self.options.is_empty() {
            write!(f, "({})", self.options)?;
        }
        Ok(())
    }
}
