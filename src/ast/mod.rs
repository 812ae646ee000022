//! Query plan node types.
//!
//! Every node is immutable once a parser returns it and owned by its parent;
//! `Display` renders the canonical query text that parses back to an equal
//! tree.

mod expand;
mod expression;
mod options;
mod path;
mod search;
mod select;
mod span;

pub use span::Span;

pub use expand::{ExpandItem, ExpandOption, PathExpandItem, StarExpandItem};
pub use expression::{
    BinaryOperator, Expression, FilterOption, Literal, MemberPath, MemberSegment, MethodKind,
    OrderByItem, OrderByOption, UnaryOperator,
};
pub use options::{LevelsOption, OptionSet, SystemQueryOption, SystemQueryOptionKind};
pub use path::ResourcePathSegment;
pub use search::{SearchExpression, SearchOption};
pub use select::{SelectItem, SelectOption, SelectProperty, SelectSegment};
