//! System query options and the per-item option set.

use super::expand::ExpandOption;
use super::expression::{FilterOption, OrderByOption};
use super::search::SearchOption;
use super::select::SelectOption;
use std::collections::BTreeMap;
use std::fmt;

/// The system query options that may appear inside an expand item's parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemQueryOptionKind {
    Count,
    Expand,
    Filter,
    Levels,
    OrderBy,
    Search,
    Select,
    Skip,
    Top,
}

impl SystemQueryOptionKind {
    /// The `$`-prefixed option name.
    pub fn name(self) -> &'static str {
        match self {
            SystemQueryOptionKind::Count => "$count",
            SystemQueryOptionKind::Expand => "$expand",
            SystemQueryOptionKind::Filter => "$filter",
            SystemQueryOptionKind::Levels => "$levels",
            SystemQueryOptionKind::OrderBy => "$orderby",
            SystemQueryOptionKind::Search => "$search",
            SystemQueryOptionKind::Select => "$select",
            SystemQueryOptionKind::Skip => "$skip",
            SystemQueryOptionKind::Top => "$top",
        }
    }
}

impl fmt::Display for SystemQueryOptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `$levels`: bounded or unbounded recursive expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelsOption {
    /// `max`: as deep as the server allows.
    Max,
    /// An explicit positive depth.
    Depth(u32),
}

impl fmt::Display for LevelsOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelsOption::Max => write!(f, "max"),
            LevelsOption::Depth(depth) => write!(f, "{depth}"),
        }
    }
}

/// A parsed system query option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemQueryOption {
    Count(bool),
    Expand(ExpandOption),
    Filter(FilterOption),
    Levels(LevelsOption),
    OrderBy(OrderByOption),
    Search(SearchOption),
    Select(SelectOption),
    Skip(u32),
    Top(u32),
}

impl SystemQueryOption {
    /// The kind of this option.
    pub fn kind(&self) -> SystemQueryOptionKind {
        match self {
            SystemQueryOption::Count(_) => SystemQueryOptionKind::Count,
            SystemQueryOption::Expand(_) => SystemQueryOptionKind::Expand,
            SystemQueryOption::Filter(_) => SystemQueryOptionKind::Filter,
            SystemQueryOption::Levels(_) => SystemQueryOptionKind::Levels,
            SystemQueryOption::OrderBy(_) => SystemQueryOptionKind::OrderBy,
            SystemQueryOption::Search(_) => SystemQueryOptionKind::Search,
            SystemQueryOption::Select(_) => SystemQueryOptionKind::Select,
            SystemQueryOption::Skip(_) => SystemQueryOptionKind::Skip,
            SystemQueryOption::Top(_) => SystemQueryOptionKind::Top,
        }
    }
}

impl fmt::Display for SystemQueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.kind())?;
        match self {
            SystemQueryOption::Count(value) => write!(f, "{value}"),
            SystemQueryOption::Expand(expand) => write!(f, "{expand}"),
            SystemQueryOption::Filter(filter) => write!(f, "{filter}"),
            SystemQueryOption::Levels(levels) => write!(f, "{levels}"),
            SystemQueryOption::OrderBy(orderby) => write!(f, "{orderby}"),
            SystemQueryOption::Search(search) => write!(f, "{search}"),
            SystemQueryOption::Select(select) => write!(f, "{select}"),
            SystemQueryOption::Skip(value) | SystemQueryOption::Top(value) => write!(f, "{value}"),
        }
    }
}

/// At most one option per kind.
///
/// [`OptionSet::try_insert`] is the only way in, so a duplicate can never be
/// stored; the caller turns the rejection into a diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    options: BTreeMap<SystemQueryOptionKind, SystemQueryOption>,
}

impl OptionSet {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `option`, handing it back if its kind is already present.
    pub fn try_insert(&mut self, option: SystemQueryOption) -> Result<(), SystemQueryOption> {
        let kind = option.kind();
        if self.options.contains_key(&kind) {
            return Err(option);
        }
        self.options.insert(kind, option);
        Ok(())
    }

    /// Returns the option of the given kind.
    pub fn get(&self, kind: SystemQueryOptionKind) -> Option<&SystemQueryOption> {
        self.options.get(&kind)
    }

    /// Returns true if an option of the given kind is present.
    pub fn contains(&self, kind: SystemQueryOptionKind) -> bool {
        self.options.contains_key(&kind)
    }

    /// Number of options present.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if no option is present.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Iterates the options in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &SystemQueryOption> {
        self.options.values()
    }

    pub fn count(&self) -> Option<bool> {
        match self.get(SystemQueryOptionKind::Count) {
            Some(SystemQueryOption::Count(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn expand(&self) -> Option<&ExpandOption> {
        match self.get(SystemQueryOptionKind::Expand) {
            Some(SystemQueryOption::Expand(expand)) => Some(expand),
            _ => None,
        }
    }

    pub fn filter(&self) -> Option<&FilterOption> {
        match self.get(SystemQueryOptionKind::Filter) {
            Some(SystemQueryOption::Filter(filter)) => Some(filter),
            _ => None,
        }
    }

    pub fn levels(&self) -> Option<LevelsOption> {
        match self.get(SystemQueryOptionKind::Levels) {
            Some(SystemQueryOption::Levels(levels)) => Some(*levels),
            _ => None,
        }
    }

    pub fn orderby(&self) -> Option<&OrderByOption> {
        match self.get(SystemQueryOptionKind::OrderBy) {
            Some(SystemQueryOption::OrderBy(orderby)) => Some(orderby),
            _ => None,
        }
    }

    pub fn search(&self) -> Option<&SearchOption> {
        match self.get(SystemQueryOptionKind::Search) {
            Some(SystemQueryOption::Search(search)) => Some(search),
            _ => None,
        }
    }

    pub fn select(&self) -> Option<&SelectOption> {
        match self.get(SystemQueryOptionKind::Select) {
            Some(SystemQueryOption::Select(select)) => Some(select),
            _ => None,
        }
    }

    pub fn skip(&self) -> Option<u32> {
        match self.get(SystemQueryOptionKind::Skip) {
            Some(SystemQueryOption::Skip(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn top(&self) -> Option<u32> {
        match self.get(SystemQueryOptionKind::Top) {
            Some(SystemQueryOption::Top(value)) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, option) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ";")?;
            }
            write!(f, "{option}")?;
        }
        Ok(())
    }
}
