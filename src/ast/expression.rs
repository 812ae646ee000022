//! Common expressions used by `$filter` and `$orderby`.

use crate::edm::{NavigationPropertyMeta, PropertyMeta};
use smol_str::SmolStr;
use std::fmt;

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    /// Kept as written so re-serialization is exact.
    Decimal(SmolStr),
    /// The unescaped string content.
    String(SmolStr),
    /// `2024-03-01`, kept as written.
    Date(SmolStr),
    /// `2024-03-01T09:30:00Z`, kept as written.
    DateTimeOffset(SmolStr),
    Guid(SmolStr),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(value) => write!(f, "{value}"),
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Decimal(text)
            | Literal::Date(text)
            | Literal::DateTimeOffset(text)
            | Literal::Guid(text) => write!(f, "{text}"),
            Literal::String(text) => write!(f, "'{}'", text.replace('\'', "''")),
        }
    }
}

/// One step of a member path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberSegment {
    Property(PropertyMeta),
    Navigation(NavigationPropertyMeta),
}

impl MemberSegment {
    /// The property name.
    pub fn name(&self) -> &str {
        match self {
            MemberSegment::Property(property) => &property.name,
            MemberSegment::Navigation(navigation) => &navigation.name,
        }
    }
}

/// A property path such as `Address/City` or `Customer/Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPath {
    pub segments: Vec<MemberSegment>,
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", segment.name())?;
        }
        Ok(())
    }
}

/// Binary operators, listed from loosest to tightest binding group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOperator {
    /// The URL keyword of the operator.
    pub fn keyword(self) -> &'static str {
        match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Eq => "eq",
            BinaryOperator::Ne => "ne",
            BinaryOperator::Gt => "gt",
            BinaryOperator::Ge => "ge",
            BinaryOperator::Lt => "lt",
            BinaryOperator::Le => "le",
            BinaryOperator::Add => "add",
            BinaryOperator::Sub => "sub",
            BinaryOperator::Mul => "mul",
            BinaryOperator::Div => "div",
            BinaryOperator::Mod => "mod",
        }
    }

    /// Returns true for `eq`, `ne`, `gt`, `ge`, `lt` and `le`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::Ne
                | BinaryOperator::Gt
                | BinaryOperator::Ge
                | BinaryOperator::Lt
                | BinaryOperator::Le
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
}

/// Built-in methods callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Contains,
    StartsWith,
    EndsWith,
    Length,
    IndexOf,
    Substring,
    ToLower,
    ToUpper,
    Trim,
    Concat,
    Round,
    Floor,
    Ceiling,
    Year,
    Month,
    Day,
}

impl MethodKind {
    /// Resolves a method by its URL name.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "contains" => MethodKind::Contains,
            "startswith" => MethodKind::StartsWith,
            "endswith" => MethodKind::EndsWith,
            "length" => MethodKind::Length,
            "indexof" => MethodKind::IndexOf,
            "substring" => MethodKind::Substring,
            "tolower" => MethodKind::ToLower,
            "toupper" => MethodKind::ToUpper,
            "trim" => MethodKind::Trim,
            "concat" => MethodKind::Concat,
            "round" => MethodKind::Round,
            "floor" => MethodKind::Floor,
            "ceiling" => MethodKind::Ceiling,
            "year" => MethodKind::Year,
            "month" => MethodKind::Month,
            "day" => MethodKind::Day,
            _ => return None,
        };
        Some(kind)
    }

    /// The URL name of the method.
    pub fn name(self) -> &'static str {
        match self {
            MethodKind::Contains => "contains",
            MethodKind::StartsWith => "startswith",
            MethodKind::EndsWith => "endswith",
            MethodKind::Length => "length",
            MethodKind::IndexOf => "indexof",
            MethodKind::Substring => "substring",
            MethodKind::ToLower => "tolower",
            MethodKind::ToUpper => "toupper",
            MethodKind::Trim => "trim",
            MethodKind::Concat => "concat",
            MethodKind::Round => "round",
            MethodKind::Floor => "floor",
            MethodKind::Ceiling => "ceiling",
            MethodKind::Year => "year",
            MethodKind::Month => "month",
            MethodKind::Day => "day",
        }
    }
}

/// A validated common expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal(Literal),
    Member(MemberPath),
    /// A parameter alias reference such as `@p1`, stored without the `@`.
    Alias(SmolStr),
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Method {
        method: MethodKind,
        args: Vec<Expression>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Member(path) => write!(f, "{path}"),
            Expression::Alias(name) => write!(f, "@{name}"),
            Expression::Unary {
                op: UnaryOperator::Not,
                operand,
            } => write!(f, "(not {operand})"),
            Expression::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.keyword())
            }
            Expression::Method { method, args } => {
                write!(f, "{}(", method.name())?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// `$filter`: a boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub expression: Expression,
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

/// One sort key of `$orderby`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByItem {
    pub expression: Expression,
    pub descending: bool,
}

/// `$orderby`: sort keys in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByOption {
    pub items: Vec<OrderByItem>,
}

impl fmt::Display for OrderByOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", item.expression)?;
            if item.descending {
                write!(f, " desc")?;
            }
        }
        Ok(())
    }
}
