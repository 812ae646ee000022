//! Common expression parsing and type checking for `$filter` and `$orderby`.
//!
//! Precedence from loosest to tightest: `or`, `and`, `not`, comparisons,
//! additive, multiplicative, primary. Comparisons do not chain. Every node is
//! typed with [`ExprType`] as it is built, so a mismatch is reported at the
//! operator or method that caused it.

use super::AliasTable;
use super::base::{TokenStream, merge_spans};
use crate::ast::{
    BinaryOperator, Expression, Literal, MemberPath, MemberSegment, MethodKind, Span,
    UnaryOperator,
};
use crate::config::ParserConfig;
use crate::edm::{Edm, PrimitiveKind, StructuredType};
use crate::error::{MessageKey, ParseResult, UriParserError};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::tokenize;
use smol_str::SmolStr;
use std::fmt;

/// Coarse expression types used for operator and method checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprType {
    Boolean,
    Numeric,
    String,
    Temporal,
    Guid,
    /// Complex values, entities and collections.
    Structured,
    /// `null` and parameter aliases without a literal value.
    Untyped,
}

impl ExprType {
    fn from_primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => ExprType::Boolean,
            PrimitiveKind::String => ExprType::String,
            PrimitiveKind::Guid => ExprType::Guid,
            k if k.is_temporal() => ExprType::Temporal,
            _ => ExprType::Numeric,
        }
    }

    /// Returns true if a value of this type may stand where `expected` is required.
    pub fn accepts(self, expected: ExprType) -> bool {
        self == expected || self == ExprType::Untyped
    }

    fn comparable_with(self, other: ExprType) -> bool {
        if self == ExprType::Untyped || other == ExprType::Untyped {
            return true;
        }
        self == other && self != ExprType::Structured
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprType::Boolean => write!(f, "Edm.Boolean"),
            ExprType::Numeric => write!(f, "a numeric type"),
            ExprType::String => write!(f, "Edm.String"),
            ExprType::Temporal => write!(f, "a date type"),
            ExprType::Guid => write!(f, "Edm.Guid"),
            ExprType::Structured => write!(f, "a structured type"),
            ExprType::Untyped => write!(f, "an untyped value"),
        }
    }
}

/// An expression with its checked type and source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedExpression {
    pub expression: Expression,
    pub ty: ExprType,
    pub span: Span,
}

/// Parses common expressions relative to one structured type.
pub struct ExpressionParser<'a> {
    edm: &'a dyn Edm,
    aliases: &'a AliasTable,
    referenced: &'a StructuredType,
    max_depth: usize,
}

impl<'a> ExpressionParser<'a> {
    pub fn new(edm: &'a dyn Edm, aliases: &'a AliasTable, referenced: &'a StructuredType) -> Self {
        Self {
            edm,
            aliases,
            referenced,
            max_depth: ParserConfig::default().max_expression_depth,
        }
    }

    /// Limits how deeply parentheses, `not` and method calls may nest.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses one expression, stopping at the first token that cannot continue it.
    pub fn parse(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        self.parse_or(stream)
    }

    fn parse_or(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        let mut left = self.parse_and(stream)?;
        while stream.try_consume_word(BinaryOperator::Or.keyword()) {
            let right = self.parse_and(stream)?;
            left = self.binary(BinaryOperator::Or, left, right)?;
        }
        Ok(left)
    }

    fn parse_and(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        let mut left = self.parse_not(stream)?;
        while stream.try_consume_word(BinaryOperator::And.keyword()) {
            let right = self.parse_not(stream)?;
            left = self.binary(BinaryOperator::And, left, right)?;
        }
        Ok(left)
    }

    fn parse_not(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        if !stream.check_word("not") {
            return self.parse_comparison(stream);
        }
        stream.nested(self.max_depth, |stream| {
            let start = stream.current_span();
            stream.advance();
            let operand = self.parse_not(stream)?;
            require_type("not", &operand, ExprType::Boolean)?;
            Ok(TypedExpression {
                span: merge_spans(&start, &operand.span),
                expression: Expression::Unary {
                    op: UnaryOperator::Not,
                    operand: Box::new(operand.expression),
                },
                ty: ExprType::Boolean,
            })
        })
    }

    fn parse_comparison(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        const COMPARISONS: [BinaryOperator; 6] = [
            BinaryOperator::Eq,
            BinaryOperator::Ne,
            BinaryOperator::Gt,
            BinaryOperator::Ge,
            BinaryOperator::Lt,
            BinaryOperator::Le,
        ];

        let left = self.parse_additive(stream)?;
        for op in COMPARISONS {
            if stream.try_consume_word(op.keyword()) {
                let right = self.parse_additive(stream)?;
                return self.binary(op, left, right);
            }
        }
        Ok(left)
    }

    fn parse_additive(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        let mut left = self.parse_multiplicative(stream)?;
        loop {
            let op = if stream.try_consume_word("add") {
                BinaryOperator::Add
            } else if stream.try_consume_word("sub") {
                BinaryOperator::Sub
            } else {
                return Ok(left);
            };
            let right = self.parse_multiplicative(stream)?;
            left = self.binary(op, left, right)?;
        }
    }

    fn parse_multiplicative(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        let mut left = self.parse_primary(stream)?;
        loop {
            let op = if stream.try_consume_word("mul") {
                BinaryOperator::Mul
            } else if stream.try_consume_word("div") {
                BinaryOperator::Div
            } else if stream.try_consume_word("mod") {
                BinaryOperator::Mod
            } else {
                return Ok(left);
            };
            let right = self.parse_primary(stream)?;
            left = self.binary(op, left, right)?;
        }
    }

    fn parse_primary(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        let token = stream.current().clone();
        match token.kind {
            TokenKind::Open => stream.nested(self.max_depth, |stream| {
                stream.advance();
                let inner = self.parse_or(stream)?;
                stream.require(TokenKind::Close)?;
                Ok(TypedExpression {
                    span: merge_spans(&token.span, &stream.previous_span()),
                    ..inner
                })
            }),
            TokenKind::Integer
            | TokenKind::Decimal
            | TokenKind::String
            | TokenKind::Date
            | TokenKind::DateTimeOffset
            | TokenKind::Guid => {
                stream.advance();
                let literal = parse_literal(&token)?;
                Ok(literal_expression(literal, literal_type(&token), token.span))
            }
            TokenKind::Alias => {
                stream.advance();
                let name = SmolStr::new(token.text.trim_start_matches('@'));
                let ty = self.alias_type(&name);
                Ok(TypedExpression {
                    expression: Expression::Alias(name),
                    ty,
                    span: token.span,
                })
            }
            TokenKind::Identifier if token.matches(TokenKind::Null) => {
                stream.advance();
                Ok(literal_expression(Literal::Null, ExprType::Untyped, token.span))
            }
            TokenKind::Identifier if token.matches(TokenKind::Boolean) => {
                stream.advance();
                let value = token.text.eq_ignore_ascii_case("true");
                Ok(literal_expression(
                    Literal::Boolean(value),
                    ExprType::Boolean,
                    token.span,
                ))
            }
            TokenKind::Identifier if stream.peek().kind == TokenKind::Open => {
                stream.nested(self.max_depth, |stream| self.parse_method(stream))
            }
            TokenKind::Identifier => self.parse_member(stream),
            _ => Err(stream.unexpected("expression")),
        }
    }

    fn parse_method(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        let name = stream.current().clone();
        let Some(method) = MethodKind::from_name(&name.text) else {
            return Err(UriParserError::new(
                MessageKey::UnknownMethod,
                format!("Unknown method '{}'.", name.text),
                name.span,
            )
            .with_param(name.text));
        };
        stream.advance();
        stream.require(TokenKind::Open)?;

        let mut args = Vec::new();
        if !stream.check(TokenKind::Close) {
            loop {
                args.push(self.parse_or(stream)?);
                if !stream.try_consume(TokenKind::Comma) {
                    break;
                }
            }
        }
        stream.require(TokenKind::Close)?;

        let span = merge_spans(&name.span, &stream.previous_span());
        let ty = check_method(method, &args, &span)?;
        Ok(TypedExpression {
            expression: Expression::Method {
                method,
                args: args.into_iter().map(|arg| arg.expression).collect(),
            },
            ty,
            span,
        })
    }

    /// Resolves `Prop`, `Complex/Prop` and `SingleNav/Prop` paths.
    fn parse_member(&self, stream: &mut TokenStream<'_>) -> ParseResult<TypedExpression> {
        let start = stream.current_span();
        let mut owner = self.referenced.clone();
        let mut segments = Vec::new();

        let ty = loop {
            let span = stream.expect(TokenKind::Identifier)?;
            let name = SmolStr::new(stream.current_lexeme());

            if let Some(property) = self.edm.structural_property(&owner, &name) {
                let complex = property.complex_type().filter(|_| !property.collection);
                let ty = match property.primitive() {
                    Some(kind) if !property.collection => ExprType::from_primitive(kind),
                    _ => ExprType::Structured,
                };
                segments.push(MemberSegment::Property(property));
                match complex {
                    Some(complex) if stream.try_consume(TokenKind::Slash) => owner = complex,
                    _ => break ty,
                }
            } else if let Some(navigation) = self.edm.navigation_property(&owner, &name) {
                if navigation.collection {
                    return Err(UriParserError::new(
                        MessageKey::NavigationNotAllowed,
                        format!(
                            "Collection-valued navigation property '{name}' cannot be used in an expression."
                        ),
                        span,
                    )
                    .with_param(name));
                }
                let target = navigation.target_type();
                segments.push(MemberSegment::Navigation(navigation));
                if stream.try_consume(TokenKind::Slash) {
                    owner = target;
                } else {
                    break ExprType::Structured;
                }
            } else {
                return Err(property_not_in_type(&name, &owner, span));
            }
        };

        Ok(TypedExpression {
            expression: Expression::Member(MemberPath { segments }),
            ty,
            span: merge_spans(&start, &stream.previous_span()),
        })
    }

    fn binary(
        &self,
        op: BinaryOperator,
        left: TypedExpression,
        right: TypedExpression,
    ) -> ParseResult<TypedExpression> {
        let span = merge_spans(&left.span, &right.span);
        let ty = match op {
            BinaryOperator::Or | BinaryOperator::And => {
                require_type(op.keyword(), &left, ExprType::Boolean)?;
                require_type(op.keyword(), &right, ExprType::Boolean)?;
                ExprType::Boolean
            }
            BinaryOperator::Eq | BinaryOperator::Ne => {
                check_comparable(op, &left, &right, &span)?;
                ExprType::Boolean
            }
            BinaryOperator::Gt | BinaryOperator::Ge | BinaryOperator::Lt | BinaryOperator::Le => {
                check_comparable(op, &left, &right, &span)?;
                for operand in [&left, &right] {
                    if operand.ty == ExprType::Structured {
                        return Err(mismatch(op.keyword(), operand, "a primitive type"));
                    }
                }
                ExprType::Boolean
            }
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Mod => {
                require_type(op.keyword(), &left, ExprType::Numeric)?;
                require_type(op.keyword(), &right, ExprType::Numeric)?;
                ExprType::Numeric
            }
        };
        Ok(TypedExpression {
            expression: Expression::Binary {
                op,
                left: Box::new(left.expression),
                right: Box::new(right.expression),
            },
            ty,
            span,
        })
    }

    /// An alias whose value is a single literal takes that literal's type.
    fn alias_type(&self, name: &str) -> ExprType {
        let Some(value) = self.aliases.get(name) else {
            return ExprType::Untyped;
        };
        let lexed = tokenize(value);
        if !lexed.errors.is_empty() {
            return ExprType::Untyped;
        }
        match lexed.tokens.as_slice() {
            [token, eof] if eof.kind == TokenKind::Eof => literal_type(token),
            _ => ExprType::Untyped,
        }
    }
}

fn literal_expression(literal: Literal, ty: ExprType, span: Span) -> TypedExpression {
    TypedExpression {
        expression: Expression::Literal(literal),
        ty,
        span,
    }
}

fn literal_type(token: &Token) -> ExprType {
    match token.kind {
        TokenKind::Integer | TokenKind::Decimal => ExprType::Numeric,
        TokenKind::String => ExprType::String,
        TokenKind::Date | TokenKind::DateTimeOffset => ExprType::Temporal,
        TokenKind::Guid => ExprType::Guid,
        _ if token.matches(TokenKind::Boolean) => ExprType::Boolean,
        _ => ExprType::Untyped,
    }
}

fn parse_literal(token: &Token) -> ParseResult<Literal> {
    match token.kind {
        TokenKind::Integer => token.text.parse::<i64>().map(Literal::Integer).map_err(|_| {
            UriParserError::new(
                MessageKey::Syntax,
                format!("Integer literal {} is out of range.", token.text),
                token.span.clone(),
            )
        }),
        TokenKind::Decimal => Ok(Literal::Decimal(token.text.clone())),
        TokenKind::Date => Ok(Literal::Date(token.text.clone())),
        TokenKind::DateTimeOffset => Ok(Literal::DateTimeOffset(token.text.clone())),
        TokenKind::Guid => Ok(Literal::Guid(token.text.clone())),
        _ => Ok(Literal::String(unescape_string(&token.text))),
    }
}

/// Strips the quotes of a string literal and collapses `''` to `'`.
pub(crate) fn unescape_string(text: &str) -> SmolStr {
    let inner = text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(text);
    SmolStr::new(inner.replace("''", "'"))
}

fn require_type(op: &str, operand: &TypedExpression, expected: ExprType) -> ParseResult<()> {
    if operand.ty.accepts(expected) {
        Ok(())
    } else {
        Err(mismatch(op, operand, expected))
    }
}

fn check_comparable(
    op: BinaryOperator,
    left: &TypedExpression,
    right: &TypedExpression,
    span: &Span,
) -> ParseResult<()> {
    if left.ty.comparable_with(right.ty) {
        return Ok(());
    }
    Err(UriParserError::new(
        MessageKey::TypeMismatch,
        format!(
            "Operands of '{}' are not comparable: {} and {}.",
            op.keyword(),
            left.ty,
            right.ty
        ),
        span.clone(),
    )
    .with_param(op.keyword()))
}

fn mismatch(op: &str, operand: &TypedExpression, expected: impl fmt::Display) -> UriParserError {
    UriParserError::new(
        MessageKey::TypeMismatch,
        format!(
            "Operand '{}' of '{op}' must be of {expected}, found {}.",
            operand.expression, operand.ty
        ),
        operand.span.clone(),
    )
    .with_param(op)
}

fn property_not_in_type(name: &str, owner: &StructuredType, span: Span) -> UriParserError {
    UriParserError::new(
        MessageKey::PropertyNotInType,
        format!("Property '{name}' not found in type '{owner}'."),
        span,
    )
    .with_param(owner.to_string())
    .with_param(name)
}

/// Parameter types, required argument count and result type of a method.
fn signature(method: MethodKind) -> (&'static [ExprType], usize, ExprType) {
    use ExprType::{Boolean, Numeric, String, Temporal};
    const TEXT: &[ExprType] = &[String];
    const TEXT_PAIR: &[ExprType] = &[String, String];
    const SUBSTRING: &[ExprType] = &[String, Numeric, Numeric];
    const NUMBER: &[ExprType] = &[Numeric];
    const DATE: &[ExprType] = &[Temporal];

    match method {
        MethodKind::Contains | MethodKind::StartsWith | MethodKind::EndsWith => {
            (TEXT_PAIR, 2, Boolean)
        }
        MethodKind::Length => (TEXT, 1, Numeric),
        MethodKind::IndexOf => (TEXT_PAIR, 2, Numeric),
        MethodKind::Substring => (SUBSTRING, 2, String),
        MethodKind::ToLower | MethodKind::ToUpper | MethodKind::Trim => (TEXT, 1, String),
        MethodKind::Concat => (TEXT_PAIR, 2, String),
        MethodKind::Round | MethodKind::Floor | MethodKind::Ceiling => (NUMBER, 1, Numeric),
        MethodKind::Year | MethodKind::Month | MethodKind::Day => (DATE, 1, Numeric),
    }
}

fn check_method(method: MethodKind, args: &[TypedExpression], span: &Span) -> ParseResult<ExprType> {
    let (params, required, result) = signature(method);
    if args.len() < required || args.len() > params.len() {
        let expected = if required == params.len() {
            required.to_string()
        } else {
            format!("{required} to {}", params.len())
        };
        return Err(UriParserError::new(
            MessageKey::TypeMismatch,
            format!(
                "Method '{}' expects {expected} arguments, found {}.",
                method.name(),
                args.len()
            ),
            span.clone(),
        )
        .with_param(method.name()));
    }
    for (arg, expected) in args.iter().zip(params) {
        require_type(method.name(), arg, *expected)?;
    }
    Ok(result)
}
