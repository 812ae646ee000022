//! `$expand`
//!
//! An expand option is a comma-separated list of items. Each item is either
//! the `*` wildcard or a path resolved against the current type: an optional
//! leading type cast, complex properties (each optionally cast), and a final
//! navigation property or `*`. A path may end in `/$ref` or `/$count`, and may
//! carry a parenthesized list of options that are parsed against the type the
//! path arrives at. A nested `$expand` re-enters [`ExpandParser`] on the same
//! token stream.

use super::AliasTable;
use super::base::{TokenStream, parse_boolean_value, parse_integer_value};
use super::filter::FilterParser;
use super::orderby::OrderByParser;
use super::search::SearchParser;
use super::select::SelectParser;
use super::type_cast::parse_type_cast;
use crate::ast::{
    ExpandItem, ExpandOption, LevelsOption, OptionSet, PathExpandItem, ResourcePathSegment, Span,
    StarExpandItem, SystemQueryOption, SystemQueryOptionKind,
};
use crate::config::ParserConfig;
use crate::edm::{Edm, StructuredType};
use crate::error::{MessageKey, ParseResult, UriParserError};
use crate::lexer::token::TokenKind;
use smol_str::SmolStr;
use std::collections::HashMap;
use tracing::{debug, trace};

/// What the options of an expand item apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionContext {
    /// The expanded entities themselves.
    Plain,
    /// Entity references, after `/$ref`.
    RefTarget,
    /// The number of related entities, after `/$count`.
    CountTarget,
}

impl OptionContext {
    /// Returns true if an option of `kind` may appear in this context.
    pub fn allows(self, kind: SystemQueryOptionKind) -> bool {
        match kind {
            SystemQueryOptionKind::Filter | SystemQueryOptionKind::Search => true,
            SystemQueryOptionKind::Expand
            | SystemQueryOptionKind::Levels
            | SystemQueryOptionKind::Select => self == OptionContext::Plain,
            SystemQueryOptionKind::Count
            | SystemQueryOptionKind::OrderBy
            | SystemQueryOptionKind::Skip
            | SystemQueryOptionKind::Top => self != OptionContext::CountTarget,
        }
    }
}

/// A resolved expand path before suffixes and options are attached.
struct ResolvedPath {
    segments: Vec<ResourcePathSegment>,
    is_star: bool,
}

/// Parses `$expand` values against an entity data model.
pub struct ExpandParser<'a> {
    edm: &'a dyn Edm,
    aliases: &'a AliasTable,
    config: ParserConfig,
    depth: usize,
}

impl<'a> ExpandParser<'a> {
    pub fn new(edm: &'a dyn Edm, aliases: &'a AliasTable) -> Self {
        Self {
            edm,
            aliases,
            config: ParserConfig::default(),
            depth: 1,
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    fn nested(&self) -> Self {
        Self {
            edm: self.edm,
            aliases: self.aliases,
            config: self.config,
            depth: self.depth + 1,
        }
    }

    /// Parses one or more comma-separated expand items.
    ///
    /// Stops at the first token that cannot continue the list; the caller
    /// decides whether that token is a legal terminator.
    pub fn parse(
        &self,
        stream: &mut TokenStream<'_>,
        referenced: &StructuredType,
    ) -> ParseResult<ExpandOption> {
        if self.depth > self.config.max_expand_depth {
            return Err(stream
                .error_here(
                    MessageKey::MaxExpandDepthExceeded,
                    format!(
                        "$expand is nested deeper than the allowed {} levels.",
                        self.config.max_expand_depth
                    ),
                )
                .with_param(self.config.max_expand_depth.to_string()));
        }
        debug!(referenced = %referenced, depth = self.depth, "parsing $expand");

        let mut items = vec![self.parse_item(stream, referenced)?];
        while stream.try_consume(TokenKind::Comma) {
            items.push(self.parse_item(stream, referenced)?);
        }
        Ok(ExpandOption::new(items))
    }

    fn parse_item(
        &self,
        stream: &mut TokenStream<'_>,
        referenced: &StructuredType,
    ) -> ParseResult<ExpandItem> {
        if stream.try_consume(TokenKind::Star) {
            return self.parse_star_suffix(stream).map(ExpandItem::Star);
        }

        let type_filter = parse_type_cast(stream, self.edm, referenced)?;
        let path_type = match &type_filter {
            Some(cast) => {
                stream.require(TokenKind::Slash)?;
                cast.clone()
            }
            None => referenced.clone(),
        };

        let ResolvedPath {
            mut segments,
            is_star,
        } = self.parse_path(stream, &path_type)?;

        // A slash after a navigation property may introduce a type cast. When
        // it does not, the slash must lead to `$ref` or `$count` below.
        let mut has_slash = false;
        if let Some(ResourcePathSegment::NavigationProperty {
            property,
            entry_type_filter,
            collection_type_filter,
        }) = segments.last_mut()
        {
            if stream.try_consume(TokenKind::Slash) {
                has_slash = true;
                if let Some(cast) = parse_type_cast(stream, self.edm, &property.target_type())? {
                    trace!(navigation = %property.name, cast = %cast, "narrowed navigation target");
                    if property.collection {
                        *collection_type_filter = Some(cast);
                    } else {
                        *entry_type_filter = Some(cast);
                    }
                    has_slash = false;
                }
            }
        }

        let (options_type, options_collection) = segments
            .last()
            .and_then(|last| last.referenced_type().map(|ty| (ty, last.is_collection())))
            .unwrap_or((path_type, false));

        let mut context = OptionContext::Plain;
        if has_slash || stream.try_consume(TokenKind::Slash) {
            if stream.try_consume(TokenKind::Ref) {
                segments.push(ResourcePathSegment::Ref);
                context = OptionContext::RefTarget;
            } else if stream.try_consume(TokenKind::Count) {
                segments.push(ResourcePathSegment::Count);
                context = OptionContext::CountTarget;
            } else {
                return Err(stream.unexpected("$ref or $count"));
            }
        }

        let options = self.parse_options(stream, &options_type, options_collection, context)?;

        Ok(ExpandItem::Path(PathExpandItem {
            type_filter,
            path: segments,
            is_star,
            options,
        }))
    }

    /// `*/$ref` or `*($levels=...)`. Only one suffix is tried.
    fn parse_star_suffix(&self, stream: &mut TokenStream<'_>) -> ParseResult<StarExpandItem> {
        let mut star = StarExpandItem::default();
        if stream.try_consume(TokenKind::Slash) {
            stream.require(TokenKind::Ref)?;
            star.is_ref = true;
        } else if stream.try_consume(TokenKind::Open) {
            stream.require(TokenKind::Levels)?;
            stream.require(TokenKind::Eq)?;
            star.levels = Some(parse_levels(stream)?);
            stream.require(TokenKind::Close)?;
        }
        Ok(star)
    }

    /// Walks complex properties and ends at a navigation property or `*`.
    fn parse_path(
        &self,
        stream: &mut TokenStream<'_>,
        referenced: &StructuredType,
    ) -> ParseResult<ResolvedPath> {
        let mut segments = Vec::new();
        let mut current = referenced.clone();

        loop {
            if !stream.try_consume(TokenKind::Identifier) {
                break;
            }
            let span = stream.previous_span();
            let name = SmolStr::new(stream.current_lexeme());

            let complex = self
                .edm
                .structural_property(&current, &name)
                .and_then(|property| property.complex_type().map(|ty| (property, ty)));
            let Some((property, complex_type)) = complex else {
                let Some(navigation) = self.edm.navigation_property(&current, &name) else {
                    return Err(navigation_not_found(&name, &current, span));
                };
                trace!(navigation = %navigation.name, owner = %current, "resolved navigation");
                segments.push(ResourcePathSegment::navigation(navigation));
                return Ok(ResolvedPath {
                    segments,
                    is_star: false,
                });
            };

            stream.require(TokenKind::Slash)?;
            current = complex_type;
            let type_filter = parse_type_cast(stream, self.edm, &current)?;
            if let Some(cast) = &type_filter {
                stream.require(TokenKind::Slash)?;
                current = cast.clone();
            }
            trace!(property = %property.name, ty = %current, "resolved complex property");
            segments.push(ResourcePathSegment::ComplexProperty {
                property,
                type_filter,
            });
        }

        if stream.try_consume(TokenKind::Star) {
            return Ok(ResolvedPath {
                segments,
                is_star: true,
            });
        }
        Err(stream.unexpected("navigation property or '*'"))
    }

    /// Parses `(<option>=<value>;...)` if present.
    pub fn parse_options(
        &self,
        stream: &mut TokenStream<'_>,
        referenced: &StructuredType,
        is_collection: bool,
        context: OptionContext,
    ) -> ParseResult<OptionSet> {
        let mut options = OptionSet::new();
        if !stream.try_consume(TokenKind::Open) {
            return Ok(options);
        }

        let mut seen: HashMap<SystemQueryOptionKind, Span> = HashMap::new();
        loop {
            let keyword = stream.current().clone();
            let kind = option_kind(keyword.kind)
                .filter(|kind| context.allows(*kind))
                .ok_or_else(|| {
                    stream
                        .error_here(MessageKey::Syntax, "Allowed query option expected.")
                        .with_param(keyword.text.clone())
                })?;
            stream.advance();
            stream.require(TokenKind::Eq)?;

            let option = self.parse_option_value(stream, kind, referenced, is_collection)?;
            if options.try_insert(option).is_err() {
                let mut err = UriParserError::new(
                    MessageKey::DoubleSystemQueryOption,
                    format!("Double system query option '{kind}'."),
                    keyword.span,
                )
                .with_param(kind.name());
                if let Some(first) = seen.get(&kind) {
                    err = err.with_related(first.clone(), "first given here");
                }
                return Err(err);
            }
            seen.insert(kind, keyword.span);

            if !stream.try_consume(TokenKind::Semicolon) {
                break;
            }
        }
        stream.require(TokenKind::Close)?;
        Ok(options)
    }

    fn parse_option_value(
        &self,
        stream: &mut TokenStream<'_>,
        kind: SystemQueryOptionKind,
        referenced: &StructuredType,
        is_collection: bool,
    ) -> ParseResult<SystemQueryOption> {
        let option = match kind {
            SystemQueryOptionKind::Count => SystemQueryOption::Count(parse_boolean_value(stream)?),
            SystemQueryOptionKind::Expand => {
                SystemQueryOption::Expand(self.nested().parse(stream, referenced)?)
            }
            SystemQueryOptionKind::Filter => SystemQueryOption::Filter(
                FilterParser::new(self.edm, self.aliases)
                    .with_config(self.config)
                    .parse(stream, referenced)?,
            ),
            SystemQueryOptionKind::Levels => SystemQueryOption::Levels(parse_levels(stream)?),
            SystemQueryOptionKind::OrderBy => SystemQueryOption::OrderBy(
                OrderByParser::new(self.edm, self.aliases)
                    .with_config(self.config)
                    .parse(stream, referenced)?,
            ),
            SystemQueryOptionKind::Search => SystemQueryOption::Search(
                SearchParser::new().with_config(self.config).parse(stream)?,
            ),
            SystemQueryOptionKind::Select => SystemQueryOption::Select(
                SelectParser::new(self.edm).parse(stream, referenced, is_collection)?,
            ),
            SystemQueryOptionKind::Skip => {
                SystemQueryOption::Skip(parse_integer_value(stream, kind.name(), true)?)
            }
            SystemQueryOptionKind::Top => {
                SystemQueryOption::Top(parse_integer_value(stream, kind.name(), true)?)
            }
        };
        Ok(option)
    }
}

/// Parses a `$levels` value: `max` or a positive depth.
pub fn parse_levels(stream: &mut TokenStream<'_>) -> ParseResult<LevelsOption> {
    if stream.try_consume(TokenKind::Max) {
        return Ok(LevelsOption::Max);
    }
    let depth = parse_integer_value(stream, SystemQueryOptionKind::Levels.name(), false)?;
    Ok(LevelsOption::Depth(depth))
}

fn option_kind(kind: TokenKind) -> Option<SystemQueryOptionKind> {
    let kind = match kind {
        TokenKind::Count => SystemQueryOptionKind::Count,
        TokenKind::Expand => SystemQueryOptionKind::Expand,
        TokenKind::Filter => SystemQueryOptionKind::Filter,
        TokenKind::Levels => SystemQueryOptionKind::Levels,
        TokenKind::OrderBy => SystemQueryOptionKind::OrderBy,
        TokenKind::Search => SystemQueryOptionKind::Search,
        TokenKind::Select => SystemQueryOptionKind::Select,
        TokenKind::Skip => SystemQueryOptionKind::Skip,
        TokenKind::Top => SystemQueryOptionKind::Top,
        _ => return None,
    };
    Some(kind)
}

fn navigation_not_found(name: &str, owner: &StructuredType, span: Span) -> UriParserError {
    UriParserError::new(
        MessageKey::PropertyNotInType,
        format!("Navigation Property '{name}' not found in type '{owner}'."),
        span,
    )
    .with_param(owner.to_string())
    .with_param(name)
}
