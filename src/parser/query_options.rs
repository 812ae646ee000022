//! Query-string front end: splits `a=b&c=d`, decodes, and dispatches each
//! system query option to its parser.

use super::AliasTable;
use super::base::{TokenStream, parse_boolean_value, parse_integer_value};
use super::expand::ExpandParser;
use super::filter::FilterParser;
use super::orderby::OrderByParser;
use super::search::SearchParser;
use super::select::SelectParser;
use crate::ast::{OptionSet, SystemQueryOption, SystemQueryOptionKind};
use crate::config::ParserConfig;
use crate::edm::{Edm, StructuredType};
use crate::error::{MessageKey, ParseResult, UriParserError};
use crate::lexer::tokenize;
use percent_encoding::percent_decode_str;
use smol_str::SmolStr;
use std::fmt;
use tracing::debug;

/// Everything a query string carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// System query options, at most one per kind.
    pub system: OptionSet,
    /// Parameter aliases, keyed without the `@`.
    pub aliases: AliasTable,
    /// Non-`$` options in the order they were given.
    pub custom: Vec<(SmolStr, SmolStr)>,
}

impl fmt::Display for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut aliases: Vec<_> = self.aliases.iter().collect();
        aliases.sort();

        let parts = self
            .system
            .iter()
            .map(ToString::to_string)
            .chain(aliases.into_iter().map(|(name, value)| format!("@{name}={value}")))
            .chain(self.custom.iter().map(|(name, value)| format!("{name}={value}")));
        for (index, part) in parts.enumerate() {
            if index > 0 {
                write!(f, "&")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// Parses complete query strings against a resource type.
///
/// Error spans point into the decoded value of the option that failed.
pub struct QueryOptionParser<'a> {
    edm: &'a dyn Edm,
    config: ParserConfig,
}

impl<'a> QueryOptionParser<'a> {
    pub fn new(edm: &'a dyn Edm) -> Self {
        Self {
            edm,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Parses `query` (with or without the leading `?`) for a resource of
    /// `resource_type`.
    ///
    /// Aliases are collected before any option is parsed, so an option may
    /// reference an alias defined after it.
    pub fn parse_query(
        &self,
        query: &str,
        resource_type: &StructuredType,
        is_collection: bool,
    ) -> ParseResult<QueryOptions> {
        if query.len() > self.config.max_query_length {
            return Err(UriParserError::new(
                MessageKey::QueryTooLong,
                format!(
                    "Query string of {} bytes exceeds the limit of {} bytes.",
                    query.len(),
                    self.config.max_query_length
                ),
                0..query.len(),
            )
            .with_param(self.config.max_query_length.to_string()));
        }
        debug!(resource_type = %resource_type, is_collection, "parsing query string");

        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (name, value) = part.split_once('=').unwrap_or((part, ""));
                (decode(name), decode(value))
            })
            .collect();

        let mut result = QueryOptions::default();
        for (name, value) in &pairs {
            if let Some(alias) = name.strip_prefix('@') {
                result.aliases.insert(alias.into(), value.into());
            }
        }

        for (name, value) in &pairs {
            if name.starts_with('@') {
                continue;
            }
            if !name.starts_with('$') {
                result.custom.push((name.into(), value.into()));
                continue;
            }
            let kind = system_option_kind(name).ok_or_else(|| {
                UriParserError::new(
                    MessageKey::UnknownSystemQueryOption,
                    format!("Unknown system query option '{name}'."),
                    0..name.len(),
                )
                .with_param(name.as_str())
            })?;
            let option =
                self.parse_system_option(kind, value, resource_type, is_collection, &result.aliases)?;
            if result.system.try_insert(option).is_err() {
                return Err(UriParserError::new(
                    MessageKey::DoubleSystemQueryOption,
                    format!("Double system query option '{kind}'."),
                    0..name.len(),
                )
                .with_param(kind.name()));
            }
        }
        Ok(result)
    }

    fn parse_system_option(
        &self,
        kind: SystemQueryOptionKind,
        value: &str,
        resource_type: &StructuredType,
        is_collection: bool,
        aliases: &AliasTable,
    ) -> ParseResult<SystemQueryOption> {
        debug!(option = kind.name(), "parsing system query option");
        let tokens = tokenize(value).into_tokens()?;
        let mut stream = TokenStream::new(&tokens);
        let edm = self.edm;

        let option = match kind {
            SystemQueryOptionKind::Count => SystemQueryOption::Count(parse_boolean_value(&mut stream)?),
            SystemQueryOptionKind::Expand => SystemQueryOption::Expand(
                ExpandParser::new(edm, aliases)
                    .with_config(self.config)
                    .parse(&mut stream, resource_type)?,
            ),
            SystemQueryOptionKind::Filter => SystemQueryOption::Filter(
                FilterParser::new(edm, aliases)
                    .with_config(self.config)
                    .parse(&mut stream, resource_type)?,
            ),
            SystemQueryOptionKind::Levels => {
                return Err(UriParserError::new(
                    MessageKey::Syntax,
                    "System query option '$levels' is allowed only inside $expand.",
                    0..value.len(),
                )
                .with_param(kind.name()));
            }
            SystemQueryOptionKind::OrderBy => SystemQueryOption::OrderBy(
                OrderByParser::new(edm, aliases)
                    .with_config(self.config)
                    .parse(&mut stream, resource_type)?,
            ),
            SystemQueryOptionKind::Search => SystemQueryOption::Search(
                SearchParser::new().with_config(self.config).parse(&mut stream)?,
            ),
            SystemQueryOptionKind::Select => SystemQueryOption::Select(
                SelectParser::new(edm).parse(&mut stream, resource_type, is_collection)?,
            ),
            SystemQueryOptionKind::Skip => {
                SystemQueryOption::Skip(parse_integer_value(&mut stream, kind.name(), true)?)
            }
            SystemQueryOptionKind::Top => {
                SystemQueryOption::Top(parse_integer_value(&mut stream, kind.name(), true)?)
            }
        };

        if !stream.is_at_end() {
            let token = stream.current();
            return Err(UriParserError::new(
                MessageKey::TrailingTokens,
                format!("Unexpected {} after the value of '{kind}'.", token.describe()),
                token.span.clone(),
            )
            .with_param(kind.name())
            .with_param(token.text.clone()));
        }
        Ok(option)
    }
}

fn decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

fn system_option_kind(name: &str) -> Option<SystemQueryOptionKind> {
    let kind = match name.to_ascii_lowercase().as_str() {
        "$count" => SystemQueryOptionKind::Count,
        "$expand" => SystemQueryOptionKind::Expand,
        "$filter" => SystemQueryOptionKind::Filter,
        "$levels" => SystemQueryOptionKind::Levels,
        "$orderby" => SystemQueryOptionKind::OrderBy,
        "$search" => SystemQueryOptionKind::Search,
        "$select" => SystemQueryOptionKind::Select,
        "$skip" => SystemQueryOptionKind::Skip,
        "$top" => SystemQueryOptionKind::Top,
        _ => return None,
    };
    Some(kind)
}
