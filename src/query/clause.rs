//! # Filter and Clause Model
//!
//! The structured query intent extracted from a request: target table,
//! optional row key, equality filters, limit, offset and ordering.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Query key carrying the row limit
pub const LIMIT_KEY: &str = "__limit__";

/// Query key carrying the row offset
pub const OFFSET_KEY: &str = "__offset__";

/// Query key carrying ordering tokens
pub const ORDER_BY_KEY: &str = "__order_by__";

/// Column matched by the second path segment
pub const ROW_KEY_COLUMN: &str = "id";

/// Control keys that never become filters
pub fn is_reserved(key: &str) -> bool {
    matches!(key, LIMIT_KEY | OFFSET_KEY | ORDER_BY_KEY)
}

/// Errors building clauses from request input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClauseError {
    #[error("invalid __order_by__ token: {0:?}")]
    InvalidOrderBy(String),
}

/// Equality filters keyed by column
///
/// Columns iterate in sorted order so identical input always compiles to
/// identical SQL; values keep the order they were received in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: BTreeMap<String, Vec<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the accepted values of `column`.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.filters.entry(column.into()).or_default().push(value.into());
    }

    pub fn and(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn get(&self, column: &str) -> Option<&[String]> {
        self.filters.get(column).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One `ORDER BY` term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Option<Direction>,
}

/// Column and table names: letters, digits, `_` and `.`
const IDENTIFIER: &str = r"[A-Za-z_][A-Za-z0-9_.]*";

fn identifier() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| {
        Regex::new(&format!("^{}$", IDENTIFIER)).expect("identifier pattern is valid")
    })
}

fn order_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(&format!(r"^\s*({})(?:\s+([A-Za-z]+))?\s*$", IDENTIFIER))
            .expect("order token pattern is valid")
    })
}

/// Whether `name` may be spliced into SQL as a table or column name
pub fn is_identifier(name: &str) -> bool {
    identifier().is_match(name)
}

impl OrderBy {
    /// Parse a `column [asc|desc]` token.
    pub fn parse(token: &str) -> Result<Self, ClauseError> {
        let invalid = || ClauseError::InvalidOrderBy(token.to_string());
        let caps = order_token().captures(token).ok_or_else(invalid)?;

        let direction = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
            None => None,
            Some(d) if d == "asc" => Some(Direction::Asc),
            Some(d) if d == "desc" => Some(Direction::Desc),
            Some(_) => return Err(invalid()),
        };

        Ok(Self {
            column: caps[1].to_string(),
            direction,
        })
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            None => write!(f, "{}", self.column),
            Some(Direction::Asc) => write!(f, "{} ASC", self.column),
            Some(Direction::Desc) => write!(f, "{} DESC", self.column),
        }
    }
}

/// A fully parsed request target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    table: String,
    key: Option<String>,
    filters: FilterSet,
    limit: Option<u64>,
    offset: Option<u64>,
    order_by: Vec<OrderBy>,
}

impl QuerySpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: None,
            filters: FilterSet::new(),
            limit: None,
            offset: None,
            order_by: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderBy>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }
}
