//! # Request Parser
//!
//! Parses the prefix-relative request path into a [`Target`], query
//! parameters into a [`QuerySpec`], and request bodies into a [`Payload`].

use serde_json::{Map, Value};

use crate::core::{SqldError, SqldResult};
use crate::db::value::json_kind;
use crate::db::ValueError;
use crate::query::clause::{is_reserved, LIMIT_KEY, OFFSET_KEY, ORDER_BY_KEY};
use crate::query::{FilterSet, OrderBy, QuerySpec};

/// Which statement the parameters are parsed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Filters, limit, offset and ordering
    Select,
    /// Filters and limit
    Update,
    /// Filters and limit
    Delete,
}

/// Table and optional row key named by a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub table: String,
    pub key: Option<String>,
}

impl Target {
    /// Parse a path with the URL prefix already stripped, e.g. `user/10`.
    ///
    /// Segments after the key are ignored.
    pub fn parse(path: &str) -> SqldResult<Self> {
        let mut segments = path.split('/').map(percent_decode);

        let table = match segments.next() {
            Some(table) if !table.is_empty() => table,
            _ => return Err(SqldError::bad_request("missing table name")),
        };
        let key = segments.next().filter(|key| !key.is_empty());

        Ok(Self { table, key })
    }
}

fn first<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn parse_count(params: &[(String, String)], name: &str) -> Option<u64> {
    first(params, name).and_then(|value| value.trim().parse().ok())
}

/// Parse order parameters (each value may hold comma-separated terms)
fn parse_order(params: &[(String, String)]) -> SqldResult<Vec<OrderBy>> {
    let mut order = Vec::new();
    for (_, value) in params.iter().filter(|(key, _)| key == ORDER_BY_KEY) {
        for term in value.split(',') {
            order.push(OrderBy::parse(term)?);
        }
    }
    Ok(order)
}

/// Build the statement description for `target` from query parameters.
///
/// Unparseable `__limit__` and `__offset__` values are ignored. Only the
/// first occurrence of either counts.
pub fn query_spec(
    target: &Target,
    params: &[(String, String)],
    intent: Intent,
) -> SqldResult<QuerySpec> {
    let mut filters = FilterSet::new();
    for (column, value) in params.iter().filter(|(key, _)| !is_reserved(key)) {
        filters.insert(column.as_str(), value.as_str());
    }

    let mut spec = QuerySpec::new(target.table.as_str()).with_filters(filters);
    if let Some(key) = &target.key {
        spec = spec.with_key(key.as_str());
    }
    if let Some(limit) = parse_count(params, LIMIT_KEY) {
        spec = spec.with_limit(limit);
    }

    if intent == Intent::Select {
        if let Some(offset) = parse_count(params, OFFSET_KEY) {
            spec = spec.with_offset(offset);
        }
        spec = spec.with_order_by(parse_order(params)?);
    }

    Ok(spec)
}

/// A decoded JSON request body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl Payload {
    /// Decode `body`; anything but an object or an array is rejected.
    pub fn parse(body: &[u8]) -> SqldResult<Self> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => Ok(Payload::Object(map)),
            Value::Array(items) => Ok(Payload::Array(items)),
            other => Err(ValueError::NotAnObject(json_kind(&other)).into()),
        }
    }

    /// The object payload; arrays are rejected.
    pub fn into_object(self) -> SqldResult<Map<String, Value>> {
        match self {
            Payload::Object(map) => Ok(map),
            Payload::Array(_) => Err(ValueError::NotAnObject("an array").into()),
        }
    }
}

/// Decode `%XX` escapes in a path segment
fn percent_decode(segment: &str) -> String {
    let raw = segment.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'%' {
            let decoded = raw
                .get(i + 1..i + 3)
                .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                bytes.push(byte);
                i += 3;
                continue;
            }
        }
        bytes.push(raw[i]);
        i += 1;
    }

    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
