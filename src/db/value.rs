//! # Database Values
//!
//! Tagged values crossing the database boundary in both directions:
//! [`Scalar`] for bound statement arguments and [`DbValue`] for scanned
//! column values.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A marshaled result row: column name to JSON scalar, in column order.
pub type Row = Map<String, Value>;

/// Errors converting request JSON into bindable arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Arrays and objects have no column representation
    #[error("column {0}: nested JSON values cannot be stored")]
    Nested(String),

    /// A create payload carried something other than an object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Human-readable kind of a JSON value, for error messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A positional statement argument
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Scalar {
    /// Convert a request body value for `column` into an argument.
    pub fn from_json(column: &str, value: &Value) -> Result<Self, ValueError> {
        Ok(match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Integer(i),
                None => Scalar::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Scalar::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return Err(ValueError::Nested(column.to_string()))
            }
        })
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

/// A value as scanned from a result set, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl DbValue {
    /// Normalize into a JSON scalar.
    ///
    /// Byte sequences become text; everything else keeps its type.
    pub fn into_json(self) -> Value {
        match self {
            DbValue::Null => Value::Null,
            DbValue::Bool(b) => Value::Bool(b),
            DbValue::Integer(i) => Value::Number(i.into()),
            DbValue::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            DbValue::Text(s) => Value::String(s),
            DbValue::Blob(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

/// Column names plus the raw values of every row, in database order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<DbValue>>,
}

impl RowSet {
    /// Zip column names onto every row, normalizing each scanned value.
    pub fn into_rows(self) -> Vec<Row> {
        let RowSet { columns, rows } = self;
        rows.into_iter()
            .map(|values| {
                columns
                    .iter()
                    .cloned()
                    .zip(values.into_iter().map(DbValue::into_json))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blob_becomes_text() {
        let v = DbValue::Blob(b"there".to_vec()).into_json();
        assert_eq!(v, json!("there"));
    }

    #[test]
    fn test_other_values_pass_through() {
        assert_eq!(DbValue::Null.into_json(), Value::Null);
        assert_eq!(DbValue::Bool(true).into_json(), json!(true));
        assert_eq!(DbValue::Integer(7).into_json(), json!(7));
        assert_eq!(DbValue::Real(1.5).into_json(), json!(1.5));
        assert_eq!(DbValue::Text("hi".into()).into_json(), json!("hi"));
    }

    #[test]
    fn test_rowset_keeps_column_order() {
        let set = RowSet {
            columns: vec!["z".into(), "a".into()],
            rows: vec![vec![DbValue::Integer(1), DbValue::Blob(b"x".to_vec())]],
        };
        let rows = set.into_rows();
        let keys: Vec<_> = rows[0].keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(rows[0]["a"], json!("x"));
    }

    #[test]
    fn test_scalar_from_json() {
        assert_eq!(Scalar::from_json("a", &json!(66)).unwrap(), Scalar::Integer(66));
        assert_eq!(Scalar::from_json("a", &json!(2.5)).unwrap(), Scalar::Real(2.5));
        assert_eq!(Scalar::from_json("a", &json!(true)).unwrap(), Scalar::Bool(true));
        assert_eq!(Scalar::from_json("a", &json!(null)).unwrap(), Scalar::Null);
        assert_eq!(
            Scalar::from_json("tags", &json!(["x"])),
            Err(ValueError::Nested("tags".into()))
        );
    }
}
