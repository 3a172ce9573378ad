//! PostgreSQL backend built on the synchronous `postgres` client.
//!
//! Statements arrive with `$n` placeholders. Request filters are always
//! text, so [`Scalar`] arguments are converted to whatever type the server
//! inferred for each parameter.

use std::error::Error as StdError;
use std::sync::Mutex;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use postgres::{Client, NoTls, Row as PgRow};

use super::config::DatabaseType;
use super::value::{DbValue, RowSet, Scalar};
use super::{Database, DbError, DbResult, ExecOutcome};

type BoxError = Box<dyn StdError + Sync + Send>;

fn integer_to_sql(i: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(i)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(i)?.to_sql(ty, out),
        Type::FLOAT4 => (i as f32).to_sql(ty, out),
        Type::FLOAT8 => (i as f64).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            i.to_string().to_sql(ty, out)
        }
        _ => i.to_sql_checked(ty, out),
    }
}

fn text_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    let trimmed = s.trim();
    match *ty {
        Type::BOOL => match trimmed.to_ascii_lowercase().as_str() {
            "t" | "true" | "1" => true.to_sql(ty, out),
            "f" | "false" | "0" => false.to_sql(ty, out),
            _ => Err(format!("invalid boolean value {:?}", s).into()),
        },
        Type::INT2 | Type::INT4 | Type::INT8 => integer_to_sql(trimmed.parse()?, ty, out),
        Type::FLOAT4 => trimmed.parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => trimmed.parse::<f64>()?.to_sql(ty, out),
        _ => s.to_sql_checked(ty, out),
    }
}

impl ToSql for Scalar {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Scalar::Null => Ok(IsNull::Yes),
            Scalar::Bool(b) => match *ty {
                Type::INT2 | Type::INT4 | Type::INT8 => integer_to_sql(i64::from(*b), ty, out),
                _ => b.to_sql_checked(ty, out),
            },
            Scalar::Integer(i) => integer_to_sql(*i, ty, out),
            Scalar::Real(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => f.to_sql_checked(ty, out),
            },
            Scalar::Text(s) => text_to_sql(s, ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn column_value(row: &PgRow, idx: usize, ty: &Type) -> DbResult<DbValue> {
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(DbValue::Bool),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| DbValue::Integer(v.into())),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| DbValue::Integer(v.into())),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(DbValue::Integer),
        Type::OID => row
            .try_get::<_, Option<u32>>(idx)?
            .map(|v| DbValue::Integer(v.into())),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| DbValue::Real(v.into())),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(DbValue::Real),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            row.try_get::<_, Option<String>>(idx)?.map(DbValue::Text)
        }
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(DbValue::Blob),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(idx)?
            .map(|v| DbValue::Text(v.to_string())),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| DbValue::Text(v.to_string())),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| DbValue::Text(v.to_rfc3339())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|v| DbValue::Text(v.to_string())),
        Type::TIME => row
            .try_get::<_, Option<NaiveTime>>(idx)?
            .map(|v| DbValue::Text(v.to_string())),
        _ => return Err(DbError::ColumnType(ty.to_string())),
    };
    Ok(value.unwrap_or(DbValue::Null))
}

fn params(args: &[Scalar]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|arg| arg as &(dyn ToSql + Sync)).collect()
}

/// One PostgreSQL client shared by every request
///
/// The client needs `&mut` access; the mutex serializes statements.
/// PostgreSQL has no last-insert-id, so writes report only the affected
/// row count.
pub struct PostgresDatabase {
    client: Mutex<Option<Client>>,
}

impl PostgresDatabase {
    /// Connect with a `postgres://` URL or a key=value connection string.
    pub fn connect(dsn: &str) -> DbResult<Self> {
        let client = Client::connect(dsn, NoTls)?;
        Ok(Self {
            client: Mutex::new(Some(client)),
        })
    }

    fn with_client<T>(&self, f: impl FnOnce(&mut Client) -> DbResult<T>) -> DbResult<T> {
        let mut guard = self.client.lock().map_err(|_| DbError::Poisoned)?;
        match guard.as_mut() {
            Some(client) => f(client),
            None => Err(DbError::Closed),
        }
    }
}

impl Database for PostgresDatabase {
    fn backend(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    fn query(&self, sql: &str, args: &[Scalar]) -> DbResult<RowSet> {
        self.with_client(|client| {
            let stmt = client.prepare(sql)?;
            let columns: Vec<String> = stmt
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect();
            let types: Vec<Type> = stmt.columns().iter().map(|c| c.type_().clone()).collect();

            let mut rows = Vec::new();
            for row in client.query(&stmt, &params(args))? {
                let mut values = Vec::with_capacity(types.len());
                for (idx, ty) in types.iter().enumerate() {
                    values.push(column_value(&row, idx, ty)?);
                }
                rows.push(values);
            }

            Ok(RowSet { columns, rows })
        })
    }

    fn execute(&self, sql: &str, args: &[Scalar]) -> DbResult<ExecOutcome> {
        self.with_client(|client| {
            let affected = client.execute(sql, &params(args))?;
            Ok(ExecOutcome {
                rows_affected: Some(affected),
                last_insert_id: None,
            })
        })
    }

    fn close(&self) -> DbResult<()> {
        let mut guard = self.client.lock().map_err(|_| DbError::Poisoned)?;
        match guard.take() {
            Some(client) => Ok(client.close()?),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Scalar, ty: &Type) -> Result<Vec<u8>, BoxError> {
        let mut out = BytesMut::new();
        value.to_sql_checked(ty, &mut out)?;
        Ok(out.to_vec())
    }

    #[test]
    fn test_text_filter_binds_to_integer_column() {
        assert_eq!(
            encode(&Scalar::from("10"), &Type::INT4).unwrap(),
            10i32.to_be_bytes()
        );
        assert_eq!(
            encode(&Scalar::from("8"), &Type::INT8).unwrap(),
            8i64.to_be_bytes()
        );
        assert!(encode(&Scalar::from("ten"), &Type::INT4).is_err());
    }

    #[test]
    fn test_text_binds_to_text_and_bool() {
        assert_eq!(encode(&Scalar::from("jack"), &Type::TEXT).unwrap(), b"jack");
        assert_eq!(encode(&Scalar::from("true"), &Type::BOOL).unwrap(), [1u8]);
        assert!(encode(&Scalar::from("maybe"), &Type::BOOL).is_err());
    }

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(
            encode(&Scalar::Integer(66), &Type::INT2).unwrap(),
            66i16.to_be_bytes()
        );
        assert!(encode(&Scalar::Integer(i64::MAX), &Type::INT4).is_err());
        assert_eq!(encode(&Scalar::Integer(3), &Type::TEXT).unwrap(), b"3");
    }

    #[test]
    fn test_null_and_mismatch() {
        let mut out = BytesMut::new();
        assert!(matches!(
            Scalar::Null.to_sql_checked(&Type::INT4, &mut out),
            Ok(IsNull::Yes)
        ));
        assert!(encode(&Scalar::Real(1.5), &Type::INT4).is_err());
    }
}
