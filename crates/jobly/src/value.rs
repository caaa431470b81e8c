//! Bindable parameter values.
//!
//! Request bodies and query strings arrive as JSON, so builder inputs are
//! `serde_json` values. [`SqlValue`] is the scalar form that ends up in a
//! fragment's value list. It implements [`ToSql`] for whatever type the
//! server infers for its placeholder, so the text `"10"` binds to an
//! `integer` column the same way a JSON number does.

use bytes::BytesMut;
use rust_decimal::Decimal;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type};

type BoxError = Box<dyn Error + Sync + Send>;

/// A single positional parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects; bound as `json`/`jsonb` (or their text form).
    Json(Value),
}

impl SqlValue {
    /// Whether this value is a number or a string that parses as one.
    pub fn is_numeric(&self) -> bool {
        match self {
            SqlValue::Int(_) | SqlValue::Float(_) => true,
            SqlValue::Text(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
            _ => false,
        }
    }

    /// Numeric view of the value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Int(i) => Some(*i as f64),
            SqlValue::Float(f) => Some(*f),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text form for scalar values. `None` for null and JSON containers.
    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Int(i) => Some(i.to_string()),
            SqlValue::Float(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Null | SqlValue::Json(_) => None,
        }
    }
}

impl From<&Value> for SqlValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => SqlValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Json(value.clone()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Json(v) => write!(f, "{v}"),
            other => f.write_str(&other.as_text().unwrap_or_default()),
        }
    }
}

fn is_text_type(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn is_json_type(ty: &Type) -> bool {
    matches!(*ty, Type::JSON | Type::JSONB)
}

fn mismatch(value: &SqlValue, ty: &Type) -> BoxError {
    format!("cannot bind {value:?} to parameter of type {ty}").into()
}

fn encode_int(i: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(i)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(i)?.to_sql(ty, out),
        Type::INT8 => i.to_sql(ty, out),
        Type::FLOAT4 => (i as f32).to_sql(ty, out),
        Type::FLOAT8 => (i as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(i).to_sql(ty, out),
        _ if is_text_type(ty) => i.to_string().to_sql(ty, out),
        _ if is_json_type(ty) => Value::from(i).to_sql(ty, out),
        _ => Err(mismatch(&SqlValue::Int(i), ty)),
    }
}

fn encode_float(f: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (f as f32).to_sql(ty, out),
        Type::FLOAT8 => f.to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(f)?.to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
        {
            encode_int(f as i64, ty, out)
        }
        _ if is_text_type(ty) => f.to_string().to_sql(ty, out),
        _ if is_json_type(ty) => Value::from(f).to_sql(ty, out),
        _ => Err(mismatch(&SqlValue::Float(f), ty)),
    }
}

fn encode_text(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => encode_int(s.trim().parse()?, ty, out),
        Type::FLOAT4 | Type::FLOAT8 => encode_float(s.trim().parse()?, ty, out),
        Type::NUMERIC => Decimal::from_str(s.trim())?.to_sql(ty, out),
        Type::BOOL => s.trim().parse::<bool>()?.to_sql(ty, out),
        _ if is_text_type(ty) => s.to_sql(ty, out),
        _ if is_json_type(ty) => Value::from(s).to_sql(ty, out),
        // Binary format: text bytes would be read as the target type's encoding.
        _ => Err(mismatch(&SqlValue::Text(s.to_owned()), ty)),
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ if is_text_type(ty) => b.to_string().to_sql(ty, out),
                _ if is_json_type(ty) => Value::from(*b).to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            SqlValue::Int(i) => encode_int(*i, ty, out),
            SqlValue::Float(f) => encode_float(*f, ty, out),
            SqlValue::Text(s) => encode_text(s, ty, out),
            SqlValue::Json(v) => match *ty {
                _ if is_json_type(ty) => v.to_sql(ty, out),
                _ if is_text_type(ty) => v.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::NUMERIC
                | Type::JSON
                | Type::JSONB
        ) || is_text_type(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}
