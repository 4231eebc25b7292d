//! Column values and ordered column maps.
//!
//! [`Value`] is the closed set of kinds an entity column can hold. Scalars bind as
//! statement parameters or render as SQL literals; the relation kinds (`List`, `Map`,
//! `Nested`) describe associations and are skipped by the DML builders.
//!
//! [`DataMap`] keeps insertion order, which the DML builders rely on to line up generated
//! placeholders with the parameters produced by [`DataMap::params`].

use crate::block::Block;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};

/// Quote `text` as a SQL string literal, doubling embedded single quotes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// A column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(uuid::Uuid),
    Json(serde_json::Value),
    /// Raw SQL rendered verbatim, e.g. `repeated + 1` in an upsert.
    Raw(Block),
    /// A to-many relation.
    List(Vec<Value>),
    /// A keyed relation.
    Map(DataMap),
    /// A nested entity.
    Nested(DataMap),
}

impl Value {
    /// Whether this value describes a relation rather than a column.
    pub fn is_relation(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_) | Value::Nested(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Inline SQL literal.
    ///
    /// Text and temporal/uuid/json values are single-quoted with `'` doubled; numbers and
    /// booleans use their natural text; `Raw` renders verbatim. Relations render empty.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Text(v) => quote_literal(v),
            Value::Date(v) => quote_literal(&v.to_string()),
            Value::Timestamp(v) => quote_literal(&v.to_string()),
            Value::TimestampTz(v) => quote_literal(&v.to_rfc3339()),
            Value::Uuid(v) => quote_literal(&v.to_string()),
            Value::Json(v) => quote_literal(&v.to_string()),
            Value::Raw(b) => b.to_string(),
            Value::List(_) | Value::Map(_) | Value::Nested(_) => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::TimestampTz(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Raw(b) => write!(f, "{b}"),
            Value::List(items) => write!(f, "[{} items]", items.len()),
            Value::Map(map) | Value::Nested(map) => write!(f, "{{{} entries}}", map.len()),
        }
    }
}

// ==================== Conversions ====================

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::TimestampTz(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<Block> for Value {
    fn from(v: Block) -> Self {
        Value::Raw(v)
    }
}

impl From<DataMap> for Value {
    fn from(v: DataMap) -> Self {
        Value::Nested(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

// ==================== Postgres binding ====================

// Variants bind through the inner type's `to_sql_checked`: a mismatched parameter type
// is a `WrongType` error.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql_checked(ty, out),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                    v.to_string().to_sql_checked(ty, out)
                }
                _ => v.to_sql_checked(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMPTZ => v.and_utc().to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::TimestampTz(v) => match *ty {
                Type::TIMESTAMP => v.naive_utc().to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Raw(b) => Err(format!("raw SQL fragment `{b}` cannot be bound as a parameter").into()),
            Value::List(_) | Value::Map(_) | Value::Nested(_) => {
                Err("relation values cannot be bound as parameters".into())
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i64::from(i16::from_sql(ty, raw)?)),
            Type::INT4 => Value::Int(i64::from(i32::from_sql(ty, raw)?)),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::FLOAT4 => Value::Float(f64::from(f32::from_sql(ty, raw)?)),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                Value::Text(String::from_sql(ty, raw)?)
            }
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::TimestampTz(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(uuid::Uuid::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            _ => return Err(format!("unsupported column type: {ty}").into()),
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(Value::Null)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Date(v) => v.serialize(serializer),
            Value::Timestamp(v) => v.serialize(serializer),
            Value::TimestampTz(v) => v.serialize(serializer),
            Value::Uuid(v) => v.serialize(serializer),
            Value::Json(v) => v.serialize(serializer),
            Value::Raw(b) => serializer.serialize_str(&b.to_string()),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) | Value::Nested(map) => map.serialize(serializer),
        }
    }
}

// ==================== DataMap ====================

/// Column name → value map that preserves insertion order.
#[derive(Debug, Clone, Default)]
pub struct DataMap {
    entries: IndexMap<String, Value>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Set `key`, keeping its original position when it already exists.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove `key`, shifting later entries down so the order is kept.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Non-null values in order, the parameter list for a statement built from this map.
    pub fn params(&self) -> Vec<Value> {
        self.values().filter(|v| !v.is_null()).cloned().collect()
    }
}

// Two maps are equal only when their entries match in order.
impl PartialEq for DataMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for DataMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for DataMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_postgres::types::WrongType;

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("O'Connor"), "'O''Connor'");
        assert_eq!(quote_literal("plain"), "'plain'");
    }

    #[test]
    fn test_relation_kinds() {
        assert!(Value::List(vec![]).is_relation());
        assert!(Value::Map(DataMap::new()).is_relation());
        assert!(Value::Nested(DataMap::new()).is_relation());
        assert!(!Value::Int(1).is_relation());
        assert!(!Value::Null.is_relation());
    }

    #[test]
    fn test_literals() {
        assert_eq!(Value::from(12).to_literal(), "12");
        assert_eq!(Value::from(true).to_literal(), "true");
        assert_eq!(Value::from("Bat's").to_literal(), "'Bat''s'");
        assert_eq!(Value::from(Block::raw("repeated + 1")).to_literal(), "repeated + 1");
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(Value::from(date).to_literal(), "'2024-05-01'");
    }

    #[test]
    fn test_option_and_vec_conversions() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
        assert_eq!(Value::from(vec![1, 2]), Value::List(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_data_map_keeps_order_on_overwrite() {
        let mut map = DataMap::new();
        map.insert("id", 1);
        map.insert("name", "Leng");
        let old = map.insert("id", 2);
        assert_eq!(old, Some(Value::Int(1)));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(map.get("id"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_data_map_remove_keeps_order() {
        let mut map: DataMap = [("id", 1), ("age", 60), ("rank", 3)].into_iter().collect();
        assert_eq!(map.remove("id"), Some(Value::Int(1)));
        assert_eq!(map.remove("missing"), None);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["age", "rank"]);
    }

    #[test]
    fn test_data_map_equality_is_ordered() {
        let a: DataMap = [("id", 1), ("age", 60)].into_iter().collect();
        let b: DataMap = [("age", 60), ("id", 1)].into_iter().collect();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_params_skip_nulls() {
        let map: DataMap = [("id", Value::Int(1)), ("nick", Value::Null), ("name", Value::from("a"))]
            .into_iter()
            .collect();
        assert_eq!(map.params(), vec![Value::Int(1), Value::from("a")]);
    }

    #[test]
    fn test_bind_checks_parameter_type() {
        let mut buf = BytesMut::new();
        let err = Value::Int(5).to_sql_checked(&Type::NUMERIC, &mut buf).err().unwrap();
        assert!(err.is::<WrongType>());
        let err = Value::Text("5".into()).to_sql_checked(&Type::INT8, &mut buf).err().unwrap();
        assert!(err.is::<WrongType>());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_bind_narrows_integers() {
        let mut buf = BytesMut::new();
        assert!(matches!(Value::Int(5).to_sql_checked(&Type::INT4, &mut buf), Ok(IsNull::No)));
        assert_eq!(buf.len(), 4);
        assert!(Value::Int(i64::MAX).to_sql_checked(&Type::INT2, &mut buf).is_err());
        assert!(matches!(Value::Null.to_sql_checked(&Type::NUMERIC, &mut buf), Ok(IsNull::Yes)));
    }

    #[test]
    fn test_serialize_to_json() {
        let map: DataMap = [("id", Value::Int(1)), ("name", Value::from("Leng"))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Leng"}"#);
    }
}
