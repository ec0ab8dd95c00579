//! Host values accepted by the encoder.

use crate::error::{SqlError, SqlResult};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Runtime category of a [`SqlValue`], the counterpart of a `typeof` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Null,
    Boolean,
    Number,
    BigInt,
    String,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::BigInt => "bigint",
            ValueKind::String => "string",
            ValueKind::Object => "object",
        })
    }
}

/// Identifies the class of an object value.
///
/// `Json` is the generic "plain object" marker: values of that class fall
/// back to a quoted JSON literal when no transformer claims them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Array,
    Date,
    Json,
    Custom { id: TypeId, name: &'static str },
}

impl ObjectClass {
    /// Class of a user type stored in [`SqlValue::Object`].
    pub fn of<T: Any>() -> Self {
        ObjectClass::Custom {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ObjectClass::Array => "Array",
            ObjectClass::Date => "Date",
            ObjectClass::Json => "Object",
            ObjectClass::Custom { name, .. } => name,
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Explicit type hint that overrides automatic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManualType {
    BigInt,
    Number,
    String,
    Boolean,
    Object,
    Class(ObjectClass),
}

impl ManualType {
    /// The hint that describes `value` exactly, or `None` for NULL/DEFAULT.
    pub fn of(value: &SqlValue) -> Option<Self> {
        match value.kind() {
            ValueKind::Undefined | ValueKind::Null => None,
            ValueKind::Boolean => Some(ManualType::Boolean),
            ValueKind::Number => Some(ManualType::Number),
            ValueKind::BigInt => Some(ManualType::BigInt),
            ValueKind::String => Some(ManualType::String),
            ValueKind::Object => value.class().map(ManualType::Class),
        }
    }

    /// The `typeof` tag this hint requires.
    pub fn kind(&self) -> ValueKind {
        match self {
            ManualType::BigInt => ValueKind::BigInt,
            ManualType::Number => ValueKind::Number,
            ManualType::String => ValueKind::String,
            ManualType::Boolean => ValueKind::Boolean,
            ManualType::Object | ManualType::Class(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ManualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManualType::Class(class) => write!(f, "{class}"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// A user-defined value, encoded through a registered transformer.
#[derive(Clone)]
pub struct SqlObject {
    class: ObjectClass,
    value: Arc<dyn Any + Send + Sync>,
    json: Option<serde_json::Value>,
}

impl SqlObject {
    /// Wrap a value that has no JSON form; it must be claimed by a transformer.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            class: ObjectClass::of::<T>(),
            value: Arc::new(value),
            json: None,
        }
    }

    /// Wrap a value and remember its JSON form as the encoding fallback.
    pub fn with_json<T>(value: T) -> SqlResult<Self>
    where
        T: Any + Send + Sync + serde::Serialize,
    {
        let json = serde_json::to_value(&value)
            .map_err(|e| SqlError::UnsupportedType(format!("{}: {e}", std::any::type_name::<T>())))?;
        Ok(Self {
            class: ObjectClass::of::<T>(),
            value: Arc::new(value),
            json: Some(json),
        })
    }

    pub fn class(&self) -> ObjectClass {
        self.class
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }
}

impl fmt::Debug for SqlObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlObject")
            .field("class", &self.class.name())
            .field("json", &self.json)
            .finish()
    }
}

/// Any value that can be turned into a SQL literal.
#[derive(Debug, Clone, Default)]
pub enum SqlValue {
    /// Renders as `NULL`.
    Null,
    /// An absent value; renders as `DEFAULT`.
    #[default]
    Default,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigInt(i128),
    Text(String),
    Date(DateTime<Utc>),
    Array(Vec<SqlValue>),
    /// A plain object; renders as a quoted JSON literal unless a transformer claims it.
    Json(serde_json::Value),
    Object(SqlObject),
}

impl SqlValue {
    /// Wrap a user type (see [`SqlObject::new`]).
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        SqlValue::Object(SqlObject::new(value))
    }

    /// Serialize any value into its JSON shape (objects become [`SqlValue::Json`]).
    pub fn from_serialize<T: serde::Serialize + ?Sized>(value: &T) -> SqlResult<Self> {
        serde_json::to_value(value)
            .map(SqlValue::from)
            .map_err(|e| SqlError::UnsupportedType(e.to_string()))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            SqlValue::Default => ValueKind::Undefined,
            SqlValue::Null => ValueKind::Null,
            SqlValue::Bool(_) => ValueKind::Boolean,
            SqlValue::Int(_) | SqlValue::Float(_) => ValueKind::Number,
            SqlValue::BigInt(_) => ValueKind::BigInt,
            SqlValue::Text(_) => ValueKind::String,
            SqlValue::Date(_) | SqlValue::Array(_) | SqlValue::Json(_) | SqlValue::Object(_) => {
                ValueKind::Object
            }
        }
    }

    /// Object class, for object values only.
    pub fn class(&self) -> Option<ObjectClass> {
        match self {
            SqlValue::Array(_) => Some(ObjectClass::Array),
            SqlValue::Date(_) => Some(ObjectClass::Date),
            SqlValue::Json(_) => Some(ObjectClass::Json),
            SqlValue::Object(obj) => Some(obj.class()),
            _ => None,
        }
    }

    /// `true` for `Null` and `Default`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, SqlValue::Null | SqlValue::Default)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, SqlValue::Default)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON form used by the plain-object fallback, if the value has one.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as Json;
        Some(match self {
            SqlValue::Null | SqlValue::Default => Json::Null,
            SqlValue::Bool(b) => Json::Bool(*b),
            SqlValue::Int(n) => Json::from(*n),
            SqlValue::Float(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            SqlValue::BigInt(n) => Json::from(i64::try_from(*n).ok()?),
            SqlValue::Text(s) => Json::String(s.clone()),
            SqlValue::Date(d) => Json::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            SqlValue::Array(items) => {
                Json::Array(items.iter().map(SqlValue::to_json).collect::<Option<_>>()?)
            }
            SqlValue::Json(v) => v.clone(),
            SqlValue::Object(obj) => obj.json()?.clone(),
        })
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                SqlValue::Int(v.into())
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::BigInt(v.into())
    }
}

impl From<i128> for SqlValue {
    fn from(v: i128) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Float(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Date(v)
    }
}

impl From<uuid::Uuid> for SqlValue {
    fn from(v: uuid::Uuid) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<SqlObject> for SqlValue {
    fn from(v: SqlObject) -> Self {
        SqlValue::Object(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for SqlValue {
    fn from(v: Vec<T>) -> Self {
        SqlValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => SqlValue::Null,
            Json::Bool(b) => SqlValue::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => match n.as_u64() {
                    Some(u) => SqlValue::BigInt(u.into()),
                    None => SqlValue::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
            },
            Json::String(s) => SqlValue::Text(s),
            Json::Array(items) => SqlValue::Array(items.into_iter().map(SqlValue::from).collect()),
            obj @ Json::Object(_) => SqlValue::Json(obj),
        }
    }
}

/// One row of named values, in insertion order.
///
/// A key that is absent reads as [`SqlValue::Default`].
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: IndexMap<String, SqlValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&SqlValue> {
        self.values.get(key)
    }

    /// Value for `key`, with absent keys reading as `DEFAULT`.
    pub fn value(&self, key: &str) -> &SqlValue {
        const DEFAULT: &SqlValue = &SqlValue::Default;
        self.values.get(key).unwrap_or(DEFAULT)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a row from a serializable struct or map; field order is kept.
    pub fn from_serialize<T: serde::Serialize + ?Sized>(value: &T) -> SqlResult<Self> {
        let json = serde_json::to_value(value).map_err(|e| SqlError::UnsupportedType(e.to_string()))?;
        match json {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(SqlError::type_mismatch("object", json_kind(&other))),
        }
    }
}

fn json_kind(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Array(_) => "array".to_string(),
        other => SqlValue::from(other.clone()).kind().to_string(),
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Build a [`Record`] from `key => value` pairs.
///
/// ```ignore
/// let row = yoursql::record! { "id" => 1, "name" => "alice" };
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut __row = $crate::Record::new();
        $( __row.insert($key, $value); )+
        __row
    }};
}
