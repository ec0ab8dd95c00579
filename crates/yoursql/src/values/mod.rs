//! Value encoding: host values to SQL literals.
//!
//! [`SqlValuesCreator`] turns a [`SqlValue`] into SQL text. Primitive values are
//! rendered directly; object values go through an ordered transformer registry
//! where the first matching entry wins, so a broad predicate registered early
//! shadows narrower ones registered later.
//!
//! # Example
//!
//! ```ignore
//! use yoursql::{SqlValuesCreator, SqlValue};
//!
//! let v = SqlValuesCreator::new();
//! assert_eq!(v.to_sql_str("it's")?, "'it''s'");
//! assert_eq!(v.to_sql_str(vec![1, 2])?, "ARRAY[1,2]");
//! assert_eq!(v.encode(&SqlValue::Default)?, "DEFAULT");
//! # Ok::<(), yoursql::SqlError>(())
//! ```

mod bulk;
mod value;

#[cfg(test)]
mod tests;

pub use bulk::{ColumnToValueConfig, ValuesColumns, ValuesList};
pub use value::{ManualType, ObjectClass, Record, SqlObject, SqlValue, ValueKind};

use crate::error::{SqlError, SqlResult};
use chrono::SecondsFormat;
use std::fmt;
use std::sync::Arc;

/// Encoder callback: receives the creator so it can encode nested values.
pub type EncodeFn = Arc<dyn Fn(&SqlValuesCreator, &SqlValue) -> SqlResult<String> + Send + Sync>;

/// Match callback deciding whether a transformer claims a value.
pub type MatchFn = Arc<dyn Fn(&SqlValue) -> bool + Send + Sync>;

#[derive(Clone)]
struct Transformer {
    class: ObjectClass,
    matches: MatchFn,
    encode: EncodeFn,
}

/// Encodes values into SQL literals using a per-instance transformer registry.
///
/// Build one at startup, configure it, and share it (e.g. behind an `Arc`).
#[derive(Clone)]
pub struct SqlValuesCreator {
    transformers: Vec<Transformer>,
}

impl Default for SqlValuesCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SqlValuesCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlValuesCreator")
            .field(
                "transformers",
                &self.transformers.iter().map(|t| t.class.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SqlValuesCreator {
    /// Create a creator with the built-in `Array` and `Date` transformers.
    pub fn new() -> Self {
        let mut creator = Self::empty();
        creator
            .set_transformer(ObjectClass::Array, |c: &SqlValuesCreator, v: &SqlValue| match v {
                SqlValue::Array(items) => c.encode_array(items),
                other => Err(SqlError::type_mismatch(ObjectClass::Array, other.kind())),
            })
            .set_transformer(ObjectClass::Date, |_: &SqlValuesCreator, v: &SqlValue| match v {
                SqlValue::Date(d) => Ok(quote(&d.to_rfc3339_opts(SecondsFormat::Millis, true))),
                other => Err(SqlError::type_mismatch(ObjectClass::Date, other.kind())),
            });
        creator
    }

    /// Create a creator with an empty registry.
    pub fn empty() -> Self {
        Self {
            transformers: Vec::new(),
        }
    }

    /// Register an encoder for values of exactly `class`.
    ///
    /// An existing entry for the same class is replaced in place, keeping its
    /// position in the lookup order.
    pub fn set_transformer<F>(&mut self, class: ObjectClass, encode: F) -> &mut Self
    where
        F: Fn(&SqlValuesCreator, &SqlValue) -> SqlResult<String> + Send + Sync + 'static,
    {
        self.set_transformer_when(class, move |v: &SqlValue| v.class() == Some(class), encode)
    }

    /// Register an encoder with a custom match predicate.
    ///
    /// Use this for subtype-style matching, e.g. one encoder for several
    /// related user types. `class` is still the key for asserted lookups.
    pub fn set_transformer_when<M, F>(&mut self, class: ObjectClass, matches: M, encode: F) -> &mut Self
    where
        M: Fn(&SqlValue) -> bool + Send + Sync + 'static,
        F: Fn(&SqlValuesCreator, &SqlValue) -> SqlResult<String> + Send + Sync + 'static,
    {
        self.put(Transformer {
            class,
            matches: Arc::new(matches),
            encode: Arc::new(encode),
        })
    }

    /// Register several exact-class encoders at once, in iteration order.
    pub fn set_transformers<I>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (ObjectClass, EncodeFn)>,
    {
        for (class, encode) in entries {
            self.put(Transformer {
                class,
                matches: Arc::new(move |v: &SqlValue| v.class() == Some(class)),
                encode,
            });
        }
        self
    }

    fn put(&mut self, entry: Transformer) -> &mut Self {
        tracing::trace!(target: "yoursql.values", class = entry.class.name(), "set transformer");
        match self.transformers.iter_mut().find(|t| t.class == entry.class) {
            Some(slot) => *slot = entry,
            None => self.transformers.push(entry),
        }
        self
    }

    /// Remove the encoder registered for `class`. Returns whether one existed.
    pub fn remove_transformer(&mut self, class: ObjectClass) -> bool {
        let before = self.transformers.len();
        self.transformers.retain(|t| t.class != class);
        before != self.transformers.len()
    }

    pub fn has_transformer(&self, class: ObjectClass) -> bool {
        self.transformers.iter().any(|t| t.class == class)
    }

    /// Encode anything convertible into a [`SqlValue`].
    pub fn to_sql_str(&self, value: impl Into<SqlValue>) -> SqlResult<String> {
        self.encode(&value.into())
    }

    /// Encode a value by its runtime category.
    pub fn encode(&self, value: &SqlValue) -> SqlResult<String> {
        Ok(match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Default => "DEFAULT".to_string(),
            SqlValue::Bool(true) => "TRUE".to_string(),
            SqlValue::Bool(false) => "FALSE".to_string(),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::BigInt(n) => n.to_string(),
            SqlValue::Float(n) => format_float(*n),
            SqlValue::Text(s) => quote(s),
            SqlValue::Date(_) | SqlValue::Array(_) | SqlValue::Json(_) | SqlValue::Object(_) => {
                return self.encode_object(value);
            }
        })
    }

    /// Encode a value under an explicit type hint.
    ///
    /// `NULL` and `DEFAULT` pass through under every hint. A primitive hint
    /// must match the value's kind; a class hint must have a registered
    /// transformer, except [`ObjectClass::Json`] which falls back to a JSON literal.
    pub fn encode_as(&self, value: &SqlValue, assert_type: &ManualType) -> SqlResult<String> {
        if value.is_nullish() {
            return self.encode(value);
        }
        let class = match assert_type {
            ManualType::Class(class) => *class,
            primitive => {
                let actual = value.kind();
                if actual != primitive.kind() {
                    return Err(SqlError::type_mismatch(primitive, actual));
                }
                return self.encode(value);
            }
        };
        if value.kind() != ValueKind::Object {
            return Err(SqlError::type_mismatch(class, value.kind()));
        }
        match self.transformers.iter().find(|t| t.class == class) {
            Some(t) if (t.matches)(value) => (t.encode)(self, value),
            Some(_) => Err(SqlError::type_mismatch(
                class,
                value.class().map_or("object", |c| c.name()),
            )),
            None if class == ObjectClass::Json => self.encode_json_fallback(value),
            None => Err(SqlError::UnregisteredType(class.name().to_string())),
        }
    }

    /// Encode an optional hint: `None` means automatic dispatch.
    pub fn encode_with(&self, value: &SqlValue, assert_type: Option<&ManualType>) -> SqlResult<String> {
        match assert_type {
            Some(t) => self.encode_as(value, t),
            None => self.encode(value),
        }
    }

    /// Render an `ARRAY[...]` literal.
    ///
    /// The element type is inferred from the first non-NULL/DEFAULT element and
    /// held for the rest of the array, so a later element of another type is
    /// encoded under the first one's hint and fails. An object element takes
    /// the class of the transformer that claims it, or the plain-object class
    /// when none does. An empty array is `NULL`.
    pub fn encode_array(&self, items: &[SqlValue]) -> SqlResult<String> {
        if items.is_empty() {
            return Ok("NULL".to_string());
        }
        let mut element_type: Option<ManualType> = None;
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            if element_type.is_none() {
                element_type = self.element_type(item);
            }
            parts.push(self.encode_with(item, element_type.as_ref())?);
        }
        Ok(format!("ARRAY[{}]", parts.join(",")))
    }

    fn element_type(&self, item: &SqlValue) -> Option<ManualType> {
        if item.kind() != ValueKind::Object {
            return ManualType::of(item);
        }
        let class = self
            .transformers
            .iter()
            .find(|t| (t.matches)(item))
            .map_or(ObjectClass::Json, |t| t.class);
        Some(ManualType::Class(class))
    }

    fn encode_object(&self, value: &SqlValue) -> SqlResult<String> {
        match self.transformers.iter().find(|t| (t.matches)(value)) {
            Some(t) => (t.encode)(self, value),
            None => self.encode_json_fallback(value),
        }
    }

    fn encode_json_fallback(&self, value: &SqlValue) -> SqlResult<String> {
        match value.to_json() {
            Some(json) => Ok(quote(&json.to_string())),
            None => Err(SqlError::UnsupportedType(
                value.class().map_or_else(|| value.kind().to_string(), |c| c.name().to_string()),
            )),
        }
    }
}

/// Quote a string as a SQL literal, doubling embedded single quotes.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else {
        n.to_string()
    }
}
