//! Row assembly: records to `VALUES` tuples and `(VALUES ...) AS t(cols)` sub-selects.

use super::{ManualType, Record, SqlValuesCreator};
use crate::error::{SqlError, SqlResult};
use crate::statement::SqlRaw;
use indexmap::{IndexMap, IndexSet};

/// Per-column encoding hint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnToValueConfig {
    /// Appends `::sql_type` to the value (first row only in multi-row lists).
    pub sql_type: Option<String>,
    /// Asserted type; a mismatching value fails to encode.
    pub assert_type: Option<ManualType>,
    /// Literal used in place of an absent value (`VALUES ... AS` only).
    pub sql_default: Option<String>,
}

impl ColumnToValueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    pub fn assert_type(mut self, assert_type: ManualType) -> Self {
        self.assert_type = Some(assert_type);
        self
    }

    pub fn sql_default(mut self, literal: impl Into<String>) -> Self {
        self.sql_default = Some(literal.into());
        self
    }
}

/// Which columns of a record to encode, and how.
#[derive(Debug, Clone, Default)]
pub enum ValuesColumns {
    /// Every key present in the input rows.
    #[default]
    Auto,
    /// An explicit ordered column list.
    Keys(Vec<String>),
    /// An explicit ordered column list with per-column hints.
    Typed(IndexMap<String, ColumnToValueConfig>),
}

impl From<Vec<String>> for ValuesColumns {
    fn from(keys: Vec<String>) -> Self {
        ValuesColumns::Keys(keys)
    }
}

impl From<Vec<&str>> for ValuesColumns {
    fn from(keys: Vec<&str>) -> Self {
        ValuesColumns::Keys(keys.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ValuesColumns {
    fn from(keys: &[&str]) -> Self {
        ValuesColumns::Keys(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ValuesColumns {
    fn from(keys: [&str; N]) -> Self {
        ValuesColumns::Keys(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl From<IndexMap<String, ColumnToValueConfig>> for ValuesColumns {
    fn from(config: IndexMap<String, ColumnToValueConfig>) -> Self {
        ValuesColumns::Typed(config)
    }
}

/// Output of [`SqlValuesCreator::rows_to_values_list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuesList {
    /// Column names, in tuple order.
    pub columns: Vec<String>,
    /// Row tuples, `(..),\n(..)`.
    pub text: String,
}

impl AsRef<str> for ValuesList {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for ValuesList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl SqlValuesCreator {
    /// Encode one row as comma-joined values (without parentheses).
    ///
    /// With [`ValuesColumns::Typed`] every value is checked against its
    /// `assert_type` and followed by its `::sql_type` cast.
    pub fn row_to_values(&self, row: &Record, columns: &ValuesColumns) -> SqlResult<String> {
        match columns {
            ValuesColumns::Auto => {
                let mut parts = Vec::with_capacity(row.len());
                for (key, value) in row.iter() {
                    parts.push(self.encode(value).map_err(|e| e.in_row(0, key))?);
                }
                Ok(parts.join(","))
            }
            ValuesColumns::Keys(keys) => self.encode_keys(row, keys).map_err(|(col, e)| e.in_row(0, col)),
            ValuesColumns::Typed(config) => {
                self.encode_typed(row, config, true).map_err(|(col, e)| e.in_row(0, col))
            }
        }
    }

    /// Encode many rows into `VALUES` tuples.
    ///
    /// With [`ValuesColumns::Auto`] the column set is the union of keys that
    /// hold a non-`DEFAULT` value in at least one row, in first-seen order. Set
    /// `keep_undefined_key` to keep keys that are `DEFAULT` everywhere. Keys a
    /// row lacks encode as `DEFAULT`. Typed casts are emitted on the first row
    /// only, and never on a `DEFAULT`.
    pub fn rows_to_values_list(
        &self,
        rows: &[Record],
        columns: &ValuesColumns,
        keep_undefined_key: bool,
    ) -> SqlResult<ValuesList> {
        if rows.is_empty() {
            return Err(SqlError::EmptyInput("rows_to_values_list requires at least one row".into()));
        }
        let keys: Vec<String> = match columns {
            ValuesColumns::Auto => union_keys(rows, keep_undefined_key),
            ValuesColumns::Keys(keys) => keys.clone(),
            ValuesColumns::Typed(config) => config.keys().cloned().collect(),
        };

        let mut tuples = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let encoded = match columns {
                ValuesColumns::Typed(config) => self.encode_typed(row, config, index == 0),
                _ => self.encode_keys(row, &keys),
            };
            let encoded = encoded.map_err(|(col, e)| e.in_row(index, col))?;
            tuples.push(format!("({encoded})"));
        }

        Ok(ValuesList {
            columns: keys,
            text: tuples.join(",\n"),
        })
    }

    /// Build `(VALUES (..),(..)) AS alias(col,...)` for use as a FROM target.
    ///
    /// Column order follows `column_types`. Absent values take the column's
    /// `sql_default` (or `NULL`), and `::sql_type` casts appear on row 0 only;
    /// PostgreSQL infers the remaining rows from the first.
    pub fn build_values_as_clause(
        &self,
        alias: &str,
        rows: &[Record],
        column_types: &IndexMap<String, ColumnToValueConfig>,
    ) -> SqlResult<SqlRaw> {
        if rows.is_empty() {
            return Err(SqlError::EmptyInput("build_values_as_clause requires at least one row".into()));
        }
        if column_types.is_empty() {
            return Err(SqlError::EmptyColumns);
        }

        let mut tuples = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let mut parts = Vec::with_capacity(column_types.len());
            for (column, config) in column_types {
                let value = row.value(column);
                let mut literal = if value.is_default() {
                    config.sql_default.clone().unwrap_or_else(|| "NULL".to_string())
                } else {
                    self.encode_with(value, config.assert_type.as_ref())
                        .map_err(|e| e.in_row(index, column.as_str()))?
                };
                if index == 0 {
                    if let Some(sql_type) = &config.sql_type {
                        literal.push_str("::");
                        literal.push_str(sql_type);
                    }
                }
                parts.push(literal);
            }
            tuples.push(format!("({})", parts.join(",")));
        }

        let columns: Vec<&str> = column_types.keys().map(String::as_str).collect();
        Ok(SqlRaw::new(format!(
            "(VALUES {}) AS {}({})",
            tuples.join(","),
            alias,
            columns.join(",")
        )))
    }

    fn encode_keys(&self, row: &Record, keys: &[String]) -> Result<String, (String, SqlError)> {
        let mut parts = Vec::with_capacity(keys.len());
        for key in keys {
            parts.push(self.encode(row.value(key)).map_err(|e| (key.clone(), e))?);
        }
        Ok(parts.join(","))
    }

    fn encode_typed(
        &self,
        row: &Record,
        config: &IndexMap<String, ColumnToValueConfig>,
        with_casts: bool,
    ) -> Result<String, (String, SqlError)> {
        let mut parts = Vec::with_capacity(config.len());
        for (key, column) in config {
            let value = row.value(key);
            let mut literal = self
                .encode_with(value, column.assert_type.as_ref())
                .map_err(|e| (key.clone(), e))?;
            // `DEFAULT` cannot carry a cast
            if with_casts && !value.is_default() {
                if let Some(sql_type) = &column.sql_type {
                    literal.push_str("::");
                    literal.push_str(sql_type);
                }
            }
            parts.push(literal);
        }
        Ok(parts.join(","))
    }
}

fn union_keys(rows: &[Record], keep_undefined_key: bool) -> Vec<String> {
    let mut keys: IndexSet<&str> = IndexSet::new();
    for row in rows {
        for (key, value) in row.iter() {
            if keep_undefined_key || !value.is_default() {
                keys.insert(key);
            }
        }
    }
    keys.into_iter().map(str::to_string).collect()
}
