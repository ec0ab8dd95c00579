use super::DbTableQuery;
use crate::error::{SqlError, SqlResult};
use crate::statement::state::{insert, update};
use crate::statement::{InsertChain, SqlRaw, UpdateChain};
use crate::values::{
    ColumnToValueConfig, ManualType, ObjectClass, Record, SqlValue, SqlValuesCreator, ValuesColumns,
};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// SQL type used for casts, without the array suffix (e.g. `int8`).
    pub sql_type: String,
    /// Host type the values (or array elements) must have.
    pub value_type: Option<ManualType>,
    pub not_null: bool,
    pub is_array: bool,
    /// Literal the database uses when the column is omitted.
    pub sql_default: Option<String>,
}

impl ColumnMeta {
    pub fn new(sql_type: impl Into<String>) -> Self {
        Self {
            sql_type: sql_type.into(),
            value_type: None,
            not_null: false,
            is_array: false,
            sql_default: None,
        }
    }

    pub fn value_type(mut self, value_type: ManualType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn sql_default(mut self, literal: impl Into<String>) -> Self {
        self.sql_default = Some(literal.into());
        self
    }

    /// Whether an insert must supply a value.
    pub fn is_required(&self) -> bool {
        self.not_null && self.sql_default.is_none()
    }

    /// Full SQL type, with `[]` for array columns.
    pub fn cast_type(&self) -> String {
        if self.is_array {
            format!("{}[]", self.sql_type)
        } else {
            self.sql_type.clone()
        }
    }

    fn to_value_config(&self) -> ColumnToValueConfig {
        let mut config = ColumnToValueConfig::new().sql_type(self.cast_type());
        config.assert_type = if self.is_array {
            Some(ManualType::Class(ObjectClass::Array))
        } else {
            self.value_type
        };
        config.sql_default = self.sql_default.clone();
        config
    }
}

/// A table name with ordered column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefined {
    name: String,
    columns: IndexMap<String, ColumnMeta>,
}

impl TableDefined {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, meta: ColumnMeta) -> Self {
        self.columns.insert(name.into(), meta);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, column: &str) -> Option<&ColumnMeta> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnMeta)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Encoding hints for every column, in declaration order.
    pub fn values_config(&self) -> IndexMap<String, ColumnToValueConfig> {
        self.columns
            .iter()
            .map(|(name, meta)| (name.clone(), meta.to_value_config()))
            .collect()
    }

    pub fn checker(&self) -> TypeChecker<'_> {
        TypeChecker { defined: self }
    }
}

/// Validates rows against [`TableDefined`] metadata.
#[derive(Debug, Clone, Copy)]
pub struct TypeChecker<'a> {
    defined: &'a TableDefined,
}

impl<'a> TypeChecker<'a> {
    pub fn new(defined: &'a TableDefined) -> Self {
        Self { defined }
    }

    /// Check a row for insertion: unknown columns, missing required columns,
    /// `NULL` into `NOT NULL`, and value types.
    pub fn check_insert(&self, row: &Record) -> SqlResult<()> {
        self.check_known(row)?;
        for (name, meta) in &self.defined.columns {
            let value = row.value(name);
            if value.is_default() {
                if meta.is_required() {
                    return Err(self.fail(name, "a value is required"));
                }
                continue;
            }
            self.check_value(name, meta, value)?;
        }
        Ok(())
    }

    /// Check a partial row for an update; absent columns are allowed.
    pub fn check_update(&self, row: &Record) -> SqlResult<()> {
        self.check_known(row)?;
        for (name, value) in row.iter() {
            if value.is_default() {
                continue;
            }
            if let Some(meta) = self.defined.get(name) {
                self.check_value(name, meta, value)?;
            }
        }
        Ok(())
    }

    /// Check every row for insertion, reporting the failing row index.
    pub fn check_rows(&self, rows: &[Record]) -> SqlResult<()> {
        for (index, row) in rows.iter().enumerate() {
            self.check_insert(row).map_err(|e| match e {
                SqlError::Validation(message) => SqlError::Validation(format!("row {index}: {message}")),
                other => other,
            })?;
        }
        Ok(())
    }

    fn check_known(&self, row: &Record) -> SqlResult<()> {
        match row.keys().find(|key| self.defined.get(key).is_none()) {
            Some(key) => Err(self.fail(key, "unknown column")),
            None => Ok(()),
        }
    }

    fn check_value(&self, name: &str, meta: &ColumnMeta, value: &SqlValue) -> SqlResult<()> {
        if matches!(value, SqlValue::Null) {
            if meta.not_null {
                return Err(self.fail(name, "NULL is not allowed"));
            }
            return Ok(());
        }
        if meta.is_array {
            let SqlValue::Array(items) = value else {
                return Err(self.fail(name, &format!("expected an array, got {}", value.kind())));
            };
            for item in items.iter().filter(|item| !item.is_nullish()) {
                self.check_type(name, meta.value_type.as_ref(), item)?;
            }
            return Ok(());
        }
        self.check_type(name, meta.value_type.as_ref(), value)
    }

    fn check_type(&self, name: &str, expected: Option<&ManualType>, value: &SqlValue) -> SqlResult<()> {
        let Some(expected) = expected else {
            return Ok(());
        };
        let ok = match expected {
            ManualType::Class(class) => value.class() == Some(*class),
            other => value.kind() == other.kind(),
        };
        if ok {
            Ok(())
        } else {
            let actual = value.class().map_or_else(|| value.kind().to_string(), |c| c.to_string());
            Err(self.fail(name, &format!("expected {expected}, got {actual}")))
        }
    }

    fn fail(&self, column: &str, message: &str) -> SqlError {
        SqlError::validation(format!("{}.{column}: {message}", self.defined.name))
    }
}

/// A [`DbTableQuery`] with column metadata: rows are validated before they
/// are encoded, and casts come from the declared column types.
#[derive(Debug, Clone)]
pub struct YourTable {
    query: DbTableQuery,
    defined: Arc<TableDefined>,
}

impl YourTable {
    pub fn new(defined: TableDefined, creator: Arc<SqlValuesCreator>) -> Self {
        let table = super::DbTable::new(defined.name()).with_columns(defined.column_names());
        Self {
            query: DbTableQuery::from_table(table, creator),
            defined: Arc::new(defined),
        }
    }

    pub fn query(&self) -> &DbTableQuery {
        &self.query
    }

    pub fn defined(&self) -> &TableDefined {
        &self.defined
    }

    /// Validate and insert rows. Only columns that hold a value in at least
    /// one row are listed; the first tuple carries the column casts.
    pub fn insert_checked(&self, rows: &[Record]) -> SqlResult<InsertChain<insert::AfterValues>> {
        self.defined.checker().check_rows(rows)?;

        let used: IndexSet<&str> = rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|(_, value)| !value.is_default())
            .map(|(key, _)| key)
            .collect();
        let config: IndexMap<String, ColumnToValueConfig> = self
            .defined
            .columns
            .iter()
            .filter(|(name, _)| used.contains(name.as_str()))
            .map(|(name, meta)| (name.clone(), meta.to_value_config()))
            .collect();
        self.query.insert_rows_with(rows, ValuesColumns::Typed(config))
    }

    /// Validate a partial row and build `UPDATE ... SET` from it.
    pub fn update_checked(&self, values: &Record) -> SqlResult<UpdateChain<update::AfterSet>> {
        self.defined.checker().check_update(values)?;
        self.query.update_values(values)
    }

    /// `(VALUES ...) AS alias(<all columns>)` with casts from the column types.
    pub fn values_as(&self, alias: &str, rows: &[Record]) -> SqlResult<SqlRaw> {
        self.defined.checker().check_rows(rows)?;
        self.query
            .creator()
            .build_values_as_clause(alias, rows, &self.defined.values_config())
    }
}
