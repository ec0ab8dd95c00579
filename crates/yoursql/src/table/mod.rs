//! Table facade.
//!
//! [`DbTable`] binds a table name to the chain builders. [`DbTableQuery`] adds
//! a shared [`SqlValuesCreator`] so rows can be passed as [`Record`]s instead
//! of pre-rendered SQL. [`YourTable`] adds column metadata on top of that.
//!
//! ```ignore
//! use std::sync::Arc;
//! use yoursql::{DbTableQuery, SqlValuesCreator, record};
//!
//! let users = DbTableQuery::new("users", Arc::new(SqlValuesCreator::new()));
//! let sql = users
//!     .insert_rows(&[record! { "name" => "alice", "age" => 30 }])?
//!     .returning("id")?;
//! assert_eq!(sql.to_string(), "INSERT INTO users(name,age)\nVALUES\n('alice',30)\nRETURNING id");
//! # Ok::<(), yoursql::SqlError>(())
//! ```

mod defined;

#[cfg(test)]
mod tests;

pub use defined::{ColumnMeta, TableDefined, TypeChecker, YourTable};

use crate::error::SqlResult;
use crate::statement::state::{delete, insert, select, update};
use crate::statement::{
    ColumnList, DeleteChain, InsertChain, SelectChain, SelectColumns, SqlFragment, UpdateChain,
    UpdateSet,
};
use crate::values::{Record, SqlValue, SqlValuesCreator, ValuesColumns};
use std::sync::Arc;

/// A named table with an optional default column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbTable {
    name: String,
    columns: Vec<String>,
}

impl DbTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Set the columns used by [`DbTable::select_all`].
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `SELECT <columns> FROM <table>`.
    pub fn select(&self, columns: impl Into<SelectColumns>) -> SqlResult<SelectChain<select::AfterFrom>> {
        Ok(crate::statement::select(columns)?.from(self.name.as_str()))
    }

    /// `SELECT <columns> FROM <table> AS <alias>`.
    pub fn select_as(
        &self,
        columns: impl Into<SelectColumns>,
        alias: &str,
    ) -> SqlResult<SelectChain<select::AfterFrom>> {
        Ok(crate::statement::select(columns)?.from_as(self.name.as_str(), alias))
    }

    /// Select the configured columns, or `*` if none are configured.
    pub fn select_all(&self) -> SqlResult<SelectChain<select::AfterFrom>> {
        if self.columns.is_empty() {
            self.select("*")
        } else {
            self.select(self.columns.clone())
        }
    }

    /// `INSERT INTO <table>(<columns>) VALUES <values>` with pre-rendered tuples.
    pub fn insert(
        &self,
        columns: impl Into<ColumnList>,
        values: impl AsRef<str>,
    ) -> SqlResult<InsertChain<insert::AfterValues>> {
        Ok(crate::statement::insert_into(&self.name, columns)?.values(values))
    }

    /// `INSERT INTO <table>(<columns>) <query>`.
    pub fn insert_select(
        &self,
        columns: impl Into<ColumnList>,
        query: impl SqlFragment,
    ) -> SqlResult<InsertChain<insert::AfterValues>> {
        Ok(crate::statement::insert_into(&self.name, columns)?.select(query))
    }

    /// `UPDATE <table> SET ...`.
    pub fn update(&self, set: impl Into<UpdateSet>) -> SqlResult<UpdateChain<update::AfterSet>> {
        crate::statement::update(&self.name).set(set)
    }

    /// `DELETE FROM <table>`.
    pub fn delete(&self) -> DeleteChain<delete::AfterDelete> {
        crate::statement::delete_from(&self.name)
    }
}

/// A [`DbTable`] that encodes host values through a shared [`SqlValuesCreator`].
#[derive(Debug, Clone)]
pub struct DbTableQuery {
    table: DbTable,
    creator: Arc<SqlValuesCreator>,
}

impl DbTableQuery {
    pub fn new(name: impl Into<String>, creator: Arc<SqlValuesCreator>) -> Self {
        Self::from_table(DbTable::new(name), creator)
    }

    pub fn from_table(table: DbTable, creator: Arc<SqlValuesCreator>) -> Self {
        Self { table, creator }
    }

    pub fn table(&self) -> &DbTable {
        &self.table
    }

    pub fn creator(&self) -> &SqlValuesCreator {
        &self.creator
    }

    /// Insert rows, taking the column set from the union of their keys.
    pub fn insert_rows(&self, rows: &[Record]) -> SqlResult<InsertChain<insert::AfterValues>> {
        self.insert_rows_with(rows, ValuesColumns::Auto)
    }

    /// Insert rows with an explicit column list or per-column hints.
    pub fn insert_rows_with(
        &self,
        rows: &[Record],
        columns: impl Into<ValuesColumns>,
    ) -> SqlResult<InsertChain<insert::AfterValues>> {
        let list = self.creator.rows_to_values_list(rows, &columns.into(), false)?;
        self.table.insert(list.columns.as_slice(), &list)
    }

    /// `UPDATE ... SET` from host values; each value is encoded as a literal
    /// and absent (`DEFAULT`) values are skipped.
    pub fn update_values(&self, values: &Record) -> SqlResult<UpdateChain<update::AfterSet>> {
        let mut set = Record::new();
        for (column, value) in values.iter() {
            if value.is_default() {
                continue;
            }
            let literal = self.creator.encode(value).map_err(|e| e.in_row(0, column))?;
            set.insert(column, SqlValue::Text(literal));
        }
        self.table.update(set)
    }

    /// `SELECT ... FROM <table>`, see [`DbTable::select`].
    pub fn select(&self, columns: impl Into<SelectColumns>) -> SqlResult<SelectChain<select::AfterFrom>> {
        self.table.select(columns)
    }

    /// `DELETE FROM <table>`.
    pub fn delete(&self) -> DeleteChain<delete::AfterDelete> {
        self.table.delete()
    }
}
