//! INSERT chain.
//!
//! ```text
//! insert_into ─▶ AfterInsert ─values / select / default_values─▶ AfterValues
//!   AfterValues ─on_conflict─▶ AfterOnConflict ─do_update─▶ AfterDoUpdate ─where─▶ AfterWhere
//!                                              └─do_nothing─▶ AfterDoNothing
//!   (AfterValues | AfterDoUpdate | AfterDoNothing | AfterWhere) ─returning─▶ SqlStatement
//! ```

use super::clause::{ColumnList, Conditions, Joiner, SelectColumns, UpdateSet, where_clause};
use super::{SqlFragment, SqlStatement, returning_clause};
use crate::error::{SqlError, SqlResult};
use std::marker::PhantomData;

/// Grammar positions of an INSERT statement.
pub mod state {
    mod sealed {
        pub trait Sealed {}
    }

    #[derive(Debug)]
    pub enum AfterInsert {}
    #[derive(Debug)]
    pub enum AfterValues {}
    #[derive(Debug)]
    pub enum AfterOnConflict {}
    #[derive(Debug)]
    pub enum AfterDoUpdate {}
    #[derive(Debug)]
    pub enum AfterDoNothing {}
    #[derive(Debug)]
    pub enum AfterWhere {}

    /// States that accept `returning`.
    pub trait CanReturning: sealed::Sealed {}

    impl sealed::Sealed for AfterValues {}
    impl sealed::Sealed for AfterDoUpdate {}
    impl sealed::Sealed for AfterDoNothing {}
    impl sealed::Sealed for AfterWhere {}

    impl CanReturning for AfterValues {}
    impl CanReturning for AfterDoUpdate {}
    impl CanReturning for AfterDoNothing {}
    impl CanReturning for AfterWhere {}
}

use state::*;

/// An INSERT statement under construction, positioned at grammar state `S`.
pub struct InsertChain<S> {
    stmt: SqlStatement,
    _state: PhantomData<fn() -> S>,
}

chain_common!(InsertChain);

/// Start an INSERT: `INSERT INTO <table>(<columns>)`.
///
/// An empty column list fails with [`SqlError::EmptyColumns`]; an empty raw
/// string omits the parenthesised list.
pub fn insert_into(table: &str, columns: impl Into<ColumnList>) -> SqlResult<InsertChain<AfterInsert>> {
    InsertChain::start(String::new(), table, &columns.into())
}

impl InsertChain<AfterInsert> {
    pub(crate) fn start(mut prefix: String, table: &str, columns: &ColumnList) -> SqlResult<Self> {
        if matches!(columns, ColumnList::List(list) if list.is_empty()) {
            return Err(SqlError::EmptyColumns);
        }
        prefix.push_str("INSERT INTO ");
        prefix.push_str(table);
        if let Some(cols) = columns.render() {
            prefix.push('(');
            prefix.push_str(&cols);
            prefix.push(')');
        }
        Ok(Self::from_statement(SqlStatement::new(prefix)))
    }

    /// `VALUES` followed by pre-rendered row tuples, e.g. a [`ValuesList`](crate::ValuesList).
    pub fn values(&self, rows: impl AsRef<str>) -> InsertChain<AfterValues> {
        self.then(&format!("\nVALUES\n{}", rows.as_ref()))
    }

    /// Insert the rows of a query.
    pub fn select(&self, query: impl SqlFragment) -> InsertChain<AfterValues> {
        self.then(&format!("\n{}", query.gen_sql()))
    }

    pub fn default_values(&self) -> InsertChain<AfterValues> {
        self.then("\nDEFAULT VALUES")
    }
}

impl InsertChain<AfterValues> {
    /// `ON CONFLICT (<columns>)`; an empty list leaves the target out.
    pub fn on_conflict(&self, columns: impl Into<ColumnList>) -> InsertChain<AfterOnConflict> {
        match columns.into().render() {
            Some(cols) => self.then(&format!("\nON CONFLICT ({cols})")),
            None => self.then("\nON CONFLICT"),
        }
    }
}

impl InsertChain<AfterOnConflict> {
    /// `DO UPDATE SET ...` from a raw SET clause or a column map.
    pub fn do_update(&self, set: impl Into<UpdateSet>) -> SqlResult<InsertChain<AfterDoUpdate>> {
        let set = set.into().render()?;
        Ok(self.then(&format!("\nDO UPDATE {set}")))
    }

    pub fn do_nothing(&self) -> InsertChain<AfterDoNothing> {
        self.then(" DO NOTHING")
    }
}

impl InsertChain<AfterDoUpdate> {
    pub fn where_(&self, conditions: impl Into<Conditions>) -> InsertChain<AfterWhere> {
        self.then(&where_clause(&conditions.into(), Joiner::And))
    }

    pub fn where_or(&self, conditions: impl Into<Conditions>) -> InsertChain<AfterWhere> {
        self.then(&where_clause(&conditions.into(), Joiner::Or))
    }
}

impl<S: CanReturning> InsertChain<S> {
    pub fn returning(&self, columns: impl Into<SelectColumns>) -> SqlResult<SqlStatement> {
        let clause = returning_clause(&columns.into())?;
        Ok(self.stmt.extend(&clause))
    }
}
