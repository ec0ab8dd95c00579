//! DELETE chain: `delete_from ─using─▶ AfterUsing ─where─▶ AfterWhere ─returning─▶ SqlStatement`.

use super::clause::{ColumnList, Conditions, Joiner, SelectColumns, where_clause};
use super::{SqlStatement, returning_clause};
use crate::error::SqlResult;
use std::marker::PhantomData;

/// Grammar positions of a DELETE statement.
pub mod state {
    mod sealed {
        pub trait Sealed {}
    }

    #[derive(Debug)]
    pub enum AfterDelete {}
    #[derive(Debug)]
    pub enum AfterUsing {}
    #[derive(Debug)]
    pub enum AfterWhere {}

    /// States that accept `where_`.
    pub trait CanWhere: sealed::Sealed {}
    /// States that accept `returning`.
    pub trait CanReturning: sealed::Sealed {}

    impl sealed::Sealed for AfterDelete {}
    impl sealed::Sealed for AfterUsing {}
    impl sealed::Sealed for AfterWhere {}

    impl CanWhere for AfterDelete {}
    impl CanWhere for AfterUsing {}

    impl CanReturning for AfterDelete {}
    impl CanReturning for AfterUsing {}
    impl CanReturning for AfterWhere {}
}

use state::*;

/// A DELETE statement under construction, positioned at grammar state `S`.
pub struct DeleteChain<S> {
    stmt: SqlStatement,
    _state: PhantomData<fn() -> S>,
}

chain_common!(DeleteChain);

/// Start a DELETE: `DELETE FROM <table>`.
pub fn delete_from(table: &str) -> DeleteChain<AfterDelete> {
    DeleteChain::start(String::new(), table)
}

impl DeleteChain<AfterDelete> {
    pub(crate) fn start(mut prefix: String, table: &str) -> Self {
        prefix.push_str("DELETE FROM ");
        prefix.push_str(table);
        Self::from_statement(SqlStatement::new(prefix))
    }

    /// `USING <tables>`; an empty list adds nothing.
    pub fn using(&self, tables: impl Into<ColumnList>) -> DeleteChain<AfterUsing> {
        match tables.into().render() {
            Some(tables) => self.then(&format!("\nUSING {tables}")),
            None => self.then(""),
        }
    }
}

impl<S: CanWhere> DeleteChain<S> {
    pub fn where_(&self, conditions: impl Into<Conditions>) -> DeleteChain<AfterWhere> {
        self.then(&where_clause(&conditions.into(), Joiner::And))
    }

    pub fn where_or(&self, conditions: impl Into<Conditions>) -> DeleteChain<AfterWhere> {
        self.then(&where_clause(&conditions.into(), Joiner::Or))
    }
}

impl<S: CanReturning> DeleteChain<S> {
    pub fn returning(&self, columns: impl Into<SelectColumns>) -> SqlResult<SqlStatement> {
        let clause = returning_clause(&columns.into())?;
        Ok(self.stmt.extend(&clause))
    }
}
