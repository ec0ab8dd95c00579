//! UPDATE chain: `update ─set─▶ AfterSet ─from─▶ AfterFrom ─where─▶ AfterWhere ─returning─▶ SqlStatement`.

use super::clause::{ColumnList, Conditions, Joiner, SelectColumns, UpdateSet, where_clause};
use super::{SqlStatement, returning_clause};
use crate::error::SqlResult;
use std::marker::PhantomData;

/// Grammar positions of an UPDATE statement.
pub mod state {
    mod sealed {
        pub trait Sealed {}
    }

    #[derive(Debug)]
    pub enum AfterUpdate {}
    #[derive(Debug)]
    pub enum AfterSet {}
    #[derive(Debug)]
    pub enum AfterFrom {}
    #[derive(Debug)]
    pub enum AfterWhere {}

    /// States that accept `where_`.
    pub trait CanWhere: sealed::Sealed {}
    /// States that accept `returning`.
    pub trait CanReturning: sealed::Sealed {}

    impl sealed::Sealed for AfterSet {}
    impl sealed::Sealed for AfterFrom {}
    impl sealed::Sealed for AfterWhere {}

    impl CanWhere for AfterSet {}
    impl CanWhere for AfterFrom {}

    impl CanReturning for AfterSet {}
    impl CanReturning for AfterFrom {}
    impl CanReturning for AfterWhere {}
}

use state::*;

/// An UPDATE statement under construction, positioned at grammar state `S`.
pub struct UpdateChain<S> {
    stmt: SqlStatement,
    _state: PhantomData<fn() -> S>,
}

chain_common!(UpdateChain);

/// Start an UPDATE: `UPDATE <table>`.
pub fn update(table: &str) -> UpdateChain<AfterUpdate> {
    UpdateChain::start(String::new(), table)
}

impl UpdateChain<AfterUpdate> {
    pub(crate) fn start(mut prefix: String, table: &str) -> Self {
        prefix.push_str("UPDATE ");
        prefix.push_str(table);
        Self::from_statement(SqlStatement::new(prefix))
    }

    /// The SET clause, raw (`"SET a = 1"`) or from a column map.
    pub fn set(&self, set: impl Into<UpdateSet>) -> SqlResult<UpdateChain<AfterSet>> {
        let set = set.into().render()?;
        Ok(self.then(&format!("\n{set}")))
    }
}

impl UpdateChain<AfterSet> {
    /// `FROM <tables>`; an empty list adds nothing.
    pub fn from(&self, tables: impl Into<ColumnList>) -> UpdateChain<AfterFrom> {
        match tables.into().render() {
            Some(tables) => self.then(&format!("\nFROM {tables}")),
            None => self.then(""),
        }
    }
}

impl<S: CanWhere> UpdateChain<S> {
    pub fn where_(&self, conditions: impl Into<Conditions>) -> UpdateChain<AfterWhere> {
        self.then(&where_clause(&conditions.into(), Joiner::And))
    }

    pub fn where_or(&self, conditions: impl Into<Conditions>) -> UpdateChain<AfterWhere> {
        self.then(&where_clause(&conditions.into(), Joiner::Or))
    }
}

impl<S: CanReturning> UpdateChain<S> {
    pub fn returning(&self, columns: impl Into<SelectColumns>) -> SqlResult<SqlStatement> {
        let clause = returning_clause(&columns.into())?;
        Ok(self.stmt.extend(&clause))
    }
}
