//! SELECT chain.
//!
//! ```text
//! select ─▶ AfterSelect ─from─▶ AfterFrom ⟲ (from / *_join)
//!   AfterFrom ─where─▶ AfterWhere ─group_by─▶ AfterGroupBy ─having─▶ AfterHaving
//!   ─order_by─▶ AfterOrderBy ─limit─▶ SqlStatement
//! ```
//!
//! Any later clause may be reached directly from an earlier state.

use super::clause::{
    ColumnList, Conditions, Joiner, OrderBy, SelectColumns, having_clause, order_by_clause,
    select_columns, where_clause,
};
use super::{Selectable, SqlStatement, limit_clause};
use crate::error::SqlResult;
use crate::values::SqlValue;
use std::borrow::Cow;
use std::marker::PhantomData;

/// Grammar positions of a SELECT statement.
pub mod state {
    mod sealed {
        pub trait Sealed {}
    }

    #[derive(Debug)]
    pub enum AfterSelect {}
    #[derive(Debug)]
    pub enum AfterFrom {}
    #[derive(Debug)]
    pub enum AfterWhere {}
    #[derive(Debug)]
    pub enum AfterGroupBy {}
    #[derive(Debug)]
    pub enum AfterHaving {}
    #[derive(Debug)]
    pub enum AfterOrderBy {}

    /// States that accept `where_`.
    pub trait CanWhere: sealed::Sealed {}
    /// States that accept `group_by`.
    pub trait CanGroupBy: sealed::Sealed {}
    /// States that accept `having`.
    pub trait CanHaving: sealed::Sealed {}
    /// States that accept `order_by`.
    pub trait CanOrderBy: sealed::Sealed {}
    /// States that accept `limit` / `offset`.
    pub trait CanLimit: sealed::Sealed {}

    macro_rules! allow {
        ($marker:ty: $($cap:ident),*) => {
            impl sealed::Sealed for $marker {}
            $(impl $cap for $marker {})*
        };
    }

    allow!(AfterSelect:);
    allow!(AfterFrom: CanWhere, CanGroupBy, CanHaving, CanOrderBy, CanLimit);
    allow!(AfterWhere: CanGroupBy, CanHaving, CanOrderBy, CanLimit);
    allow!(AfterGroupBy: CanHaving, CanOrderBy, CanLimit);
    allow!(AfterHaving: CanOrderBy, CanLimit);
    allow!(AfterOrderBy: CanLimit);
}

use state::*;

/// A SELECT statement under construction, positioned at grammar state `S`.
pub struct SelectChain<S> {
    stmt: SqlStatement,
    _state: PhantomData<fn() -> S>,
}

chain_common!(SelectChain);

impl<S> Selectable for SelectChain<S> {
    fn to_select(&self) -> Cow<'_, str> {
        self.stmt.to_select()
    }
}

/// Start a SELECT: `SELECT <columns>`.
pub fn select(columns: impl Into<SelectColumns>) -> SqlResult<SelectChain<AfterSelect>> {
    SelectChain::start(String::new(), "SELECT ", &columns.into())
}

/// Start a `SELECT DISTINCT`.
pub fn select_distinct(columns: impl Into<SelectColumns>) -> SqlResult<SelectChain<AfterSelect>> {
    SelectChain::start(String::new(), "SELECT DISTINCT ", &columns.into())
}

impl SelectChain<AfterSelect> {
    pub(crate) fn start(
        mut prefix: String,
        keyword: &str,
        columns: &SelectColumns,
    ) -> SqlResult<Self> {
        let columns = select_columns(columns)?;
        prefix.push_str(keyword);
        prefix.push_str(&columns);
        Ok(Self::from_statement(SqlStatement::new(prefix)))
    }

    /// `FROM <target>`.
    pub fn from(&self, target: impl Selectable) -> SelectChain<AfterFrom> {
        self.then(&format!("\nFROM {}", target.to_select()))
    }

    /// `FROM <target> AS <alias>`.
    pub fn from_as(&self, target: impl Selectable, alias: &str) -> SelectChain<AfterFrom> {
        self.then(&format!("\nFROM {} AS {}", target.to_select(), alias))
    }
}

impl SelectChain<AfterFrom> {
    /// Add another FROM item: `,<target>`.
    pub fn from(&self, target: impl Selectable) -> SelectChain<AfterFrom> {
        self.then(&format!(",{}", target.to_select()))
    }

    /// Add another FROM item with an alias.
    pub fn from_as(&self, target: impl Selectable, alias: &str) -> SelectChain<AfterFrom> {
        self.then(&format!(",{} AS {}", target.to_select(), alias))
    }

    pub fn inner_join(&self, target: impl Selectable, on: impl Into<Conditions>) -> SelectChain<AfterFrom> {
        self.join("INNER JOIN", target, on.into())
    }

    pub fn left_join(&self, target: impl Selectable, on: impl Into<Conditions>) -> SelectChain<AfterFrom> {
        self.join("LEFT JOIN", target, on.into())
    }

    pub fn right_join(&self, target: impl Selectable, on: impl Into<Conditions>) -> SelectChain<AfterFrom> {
        self.join("RIGHT JOIN", target, on.into())
    }

    pub fn full_join(&self, target: impl Selectable, on: impl Into<Conditions>) -> SelectChain<AfterFrom> {
        self.join("FULL JOIN", target, on.into())
    }

    pub fn natural_join(&self, target: impl Selectable) -> SelectChain<AfterFrom> {
        self.join("NATURAL JOIN", target, Conditions::None)
    }

    pub fn cross_join(&self, target: impl Selectable) -> SelectChain<AfterFrom> {
        self.join("CROSS JOIN", target, Conditions::None)
    }

    fn join(&self, kind: &str, target: impl Selectable, on: Conditions) -> SelectChain<AfterFrom> {
        let mut sql = format!("\n{kind} {}", target.to_select());
        if let Some(on) = super::clause::condition(&on, Joiner::And) {
            sql.push_str(" ON ");
            sql.push_str(&on);
        }
        self.then(&sql)
    }
}

impl<S: CanWhere> SelectChain<S> {
    /// `WHERE` with list entries joined by `AND`; empty input adds nothing.
    pub fn where_(&self, conditions: impl Into<Conditions>) -> SelectChain<AfterWhere> {
        self.then(&where_clause(&conditions.into(), Joiner::And))
    }

    /// `WHERE` with list entries joined by `OR`.
    pub fn where_or(&self, conditions: impl Into<Conditions>) -> SelectChain<AfterWhere> {
        self.then(&where_clause(&conditions.into(), Joiner::Or))
    }
}

impl<S: CanGroupBy> SelectChain<S> {
    /// `GROUP BY <columns>`; empty input adds nothing.
    pub fn group_by(&self, columns: impl Into<ColumnList>) -> SelectChain<AfterGroupBy> {
        match columns.into().render() {
            Some(cols) => self.then(&format!("\nGROUP BY {cols}")),
            None => self.then(""),
        }
    }
}

impl<S: CanHaving> SelectChain<S> {
    pub fn having(&self, conditions: impl Into<Conditions>) -> SelectChain<AfterHaving> {
        self.then(&having_clause(&conditions.into(), Joiner::And))
    }

    pub fn having_or(&self, conditions: impl Into<Conditions>) -> SelectChain<AfterHaving> {
        self.then(&having_clause(&conditions.into(), Joiner::Or))
    }
}

impl<S: CanOrderBy> SelectChain<S> {
    pub fn order_by(&self, order: impl Into<OrderBy>) -> SelectChain<AfterOrderBy> {
        self.then(&order_by_clause(&order.into()))
    }
}

impl<S: CanLimit> SelectChain<S> {
    /// `LIMIT n`. The argument must be numeric; zero and negatives are kept.
    pub fn limit(&self, limit: impl Into<SqlValue>) -> SqlResult<SqlStatement> {
        self.limit_offset(limit, SqlValue::Default)
    }

    /// `OFFSET n` without a limit.
    pub fn offset(&self, offset: impl Into<SqlValue>) -> SqlResult<SqlStatement> {
        self.limit_offset(SqlValue::Default, offset)
    }

    /// `LIMIT n OFFSET m`; `NULL`/`DEFAULT` for either omits that clause.
    pub fn limit_offset(
        &self,
        limit: impl Into<SqlValue>,
        offset: impl Into<SqlValue>,
    ) -> SqlResult<SqlStatement> {
        let clause = limit_clause(&limit.into(), &offset.into())?;
        Ok(self.stmt.extend(&clause))
    }
}
