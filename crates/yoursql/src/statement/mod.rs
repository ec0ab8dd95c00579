//! Chained statement builders.
//!
//! Every builder state owns an immutable SQL string. Each method appends a
//! clause and returns a *new* builder whose type exposes only the clauses
//! that may follow, so a half-built statement can be branched freely:
//!
//! ```ignore
//! use yoursql::{select, OrderItem};
//!
//! let base = select("id, name")?.from("users").where_("active");
//! let newest = base.order_by(OrderItem::desc("created_at")).limit(10)?;
//! let by_name = base.order_by("name").to_string();
//!
//! assert_eq!(by_name, "SELECT id, name\nFROM users\nWHERE active\nORDER BY name");
//! # Ok::<(), yoursql::SqlError>(())
//! ```
//!
//! SQL is built eagerly: validation errors surface at the call that
//! introduced the bad input, and a failed call leaves the previous builder
//! untouched.

/// Implements `SqlFragment`, `Display`, `Clone` and `Debug` for a builder
/// generic over a type-state marker.
macro_rules! chain_common {
    ($name:ident) => {
        impl<S> $name<S> {
            pub(crate) fn from_statement(stmt: $crate::statement::SqlStatement) -> Self {
                Self {
                    stmt,
                    _state: ::std::marker::PhantomData,
                }
            }

            /// Append `suffix`, moving to state `T`.
            pub(crate) fn then<T>(&self, suffix: &str) -> $name<T> {
                $name::from_statement(self.stmt.extend(suffix))
            }

            /// The statement built so far.
            pub fn to_statement(&self) -> $crate::statement::SqlStatement {
                self.stmt.clone()
            }
        }

        impl<S> Clone for $name<S> {
            fn clone(&self) -> Self {
                Self::from_statement(self.stmt.clone())
            }
        }

        impl<S> ::std::fmt::Debug for $name<S> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("state", &::std::any::type_name::<S>())
                    .field("sql", &$crate::statement::SqlFragment::gen_sql(&self.stmt))
                    .finish()
            }
        }

        impl<S> $crate::statement::SqlFragment for $name<S> {
            fn gen_sql(&self) -> &str {
                $crate::statement::SqlFragment::gen_sql(&self.stmt)
            }
        }

        impl<S> ::std::fmt::Display for $name<S> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.stmt, f)
            }
        }

        impl<S> From<$name<S>> for $crate::statement::SqlStatement {
            fn from(chain: $name<S>) -> Self {
                chain.stmt
            }
        }
    };
}

mod clause;
mod cte;
mod delete;
mod insert;
mod select;
mod update;


pub use clause::{
    ColumnList, Conditions, Joiner, OrderBy, OrderByEntry, OrderDirection, OrderItem, SelectAs,
    SelectColumns, UpdateSet, condition, create_update_set_from_object, having_clause,
    order_by_clause, select_columns, where_clause,
};
pub use cte::{WithChain, with_as, with_recursive};
pub use delete::{DeleteChain, delete_from};
pub use insert::{InsertChain, insert_into};
pub use select::{SelectChain, select, select_distinct};
pub use update::{UpdateChain, update};

/// Type-state markers for the builders.
pub mod state {
    pub use super::delete::state as delete;
    pub use super::insert::state as insert;
    pub use super::select::state as select;
    pub use super::update::state as update;
}

use crate::error::{LimitArg, SqlError, SqlResult};
use crate::values::SqlValue;
use std::borrow::Cow;
use std::fmt;

/// Anything that holds finished SQL text.
pub trait SqlFragment {
    /// The SQL text.
    fn gen_sql(&self) -> &str;
}

impl SqlFragment for str {
    fn gen_sql(&self) -> &str {
        self
    }
}

impl SqlFragment for String {
    fn gen_sql(&self) -> &str {
        self
    }
}

impl<T: SqlFragment + ?Sized> SqlFragment for &T {
    fn gen_sql(&self) -> &str {
        (**self).gen_sql()
    }
}

/// Anything usable as a FROM / JOIN target.
///
/// Plain strings are table names or expressions and are used verbatim;
/// statements are wrapped in parentheses.
pub trait Selectable {
    fn to_select(&self) -> Cow<'_, str>;
}

impl Selectable for str {
    fn to_select(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Selectable for String {
    fn to_select(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl<T: Selectable + ?Sized> Selectable for &T {
    fn to_select(&self) -> Cow<'_, str> {
        (**self).to_select()
    }
}

/// Pre-rendered SQL used verbatim as an expression or FROM target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlRaw(String);

impl SqlRaw {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl SqlFragment for SqlRaw {
    fn gen_sql(&self) -> &str {
        &self.0
    }
}

impl Selectable for SqlRaw {
    fn to_select(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }
}

impl fmt::Display for SqlRaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finished, immutable statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlStatement {
    sql: String,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    pub fn into_string(self) -> String {
        self.sql
    }

    /// `(sql) AS alias`, usable as a FROM / JOIN target.
    pub fn to_select_as(&self, alias: &str) -> SqlRaw {
        SqlRaw(format!("({}) AS {}", self.sql, alias))
    }

    /// A new statement with `suffix` appended; `self` is left as is.
    pub(crate) fn extend(&self, suffix: &str) -> SqlStatement {
        let mut sql = String::with_capacity(self.sql.len() + suffix.len());
        sql.push_str(&self.sql);
        sql.push_str(suffix);
        SqlStatement { sql }
    }
}

impl SqlFragment for SqlStatement {
    fn gen_sql(&self) -> &str {
        &self.sql
    }
}

impl Selectable for SqlStatement {
    fn to_select(&self) -> Cow<'_, str> {
        Cow::Owned(format!("({})", self.sql))
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl AsRef<str> for SqlStatement {
    fn as_ref(&self) -> &str {
        &self.sql
    }
}

/// `\nRETURNING <columns>`; `"*"` passes through, other shapes go through
/// [`select_columns`] and must not be empty.
pub(crate) fn returning_clause(columns: &SelectColumns) -> SqlResult<String> {
    Ok(format!("\nRETURNING {}", select_columns(columns)?))
}

/// `\nLIMIT n` / `\nOFFSET m` text for numeric arguments.
///
/// `NULL`/`DEFAULT` omit the clause; zero and negative values are emitted
/// verbatim. Anything else fails with [`SqlError::InvalidLimitType`].
pub(crate) fn limit_clause(limit: &SqlValue, offset: &SqlValue) -> SqlResult<String> {
    let mut sql = String::new();
    if let Some(n) = limit_number(limit, LimitArg::Limit)? {
        sql.push_str("\nLIMIT ");
        sql.push_str(&n);
    }
    if let Some(n) = limit_number(offset, LimitArg::Offset)? {
        sql.push_str("\nOFFSET ");
        sql.push_str(&n);
    }
    Ok(sql)
}

fn limit_number(value: &SqlValue, arg: LimitArg) -> SqlResult<Option<String>> {
    match value {
        SqlValue::Null | SqlValue::Default => Ok(None),
        SqlValue::Int(n) => Ok(Some(n.to_string())),
        SqlValue::BigInt(n) => Ok(Some(n.to_string())),
        SqlValue::Float(n) => Ok(Some(n.to_string())),
        other => Err(SqlError::InvalidLimitType {
            arg,
            actual: other.kind().to_string(),
        }),
    }
}
