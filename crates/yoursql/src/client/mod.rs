//! Execution layer over an injected driver.
//!
//! Statements built by this crate carry their values inline, so a driver only
//! has to run plain SQL text. [`DbQuery`] is that contract; the wrappers in
//! this module sequence calls to it:
//!
//! - [`DbTransaction`] allows one statement in flight at a time and makes
//!   `commit`/`rollback` idempotent.
//! - [`DbPoolConnection`] makes `release` idempotent and rejects use after it.
//! - [`DbQueryPool`] hands out connections and transactions.
//!
//! ```ignore
//! use yoursql::{DbQuery, DbQueryPool, update};
//!
//! let pool = yoursql::create_pool("postgres://localhost/app")?;
//! let tx = pool.begin(None).await?;
//! tx.execute(&update("users").set("SET active = false")?.where_("id = 1").to_string()).await?;
//! tx.commit().await?;
//! ```

mod pool;
mod postgres;
mod transaction;


pub use pool::{DbPoolConnection, DbQueryPool};
#[cfg(feature = "pool")]
pub use pool::{
    DEFAULT_POOL_SIZE, create_pool, create_pool_with_config, create_pool_with_manager_config,
    create_pool_with_tls,
};
pub use transaction::DbTransaction;

use crate::error::SqlResult;
use std::future::Future;

/// Rows returned by one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRowsResult<R> {
    pub rows: Vec<R>,
    /// Rows affected (or returned, for queries), as reported by the server.
    pub row_count: u64,
}

impl<R> Default for QueryRowsResult<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            row_count: 0,
        }
    }
}

/// A connection able to run plain SQL text.
pub trait DbQuery: Send + Sync {
    /// Row type produced by the driver.
    type Row: Send;

    /// Run `sql` and return the rows of its last statement.
    fn query(&self, sql: &str) -> impl Future<Output = SqlResult<QueryRowsResult<Self::Row>>> + Send;

    /// Run `sql` and return one result per statement it contains.
    fn multiple_query(
        &self,
        sql: &str,
    ) -> impl Future<Output = SqlResult<Vec<QueryRowsResult<Self::Row>>>> + Send;

    /// Run `sql` and return the affected row count of its last statement.
    fn execute(&self, sql: &str) -> impl Future<Output = SqlResult<u64>> + Send {
        async move { Ok(self.query(sql).await?.row_count) }
    }
}

const MAX_LOGGED_SQL: usize = 200;

/// Log SQL handed to a driver.
pub(crate) fn log_sql(sql: &str) {
    if sql.len() > MAX_LOGGED_SQL {
        let shown = format!("{}...", truncate_sql_bytes(sql, MAX_LOGGED_SQL));
        tracing::debug!(target: "yoursql.sql", sql = %shown, len = sql.len());
    } else {
        tracing::debug!(target: "yoursql.sql", sql = %sql);
    }
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
