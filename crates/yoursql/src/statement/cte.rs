//! Common table expressions.
//!
//! ```ignore
//! use yoursql::{with_as, select};
//!
//! let active = select("id")?.from("users").where_("active");
//! let sql = with_as("active_users", &active)
//!     .as_("recent", "SELECT id FROM logins")
//!     .select("*")?
//!     .from("active_users")
//!     .to_string();
//! # Ok::<(), yoursql::SqlError>(())
//! ```

use super::clause::{ColumnList, SelectColumns};
use super::delete::{DeleteChain, state::AfterDelete};
use super::insert::{InsertChain, state::AfterInsert};
use super::select::{SelectChain, state::AfterSelect};
use super::update::{UpdateChain, state::AfterUpdate};
use super::SqlFragment;
use crate::error::SqlResult;

/// The accumulated `WITH` preamble. The statement that follows receives it
/// as a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct WithChain {
    preamble: String,
}

/// `WITH name AS(<statement>)`.
pub fn with_as(name: &str, statement: impl SqlFragment) -> WithChain {
    WithChain::start("WITH ", name, statement.gen_sql())
}

/// `WITH RECURSIVE name AS(<statement>)`.
pub fn with_recursive(name: &str, statement: impl SqlFragment) -> WithChain {
    WithChain::start("WITH RECURSIVE ", name, statement.gen_sql())
}

impl WithChain {
    fn start(keyword: &str, name: &str, sql: &str) -> Self {
        Self {
            preamble: format!("{keyword}{name} AS({sql})"),
        }
    }

    /// Add another named statement: `,\nname AS(<statement>)`.
    pub fn as_(&self, name: &str, statement: impl SqlFragment) -> WithChain {
        Self {
            preamble: format!("{},\n{} AS({})", self.preamble, name, statement.gen_sql()),
        }
    }

    fn lead(&self) -> String {
        let mut lead = String::with_capacity(self.preamble.len() + 1);
        lead.push_str(&self.preamble);
        lead.push('\n');
        lead
    }

    pub fn select(&self, columns: impl Into<SelectColumns>) -> SqlResult<SelectChain<AfterSelect>> {
        SelectChain::start(self.lead(), "SELECT ", &columns.into())
    }

    pub fn select_distinct(
        &self,
        columns: impl Into<SelectColumns>,
    ) -> SqlResult<SelectChain<AfterSelect>> {
        SelectChain::start(self.lead(), "SELECT DISTINCT ", &columns.into())
    }

    pub fn insert_into(
        &self,
        table: &str,
        columns: impl Into<ColumnList>,
    ) -> SqlResult<InsertChain<AfterInsert>> {
        InsertChain::start(self.lead(), table, &columns.into())
    }

    pub fn update(&self, table: &str) -> UpdateChain<AfterUpdate> {
        UpdateChain::start(self.lead(), table)
    }

    pub fn delete_from(&self, table: &str) -> DeleteChain<AfterDelete> {
        DeleteChain::start(self.lead(), table)
    }
}

impl SqlFragment for WithChain {
    fn gen_sql(&self) -> &str {
        &self.preamble
    }
}
