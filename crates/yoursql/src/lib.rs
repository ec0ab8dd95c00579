//! # yoursql
//!
//! Composable SQL statement builder for PostgreSQL.
//!
//! ## Features
//!
//! - **Values inline**: host values are encoded to SQL literals by a
//!   pluggable [`SqlValuesCreator`], so a statement is plain text
//! - **Bulk VALUES**: many rows become one `VALUES` list or a typed
//!   `(VALUES ...) AS alias(cols)` source
//! - **Chain builders**: `SELECT`, `INSERT`, `UPDATE`, `DELETE` and `WITH`
//!   chains whose methods only offer the clauses valid at each step
//! - **Table facades**: [`DbTable`], [`DbTableQuery`] and the checked
//!   [`YourTable`]
//! - **Thin client**: [`DbQuery`] over `tokio-postgres`, with
//!   [`DbTransaction`] and pooled connections
//!
//! ## Statements
//!
//! ```ignore
//! use yoursql::{select, insert_into, SqlValuesCreator, ValuesColumns, record};
//!
//! let sql = select(["id", "name"])?
//!     .from("users")
//!     .where_(["active", "age > 18"])
//!     .order_by("created_at DESC")
//!     .limit(10)?
//!     .to_string();
//!
//! let v = SqlValuesCreator::new();
//! let list = v.rows_to_values_list(
//!     &[record! { "id" => 1, "name" => "a" }],
//!     &ValuesColumns::Auto,
//!     false,
//! )?;
//! let insert = insert_into("users", list.columns.as_slice())?
//!     .values(&list)
//!     .on_conflict(["id"])
//!     .do_nothing()
//!     .returning("*")?;
//! # Ok::<(), yoursql::SqlError>(())
//! ```
//!
//! ## Execution
//!
//! ```ignore
//! use yoursql::{DbQuery, DbQueryPool};
//!
//! let pool = yoursql::create_pool("postgres://localhost/app")?;
//! let tx = pool.begin(None).await?;
//! tx.execute(&insert.to_string()).await?;
//! tx.commit().await?;
//! ```

pub mod client;
pub mod error;
pub mod prelude;
pub mod statement;
pub mod table;
pub mod values;

pub use error::{LimitArg, SqlError, SqlResult};

pub use values::{
    ColumnToValueConfig, EncodeFn, ManualType, MatchFn, ObjectClass, Record, SqlObject, SqlValue,
    SqlValuesCreator, ValueKind, ValuesColumns, ValuesList, quote,
};

pub use statement::{
    ColumnList, Conditions, DeleteChain, InsertChain, Joiner, OrderBy, OrderByEntry,
    OrderDirection, OrderItem, SelectAs, SelectChain, SelectColumns, Selectable, SqlFragment,
    SqlRaw, SqlStatement, UpdateChain, UpdateSet, WithChain, condition,
    create_update_set_from_object, delete_from, having_clause, insert_into, order_by_clause,
    select, select_columns, select_distinct, update, where_clause, with_as, with_recursive,
};

pub use table::{ColumnMeta, DbTable, DbTableQuery, TableDefined, TypeChecker, YourTable};

pub use client::{DbPoolConnection, DbQuery, DbQueryPool, DbTransaction, QueryRowsResult};

#[cfg(feature = "pool")]
pub use client::{
    DEFAULT_POOL_SIZE, create_pool, create_pool_with_config, create_pool_with_manager_config, create_pool_with_tls,
};
