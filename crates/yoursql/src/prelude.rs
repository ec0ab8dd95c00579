//! Convenient imports for typical `yoursql` usage.
//!
//! ```ignore
//! use yoursql::prelude::*;
//! ```

pub use crate::{
    DbQuery, DbQueryPool, DbTransaction, Record, Selectable, SqlError, SqlFragment, SqlResult,
    SqlValue, SqlValuesCreator, ValuesColumns, delete_from, insert_into, record, select,
    select_distinct, update, with_as, with_recursive,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};
