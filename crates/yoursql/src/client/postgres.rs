//! [`DbQuery`] for `tokio_postgres` and `deadpool_postgres` clients.
//!
//! SQL runs over the simple-query protocol, which accepts several
//! `;`-separated statements in one round trip.

use super::{DbQuery, QueryRowsResult, log_sql};
use crate::error::{SqlError, SqlResult};
use tokio_postgres::{SimpleQueryMessage, SimpleQueryRow};

impl DbQuery for tokio_postgres::Client {
    type Row = SimpleQueryRow;

    async fn query(&self, sql: &str) -> SqlResult<QueryRowsResult<SimpleQueryRow>> {
        let mut results = self.multiple_query(sql).await?;
        Ok(results.pop().unwrap_or_default())
    }

    async fn multiple_query(&self, sql: &str) -> SqlResult<Vec<QueryRowsResult<SimpleQueryRow>>> {
        log_sql(sql);
        let messages = self.simple_query(sql).await.map_err(SqlError::from_db_error)?;
        Ok(split_results(messages))
    }
}

#[cfg(feature = "pool")]
impl DbQuery for deadpool_postgres::Client {
    type Row = SimpleQueryRow;

    async fn query(&self, sql: &str) -> SqlResult<QueryRowsResult<SimpleQueryRow>> {
        let client: &tokio_postgres::Client = self;
        DbQuery::query(client, sql).await
    }

    async fn multiple_query(&self, sql: &str) -> SqlResult<Vec<QueryRowsResult<SimpleQueryRow>>> {
        let client: &tokio_postgres::Client = self;
        DbQuery::multiple_query(client, sql).await
    }
}

/// Group simple-query messages into one result per statement.
fn split_results(messages: Vec<SimpleQueryMessage>) -> Vec<QueryRowsResult<SimpleQueryRow>> {
    let mut results = Vec::new();
    let mut rows = Vec::new();
    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => rows.push(row),
            SimpleQueryMessage::CommandComplete(row_count) => results.push(QueryRowsResult {
                rows: std::mem::take(&mut rows),
                row_count,
            }),
            _ => {}
        }
    }
    results
}
