//! Pooled connections.

use super::{DbQuery, DbTransaction, QueryRowsResult};
use crate::error::{SqlError, SqlResult};
use std::future::Future;

/// A connection checked out of a pool.
///
/// `release` hands the connection back (for `deadpool` by dropping it) and
/// may be called any number of times; statements after it fail with
/// [`SqlError::ConnectionReleased`]. Dropping the wrapper releases as well.
#[derive(Debug)]
pub struct DbPoolConnection<C> {
    conn: Option<C>,
}

impl<C: DbQuery> DbPoolConnection<C> {
    pub fn new(conn: C) -> Self {
        Self { conn: Some(conn) }
    }

    pub fn is_released(&self) -> bool {
        self.conn.is_none()
    }

    /// Release the connection. Later calls do nothing.
    pub fn release(&mut self) {
        if self.conn.take().is_some() {
            tracing::debug!(target: "yoursql.tx", "connection released");
        }
    }

    /// Start a transaction that owns this connection.
    pub async fn begin(mut self, mode: Option<&str>) -> SqlResult<DbTransaction<C>> {
        let conn = self.conn.take().ok_or(SqlError::ConnectionReleased)?;
        DbTransaction::begin(conn, mode).await
    }

    fn conn(&self) -> SqlResult<&C> {
        self.conn.as_ref().ok_or(SqlError::ConnectionReleased)
    }
}

impl<C: DbQuery> DbQuery for DbPoolConnection<C> {
    type Row = C::Row;

    async fn query(&self, sql: &str) -> SqlResult<QueryRowsResult<C::Row>> {
        self.conn()?.query(sql).await
    }

    async fn multiple_query(&self, sql: &str) -> SqlResult<Vec<QueryRowsResult<C::Row>>> {
        self.conn()?.multiple_query(sql).await
    }

    async fn execute(&self, sql: &str) -> SqlResult<u64> {
        self.conn()?.execute(sql).await
    }
}

/// A source of connections.
pub trait DbQueryPool: Send + Sync {
    type Connection: DbQuery;

    /// Check out a connection.
    fn connect(&self) -> impl Future<Output = SqlResult<DbPoolConnection<Self::Connection>>> + Send;

    /// Check out a connection and start a transaction on it.
    fn begin(
        &self,
        mode: Option<&str>,
    ) -> impl Future<Output = SqlResult<DbTransaction<Self::Connection>>> + Send {
        async move { self.connect().await?.begin(mode).await }
    }
}

#[cfg(feature = "pool")]
mod deadpool {
    use super::{DbPoolConnection, DbQueryPool};
    use crate::error::{SqlError, SqlResult};
    use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
    use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
    use tokio_postgres::{NoTls, Socket};

    /// Connections per pool unless a size is given.
    pub const DEFAULT_POOL_SIZE: usize = 16;

    impl DbQueryPool for Pool {
        type Connection = deadpool_postgres::Client;

        async fn connect(&self) -> SqlResult<DbPoolConnection<deadpool_postgres::Client>> {
            let client = self.get().await?;
            Ok(DbPoolConnection::new(client))
        }
    }

    /// Plain-TCP pool of [`DEFAULT_POOL_SIZE`] connections.
    ///
    /// `database_url` is anything `tokio_postgres::Config` parses, a
    /// `postgres://` URL or a `host=.. user=..` string. Connections are opened
    /// lazily, so a bad host only shows up on the first `connect`.
    pub fn create_pool(database_url: &str) -> SqlResult<Pool> {
        create_pool_with_config(database_url, DEFAULT_POOL_SIZE)
    }

    /// Plain-TCP pool holding at most `max_size` connections.
    pub fn create_pool_with_config(database_url: &str, max_size: usize) -> SqlResult<Pool> {
        create_pool_with_manager_config(database_url, NoTls, fast_recycling(), |pool| {
            pool.max_size(max_size)
        })
    }

    /// Pool of [`DEFAULT_POOL_SIZE`] connections over `tls`.
    pub fn create_pool_with_tls<T>(database_url: &str, tls: T) -> SqlResult<Pool>
    where
        T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
        T::Stream: Sync + Send,
        T::TlsConnect: Sync + Send,
        <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
    {
        create_pool_with_manager_config(database_url, tls, fast_recycling(), |pool| {
            pool.max_size(DEFAULT_POOL_SIZE)
        })
    }

    /// Fully tuned pool: `manager_config` picks the recycling check and
    /// `configure_pool` adjusts size, timeouts and runtime on the builder.
    ///
    /// An unparsable `database_url` is [`SqlError::Connection`]; a builder
    /// rejection (e.g. timeouts without a runtime) is [`SqlError::Pool`].
    pub fn create_pool_with_manager_config<T>(
        database_url: &str,
        tls: T,
        manager_config: ManagerConfig,
        configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
    ) -> SqlResult<Pool>
    where
        T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
        T::Stream: Sync + Send,
        T::TlsConnect: Sync + Send,
        <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
    {
        let pg_config = database_url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| SqlError::Connection(format!("invalid database url: {e}")))?;

        let manager = Manager::from_config(pg_config, tls, manager_config);
        let pool = configure_pool(Pool::builder(manager))
            .build()
            .map_err(|e| SqlError::Pool(e.to_string()))?;
        tracing::debug!(target: "yoursql.pool", max_size = pool.status().max_size, "pool created");
        Ok(pool)
    }

    // Statements carry literals, so a server-side reset on checkout buys nothing.
    fn fast_recycling() -> ManagerConfig {
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        }
    }
}

#[cfg(feature = "pool")]
pub use deadpool::{
    DEFAULT_POOL_SIZE, create_pool, create_pool_with_config, create_pool_with_manager_config,
    create_pool_with_tls,
};
