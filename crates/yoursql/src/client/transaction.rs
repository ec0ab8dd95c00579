//! Transactions over a single connection.

use super::{DbQuery, QueryRowsResult};
use crate::error::{SqlError, SqlResult};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

const OPEN: u8 = 0;
const COMMITTED: u8 = 1;
const ROLLED_BACK: u8 = 2;

/// A transaction holding its connection until it is finished.
///
/// Only one statement may run at a time; a second call made while one is in
/// flight fails with [`SqlError::TransactionBusy`] instead of queueing.
/// `commit` and `rollback` are idempotent: once the transaction is finished,
/// further calls to either return `Ok(())` without touching the connection,
/// while statements fail with [`SqlError::TransactionClosed`].
///
/// # Example
///
/// ```ignore
/// let tx = DbTransaction::begin(client, Some("ISOLATION LEVEL SERIALIZABLE")).await?;
/// tx.execute("UPDATE accounts SET balance = balance - 100 WHERE id = 1").await?;
///
/// let sp = tx.savepoint_auto().await?;
/// if tx.execute("INSERT INTO audit VALUES (1)").await.is_err() {
///     tx.rollback_to_savepoint(&sp).await?;
/// }
/// tx.commit().await?;
/// let client = tx.into_inner();
/// ```
pub struct DbTransaction<C> {
    conn: C,
    busy: AtomicBool,
    state: AtomicU8,
    savepoints: AtomicU64,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<C: DbQuery> DbTransaction<C> {
    /// Start a transaction: `BEGIN` or `BEGIN <mode>`.
    pub async fn begin(conn: C, mode: Option<&str>) -> SqlResult<Self> {
        let sql = match mode {
            Some(mode) => format!("BEGIN {mode}"),
            None => "BEGIN".to_string(),
        };
        conn.execute(&sql).await?;
        tracing::debug!(target: "yoursql.tx", mode = mode.unwrap_or("-"), "begin");
        Ok(Self {
            conn,
            busy: AtomicBool::new(false),
            state: AtomicU8::new(OPEN),
            savepoints: AtomicU64::new(0),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.state.load(Ordering::Acquire) != OPEN
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Commit. A no-op once the transaction is finished.
    pub async fn commit(&self) -> SqlResult<()> {
        self.finish("COMMIT", COMMITTED).await
    }

    /// Roll back. A no-op once the transaction is finished.
    pub async fn rollback(&self) -> SqlResult<()> {
        self.finish("ROLLBACK", ROLLED_BACK).await
    }

    /// `SAVEPOINT <name>`.
    pub async fn savepoint(&self, name: &str) -> SqlResult<()> {
        self.execute_open(&format!("SAVEPOINT {name}")).await.map(drop)
    }

    /// Create a savepoint with a generated name and return the name.
    pub async fn savepoint_auto(&self) -> SqlResult<String> {
        let n = self.savepoints.fetch_add(1, Ordering::Relaxed);
        let name = format!("yoursql_sp_{n}");
        self.savepoint(&name).await?;
        Ok(name)
    }

    /// `RELEASE SAVEPOINT <name>`.
    pub async fn release_savepoint(&self, name: &str) -> SqlResult<()> {
        self.execute_open(&format!("RELEASE SAVEPOINT {name}")).await.map(drop)
    }

    /// `ROLLBACK TO SAVEPOINT <name>`.
    pub async fn rollback_to_savepoint(&self, name: &str) -> SqlResult<()> {
        self.execute_open(&format!("ROLLBACK TO SAVEPOINT {name}")).await.map(drop)
    }

    /// Give the connection back. An unfinished transaction stays open on it.
    pub fn into_inner(self) -> C {
        if !self.is_finished() {
            tracing::warn!(target: "yoursql.tx", "connection taken back from an open transaction");
        }
        self.conn
    }

    async fn finish(&self, sql: &str, target: u8) -> SqlResult<()> {
        let _guard = self.acquire()?;
        if self.is_finished() {
            return Ok(());
        }
        let result = self.conn.execute(sql).await;
        // A failed COMMIT/ROLLBACK still ends the transaction server side.
        self.state.store(target, Ordering::Release);
        tracing::debug!(target: "yoursql.tx", action = sql, ok = result.is_ok(), "finish");
        result.map(drop)
    }

    async fn execute_open(&self, sql: &str) -> SqlResult<u64> {
        let _guard = self.acquire_open()?;
        self.conn.execute(sql).await
    }

    fn acquire(&self) -> SqlResult<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(target: "yoursql.tx", "statement rejected: transaction is busy");
            return Err(SqlError::TransactionBusy);
        }
        Ok(BusyGuard(&self.busy))
    }

    fn acquire_open(&self) -> SqlResult<BusyGuard<'_>> {
        let guard = self.acquire()?;
        match self.state.load(Ordering::Acquire) {
            OPEN => Ok(guard),
            COMMITTED => Err(SqlError::TransactionClosed("committed")),
            _ => Err(SqlError::TransactionClosed("rolled back")),
        }
    }
}

impl<C: DbQuery> DbQuery for DbTransaction<C> {
    type Row = C::Row;

    async fn query(&self, sql: &str) -> SqlResult<QueryRowsResult<C::Row>> {
        let _guard = self.acquire_open()?;
        self.conn.query(sql).await
    }

    async fn multiple_query(&self, sql: &str) -> SqlResult<Vec<QueryRowsResult<C::Row>>> {
        let _guard = self.acquire_open()?;
        self.conn.multiple_query(sql).await
    }

    async fn execute(&self, sql: &str) -> SqlResult<u64> {
        self.execute_open(sql).await
    }
}

impl<C> std::fmt::Debug for DbTransaction<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbTransaction")
            .field("busy", &self.busy.load(Ordering::Relaxed))
            .field("state", &self.state.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
