//! Pooled database session.
//!
//! A [`Session`] owns a `deadpool-postgres` pool and runs operations against a
//! [`Conn`]. Each orchestration call checks out one connection and returns it to the
//! pool when the call finishes, whatever the outcome.
//!
//! ```ignore
//! use sqlblock::{PoolConfig, Session, Insert, Record};
//!
//! let session = Session::connect(&PoolConfig::from_env()?).await?;
//! let user = Record::new("users").set("name", "Leng");
//!
//! let keys = session
//!     .transaction(async |conn| {
//!         let keys = conn.insert_statement(&Insert::new(&user).parameterize(true)).await?;
//!         conn.update("UPDATE stats SET users = users + 1", &[]).await?;
//!         Ok(keys)
//!     })
//!     .await?;
//! ```

mod conn;

pub use conn::{Conn, row_to_aliased_map, row_to_map};

use crate::config::PoolConfig;
use crate::error::{DbError, DbResult};
use crate::logger::SqlLogger;
use crate::pool;
use deadpool_postgres::Pool;
use std::time::Duration;

/// Orchestrates operations over pooled connections.
#[derive(Clone)]
pub struct Session {
    pool: Pool,
    logger: SqlLogger,
    throw_on_duplicate: bool,
    max_idle: Option<Duration>,
}

impl Session {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            logger: SqlLogger::default(),
            throw_on_duplicate: true,
            max_idle: None,
        }
    }

    /// Create a pool from `config`, warm it up and wrap it in a session.
    pub async fn connect(config: &PoolConfig) -> DbResult<Self> {
        let pool = pool::connect(config).await?;
        Ok(Self::new(pool).max_idle(config.max_idle()))
    }

    pub fn with_logger(mut self, logger: SqlLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Classify duplicate-key failures as [`DbError::DuplicateKey`] (on by default).
    pub fn throw_on_duplicate(mut self, enabled: bool) -> Self {
        self.throw_on_duplicate = enabled;
        self
    }

    /// Evict connections idle longer than `max_idle` before each checkout.
    pub fn max_idle(mut self, max_idle: Option<Duration>) -> Self {
        self.max_idle = max_idle;
        self
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn logger(&self) -> &SqlLogger {
        &self.logger
    }

    async fn checkout(&self) -> DbResult<deadpool_postgres::Object> {
        if let Some(max_idle) = self.max_idle {
            let evicted = pool::evict_idle(&self.pool, max_idle);
            if evicted > 0 {
                tracing::debug!(target: "sqlblock.pool", evicted, "evicted idle connections");
            }
        }
        Ok(self.pool.get().await?)
    }

    // ==================== Single attempts ====================

    async fn attempt<T, F>(&self, op: &mut F) -> DbResult<T>
    where
        F: AsyncFnMut(&Conn<'_>) -> DbResult<T>,
    {
        let client = self.checkout().await?;
        let conn = Conn::from_client(&client, &self.logger, self.throw_on_duplicate);
        op(&conn).await
    }

    async fn attempt_transaction<T, F>(&self, op: &mut F) -> DbResult<T>
    where
        F: AsyncFnMut(&Conn<'_>) -> DbResult<T>,
    {
        let mut client = self.checkout().await?;
        let client: &mut tokio_postgres::Client = &mut client;
        self.run_transaction(client, op).await
    }

    async fn run_transaction<T, F>(
        &self,
        client: &mut tokio_postgres::Client,
        op: &mut F,
    ) -> DbResult<T>
    where
        F: AsyncFnMut(&Conn<'_>) -> DbResult<T>,
    {
        let tx = client.transaction().await.map_err(DbError::from_db_error)?;
        let result = {
            let conn = Conn::from_transaction(&tx, &self.logger, self.throw_on_duplicate);
            op(&conn).await
        };
        match result {
            Ok(value) => {
                tx.commit().await.map_err(DbError::from_db_error)?;
                Ok(value)
            }
            Err(error) => match tx.rollback().await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err(DbError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }

    async fn with_retries<T, F>(
        &self,
        retries: u32,
        delay: Duration,
        in_transaction: bool,
        op: &mut F,
    ) -> DbResult<T>
    where
        F: AsyncFnMut(&Conn<'_>) -> DbResult<T>,
    {
        let mut retries_left = retries;
        loop {
            let result = if in_transaction {
                self.attempt_transaction(op).await
            } else {
                self.attempt(op).await
            };
            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retries_left > 0 => {
                    self.logger.log_retry(retries_left, &err);
                    retries_left -= 1;
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(err) => {
                    self.logger.log_error(&err);
                    return Err(err);
                }
            }
        }
    }

    // ==================== Orchestration ====================

    /// Run `op` once on a pooled connection.
    pub async fn once<T>(&self, mut op: impl AsyncFnMut(&Conn<'_>) -> DbResult<T>) -> DbResult<T> {
        self.attempt(&mut op).await.inspect_err(|err| self.logger.log_error(err))
    }

    /// Run `op`, retrying up to `retries` more times after `delay`.
    ///
    /// Each attempt checks out a fresh connection. Duplicate-key failures are never retried.
    pub async fn retry<T>(
        &self,
        retries: u32,
        delay: Duration,
        mut op: impl AsyncFnMut(&Conn<'_>) -> DbResult<T>,
    ) -> DbResult<T> {
        self.with_retries(retries, delay, false, &mut op).await
    }

    /// Run `op` inside a transaction: commit on `Ok`, roll back on `Err`.
    pub async fn transaction<T>(
        &self,
        mut op: impl AsyncFnMut(&Conn<'_>) -> DbResult<T>,
    ) -> DbResult<T> {
        self.attempt_transaction(&mut op)
            .await
            .inspect_err(|err| self.logger.log_error(err))
    }

    /// Like [`transaction`](Self::transaction), rerunning the whole transaction on failure.
    pub async fn transaction_retry<T>(
        &self,
        retries: u32,
        delay: Duration,
        mut op: impl AsyncFnMut(&Conn<'_>) -> DbResult<T>,
    ) -> DbResult<T> {
        self.with_retries(retries, delay, true, &mut op).await
    }

    /// Run a transaction on a caller-owned connection, leaving it open afterwards.
    pub async fn transaction_open<T>(
        &self,
        client: &mut tokio_postgres::Client,
        mut op: impl AsyncFnMut(&Conn<'_>) -> DbResult<T>,
    ) -> DbResult<T> {
        self.run_transaction(client, &mut op)
            .await
            .inspect_err(|err| self.logger.log_error(err))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("pool", &self.pool.status())
            .field("logger", &self.logger)
            .field("throw_on_duplicate", &self.throw_on_duplicate)
            .field("max_idle", &self.max_idle)
            .finish()
    }
}
