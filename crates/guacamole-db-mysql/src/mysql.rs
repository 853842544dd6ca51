//! MySQL backend built on sqlx.

use std::time::Duration;

use async_trait::async_trait;
use sqlx_core::executor::Executor;
use sqlx_core::pool::PoolOptions;
use sqlx_core::transaction::Transaction;
use sqlx_mysql::{MySql, MySqlConnectOptions, MySqlPool};
use tracing::{debug, instrument};

use crate::config::ConnectionParams;
use crate::error::DriverError;
use crate::executor::{SqlBackend, SqlSession};

/// Type alias for MySQL pool options.
pub type MySqlPoolOptions = PoolOptions<MySql>;

/// [`SqlBackend`] connecting to a MySQL (or MariaDB) server.
///
/// Each session owns a single-connection pool, so every statement of a script
/// runs on the same connection and transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlBackend;

impl MysqlBackend {
    /// Creates a new backend.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Builds sqlx connect options from connection parameters.
fn connect_options(params: &ConnectionParams) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.user)
        .password(&params.password)
        .database(&params.database)
}

#[async_trait]
impl SqlBackend for MysqlBackend {
    #[instrument(skip_all, fields(url = %params.display_url()))]
    async fn begin(&self, params: &ConnectionParams) -> Result<Box<dyn SqlSession>, DriverError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(Duration::from_millis(params.connect_timeout_ms))
            .test_before_acquire(false)
            .connect_with(connect_options(params))
            .await?;

        let tx = pool.begin().await?;
        debug!("MySQL transaction started");

        Ok(Box::new(MysqlSession { tx, pool }))
    }
}

/// A MySQL connection with an open transaction.
///
/// Dropping it without committing rolls the transaction back and returns the
/// connection to its pool, which is dropped with it.
struct MysqlSession {
    tx: Transaction<'static, MySql>,
    pool: MySqlPool,
}

#[async_trait]
impl SqlSession for MysqlSession {
    async fn execute(&mut self, statement: &str) -> Result<(), DriverError> {
        let result = (&mut *self.tx).execute(statement).await?;
        debug!(rows_affected = result.rows_affected(), "Statement executed");
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DriverError> {
        let MysqlSession { tx, pool } = *self;
        tx.commit().await?;
        pool.close().await;
        debug!("MySQL transaction committed");
        Ok(())
    }
}
