//! Idempotent, transactional execution of SQL scripts.
//!
//! A script is split into statements and run inside a single transaction.
//! Statements failing with a benign error (see [`ErrorClassifier`]) are
//! skipped, so re-running a script of `CREATE` statements against a database
//! that already holds its objects succeeds. Any other error aborts the script
//! before the commit; the uncommitted transaction is rolled back when the
//! session is dropped.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use crate::classify::{ErrorClass, ErrorClassifier, MessageClassifier};
use crate::config::ConnectionParams;
use crate::error::{DriverError, Result, SqlExecutionError};
use crate::script;

/// An open connection with a transaction in progress.
///
/// Dropping a session without calling [`commit`](SqlSession::commit) must
/// discard its work and release the connection.
#[async_trait]
pub trait SqlSession: Send {
    /// Executes one statement inside the transaction.
    async fn execute(&mut self, statement: &str) -> std::result::Result<(), DriverError>;

    /// Commits the transaction and releases the connection.
    async fn commit(self: Box<Self>) -> std::result::Result<(), DriverError>;
}

/// Opens sessions against a database.
#[async_trait]
pub trait SqlBackend: Send + Sync {
    /// Connects and begins a transaction.
    async fn begin(
        &self,
        params: &ConnectionParams,
    ) -> std::result::Result<Box<dyn SqlSession>, DriverError>;
}

/// Statement counts of a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Statements that ran without error.
    pub executed: usize,
    /// Statements whose error was classified benign.
    pub skipped: usize,
}

impl ExecutionReport {
    /// Total number of statements processed.
    pub fn total(&self) -> usize {
        self.executed + self.skipped
    }
}

/// Type alias for a shareable SQL backend.
pub type DynSqlBackend = Arc<dyn SqlBackend>;

/// Runs SQL scripts through a [`SqlBackend`].
#[derive(Clone)]
pub struct ScriptExecutor {
    backend: DynSqlBackend,
    classifier: Arc<dyn ErrorClassifier>,
}

impl ScriptExecutor {
    /// Creates an executor using the default message classifier.
    pub fn new(backend: DynSqlBackend) -> Self {
        Self {
            backend,
            classifier: Arc::new(MessageClassifier::default()),
        }
    }

    /// Replaces the error classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Executes `raw_script` in one transaction.
    ///
    /// A script without statements returns immediately without opening a
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SqlExecutionError::Statement`] for the first statement whose
    /// error is fatal; later statements are not attempted and nothing is
    /// committed. Connection and commit failures are reported as
    /// [`SqlExecutionError::Connection`] and [`SqlExecutionError::Commit`].
    #[instrument(skip_all, fields(url = %params.display_url()))]
    pub async fn execute(&self, params: &ConnectionParams, raw_script: &str) -> Result<ExecutionReport> {
        let mut pending: VecDeque<String> = script::split(raw_script).into();
        let mut report = ExecutionReport::default();

        if pending.is_empty() {
            debug!("SQL script has no statements, nothing to execute");
            return Ok(report);
        }

        info!(statements = pending.len(), "Executing SQL script");

        let mut session = self
            .backend
            .begin(params)
            .await
            .map_err(SqlExecutionError::Connection)?;

        while let Some(statement) = pending.front() {
            match session.execute(statement).await {
                Ok(()) => report.executed += 1,
                Err(err) => match self.classifier.classify(&err) {
                    ErrorClass::Benign => {
                        debug!(error = %err, "Ignoring benign SQL error");
                        report.skipped += 1;
                    }
                    ErrorClass::Fatal => {
                        error!(statement = %statement, error = %err, "SQL error in statement");
                        let statement = statement.clone();
                        drop(session);
                        warn!(
                            remaining = pending.len() - 1,
                            "SQL script aborted, transaction rolled back"
                        );
                        return Err(SqlExecutionError::Statement {
                            statement,
                            source: err,
                        });
                    }
                },
            }
            pending.pop_front();
        }

        session.commit().await.map_err(SqlExecutionError::Commit)?;

        info!(
            executed = report.executed,
            skipped = report.skipped,
            "SQL script committed"
        );

        Ok(report)
    }
}
