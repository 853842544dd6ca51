//! Error types for MySQL script execution.

use sqlx_core::error::Error as SqlxError;

/// An error reported by the database driver for a single operation.
///
/// Only the rendered message and the optional SQLSTATE code are kept, so
/// backends other than sqlx (and test doubles) can produce it as well.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    code: Option<String>,
    message: String,
}

impl DriverError {
    /// Creates a driver error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Attaches a SQLSTATE code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Returns the driver message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the SQLSTATE code, if the driver reported one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl From<SqlxError> for DriverError {
    fn from(err: SqlxError) -> Self {
        let code = match &err {
            SqlxError::Database(db_err) => db_err.code().map(|c| c.into_owned()),
            _ => None,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

/// Errors returned by [`ScriptExecutor::execute`](crate::ScriptExecutor::execute).
#[derive(Debug, thiserror::Error)]
pub enum SqlExecutionError {
    /// The connection or transaction could not be opened.
    #[error("Database connection error: {0}")]
    Connection(#[source] DriverError),

    /// A statement failed with an error that is not safe to ignore.
    #[error("SQL statement failed: {source}")]
    Statement {
        /// The statement as sent to the server.
        statement: String,
        /// The underlying driver error.
        #[source]
        source: DriverError,
    },

    /// The final commit failed.
    #[error("Commit failed: {0}")]
    Commit(#[source] DriverError),
}

impl SqlExecutionError {
    /// Returns the statement that aborted the script, if any.
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        match self {
            Self::Statement { statement, .. } => Some(statement),
            _ => None,
        }
    }

    /// Returns the underlying driver error.
    #[must_use]
    pub fn driver_error(&self) -> &DriverError {
        match self {
            Self::Connection(err) | Self::Commit(err) => err,
            Self::Statement { source, .. } => source,
        }
    }
}

/// Result type alias for script execution.
pub type Result<T> = std::result::Result<T, SqlExecutionError>;
