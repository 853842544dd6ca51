//! Error types for the operator.

use guacamole_db_mysql::SqlExecutionError;
use guacamole_model::{ResolveError, StateError, WorkloadError};

/// Errors that fail a reconcile invocation.
///
/// Missing relations and an unreachable workload are not errors; they are
/// reported through the unit status instead.
#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    /// Database initialization failed.
    #[error("Database initialization failed: {0}")]
    Sql(#[from] SqlExecutionError),

    /// The workload container rejected a request.
    #[error(transparent)]
    Workload(#[from] WorkloadError),

    /// Persisted state could not be read or written.
    #[error(transparent)]
    State(#[from] StateError),

    /// The unit address could not be determined.
    #[error(transparent)]
    Address(#[from] ResolveError),

    /// The workload container handed in is not the configured one.
    #[error("Workload container is {actual:?}, expected {expected:?}")]
    ContainerMismatch { expected: String, actual: String },

    /// A relation published a value the operator cannot use.
    #[error("Invalid relation data {relation}.{key}={value:?}: {message}")]
    InvalidRelationData {
        relation: String,
        key: String,
        value: String,
        message: String,
    },
}

impl OperatorError {
    #[must_use]
    pub fn invalid_relation_data(
        relation: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRelationData {
            relation: relation.into(),
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for operator operations.
pub type Result<T> = std::result::Result<T, OperatorError>;
