//! The workload container and its process supervisor.

use async_trait::async_trait;

use crate::layer::{Layer, Plan};

/// Errors raised while talking to the workload container.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    /// The supervisor API is not reachable.
    #[error("Cannot connect to workload container: {message}")]
    Unreachable { message: String },

    /// The supervisor rejected a request.
    #[error("Supervisor request failed: {message}")]
    Api { message: String },

    /// A command could not be run inside the container.
    #[error("Exec of {command:?} failed: {message}")]
    Exec { command: Vec<String>, message: String },
}

impl WorkloadError {
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn exec(command: &[String], message: impl Into<String>) -> Self {
        Self::Exec {
            command: command.to_vec(),
            message: message.into(),
        }
    }
}

/// Captured output of a command run inside the container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    /// Output of a successful command that only wrote to stdout.
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }
}

/// The workload container, reached through its process supervisor.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait Container: Send + Sync {
    /// Container name, e.g. `guacamole`.
    fn name(&self) -> &str;

    /// Returns `true` if the supervisor API answers.
    async fn can_connect(&self) -> bool;

    /// Returns the supervisor's current plan.
    async fn plan(&self) -> Result<Plan, WorkloadError>;

    /// Adds (or, with `combine`, merges) a layer under `label`.
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<(), WorkloadError>;

    /// Restarts a service, starting it if it is not running.
    async fn restart(&self, service: &str) -> Result<(), WorkloadError>;

    /// Runs a command to completion and captures its output.
    async fn exec(&self, command: &[String]) -> Result<ExecOutput, WorkloadError>;
}
