//! # guacamole-operator
//!
//! Lifecycle controller for the Apache Guacamole web application.
//!
//! The operator waits for the `guacd` proxy and a MySQL database to publish
//! their connection data, initializes the database schema once, configures
//! the workload's service and reports where the application can be reached.
//!
//! ## Modules
//!
//! - [`relations`]: reading relation data and the prerequisite check
//! - [`reconciler`]: the reconcile pass
//! - [`dispatcher`]: hook event delivery with deferral
//! - [`layer`]: the service layer handed to the supervisor
//! - [`state`]: file-backed persisted state
//! - [`network`]: the pod's own address
//! - [`config`]: settings loaded from file and environment

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod layer;
pub mod network;
pub mod observability;
pub mod reconciler;
pub mod relations;
pub mod state;

use std::sync::Arc;

use guacamole_db_mysql::{MysqlBackend, ScriptExecutor};
use guacamole_model::{DynContainer, DynModel};

pub use config::OperatorSettings;
pub use dispatcher::{Dispatcher, HookEvent};
pub use error::{OperatorError, Result};
pub use network::HostnameResolver;
pub use observability::init_tracing_with_level;
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use relations::{Prerequisites, Readiness};
pub use state::FileStateStore;

/// Wires a dispatcher for a live deployment.
///
/// State is kept in the file named by `settings.state.path`, SQL goes to
/// MySQL and the unit address comes from the machine hostname.
///
/// # Errors
///
/// Returns [`OperatorError::ContainerMismatch`] if `container` is not the
/// container named by `settings.workload.container`.
pub fn live_dispatcher(
    settings: &OperatorSettings,
    model: DynModel,
    container: DynContainer,
) -> Result<Dispatcher> {
    if container.name() != settings.workload.container {
        return Err(OperatorError::ContainerMismatch {
            expected: settings.workload.container.clone(),
            actual: container.name().to_string(),
        });
    }
    let reconciler = Reconciler::new(
        model,
        container,
        Arc::new(FileStateStore::new(&settings.state.path)),
        ScriptExecutor::new(Arc::new(MysqlBackend::new())),
        Arc::new(HostnameResolver),
    )
    .with_settings(settings);
    Ok(Dispatcher::new(reconciler))
}
