//! Converges the workload towards its desired state.
//!
//! Every trigger runs the same sequence:
//!
//! 1. wait for the workload runtime to answer
//! 2. check that `guacd` and `mysql` published everything needed
//! 3. initialize the database schema, once per deployment
//! 4. apply the service layer and restart the service
//! 5. report the access URL
//!
//! Missing relations and an unreachable runtime are reported through the
//! returned status. Only infrastructure failures (SQL, supervisor, state
//! storage) come back as errors.

use guacamole_db_mysql::ScriptExecutor;
use guacamole_model::{
    DynAddressResolver, DynContainer, DynModel, DynStateStore, UnitStatus,
};
use tracing::{debug, info, instrument};

use crate::config::{DatabaseSettings, OperatorSettings, WorkloadSettings};
use crate::dispatcher::HookEvent;
use crate::error::Result;
use crate::layer::render_layer;
use crate::relations::{INGRESS, MysqlInfo, Prerequisites, Readiness, missing_message};

/// Status message while the workload runtime is not reachable.
pub const WAITING_FOR_RUNTIME: &str = "waiting for pebble to start";

/// Result of a single reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The pass ran to completion with this status.
    Settled(UnitStatus),
    /// The pass could not run yet; the triggering event should be redelivered.
    Deferred(UnitStatus),
}

impl ReconcileOutcome {
    pub fn status(&self) -> &UnitStatus {
        match self {
            Self::Settled(status) | Self::Deferred(status) => status,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

/// Reconciles the Guacamole workload against the host model.
pub struct Reconciler {
    model: DynModel,
    container: DynContainer,
    state: DynStateStore,
    executor: ScriptExecutor,
    addresses: DynAddressResolver,
    workload: WorkloadSettings,
    database: DatabaseSettings,
    prerequisites: Prerequisites,
}

impl Reconciler {
    /// Creates a reconciler with default settings.
    pub fn new(
        model: DynModel,
        container: DynContainer,
        state: DynStateStore,
        executor: ScriptExecutor,
        addresses: DynAddressResolver,
    ) -> Self {
        Self {
            model,
            container,
            state,
            executor,
            addresses,
            workload: WorkloadSettings::default(),
            database: DatabaseSettings::default(),
            prerequisites: Prerequisites::new(),
        }
    }

    /// Applies workload and database settings.
    #[must_use]
    pub fn with_settings(mut self, settings: &OperatorSettings) -> Self {
        self.workload = settings.workload.clone();
        self.database = settings.database.clone();
        self
    }

    pub fn model(&self) -> &DynModel {
        &self.model
    }

    /// Runs one reconcile pass for `event`.
    ///
    /// # Errors
    ///
    /// Fails if database initialization fails, if the supervisor rejects the
    /// layer or restart, or if state or the unit address cannot be accessed.
    /// On a database failure `db_initialized` stays `false`, so the next pass
    /// retries the whole script.
    #[instrument(skip(self, event), fields(event = %event))]
    pub async fn reconcile(&mut self, event: &HookEvent) -> Result<ReconcileOutcome> {
        if !self.container.can_connect().await {
            info!(container = self.container.name(), "Workload runtime not reachable, deferring");
            return Ok(ReconcileOutcome::Deferred(UnitStatus::maintenance(
                WAITING_FOR_RUNTIME,
            )));
        }

        let (guacd, mysql) = match self.prerequisites.check(self.model.as_ref()) {
            Readiness::Ready { guacd, mysql } => (guacd, mysql),
            Readiness::Missing(missing) => {
                let message = missing_message(&missing);
                info!(%message, "Prerequisites not met");
                return Ok(ReconcileOutcome::Settled(UnitStatus::blocked(message)));
            }
        };

        self.ensure_database(&mysql).await?;

        let layer = render_layer(&self.workload, &guacd, &mysql);
        self.container
            .add_layer(&self.workload.service, &layer, true)
            .await?;
        self.restart_service().await?;

        let status = self.active_status()?;
        info!(%status, "Workload reconciled");
        Ok(ReconcileOutcome::Settled(status))
    }

    /// Creates the schema unless a previous pass already did.
    async fn ensure_database(&self, mysql: &MysqlInfo) -> Result<()> {
        let mut state = self.state.load().await?;
        if state.db_initialized {
            debug!("Database already initialized");
            return Ok(());
        }

        let params = mysql
            .connection_params()?
            .with_connect_timeout_ms(self.database.connect_timeout_ms);
        let output = self.container.exec(&self.workload.initdb_command).await?;
        let report = self.executor.execute(&params, &output.stdout).await?;

        state.db_initialized = true;
        self.state.save(&state).await?;
        info!(
            database = %params.display_url(),
            executed = report.executed,
            skipped = report.skipped,
            "Database initialized"
        );
        Ok(())
    }

    /// Restarts the service if the current plan defines it.
    async fn restart_service(&self) -> Result<()> {
        let service = &self.workload.service;
        if !self.container.plan().await?.has_service(service) {
            debug!(service, "Service not in plan, skipping restart");
            return Ok(());
        }
        self.container.restart(service).await?;
        info!(service, "Service restarted");
        Ok(())
    }

    /// The active status: the access URL on the leader, empty elsewhere.
    fn active_status(&self) -> Result<UnitStatus> {
        if !self.model.is_leader() {
            return Ok(UnitStatus::active(""));
        }
        let path = &self.workload.url_path;
        let config = self.model.config();
        let url = match config.external_hostname() {
            Some(host) if self.model.relation(INGRESS).is_some() => {
                format!("http://{host}/{path}")
            }
            _ => {
                let address = std::net::SocketAddr::new(
                    self.addresses.unit_address()?,
                    self.workload.port,
                );
                format!("http://{address}/{path}")
            }
        };
        Ok(UnitStatus::active(format!("Go to {url}")))
    }
}
