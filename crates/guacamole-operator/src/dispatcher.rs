//! Hook event delivery with deferral.
//!
//! The host delivers one event at a time. An event whose reconcile pass is
//! deferred is kept and redelivered, ahead of the new event, on the next
//! dispatch.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::reconciler::{ReconcileOutcome, Reconciler};

/// Events that trigger a reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// The workload container's supervisor became ready.
    WorkloadReady,
    /// The charm configuration changed.
    ConfigChanged,
    /// Data on a relation endpoint changed.
    RelationChanged(String),
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkloadReady => f.write_str("workload-ready"),
            Self::ConfigChanged => f.write_str("config-changed"),
            Self::RelationChanged(endpoint) => write!(f, "{endpoint}-relation-changed"),
        }
    }
}

/// Delivers events to a [`Reconciler`] and publishes the resulting status.
pub struct Dispatcher {
    reconciler: Reconciler,
    deferred: VecDeque<HookEvent>,
}

impl Dispatcher {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler,
            deferred: VecDeque::new(),
        }
    }

    /// Events waiting for redelivery, oldest first.
    pub fn deferred(&self) -> impl Iterator<Item = &HookEvent> {
        self.deferred.iter()
    }

    /// Redelivers deferred events, then delivers `event`.
    ///
    /// An event already waiting in the queue is taken out of it and delivered
    /// once, after the other queued events. Returns the outcome for `event`.
    ///
    /// # Errors
    ///
    /// Stops at the first failing pass. The failed event and everything not
    /// yet delivered stay queued for the next dispatch.
    pub async fn dispatch(&mut self, event: HookEvent) -> Result<ReconcileOutcome> {
        let mut queued = std::mem::take(&mut self.deferred);
        queued.retain(|pending| *pending != event);

        while let Some(pending) = queued.pop_front() {
            debug!(event = %pending, "Redelivering deferred event");
            if let Err(e) = self.deliver(&pending).await {
                self.defer(pending);
                for rest in queued {
                    self.defer(rest);
                }
                self.defer(event);
                return Err(e);
            }
        }

        match self.deliver(&event).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.defer(event);
                Err(e)
            }
        }
    }

    async fn deliver(&mut self, event: &HookEvent) -> Result<ReconcileOutcome> {
        let outcome = match self.reconciler.reconcile(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%event, error = %e, "Reconcile failed");
                return Err(e);
            }
        };
        self.reconciler.model().set_status(outcome.status().clone());
        if outcome.is_deferred() {
            self.defer(event.clone());
        }
        Ok(outcome)
    }

    fn defer(&mut self, event: HookEvent) {
        if !self.deferred.contains(&event) {
            debug!(%event, "Event deferred");
            self.deferred.push_back(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use async_trait::async_trait;
    use guacamole_db_mysql::{
        ConnectionParams, DriverError, ScriptExecutor, SqlBackend, SqlSession,
    };
    use guacamole_memory::{
        MemoryContainer, MemoryModel, MemoryStateStore, StaticAddressResolver,
    };
    use guacamole_model::{ExecOutput, UnitStatus};

    use super::*;
    use crate::relations::{GUACD, MYSQL};

    struct RefusingBackend;

    #[async_trait]
    impl SqlBackend for RefusingBackend {
        async fn begin(
            &self,
            params: &ConnectionParams,
        ) -> std::result::Result<Box<dyn SqlSession>, DriverError> {
            Err(DriverError::new(format!("Can't connect to MySQL server on '{}'", params.host)))
        }
    }

    struct AcceptingBackend;

    struct AcceptingSession;

    #[async_trait]
    impl SqlBackend for AcceptingBackend {
        async fn begin(
            &self,
            _params: &ConnectionParams,
        ) -> std::result::Result<Box<dyn SqlSession>, DriverError> {
            Ok(Box::new(AcceptingSession))
        }
    }

    #[async_trait]
    impl SqlSession for AcceptingSession {
        async fn execute(&mut self, _statement: &str) -> std::result::Result<(), DriverError> {
            Ok(())
        }

        async fn commit(self: Box<Self>) -> std::result::Result<(), DriverError> {
            Ok(())
        }
    }

    fn dispatcher(
        backend: Arc<dyn SqlBackend>,
    ) -> (Dispatcher, Arc<MemoryModel>, Arc<MemoryContainer>) {
        let model = Arc::new(MemoryModel::new());
        let container = Arc::new(MemoryContainer::new("guacamole"));
        let reconciler = Reconciler::new(
            model.clone(),
            container.clone(),
            Arc::new(MemoryStateStore::new()),
            ScriptExecutor::new(backend),
            Arc::new(StaticAddressResolver(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))),
        );
        (Dispatcher::new(reconciler), model, container)
    }

    fn add_relations(model: &MemoryModel) {
        let guacd = model.add_relation(GUACD);
        model.update_app_data(guacd, [("hostname", "guacd"), ("port", "4822")]);
        let mysql = model.add_relation(MYSQL);
        model.add_relation_unit(mysql, "mysql/0");
        model.update_unit_data(
            mysql,
            "mysql/0",
            [
                ("host", "db"),
                ("port", "3306"),
                ("user", "guac"),
                ("password", "secret"),
                ("database", "guacamole_db"),
                ("root_password", "root"),
            ],
        );
    }

    #[test]
    fn test_event_display() {
        assert_eq!(HookEvent::WorkloadReady.to_string(), "workload-ready");
        assert_eq!(
            HookEvent::RelationChanged("mysql".into()).to_string(),
            "mysql-relation-changed"
        );
    }

    #[tokio::test]
    async fn test_status_is_published() {
        let (mut dispatcher, model, _) = dispatcher(Arc::new(AcceptingBackend));
        dispatcher.dispatch(HookEvent::WorkloadReady).await.unwrap();
        assert_eq!(
            model.status(),
            Some(UnitStatus::blocked("missing relations: guacd, mysql"))
        );
        assert_eq!(dispatcher.deferred().count(), 0);
    }

    #[tokio::test]
    async fn test_deferred_event_is_redelivered() {
        let (mut dispatcher, model, container) = dispatcher(Arc::new(AcceptingBackend));
        add_relations(&model);
        container.set_can_connect(false).await;

        let outcome = dispatcher.dispatch(HookEvent::ConfigChanged).await.unwrap();
        assert!(outcome.is_deferred());
        assert_eq!(
            model.status(),
            Some(UnitStatus::maintenance("waiting for pebble to start"))
        );
        assert_eq!(
            dispatcher.deferred().collect::<Vec<_>>(),
            vec![&HookEvent::ConfigChanged]
        );

        // Deferring the same event again does not duplicate it.
        dispatcher.dispatch(HookEvent::ConfigChanged).await.unwrap();
        assert_eq!(dispatcher.deferred().count(), 1);

        container.set_can_connect(true).await;
        let outcome = dispatcher.dispatch(HookEvent::WorkloadReady).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Settled(UnitStatus::active("")));
        assert_eq!(dispatcher.deferred().count(), 0);
        // One layer for the redelivered event and one for the new one.
        assert_eq!(container.layers().await.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_event_moves_behind_queued_events() {
        let (mut dispatcher, model, container) = dispatcher(Arc::new(AcceptingBackend));
        add_relations(&model);
        container.set_can_connect(false).await;

        dispatcher.dispatch(HookEvent::ConfigChanged).await.unwrap();
        dispatcher
            .dispatch(HookEvent::RelationChanged(MYSQL.into()))
            .await
            .unwrap();
        assert_eq!(
            dispatcher.deferred().collect::<Vec<_>>(),
            vec![
                &HookEvent::ConfigChanged,
                &HookEvent::RelationChanged(MYSQL.into())
            ]
        );

        dispatcher.dispatch(HookEvent::ConfigChanged).await.unwrap();
        assert_eq!(
            dispatcher.deferred().collect::<Vec<_>>(),
            vec![
                &HookEvent::RelationChanged(MYSQL.into()),
                &HookEvent::ConfigChanged
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_event_stays_queued() {
        let (mut dispatcher, model, container) = dispatcher(Arc::new(RefusingBackend));
        add_relations(&model);
        container
            .set_exec_output(
                &["/opt/guacamole/bin/initdb.sh", "--mysql"],
                ExecOutput::stdout("CREATE TABLE a (id INT);"),
            )
            .await;

        let result = dispatcher
            .dispatch(HookEvent::RelationChanged(MYSQL.into()))
            .await;
        assert!(result.is_err());
        assert_eq!(
            dispatcher.deferred().collect::<Vec<_>>(),
            vec![&HookEvent::RelationChanged(MYSQL.into())]
        );

        let result = dispatcher.dispatch(HookEvent::ConfigChanged).await;
        assert!(result.is_err());
        assert_eq!(
            dispatcher.deferred().collect::<Vec<_>>(),
            vec![
                &HookEvent::RelationChanged(MYSQL.into()),
                &HookEvent::ConfigChanged
            ]
        );
    }
}
