use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use guacamole_db_mysql::{
    ConnectionParams, DriverError, ScriptExecutor, SqlBackend, SqlSession,
};
use guacamole_memory::{MemoryContainer, MemoryModel, StaticAddressResolver};
use guacamole_model::{ExecOutput, StateStore, UnitStatus};
use guacamole_operator::{
    Dispatcher, FileStateStore, HookEvent, OperatorError, OperatorSettings, ReconcileOutcome,
    Reconciler,
};

const INITDB: &[&str] = &["/opt/guacamole/bin/initdb.sh", "--mysql"];

/// A database that remembers created tables across connections.
#[derive(Default)]
struct FakeDatabase {
    tables: Arc<Mutex<Vec<String>>>,
    log: Arc<Mutex<Vec<String>>>,
}

struct FakeSession {
    tables: Arc<Mutex<Vec<String>>>,
    log: Arc<Mutex<Vec<String>>>,
    created: Vec<String>,
}

#[async_trait]
impl SqlBackend for FakeDatabase {
    async fn begin(&self, _params: &ConnectionParams) -> Result<Box<dyn SqlSession>, DriverError> {
        Ok(Box::new(FakeSession {
            tables: self.tables.clone(),
            log: self.log.clone(),
            created: Vec::new(),
        }))
    }
}

#[async_trait]
impl SqlSession for FakeSession {
    async fn execute(&mut self, statement: &str) -> Result<(), DriverError> {
        self.log.lock().unwrap().push(statement.trim().to_string());
        let statement = statement.trim();
        if statement == ";" {
            return Err(DriverError::new("Query was empty").with_code("42000"));
        }
        if let Some(rest) = statement.strip_prefix("CREATE TABLE ") {
            let name = rest.split_whitespace().next().unwrap_or_default().to_string();
            if self.tables.lock().unwrap().contains(&name) || self.created.contains(&name) {
                return Err(
                    DriverError::new(format!("Table '{name}' already exists")).with_code("42S01")
                );
            }
            self.created.push(name);
            return Ok(());
        }
        Err(DriverError::new(format!("You have an error in your SQL syntax near '{statement}'")))
    }

    async fn commit(self: Box<Self>) -> Result<(), DriverError> {
        let FakeSession {
            tables, created, ..
        } = *self;
        tables.lock().unwrap().extend(created);
        Ok(())
    }
}

struct Deployment {
    model: Arc<MemoryModel>,
    container: Arc<MemoryContainer>,
    database: Arc<FakeDatabase>,
    dispatcher: Dispatcher,
    _dir: tempfile::TempDir,
    state_path: std::path::PathBuf,
}

fn deploy() -> Deployment {
    let dir = tempfile::tempdir().expect("tmp dir");
    let state_path = dir.path().join("state.json");
    let model = Arc::new(MemoryModel::new());
    let container = Arc::new(MemoryContainer::new("guacamole"));
    let database = Arc::new(FakeDatabase::default());
    let reconciler = Reconciler::new(
        model.clone(),
        container.clone(),
        Arc::new(FileStateStore::new(&state_path)),
        ScriptExecutor::new(database.clone()),
        Arc::new(StaticAddressResolver("10.0.0.5".parse::<IpAddr>().unwrap())),
    )
    .with_settings(&OperatorSettings::default());
    Deployment {
        model,
        container,
        database,
        dispatcher: Dispatcher::new(reconciler),
        _dir: dir,
        state_path,
    }
}

fn relate_guacd(model: &MemoryModel) {
    let id = model.add_relation("guacd");
    model.add_relation_unit(id, "guacd/0");
    model.update_app_data(id, [("hostname", "guacd"), ("port", "4822")]);
}

fn relate_mysql(model: &MemoryModel) {
    let id = model.add_relation("mysql");
    model.add_relation_unit(id, "mysql/0");
    model.update_unit_data(
        id,
        "mysql/0",
        [
            ("host", "mysql"),
            ("port", "3306"),
            ("user", "guacamole"),
            ("password", "secret"),
            ("database", "guacamole_db"),
            ("root_password", "root"),
        ],
    );
}

#[tokio::test]
async fn full_lifecycle() {
    let mut deployment = deploy();
    deployment.model.set_leader(true);
    deployment
        .container
        .set_exec_output(
            INITDB,
            ExecOutput::stdout(
                "-- Guacamole schema\nCREATE TABLE guacamole_user (id INT);\n\nCREATE TABLE guacamole_entity (id INT); -- entities\n",
            ),
        )
        .await;

    // No relations yet.
    deployment
        .dispatcher
        .dispatch(HookEvent::WorkloadReady)
        .await
        .unwrap();
    assert_eq!(
        deployment.model.status(),
        Some(UnitStatus::blocked("missing relations: guacd, mysql"))
    );

    relate_guacd(&deployment.model);
    deployment
        .dispatcher
        .dispatch(HookEvent::RelationChanged("guacd".into()))
        .await
        .unwrap();
    assert_eq!(
        deployment.model.status(),
        Some(UnitStatus::blocked("missing relations: mysql"))
    );

    relate_mysql(&deployment.model);
    let outcome = deployment
        .dispatcher
        .dispatch(HookEvent::RelationChanged("mysql".into()))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::Settled(UnitStatus::active("Go to http://10.0.0.5:8080/guacamole"))
    );
    assert_eq!(deployment.model.status(), Some(outcome.status().clone()));

    // Schema created once; the trailing empty statement is tolerated.
    assert_eq!(
        *deployment.database.tables.lock().unwrap(),
        vec!["guacamole_user".to_string(), "guacamole_entity".to_string()]
    );
    let state = FileStateStore::new(&deployment.state_path).load().await.unwrap();
    assert!(state.db_initialized);

    let layers = deployment.container.layers().await;
    let env = &layers.last().unwrap().1.services["guacamole"].environment;
    assert_eq!(env["MYSQL_HOSTNAME"], "mysql");
    assert_eq!(env["GUACD_PORT"], "4822");
    assert_eq!(
        deployment.container.restarts().await,
        vec!["guacamole".to_string()]
    );

    // Later events do not touch the database again.
    let statements = deployment.database.log.lock().unwrap().len();
    deployment
        .dispatcher
        .dispatch(HookEvent::ConfigChanged)
        .await
        .unwrap();
    assert_eq!(deployment.database.log.lock().unwrap().len(), statements);
    assert_eq!(deployment.container.exec_calls().await.len(), 1);
}

#[tokio::test]
async fn schema_rerun_against_initialized_database() {
    let mut deployment = deploy();
    relate_guacd(&deployment.model);
    relate_mysql(&deployment.model);
    deployment
        .container
        .set_exec_output(INITDB, ExecOutput::stdout("CREATE TABLE guacamole_user (id INT);\n"))
        .await;
    // The tables exist but the operator lost its state.
    deployment
        .database
        .tables
        .lock()
        .unwrap()
        .push("guacamole_user".into());

    let outcome = deployment
        .dispatcher
        .dispatch(HookEvent::WorkloadReady)
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Settled(UnitStatus::active("")));
    let state = FileStateStore::new(&deployment.state_path).load().await.unwrap();
    assert!(state.db_initialized);
}

#[tokio::test]
async fn fatal_schema_error_keeps_retrying() {
    let mut deployment = deploy();
    relate_guacd(&deployment.model);
    relate_mysql(&deployment.model);
    deployment
        .container
        .set_exec_output(
            INITDB,
            ExecOutput::stdout("CREATE TABLE a (id INT);\nDROP EVERYTHING;\nCREATE TABLE b (id INT);\n"),
        )
        .await;

    let err = deployment
        .dispatcher
        .dispatch(HookEvent::WorkloadReady)
        .await
        .unwrap_err();
    match err {
        OperatorError::Sql(sql) => {
            assert_eq!(sql.statement().map(str::trim), Some("DROP EVERYTHING;"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        *deployment.database.log.lock().unwrap(),
        vec!["CREATE TABLE a (id INT);".to_string(), "DROP EVERYTHING;".to_string()]
    );
    assert!(deployment.database.tables.lock().unwrap().is_empty());
    assert!(deployment.container.layers().await.is_empty());
    assert_eq!(
        deployment.dispatcher.deferred().collect::<Vec<_>>(),
        vec![&HookEvent::WorkloadReady]
    );
}

#[tokio::test]
async fn unreachable_runtime_defers_until_ready() {
    let mut deployment = deploy();
    relate_guacd(&deployment.model);
    relate_mysql(&deployment.model);
    deployment.container.set_can_connect(false).await;

    let outcome = deployment
        .dispatcher
        .dispatch(HookEvent::ConfigChanged)
        .await
        .unwrap();
    assert!(outcome.is_deferred());
    assert_eq!(
        deployment.model.status(),
        Some(UnitStatus::maintenance("waiting for pebble to start"))
    );
    assert!(!deployment.state_path.exists());

    deployment.container.set_can_connect(true).await;
    deployment
        .dispatcher
        .dispatch(HookEvent::WorkloadReady)
        .await
        .unwrap();
    assert_eq!(deployment.dispatcher.deferred().count(), 0);
    assert_eq!(deployment.model.status(), Some(UnitStatus::active("")));
}
