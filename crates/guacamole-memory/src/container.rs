//! In-memory [`Container`] implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use guacamole_model::{Container, ExecOutput, Layer, Plan, WorkloadError};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct ContainerState {
    can_connect: bool,
    plan: Plan,
    layers: Vec<(String, Layer)>,
    restarts: Vec<String>,
    exec_outputs: HashMap<Vec<String>, ExecOutput>,
    exec_calls: Vec<Vec<String>>,
}

/// In-memory workload container.
///
/// Layers are combined into the plan the way the supervisor does; restarts
/// and exec calls are recorded for inspection. Commands without a
/// registered output produce empty stdout.
#[derive(Debug)]
pub struct MemoryContainer {
    name: String,
    state: Mutex<ContainerState>,
}

impl MemoryContainer {
    /// Creates a reachable container with an empty plan.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(ContainerState {
                can_connect: true,
                ..Default::default()
            }),
        }
    }

    pub async fn set_can_connect(&self, can_connect: bool) {
        self.state.lock().await.can_connect = can_connect;
    }

    /// Registers the output returned when `command` is executed.
    pub async fn set_exec_output<S: AsRef<str>>(&self, command: &[S], output: ExecOutput) {
        let command = command.iter().map(|s| s.as_ref().to_string()).collect();
        self.state.lock().await.exec_outputs.insert(command, output);
    }

    /// Layers added so far, oldest first.
    pub async fn layers(&self) -> Vec<(String, Layer)> {
        self.state.lock().await.layers.clone()
    }

    /// Services restarted so far, oldest first.
    pub async fn restarts(&self) -> Vec<String> {
        self.state.lock().await.restarts.clone()
    }

    /// Commands executed so far, oldest first.
    pub async fn exec_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().await.exec_calls.clone()
    }
}

#[async_trait]
impl Container for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn can_connect(&self) -> bool {
        self.state.lock().await.can_connect
    }

    async fn plan(&self) -> Result<Plan, WorkloadError> {
        let state = self.state.lock().await;
        if !state.can_connect {
            return Err(WorkloadError::unreachable(&self.name));
        }
        Ok(state.plan.clone())
    }

    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<(), WorkloadError> {
        let mut state = self.state.lock().await;
        if !state.can_connect {
            return Err(WorkloadError::unreachable(&self.name));
        }
        if !combine && state.layers.iter().any(|(existing, _)| existing == label) {
            return Err(WorkloadError::api(format!("layer {label:?} already exists")));
        }
        state.plan.combine(layer);
        state.layers.push((label.to_string(), layer.clone()));
        Ok(())
    }

    async fn restart(&self, service: &str) -> Result<(), WorkloadError> {
        let mut state = self.state.lock().await;
        if !state.plan.has_service(service) {
            return Err(WorkloadError::api(format!("service {service:?} not found in plan")));
        }
        state.restarts.push(service.to_string());
        Ok(())
    }

    async fn exec(&self, command: &[String]) -> Result<ExecOutput, WorkloadError> {
        let mut state = self.state.lock().await;
        if !state.can_connect {
            return Err(WorkloadError::exec(command, "container unreachable"));
        }
        state.exec_calls.push(command.to_vec());
        Ok(state.exec_outputs.get(command).cloned().unwrap_or_default())
    }
}
