//! Pebble-style layer and plan documents.
//!
//! A layer describes the services a supervisor should run. Layers submitted
//! with `combine` are merged into the supervisor's plan service by service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a service in a layer combines with the same service already planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Override {
    /// Merge the fields set in the layer into the existing service.
    Merge,
    /// Replace the existing service entirely.
    #[default]
    Replace,
}

/// Whether the supervisor starts a service automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    #[default]
    Enabled,
    Disabled,
}

/// One supervised service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "override")]
    pub override_mode: Override,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    pub command: String,
    #[serde(default)]
    pub startup: Startup,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// A layer submitted to the supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
}

/// The supervisor's combined view of all applied layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
}

impl Plan {
    /// Returns `true` if `service` is part of the plan.
    pub fn has_service(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    /// Combines a layer into the plan, honouring each service's override mode.
    pub fn combine(&mut self, layer: &Layer) {
        for (name, service) in &layer.services {
            match (service.override_mode, self.services.get_mut(name)) {
                (Override::Merge, Some(existing)) => {
                    if !service.summary.is_empty() {
                        existing.summary = service.summary.clone();
                    }
                    if !service.command.is_empty() {
                        existing.command = service.command.clone();
                    }
                    existing.startup = service.startup;
                    existing
                        .environment
                        .extend(service.environment.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                _ => {
                    self.services.insert(name.clone(), service.clone());
                }
            }
        }
    }
}
