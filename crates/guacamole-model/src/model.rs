//! The host model: relations, leadership, configuration and status.

use serde::{Deserialize, Serialize};

use crate::relation::{Relation, RelationId};
use crate::status::UnitStatus;

/// Charm configuration set by the administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CharmConfig {
    /// Hostname the application is published under through ingress.
    #[serde(default)]
    pub external_hostname: Option<String>,
}

impl CharmConfig {
    /// Returns the external hostname, treating an empty value as unset.
    pub fn external_hostname(&self) -> Option<&str> {
        self.external_hostname
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
    }
}

/// Read access to the host model plus the status surface.
///
/// Every call reads live state; implementations must not cache relation data
/// between calls.
pub trait Model: Send + Sync {
    /// Returns the relation established on `endpoint`, if any.
    ///
    /// When several relations share an endpoint the first one is returned.
    fn relation(&self, endpoint: &str) -> Option<Relation>;

    /// Returns a relation by id, or `None` once it has been removed.
    fn relation_by_id(&self, id: RelationId) -> Option<Relation>;

    /// Returns `true` if this unit is the elected leader.
    fn is_leader(&self) -> bool;

    /// Returns the current charm configuration.
    fn config(&self) -> CharmConfig;

    /// Publishes the unit's workload status.
    fn set_status(&self, status: UnitStatus);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_hostname() {
        let config: CharmConfig =
            serde_json::from_str(r#"{"external-hostname": "guacamole.example.com"}"#)
                .expect("deserialization failed");
        assert_eq!(config.external_hostname(), Some("guacamole.example.com"));

        let config: CharmConfig =
            serde_json::from_str(r#"{"external-hostname": "  "}"#).expect("deserialization failed");
        assert_eq!(config.external_hostname(), None);

        assert_eq!(CharmConfig::default().external_hostname(), None);
    }
}
