//! In-memory [`Model`] implementation.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

use guacamole_model::{CharmConfig, Model, Relation, RelationId, RelationUnit, UnitStatus};

#[derive(Debug, Default)]
struct ModelState {
    relations: Vec<Relation>,
    leader: bool,
    config: CharmConfig,
    statuses: Vec<UnitStatus>,
}

/// In-memory host model.
///
/// Relation data follows host semantics: writing an empty value removes the
/// key from the bag.
#[derive(Debug)]
pub struct MemoryModel {
    state: RwLock<ModelState>,
    next_relation_id: AtomicU32,
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryModel {
    /// Creates a model with no relations, not leader and default config.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ModelState::default()),
            next_relation_id: AtomicU32::new(1),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ModelState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ModelState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_relation(&self, id: RelationId, f: impl FnOnce(&mut Relation)) {
        let mut state = self.write();
        match state.relations.iter_mut().find(|r| r.id == id) {
            Some(relation) => f(relation),
            None => tracing::warn!(relation_id = %id, "Relation not found"),
        }
    }

    /// Establishes a relation on `endpoint`.
    pub fn add_relation(&self, endpoint: &str) -> RelationId {
        let id = RelationId(self.next_relation_id.fetch_add(1, Ordering::SeqCst));
        self.write().relations.push(Relation::new(id, endpoint));
        id
    }

    /// Removes a relation.
    pub fn remove_relation(&self, id: RelationId) {
        self.write().relations.retain(|r| r.id != id);
    }

    /// Joins a remote unit to a relation.
    pub fn add_relation_unit(&self, id: RelationId, unit: &str) {
        self.with_relation(id, |relation| {
            if !relation.units.iter().any(|u| u.name == unit) {
                relation.units.push(RelationUnit {
                    name: unit.to_string(),
                    data: Default::default(),
                });
            }
        });
    }

    /// Removes a remote unit from a relation.
    pub fn remove_relation_unit(&self, id: RelationId, unit: &str) {
        self.with_relation(id, |relation| relation.units.retain(|u| u.name != unit));
    }

    /// Updates a unit's data bag.
    pub fn update_unit_data<K, V>(&self, id: RelationId, unit: &str, data: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let data: Vec<(String, String)> = data.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.with_relation(id, |relation| {
            if let Some(unit) = relation.units.iter_mut().find(|u| u.name == unit) {
                apply(&mut unit.data, data);
            }
        });
    }

    /// Updates the remote application's data bag.
    pub fn update_app_data<K, V>(&self, id: RelationId, data: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let data: Vec<(String, String)> = data.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.with_relation(id, |relation| apply(&mut relation.app_data, data));
    }

    pub fn set_leader(&self, leader: bool) {
        self.write().leader = leader;
    }

    pub fn set_config(&self, config: CharmConfig) {
        self.write().config = config;
    }

    /// Returns the most recently published status.
    pub fn status(&self) -> Option<UnitStatus> {
        self.read().statuses.last().cloned()
    }

    /// Returns every status published so far, oldest first.
    pub fn status_history(&self) -> Vec<UnitStatus> {
        self.read().statuses.clone()
    }
}

fn apply(bag: &mut guacamole_model::RelationData, data: Vec<(String, String)>) {
    for (key, value) in data {
        if value.is_empty() {
            bag.remove(&key);
        } else {
            bag.insert(key, value);
        }
    }
}

impl Model for MemoryModel {
    fn relation(&self, endpoint: &str) -> Option<Relation> {
        self.read()
            .relations
            .iter()
            .find(|r| r.name == endpoint)
            .cloned()
    }

    fn relation_by_id(&self, id: RelationId) -> Option<Relation> {
        self.read().relations.iter().find(|r| r.id == id).cloned()
    }

    fn is_leader(&self) -> bool {
        self.read().leader
    }

    fn config(&self) -> CharmConfig {
        self.read().config.clone()
    }

    fn set_status(&self, status: UnitStatus) {
        self.write().statuses.push(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_lifecycle() {
        let model = MemoryModel::new();
        assert!(model.relation("mysql").is_none());

        let id = model.add_relation("mysql");
        model.add_relation_unit(id, "mysql/0");
        model.update_unit_data(id, "mysql/0", [("host", "db"), ("port", "3306")]);

        let relation = model.relation("mysql").expect("relation exists");
        assert_eq!(relation.id, id);
        assert_eq!(relation.unit_value("host"), Some("db"));

        model.update_unit_data(id, "mysql/0", [("host", "")]);
        assert_eq!(model.relation("mysql").and_then(|r| r.unit_value("host").map(String::from)), None);

        model.remove_relation_unit(id, "mysql/0");
        assert!(model.relation_by_id(id).expect("relation exists").units.is_empty());

        model.remove_relation(id);
        assert!(model.relation_by_id(id).is_none());
    }

    #[test]
    fn test_status_history() {
        let model = MemoryModel::new();
        assert!(model.status().is_none());
        model.set_status(UnitStatus::maintenance("a"));
        model.set_status(UnitStatus::active(""));
        assert_eq!(model.status(), Some(UnitStatus::active("")));
        assert_eq!(model.status_history().len(), 2);
    }
}
