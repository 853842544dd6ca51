//! Relation data as exposed by the host.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A flat string-to-string data bag.
pub type RelationData = BTreeMap<String, String>;

/// Host-assigned relation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationId(pub u32);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data contributed by one remote unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationUnit {
    /// Unit name, e.g. `mysql/0`.
    pub name: String,
    /// The unit's data bag.
    #[serde(default)]
    pub data: RelationData,
}

/// A snapshot of one established relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation identifier.
    pub id: RelationId,
    /// Endpoint name, e.g. `mysql`.
    pub name: String,
    /// Data bag of the remote application.
    #[serde(default)]
    pub app_data: RelationData,
    /// Remote units in join order.
    #[serde(default)]
    pub units: Vec<RelationUnit>,
}

impl Relation {
    /// Creates a relation without data or units.
    pub fn new(id: RelationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            app_data: RelationData::new(),
            units: Vec::new(),
        }
    }

    /// Returns the first non-empty value of `key` across units, in order.
    pub fn unit_value(&self, key: &str) -> Option<&str> {
        self.units
            .iter()
            .filter_map(|unit| unit.data.get(key))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    /// Returns the value of `key` in the application bag, if non-empty.
    pub fn app_value(&self, key: &str) -> Option<&str> {
        self.app_data
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}
