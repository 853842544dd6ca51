//! Reading the `guacd` and `mysql` relations.
//!
//! Relation data is read live from the model on every call. A key counts as
//! present only if it holds a non-empty value.

use std::collections::BTreeSet;

use guacamole_db_mysql::ConnectionParams;
use guacamole_model::{Model, Relation, RelationId};
use tracing::debug;

use crate::error::{OperatorError, Result};

/// Endpoint of the guacd proxy relation.
pub const GUACD: &str = "guacd";

/// Endpoint of the MySQL relation.
pub const MYSQL: &str = "mysql";

/// Endpoint of the optional ingress relation.
pub const INGRESS: &str = "ingress";

const GUACD_KEYS: &[&str] = &["hostname", "port"];
const MYSQL_KEYS: &[&str] = &["host", "port", "user", "password", "database", "root_password"];

/// Which data bags of a relation hold the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataScope {
    /// The remote application's bag.
    Application,
    /// The remote units' bags; the first non-empty value in join order wins.
    Units,
}

impl DataScope {
    fn value<'a>(self, relation: &'a Relation, key: &str) -> Option<&'a str> {
        match self {
            Self::Application => relation.app_value(key),
            Self::Units => relation.unit_value(key),
        }
    }
}

/// The requiring side of one relation endpoint.
///
/// The relation is bound lazily on first use and re-bound when the bound
/// relation goes away, so a requirer created before the relation exists
/// picks it up later.
#[derive(Debug, Clone)]
pub struct RelationRequirer {
    endpoint: &'static str,
    mandatory_keys: &'static [&'static str],
    scope: DataScope,
    binding: Option<RelationId>,
}

impl RelationRequirer {
    pub fn new(
        endpoint: &'static str,
        mandatory_keys: &'static [&'static str],
        scope: DataScope,
    ) -> Self {
        Self {
            endpoint,
            mandatory_keys,
            scope,
            binding: None,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn binding(&self) -> Option<RelationId> {
        self.binding
    }

    /// Returns the live relation, binding it first if necessary.
    pub fn resolve(&mut self, model: &dyn Model) -> Option<Relation> {
        if let Some(id) = self.binding {
            if let Some(relation) = model.relation_by_id(id) {
                return Some(relation);
            }
            debug!(endpoint = self.endpoint, relation_id = %id, "Bound relation is gone");
            self.binding = None;
        }
        let relation = model.relation(self.endpoint)?;
        debug!(endpoint = self.endpoint, relation_id = %relation.id, "Relation bound");
        self.binding = Some(relation.id);
        Some(relation)
    }

    /// Reads one key; absent and empty values both yield `None`.
    pub fn read(&mut self, model: &dyn Model, key: &str) -> Option<String> {
        let relation = self.resolve(model)?;
        self.scope.value(&relation, key).map(str::to_string)
    }

    /// Returns `true` if the relation is absent or any mandatory key is unset.
    pub fn is_missing(&mut self, model: &dyn Model) -> bool {
        match self.resolve(model) {
            Some(relation) => self.first_missing_key(&relation).is_some(),
            None => true,
        }
    }

    fn first_missing_key(&self, relation: &Relation) -> Option<&'static str> {
        self.mandatory_keys
            .iter()
            .copied()
            .find(|key| self.scope.value(relation, key).is_none())
    }

    /// Returns the live relation only if every mandatory key is set.
    fn complete(&mut self, model: &dyn Model) -> Option<Relation> {
        let relation = self.resolve(model)?;
        if let Some(key) = self.first_missing_key(&relation) {
            debug!(endpoint = self.endpoint, key, "Mandatory relation key missing");
            return None;
        }
        Some(relation)
    }
}

/// Connection info published by guacd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuacdInfo {
    pub hostname: String,
    pub port: String,
}

/// Credentials published by the database.
#[derive(Clone, PartialEq, Eq)]
pub struct MysqlInfo {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl std::fmt::Debug for MysqlInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .field("database", &self.database)
            .finish()
    }
}

impl MysqlInfo {
    /// Builds connection parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::InvalidRelationData`] if the port is not a
    /// valid TCP port.
    pub fn connection_params(&self) -> Result<ConnectionParams> {
        let port: u16 = self.port.trim().parse().map_err(|e| {
            OperatorError::invalid_relation_data(MYSQL, "port", &self.port, format!("{e}"))
        })?;
        Ok(ConnectionParams::new(
            &self.host,
            port,
            &self.user,
            &self.password,
            &self.database,
        ))
    }
}

/// Result of checking the prerequisites of the workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready { guacd: GuacdInfo, mysql: MysqlInfo },
    Missing(BTreeSet<&'static str>),
}

/// The relations the workload cannot start without.
#[derive(Debug, Clone)]
pub struct Prerequisites {
    guacd: RelationRequirer,
    mysql: RelationRequirer,
}

impl Default for Prerequisites {
    fn default() -> Self {
        Self::new()
    }
}

impl Prerequisites {
    pub fn new() -> Self {
        Self {
            guacd: RelationRequirer::new(GUACD, GUACD_KEYS, DataScope::Application),
            mysql: RelationRequirer::new(MYSQL, MYSQL_KEYS, DataScope::Units),
        }
    }

    /// Names of the prerequisites that are missing, sorted.
    pub fn missing(&mut self, model: &dyn Model) -> BTreeSet<&'static str> {
        [&mut self.guacd, &mut self.mysql]
            .into_iter()
            .filter_map(|requirer| requirer.is_missing(model).then_some(requirer.endpoint()))
            .collect()
    }

    pub fn guacd(&mut self, model: &dyn Model) -> Option<GuacdInfo> {
        let relation = self.guacd.complete(model)?;
        let scope = DataScope::Application;
        Some(GuacdInfo {
            hostname: scope.value(&relation, "hostname")?.to_string(),
            port: scope.value(&relation, "port")?.to_string(),
        })
    }

    pub fn mysql(&mut self, model: &dyn Model) -> Option<MysqlInfo> {
        let relation = self.mysql.complete(model)?;
        let read = |key: &str| DataScope::Units.value(&relation, key).map(str::to_string);
        Some(MysqlInfo {
            host: read("host")?,
            port: read("port")?,
            user: read("user")?,
            password: read("password")?,
            database: read("database")?,
        })
    }

    /// Reads both relations, or reports which ones are missing.
    pub fn check(&mut self, model: &dyn Model) -> Readiness {
        match (self.guacd(model), self.mysql(model)) {
            (Some(guacd), Some(mysql)) => Readiness::Ready { guacd, mysql },
            (guacd, mysql) => {
                let mut missing = BTreeSet::new();
                if guacd.is_none() {
                    missing.insert(GUACD);
                }
                if mysql.is_none() {
                    missing.insert(MYSQL);
                }
                Readiness::Missing(missing)
            }
        }
    }
}

/// Status message for missing prerequisites.
pub fn missing_message(missing: &BTreeSet<&'static str>) -> String {
    let names: Vec<&str> = missing.iter().copied().collect();
    format!("missing relations: {}", names.join(", "))
}
