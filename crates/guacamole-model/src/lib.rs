//! # guacamole-model
//!
//! Abstractions over the orchestration host the Guacamole operator runs in.
//!
//! This crate defines the traits and types the operator reconciles against.
//! It does not contain any host integration - an in-memory implementation
//! lives in `guacamole-memory`.
//!
//! ## Overview
//!
//! - [`Model`]: relations, leadership, charm configuration and unit status
//! - [`Container`]: the workload container and its process supervisor
//! - [`StateStore`]: state persisted across operator invocations
//! - [`AddressResolver`]: the unit's own network address
//!
//! ## Example
//!
//! ```ignore
//! use guacamole_model::{Model, UnitStatus};
//!
//! fn block_without_database(model: &dyn Model) {
//!     if model.relation("mysql").is_none() {
//!         model.set_status(UnitStatus::blocked("missing relations: mysql"));
//!     }
//! }
//! ```

mod container;
mod layer;
mod model;
mod network;
mod relation;
mod state;
mod status;

pub use container::{Container, ExecOutput, WorkloadError};
pub use layer::{Layer, Override, Plan, Service, Startup};
pub use model::{CharmConfig, Model};
pub use network::{AddressResolver, ResolveError};
pub use relation::{Relation, RelationData, RelationId, RelationUnit};
pub use state::{StateError, StateStore, StoredState};
pub use status::UnitStatus;

/// Type alias for a shareable model.
pub type DynModel = std::sync::Arc<dyn Model>;

/// Type alias for a shareable workload container.
pub type DynContainer = std::sync::Arc<dyn Container>;

/// Type alias for a shareable state store.
pub type DynStateStore = std::sync::Arc<dyn StateStore>;

/// Type alias for a shareable address resolver.
pub type DynAddressResolver = std::sync::Arc<dyn AddressResolver>;
