//! In-memory host model for the Guacamole operator.
//!
//! This crate implements every trait of `guacamole-model` in memory so the
//! operator can be driven without an orchestration host, in tests and in local
//! simulations.
//!
//! # Example
//!
//! ```ignore
//! use guacamole_memory::MemoryModel;
//!
//! let model = MemoryModel::new();
//! let mysql = model.add_relation("mysql");
//! model.add_relation_unit(mysql, "mysql/0");
//! model.update_unit_data(mysql, "mysql/0", [("host", "db"), ("port", "3306")]);
//! ```

pub mod container;
pub mod model;
pub mod network;
pub mod state;

pub use container::MemoryContainer;
pub use model::MemoryModel;
pub use network::StaticAddressResolver;
pub use state::MemoryStateStore;
