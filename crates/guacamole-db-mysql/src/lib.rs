//! MySQL script execution for the Guacamole operator.
//!
//! This crate runs database initialization scripts exactly once per database,
//! tolerating the errors a previous, partially applied run leaves behind.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use guacamole_db_mysql::{ConnectionParams, MysqlBackend, ScriptExecutor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ConnectionParams::new("mysql", 3306, "guacamole", "secret", "guacamole_db");
//! let executor = ScriptExecutor::new(Arc::new(MysqlBackend::new()));
//!
//! let report = executor.execute(&params, "CREATE TABLE t (id INT);").await?;
//! assert_eq!(report.executed, 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`script`]: comment stripping and statement splitting
//! - [`classify`]: benign/fatal classification of driver errors
//! - [`executor`]: the transactional, idempotent executor and its backend traits
//! - [`mysql`]: sqlx-based MySQL backend
//! - [`config`]: connection parameters

mod config;
mod error;

pub mod classify;
pub mod executor;
pub mod mysql;
pub mod script;

// Re-export main types
pub use classify::{ErrorClass, ErrorClassifier, MessageClassifier};
pub use config::ConnectionParams;
pub use error::{DriverError, Result, SqlExecutionError};
pub use executor::{DynSqlBackend, ExecutionReport, ScriptExecutor, SqlBackend, SqlSession};
pub use mysql::MysqlBackend;
pub use script::split;
