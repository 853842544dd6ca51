//! Connection parameters for the MySQL backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection parameters taken from the `mysql` relation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Server host name or address.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// User to connect as.
    pub user: String,

    /// Password for `user`.
    pub password: String,

    /// Database (schema) the script runs against.
    pub database: String,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl ConnectionParams {
    /// Creates connection parameters with the default timeout.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn with_connect_timeout_ms(mut self, timeout: u64) -> Self {
        self.connect_timeout_ms = timeout;
        self
    }

    /// Connection URL with the password masked, for logging.
    pub fn display_url(&self) -> String {
        let password = if self.password.is_empty() { "" } else { ":****" };
        format!(
            "mysql://{}{}@{}:{}/{}",
            self.user, password, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .field("database", &self.database)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}
