use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OperatorSettings {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Workload container, service and init script
    #[serde(default)]
    pub workload: WorkloadSettings,
    /// Database connection tuning
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Persisted operator state
    #[serde(default)]
    pub state: StateSettings,
}

impl OperatorSettings {
    pub fn validate(&self) -> Result<(), String> {
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Workload validations
        if self.workload.container.is_empty() {
            return Err("workload.container must not be empty".into());
        }
        if self.workload.service.is_empty() {
            return Err("workload.service must not be empty".into());
        }
        if self.workload.command.is_empty() {
            return Err("workload.command must not be empty".into());
        }
        if self.workload.port == 0 {
            return Err("workload.port must be > 0".into());
        }
        if self.workload.initdb_command.is_empty() {
            return Err("workload.initdb_command must not be empty".into());
        }
        // Database validation
        if self.database.connect_timeout_ms == 0 {
            return Err("database.connect_timeout_ms must be > 0".into());
        }
        if self.state.path.as_os_str().is_empty() {
            return Err("state.path must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSettings {
    /// Container holding the workload
    #[serde(default = "default_container")]
    pub container: String,
    /// Supervisor service (and layer label) of the web application
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_command")]
    pub command: String,
    /// Port the web application listens on inside the pod
    #[serde(default = "default_port")]
    pub port: u16,
    /// URL path the application is served under
    #[serde(default = "default_url_path")]
    pub url_path: String,
    /// Command printing the database schema script on stdout
    #[serde(default = "default_initdb_command")]
    pub initdb_command: Vec<String>,
}
fn default_container() -> String {
    "guacamole".into()
}
fn default_service() -> String {
    "guacamole".into()
}
fn default_command() -> String {
    "/opt/guacamole/bin/start.sh".into()
}
fn default_port() -> u16 {
    8080
}
fn default_url_path() -> String {
    "guacamole".into()
}
fn default_initdb_command() -> Vec<String> {
    vec!["/opt/guacamole/bin/initdb.sh".into(), "--mysql".into()]
}
impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            container: default_container(),
            service: default_service(),
            command: default_command(),
            port: default_port(),
            url_path: default_url_path(),
            initdb_command: default_initdb_command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}
impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSettings {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}
fn default_state_path() -> PathBuf {
    PathBuf::from(".guacamole-operator/state.json")
}
impl Default for StateSettings {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

pub mod loader {
    use super::OperatorSettings;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Default settings file, looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "guacamole-operator.toml";

    pub fn load_config(path: Option<&str>) -> Result<OperatorSettings, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                } else {
                    return Err(format!("config file not found: {p}"));
                }
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., GUACAMOLE__WORKLOAD__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("GUACAMOLE")
                .try_parsing(true)
                .separator("__")
                .list_separator(" ")
                .with_list_parse_key("workload.initdb_command"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: OperatorSettings = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_config_with_default_path<P: AsRef<Path>>(
        path: Option<P>,
    ) -> Result<OperatorSettings, String> {
        let p = path
            .as_ref()
            .map(|p| p.as_ref().to_string_lossy().to_string());
        load_config(p.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = OperatorSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.workload.port, 8080);
        assert_eq!(
            settings.workload.initdb_command,
            vec!["/opt/guacamole/bin/initdb.sh", "--mysql"]
        );
    }

    #[test]
    fn test_validation_errors() {
        let mut settings = OperatorSettings::default();
        settings.logging.level = "loud".into();
        assert!(settings.validate().unwrap_err().contains("logging.level"));

        let mut settings = OperatorSettings::default();
        settings.workload.port = 0;
        assert!(settings.validate().unwrap_err().contains("workload.port"));

        let mut settings = OperatorSettings::default();
        settings.workload.initdb_command.clear();
        assert!(settings.validate().unwrap_err().contains("initdb_command"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            r#"
[logging]
level = "debug"

[workload]
port = 9090
initdb_command = ["/usr/bin/initdb", "--mysql"]

[state]
path = "/var/lib/guacamole/state.json"
"#
        )
        .expect("write config");

        let path = file.path().to_string_lossy().to_string();
        let settings = loader::load_config(Some(&path)).expect("config loads");
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.workload.port, 9090);
        assert_eq!(settings.workload.service, "guacamole");
        assert_eq!(settings.workload.initdb_command[0], "/usr/bin/initdb");
        assert_eq!(
            settings.state.path,
            PathBuf::from("/var/lib/guacamole/state.json")
        );
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[workload]\nport = 0\n").expect("write config");

        let path = file.path().to_string_lossy().to_string();
        let err = loader::load_config(Some(&path)).unwrap_err();
        assert!(err.contains("workload.port"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = loader::load_config(Some("/nonexistent/guacamole-operator.toml")).unwrap_err();
        assert!(err.contains("not found"));
    }
}
