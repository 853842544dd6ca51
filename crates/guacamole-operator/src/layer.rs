//! Rendering of the Guacamole service layer.

use std::collections::BTreeMap;

use guacamole_model::{Layer, Override, Service, Startup};

use crate::config::WorkloadSettings;
use crate::relations::{GuacdInfo, MysqlInfo};

/// Runtime environment the Guacamole image expects.
const RUNTIME_ENVIRONMENT: &[(&str, &str)] = &[
    (
        "PATH",
        "/usr/local/tomcat/bin:/usr/local/openjdk-8/bin:/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin",
    ),
    ("LANG", "C.UTF-8"),
    ("JAVA_HOME", "/usr/local/openjdk-8"),
    ("CATALINA_HOME", "/usr/local/tomcat"),
    ("TOMCAT_NATIVE_LIBDIR", "/usr/local/tomcat/native-jni-lib"),
    ("LD_LIBRARY_PATH", "/usr/local/tomcat/native-jni-lib"),
];

/// Builds the layer for the current relation data.
pub fn render_layer(settings: &WorkloadSettings, guacd: &GuacdInfo, mysql: &MysqlInfo) -> Layer {
    let mut environment: BTreeMap<String, String> = RUNTIME_ENVIRONMENT
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    environment.extend([
        ("MYSQL_HOSTNAME".to_string(), mysql.host.clone()),
        ("MYSQL_PORT".to_string(), mysql.port.clone()),
        ("MYSQL_DATABASE".to_string(), mysql.database.clone()),
        ("MYSQL_USER".to_string(), mysql.user.clone()),
        ("MYSQL_PASSWORD".to_string(), mysql.password.clone()),
        ("GUACD_HOSTNAME".to_string(), guacd.hostname.clone()),
        ("GUACD_PORT".to_string(), guacd.port.clone()),
    ]);

    let service = Service {
        override_mode: Override::Replace,
        summary: format!("{} service", settings.service),
        command: settings.command.clone(),
        startup: Startup::Enabled,
        environment,
    };

    Layer {
        summary: format!("{} layer", settings.service),
        description: format!("pebble config layer for {}", settings.service),
        services: BTreeMap::from([(settings.service.clone(), service)]),
    }
}
