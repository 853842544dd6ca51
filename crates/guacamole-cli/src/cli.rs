use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "guacamole-initdb")]
#[command(about = "Apply the Guacamole database schema, skipping objects that already exist")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Operator settings file (defaults to ./guacamole-operator.toml if present)
    #[arg(short, long, global = true, env = "GUACAMOLE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a schema script against a MySQL database
    Apply(ApplyArgs),
    /// Print the statements a script splits into
    Split(ScriptArg),
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Database host
    #[arg(long, env = "MYSQL_HOSTNAME", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(long, env = "MYSQL_PORT", default_value_t = 3306)]
    pub port: u16,

    /// Database user
    #[arg(short, long, env = "MYSQL_USER")]
    pub user: String,

    /// Database password
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Database name
    #[arg(short, long, env = "MYSQL_DATABASE")]
    pub database: String,

    #[command(flatten)]
    pub script: ScriptArg,
}

#[derive(Args)]
pub struct ScriptArg {
    /// Script file; reads stdin when omitted or `-`
    pub script: Option<PathBuf>,
}
