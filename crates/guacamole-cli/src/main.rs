mod cli;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use guacamole_db_mysql::{ConnectionParams, MysqlBackend, ScriptExecutor, split};
use guacamole_operator::config::loader::load_config_with_default_path;
use guacamole_operator::init_tracing_with_level;

use cli::{ApplyArgs, Cli, Commands, ScriptArg};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !dotenv_missing(&e) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_config_with_default_path(cli.config.as_deref())
        .map_err(anyhow::Error::msg)
        .context("loading settings")?;
    init_tracing_with_level(&settings.logging.level);

    match cli.command {
        Commands::Apply(args) => apply(args, settings.database.connect_timeout_ms).await,
        Commands::Split(arg) => {
            for statement in split(&read_script(&arg)?) {
                println!("{}", statement.trim());
            }
            Ok(())
        }
    }
}

async fn apply(args: ApplyArgs, connect_timeout_ms: u64) -> Result<()> {
    let script = read_script(&args.script)?;
    let params = ConnectionParams::new(args.host, args.port, args.user, args.password, args.database)
        .with_connect_timeout_ms(connect_timeout_ms);
    tracing::info!(database = %params.display_url(), "Applying schema");

    let executor = ScriptExecutor::new(Arc::new(MysqlBackend::new()));
    let report = executor
        .execute(&params, &script)
        .await
        .with_context(|| format!("applying schema to {}", params.display_url()))?;
    println!(
        "{} statements executed, {} skipped",
        report.executed, report.skipped
    );
    Ok(())
}

fn dotenv_missing(error: &dotenvy::Error) -> bool {
    matches!(error, dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
}

fn read_script(arg: &ScriptArg) -> Result<String> {
    match arg.script.as_deref() {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut script = String::new();
            std::io::stdin()
                .read_to_string(&mut script)
                .context("reading script from stdin")?;
            Ok(script)
        }
    }
}
