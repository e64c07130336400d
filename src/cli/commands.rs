use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::Value;

use crate::application::{Application, Console, Response};
use crate::config::{load_config, AppConfig};
use crate::di::Container;
use crate::logging::init_logging_with_config;
use crate::registry;

/// Command-line interface for the soli demo application
#[derive(Debug, Parser)]
#[command(name = "soli", version)]
#[command(about = "Dispatch requests and console tasks through the soli dispatcher", long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or TOML); defaults apply when it does not exist
    #[arg(long, global = true, env = "SOLI_CONFIG", default_value = "soli.yaml")]
    pub config: PathBuf,

    /// Log level override (trace/debug/info/warn/error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Dispatch a web request and print the response
    Request {
        /// Request URI, e.g. /user/view/1
        uri: String,

        /// HTTP method used for route table matching
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Run a console task
    Run {
        /// Task name (default: main)
        task: Option<String>,

        /// Action name (default: main)
        action: Option<String>,

        /// Positional params handed to the action
        #[arg(trailing_var_arg = true)]
        params: Vec<String>,
    },
    /// List the configured route table
    Routes,
}

fn sample_container() -> Container {
    let mut container = Container::new();
    registry::register_all(&mut container);
    container
}

fn write_value<W: Write>(out: &mut W, value: &Value) -> Result<()> {
    match value {
        Value::String(text) => writeln!(out, "{text}")?,
        other => writeln!(out, "{}", serde_json::to_string_pretty(other)?)?,
    }
    Ok(())
}

/// Execute a parsed command against `config`, writing results to `out`.
///
/// # Errors
///
/// Invalid method or route table, unhandled dispatch errors, or write failures.
pub fn execute<W: Write>(cli: &Cli, config: &AppConfig, out: &mut W) -> Result<()> {
    match &cli.command {
        Commands::Request { uri, method } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method '{method}'"))?;

            let mut app = Application::from_config(config, sample_container())?;
            app.set_dispatch_events(registry::dispatch_events());

            match app.handle(&method, uri) {
                Ok(response) => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?;
                    Ok(())
                }
                Err(err) => {
                    let response = Response::error(err.status_code(), err.message());
                    writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?;
                    Err(err).context(format!("{method} {uri} failed"))
                }
            }
        }
        Commands::Run {
            task,
            action,
            params,
        } => {
            let mut args: Vec<String> = Vec::with_capacity(params.len() + 2);
            if let Some(task) = task {
                args.push(task.clone());
                if let Some(action) = action {
                    args.push(action.clone());
                    args.extend(params.iter().cloned());
                }
            }

            let mut console = Console::from_config(config, sample_container());
            let value = console
                .handle(&args)
                .with_context(|| format!("task '{}' failed", args.join(" ")))?;
            write_value(out, &value)
        }
        Commands::Routes => {
            let router = config.build_router()?;
            if router.is_empty() {
                writeln!(
                    out,
                    "No routes configured; requests are split as /controller/action/params..."
                )?;
            }
            for route in router.routes() {
                writeln!(out, "{route}")?;
            }
            Ok(())
        }
    }
}

/// Parse argv, load configuration, initialise logging and run the command.
///
/// # Errors
///
/// Anything [`execute`] reports, plus config and logging setup failures.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let mut log_config = config.log_config();
    if let Some(level) = &cli.log_level {
        log_config.log_level = level.clone();
    }
    let _logging = init_logging_with_config(&log_config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli, &config, &mut out)
}
