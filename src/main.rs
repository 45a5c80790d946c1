//! Pick an item from the runtime's launcher service and run its action.
//!
//! One run lists the launcher items, lets the user choose one, and asks the
//! runtime to evaluate the chosen item's action.  Cancelling is not an error.

mod app;
mod config;
mod core;
mod shell;
mod ui;

use std::io;

use anyhow::{bail, Result};
use clap::Parser;

use crate::app::picker::BuiltinSelector;
use crate::app::pipeline::{run_pipeline, Outcome};
use crate::app::selector::CommandSelector;
use crate::app::transport::CommandTransport;
use crate::config::{AppConfig, SelectorKind};
use crate::shell::path::locate_program;

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version,
    about = "Choose a launcher item and run its action"
)]
struct Cli {}

// ───────────────────────────────────────── startup ──────────

/// Fail early when a collaborator binary cannot be found.
fn check_programs(config: &AppConfig) -> Result<()> {
    let mut required = vec![("call transport", config.transport.as_str())];
    if let SelectorKind::Command(program) = &config.selector {
        required.push(("selector", program.as_str()));
    }

    for (role, program) in required {
        match locate_program(program) {
            Ok(path) => tracing::debug!("{role}: {}", path.display()),
            Err(e) => bail!("{role} `{program}` was not found on PATH ({e})"),
        }
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (silent unless RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let _cli = Cli::parse();

    let config = AppConfig::load();
    check_programs(&config)?;

    let service = config.launcher_service();
    let mut transport = CommandTransport::from_config(&config);

    let outcome = match &config.selector {
        SelectorKind::Builtin => {
            let mut selector = BuiltinSelector::new(config.clone());
            run_pipeline(&mut transport, &mut selector, service).await?
        }
        SelectorKind::Command(program) => {
            let mut selector = CommandSelector::new(program.clone(), config.selector_args.clone());
            run_pipeline(&mut transport, &mut selector, service).await?
        }
    };

    match outcome {
        Outcome::Dispatched { label } => tracing::info!(%label, "launched"),
        Outcome::Cancelled => tracing::info!("nothing selected"),
        Outcome::Unmatched { choice } => {
            tracing::warn!(%choice, "selection did not match any item; nothing launched")
        }
    }
    Ok(())
}
