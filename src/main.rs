mod batch;
mod cli;
mod console;
mod logging;
mod utils;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, SessionArgs};
use colored::*;
use console::Console;
use dotenv::dotenv;
use inventory_scan::export::write_session_exports;
use inventory_scan::{AppConfig, Catalog, Workspace};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match inventory_scan::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Count(session)) => {
            if let Err(err) = run_count(&config, &session) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::Batch(batch)) => {
            if let Err(err) = run_batch(&config, &batch.session, &batch.codes) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::Validate { catalog }) => match Catalog::from_path(&catalog) {
            Ok(loaded) => println!(
                "{} {} products, {} scannable codes",
                "Catalog OK:".green(),
                loaded.len(),
                loaded.alias_count()
            ),
            Err(err) => {
                error!("{}", err);
                process::exit(2);
            }
        },
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

/// Build the workspace from flags, falling back to configuration values.
fn open_workspace(config: &AppConfig, args: &SessionArgs, require_catalog: bool) -> Result<Workspace> {
    let session = args
        .session
        .clone()
        .unwrap_or_else(|| config.default_session.clone());
    let mut workspace = Workspace::new(&session)?;

    let catalog_path = args
        .catalog
        .clone()
        .or_else(|| config.catalog_path.as_ref().map(PathBuf::from));

    match catalog_path {
        Some(path) => {
            workspace
                .import_catalog(&path)
                .with_context(|| format!("loading catalog '{}'", path.display()))?;
        }
        None if require_catalog => return Err(anyhow!("no catalog given (--catalog or catalog_path)")),
        None => info!("No catalog yet; load one with :import PATH"),
    }

    Ok(workspace)
}

fn export_dir(config: &AppConfig, args: &SessionArgs) -> PathBuf {
    args.export_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.export_dir))
}

fn run_count(config: &AppConfig, args: &SessionArgs) -> Result<()> {
    let workspace = open_workspace(config, args, false)?;
    let mut console = Console::new(workspace, export_dir(config, args), config.default_quantity);
    let stdin = io::stdin();
    console.run(&mut stdin.lock())
}

fn run_batch(config: &AppConfig, args: &SessionArgs, codes: &Path) -> Result<()> {
    let mut workspace = open_workspace(config, args, true)?;
    let report = batch::replay(&mut workspace, codes, config.default_quantity)?;
    info!(
        "{} lines: {} matched, {} unknown, {} blank",
        report.lines,
        report.matched,
        report.unknown,
        report.skipped,
    );

    let catalog = workspace
        .catalog()
        .ok_or_else(|| anyhow!("no catalog loaded"))?;
    let paths = write_session_exports(
        &export_dir(config, args),
        workspace.sessions.current_name(),
        catalog,
        workspace.sessions.current(),
    )?;
    for path in paths {
        println!("{} {}", "Wrote".green(), path.display());
    }

    Ok(())
}
