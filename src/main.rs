mod analysis;
mod config;
mod engine;
mod export;
mod manager;
mod model;
mod report;

use crate::config::Overrides;
use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate and export the trajectory and its summary.
    Simulate {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Simulate and print the trajectory without writing anything.
    Show {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Summarize a previously exported trajectory.
    Analyze,

    /// Remove the exported trajectory and summary.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mut mgr = Manager::new(args.sim_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Simulate { overrides } => {
            mgr.apply_overrides(&overrides)?;
            mgr.run_simulation()?;
        }
        Command::Show { overrides } => {
            mgr.apply_overrides(&overrides)?;
            mgr.show_simulation()?;
        }
        Command::Analyze => mgr.run_analysis()?,
        Command::Clean => mgr.clean_sim()?,
    }

    Ok(())
}
