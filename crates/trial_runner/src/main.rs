//! Trial Runner CLI
//!
//! Generates physics trials against a live engine or the offline stand-in,
//! and inspects the resulting records.

#[cfg(feature = "cli")]
use anyhow::{bail, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use trial_runner::EngineTarget;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "trial_runner")]
#[command(about = "Generate and inspect physics benchmark trials", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run every trial of a scenario and write records
    Run {
        /// Scenario config (YAML or JSON)
        #[arg(long)]
        config: PathBuf,

        /// Engine address (host:port)
        #[arg(long, conflicts_with = "offline")]
        engine: Option<String>,

        /// Use the in-process stand-in instead of a live engine
        #[arg(long)]
        offline: bool,

        /// Output directory for trial records
        #[arg(long)]
        out: PathBuf,

        /// Override the number of trials
        #[arg(long)]
        num: Option<u32>,

        /// Override the run seed
        #[arg(long)]
        seed: Option<u64>,

        /// Also write a pretty JSON copy of each record
        #[arg(long, default_value = "false")]
        json: bool,

        /// Extra catalog file merged over the built-in prototypes
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print the initialization batch of one trial as JSON
    Plan {
        /// Scenario config (YAML or JSON)
        #[arg(long)]
        config: PathBuf,

        /// Trial index
        #[arg(long, default_value = "0")]
        trial: u32,

        /// Extra catalog file merged over the built-in prototypes
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print per-trial aggregates as JSON lines
    Summarize {
        /// Directory written by `run`
        #[arg(long)]
        dir: PathBuf,
    },

    /// Print the configuration JSON schema
    Schema,

    /// List catalog prototypes
    Catalog {
        /// Extra catalog file merged over the built-in prototypes
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    trial_runner::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            engine,
            offline,
            out,
            num,
            seed,
            json,
            catalog,
        } => {
            let target = match (engine, offline) {
                (Some(addr), false) => EngineTarget::Remote(addr),
                (None, true) => EngineTarget::Offline,
                _ => bail!("pass either --engine <addr> or --offline"),
            };
            let scenario = trial_runner::load_config(&config, num, seed)?;
            let catalog = trial_runner::load_catalog(catalog.as_deref())?;
            let report = trial_runner::run_trials(scenario, catalog, &target, &out, json)?;
            println!("{}", serde_json::json!({
                "trials_written": report.trials_written,
                "trials_failed": report.trials_failed,
                "frames": report.frames,
                "out": out.display().to_string(),
            }));
        }

        Commands::Plan {
            config,
            trial,
            catalog,
        } => {
            let scenario = trial_runner::load_config(&config, None, None)?;
            let catalog = trial_runner::load_catalog(catalog.as_deref())?;
            let batch = trial_runner::plan_batch(scenario, catalog, trial)?;
            println!("{}", serde_json::to_string_pretty(&batch)?);
        }

        Commands::Summarize { dir } => {
            for summary in trial_runner::summarize_dir(&dir)? {
                println!("{}", serde_json::to_string(&summary)?);
            }
        }

        Commands::Schema => {
            println!("{}", trial_runner::schema_json()?);
        }

        Commands::Catalog { file } => {
            let catalog = trial_runner::load_catalog(file.as_deref())?;
            for line in trial_runner::catalog_lines(&catalog) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("trial_runner was built without the `cli` feature");
}
