//! CLI structure and dispatch.
//!
//! Commands:
//! - `status` - schema version and row counts
//! - `search` - substring search over one record kind
//! - `report` - build a text report and export it to a file
//! - `pedigree` - print an animal's ancestry tree

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zoo_core::ZooConfig;

pub use commands::*;

/// Zoo records maintenance tool.
#[derive(Parser, Debug)]
#[command(name = "zoo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database (overrides ZOO_DB_PATH)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error (overrides ZOO_LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Directory for rolling log files (overrides ZOO_LOG_DIR)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show schema version and row counts
    Status,

    /// Search records of one kind; blank text lists everything
    Search {
        /// Record kind, e.g. animal, species, feeding, caretakers
        kind: String,

        /// Case-insensitive substring
        #[arg(default_value = "")]
        text: String,
    },

    /// Build a report and export it as paginated text
    Report {
        /// animals, employees, enclosures, feeds, feeding, health, pedigree, caretakers
        kind: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Search text restricting the listed rows
        #[arg(short, long, default_value = "")]
        filter: String,

        /// Root animal name (pedigree reports)
        #[arg(short, long)]
        animal: Option<String>,

        /// Pedigree depth limit
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },

    /// Print the pedigree of an animal
    Pedigree {
        /// Animal name, matched ignoring case
        name: String,

        /// Generations to resolve before truncating
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },
}

impl Cli {
    /// Layers command-line flags over the environment configuration.
    pub fn resolve_config(&self, mut config: ZooConfig) -> Result<ZooConfig, CliError> {
        if let Some(database) = &self.database {
            config.db_path = database.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
        if let Some(log_dir) = config.log_dir.take() {
            let absolute = if log_dir.is_absolute() {
                log_dir
            } else {
                std::env::current_dir()
                    .map_err(|err| CliError::Config(format!("cannot resolve log dir: {err}")))?
                    .join(log_dir)
            };
            config.log_dir = Some(absolute);
        }
        Ok(config)
    }
}

/// Executes the parsed command line.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    let config = cli.resolve_config(ZooConfig::from_env().map_err(CliError::Config)?)?;
    zoo_core::init_logging_from_config(&config).map_err(CliError::Config)?;

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&config),
        Some(Commands::Search { kind, text }) => cmd_search(&config, &kind, &text),
        Some(Commands::Report {
            kind,
            output,
            filter,
            animal,
            max_depth,
        }) => cmd_report(&config, &kind, &output, &filter, animal, max_depth),
        Some(Commands::Pedigree { name, max_depth }) => cmd_pedigree(&config, &name, max_depth),
    }
}
