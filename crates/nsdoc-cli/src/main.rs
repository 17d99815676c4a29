//! nsdoc CLI - Documentation snapshots for Clojure projects

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use nsdoc_project::Config;

mod inspect;
mod snapshot;

/// Crates whose events are shown at the chosen level
const CRATES: [&str; 3] = ["nsdoc_core", "nsdoc_project", "nsdoc_cli"];

#[derive(Parser)]
#[command(name = "nsdoc")]
#[command(version = nsdoc_core::VERSION)]
#[command(about = "Write documentation snapshots of Clojure projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory the snapshot is written to
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Configuration file (defaults to ./nsdoc.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show more detail (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot a Leiningen project
    Project {
        /// Directory containing project.clj
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Snapshot the Clojure sources themselves
    Clojure {
        /// Source root containing clojure/core.clj
        src_dir: PathBuf,

        /// Clojure version recorded in the snapshot
        #[arg(long)]
        clojure_version: String,
    },

    /// Summarize an existing snapshot
    Inspect {
        /// Snapshot file (.json.gz)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Project { dir } => {
            let config = load_config(cli.config.as_deref())?;
            let path = snapshot::project(&dir, &config, cli.output)?;
            println!("{}", path.display());
        }

        Commands::Clojure {
            src_dir,
            clojure_version,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let path = snapshot::clojure(&src_dir, &clojure_version, &config, cli.output)?;
            println!("{}", path.display());
        }

        Commands::Inspect { file } => {
            print!("{}", inspect::summary(&file)?);
        }
    }

    Ok(())
}

/// Route `tracing` events to stderr; `RUST_LOG` overrides the flags
fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_name(verbose, quiet);
        let allowlist: Vec<_> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
        EnvFilter::new(format!("warn,{}", allowlist.join(",")))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn level_name(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load(path).with_context(|| format!("Failed to load '{}'", path.display()))
        }
        None => Config::load_or_default(Path::new(".")).context("Failed to load nsdoc.toml"),
    }
}
