//! publist - publication lists from NASA ADS
//!
//! # Commands
//!
//! - `fetch`: run every roster member's queries and update the snapshot
//! - `verify`: print records whose member matches need a human to confirm
//! - `whitelist` / `remove` / `whiten`: curate the snapshot
//! - `render`: fetch missing BibTeX and print the TeX or HTML list
//! - `count`: number of records in the snapshot
//!
//! Logs go to stderr; stdout carries only command output.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use publist_core::{OutputFormat, PublistConfig, TargetEncoding};

mod commands;

#[derive(Parser)]
#[command(name = "publist")]
#[command(version)]
#[command(about = "Build an organization's publication list from NASA ADS")]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: {config_dir}/publist/config.toml if present)
    #[arg(long, global = true, env = "PUBLIST_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search ADS for every member and merge the results into the snapshot
    Fetch {
        #[arg(long)]
        snapshot: PathBuf,
        /// Roster CSV URL or path, overriding `roster.source`
        #[arg(long)]
        roster: Option<String>,
        /// Start from an empty store instead of the existing snapshot
        #[arg(long)]
        fresh: bool,
    },
    /// Print the verification worklist, one JSON object per line
    Verify {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Confirm records by bibcode
    Whitelist {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(required = true)]
        bibcodes: Vec<String>,
    },
    /// Drop records by bibcode
    Remove {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(required = true)]
        bibcodes: Vec<String>,
    },
    /// Confirm records matched by several members at once
    Whiten {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long, default_value_t = 3)]
        min_members: usize,
    },
    /// Render the publication list, oldest first
    Render {
        #[arg(long)]
        snapshot: PathBuf,
        /// `tex` or `html`
        #[arg(long, default_value = "tex")]
        format: OutputFormat,
        /// Override `output.encoding` (utf-8, latin-1, ascii)
        #[arg(long)]
        encoding: Option<TargetEncoding>,
        /// Write here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Count records in the snapshot
    Count {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        arxiv_only: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => PublistConfig::load(path)?,
        None => PublistConfig::load_standard()?,
    };

    match cli.command {
        Command::Fetch {
            snapshot,
            roster,
            fresh,
        } => commands::fetch(&config, &snapshot, roster.as_deref(), fresh),
        Command::Verify { snapshot } => commands::verify(&config, &snapshot),
        Command::Whitelist { snapshot, bibcodes } => {
            commands::whitelist(&config, &snapshot, &bibcodes)
        }
        Command::Remove { snapshot, bibcodes } => commands::remove(&config, &snapshot, &bibcodes),
        Command::Whiten {
            snapshot,
            min_members,
        } => commands::whiten(&config, &snapshot, min_members),
        Command::Render {
            snapshot,
            format,
            encoding,
            output,
        } => commands::render(&config, &snapshot, format, encoding, output.as_deref()),
        Command::Count {
            snapshot,
            arxiv_only,
        } => commands::count(&config, &snapshot, arxiv_only),
    }
}
