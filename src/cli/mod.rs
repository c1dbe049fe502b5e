//! CLI command definitions and handlers

mod analyze;
mod init;
mod rules;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// archrisk - threat-model risk analysis
#[derive(Parser, Debug)]
#[command(name = "archrisk")]
#[command(
    version,
    about = "Derive scored security risks from an architecture threat model",
    long_about = "archrisk reads a declarative model of data, technical assets, trust boundaries \
and communication links, scores how attractive each asset is to an attacker, runs its \
built-in risk rules and reconciles the results with the tracking entries in the model.",
    after_help = "\
Examples:
  archrisk analyze model.yaml                    Text report on stdout
  archrisk analyze model.yaml --format json      JSON output for scripting
  archrisk analyze model.yaml --fail-on high     Exit 1 on open high+ risks
  archrisk rules                                 List built-in rules"
)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel rule workers (1-64)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a threat model and report its risks
    Analyze {
        /// Model file (.yaml, .yml or .json)
        model: PathBuf,

        /// Output format: text, json
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Rule IDs to skip (repeatable)
        #[arg(long = "skip-rule")]
        skip_rule: Vec<String>,

        /// Warn about tracking entries that match no risk instead of failing
        #[arg(long)]
        ignore_orphaned_risk_tracking: bool,

        /// Exit with code 1 if any open risk is at or above this severity
        #[arg(long, value_parser = ["low", "medium", "elevated", "high", "critical"])]
        fail_on: Option<String>,
    },

    /// List the built-in risk rules
    Rules {
        /// Print the rule catalogue as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write an example archrisk.toml config file
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            model,
            format,
            output,
            skip_rule,
            ignore_orphaned_risk_tracking,
            fail_on,
        } => analyze::run(analyze::AnalyzeOptions {
            model,
            format,
            output,
            skip_rules: skip_rule,
            ignore_orphans: ignore_orphaned_risk_tracking,
            fail_on,
            workers: cli.workers,
        }),

        Commands::Rules { json } => rules::run(json),

        Commands::Init { path } => init::run(&path),
    }
}
