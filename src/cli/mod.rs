//! Command-line interface for pkgsieve.
//!
//! Argument parsing is clap-derive based; each subcommand lives in its own
//! module under `commands/`. Status output goes to stderr through [`Output`]
//! so stdout stays reserved for the filtered manifest stream.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

pub use output::Output;

/// pkgsieve - selector-based exclusion filtering for Kubernetes package manifests
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true, env = "PKGSIEVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable quiet output (status messages suppressed)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Overwrite existing files without prompting
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Filter manifest streams through the configured exclusion selectors
    Filter {
        /// Manifest files to read (stdin when omitted or given as '-')
        paths: Vec<PathBuf>,

        /// Write the retained documents to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (yaml, json)
        #[arg(long, default_value = "yaml")]
        format: String,

        /// Print a count summary after filtering
        #[arg(long)]
        stats: bool,

        /// Additional selector expression such as 'group=example.org' (repeatable)
        #[arg(short = 'e', long = "exclude", value_name = "EXPR")]
        exclude: Vec<String>,
    },
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a starter configuration file
    Init,
    /// Validate the effective configuration
    Validate,
    /// Show the effective configuration
    Show,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = Output::new(self.verbose, self.quiet);

        match self.command {
            Some(Commands::Filter {
                paths,
                output: destination,
                format,
                stats,
                exclude,
            }) => commands::filter::execute(
                paths,
                destination,
                &format,
                stats,
                &exclude,
                self.config.as_deref(),
                &output,
            ),
            Some(Commands::Config(cmd)) => {
                commands::config::execute(cmd, self.config.as_deref(), self.force, &output)
            }
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}
