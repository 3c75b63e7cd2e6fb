//! CLI module - command-line interface
//!
//! Argument parsing and the handlers behind each subcommand.

pub mod commands;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Trendwatch - short-video trend digests and research reports
#[derive(Parser, Debug)]
#[command(name = "trendwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Print reports instead of posting them to the webhook
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build and send the hashtag trend digest
    Trends {
        /// Hashtag to include (repeatable); defaults to the configured list
        #[arg(long = "hashtag", short = 't')]
        hashtags: Vec<String>,
    },

    /// Run the research agent on a brief and send its report
    Research {
        /// What to research, in plain language
        brief: String,

        /// Override the agent's iteration budget
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Inspect or write the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print the effective configuration with secrets masked
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}
