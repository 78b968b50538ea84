//! Command-line interface for readalong
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Read-along tutor: follow a reader through a story from recognizer output
#[derive(Parser, Debug)]
#[command(
    name = "readalong",
    version,
    about = "Follow a reader through a story from speech recognizer output"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: focus phrases and info logs, -vv: per-token decisions)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay recognizer output (JSON lines) against a story
    Read {
        /// Story document (JSON)
        #[arg(long, short = 's', value_name = "FILE")]
        story: PathBuf,

        /// Recognizer transcript, one JSON message per line (default: stdin)
        #[arg(long, short = 't', value_name = "FILE")]
        transcript: Option<PathBuf>,

        /// Turn pages automatically once they are read
        #[arg(long)]
        auto_turn: bool,

        /// Add front and back cover pages
        #[arg(long)]
        covers: bool,
    },

    /// Print the focus phrase for a position as recognizer JSON
    Focus {
        /// Story document (JSON)
        #[arg(long, short = 's', value_name = "FILE")]
        story: PathBuf,

        /// Page index (0-based)
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Sentence index on the page (0-based)
        #[arg(long, default_value_t = 0)]
        sentence: usize,

        /// Word index in the sentence (0-based)
        #[arg(long, default_value_t = 0)]
        word: usize,

        /// Add front and back cover pages
        #[arg(long)]
        covers: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Get a configuration value by key (e.g., focus.window_width)
    Get {
        /// Dotted key path (e.g., focus.phrase_mode)
        key: String,
    },
}
