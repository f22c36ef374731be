//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Convert MyST markdown notebooks to Jupyter notebooks.
#[derive(Parser, Debug)]
#[command(name = "myst-nb", version, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short, long, env = "MYST_NB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Fence info prefix that marks a code cell.
    #[arg(long, global = true)]
    pub code_directive: Option<String>,

    /// Fence info prefix that marks a raw cell.
    #[arg(long, global = true)]
    pub raw_directive: Option<String>,

    /// Record the source lines of every cell.
    #[arg(long, global = true)]
    pub line_numbers: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert MyST files (or directories of them) to `.ipynb`.
    Convert {
        /// Files or directories to convert.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file; only valid with a single input file.
        #[arg(short, long, conflicts_with = "out_dir")]
        output: Option<PathBuf>,

        /// Directory to write notebooks into.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Report whether files are MyST notebooks and whether their metadata is valid.
    Check {
        /// Files or directories to check.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Print a one-line summary of every cell in a notebook.
    Inspect {
        /// The notebook to inspect.
        input: PathBuf,
    },

    /// Configuration operations.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the config file path.
    Path,

    /// Show the effective configuration.
    Show,

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}
