//! CLI command definitions and handlers.

pub mod classify;
pub mod models;

use clap::{Parser, Subcommand};

/// Photo Classify - predict the category of photos with a local model
#[derive(Parser)]
#[command(name = "photo-classify")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared classify arguments (paths, pipeline, output).
    #[command(flatten)]
    pub classify: classify::ClassifyArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Classify images
    Classify(classify::ClassifyArgs),
    /// Manage model files
    Models(models::ModelsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every image was classified.
    Success = 0,
    /// At least one request failed.
    Failures = 1,
    /// Fatal error before or during the run.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
