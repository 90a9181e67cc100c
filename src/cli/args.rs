//! Command line argument parsing for the Almoner CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Almoner - match free-text interests to charities
#[derive(Parser, Debug, Clone)]
#[command(name = "almoner")]
#[command(about = "Explainable interest-to-charity matching and ranking")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct AlmonerArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl AlmonerArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recommend charities for an interest query
    Recommend(RecommendArgs),

    /// Show the features extracted from a query
    Extract(ExtractArgs),

    /// Show catalog and index statistics
    Stats(StatsArgs),

    /// Measure recommendation latency over a query file
    Bench(BenchArgs),
}

/// Where the engine loads its catalog, configuration and collaborators from.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Catalog file (.json, .jsonl or .csv)
    #[arg(long, value_name = "FILE", env = "ALMONER_CATALOG")]
    pub catalog: PathBuf,

    /// Engine configuration file (JSON)
    #[arg(long, value_name = "FILE", env = "ALMONER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Relevance model file (JSON)
    #[arg(long, value_name = "FILE", env = "ALMONER_MODEL")]
    pub model: Option<PathBuf>,

    /// Domain synonym table (JSON)
    #[arg(long, value_name = "FILE")]
    pub synonyms: Option<PathBuf>,

    /// Disable linguistic analysis (whitespace keywords only)
    #[arg(long)]
    pub no_nlp: bool,
}

/// Arguments for recommending
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// Interest query
    #[arg(value_name = "QUERY")]
    pub query: String,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Number of results to return
    #[arg(short = 'n', long, default_value = "5")]
    pub top_n: usize,

    /// Perturb scores slightly for variety across repeated queries
    #[arg(long)]
    pub randomize: bool,

    /// User id passed to the relevance model
    #[arg(long)]
    pub user: Option<u64>,

    /// Seed the random generator for reproducible randomized output
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for feature extraction
#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    /// Interest query
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Domain synonym table (JSON)
    #[arg(long, value_name = "FILE")]
    pub synonyms: Option<PathBuf>,

    /// Disable linguistic analysis (whitespace keywords only)
    #[arg(long)]
    pub no_nlp: bool,
}

/// Arguments for statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Arguments for benchmarking
#[derive(Parser, Debug, Clone)]
pub struct BenchArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// File with one query per line (blank lines and `#` comments skipped)
    #[arg(long, value_name = "FILE")]
    pub queries: PathBuf,

    /// Passes over the query file
    #[arg(short, long, default_value = "10")]
    pub iterations: usize,

    /// Number of results per query
    #[arg(short = 'n', long, default_value = "5")]
    pub top_n: usize,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
