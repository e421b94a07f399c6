//! Spotify Category Audio Statistics Library
//!
//! Fetches the top tracks of a Spotify browse category, enriches every track
//! with audio features and audio analysis, and writes the result as JSON.
//! Per-track analysis failures are retried once and otherwise tolerated;
//! everything before that aborts the run.
//!
//! # Modules
//!
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Errors that abort a pipeline run
//! - `management` - Persisting enriched result sets
//! - `pipeline` - The staged enrichment pipeline
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```ignore
//! use sporlstats::{config, pipeline::Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> sporlstats::Res<()> {
//!     config::load_env().await?;
//!     let pipeline = Pipeline::new(config::Settings::from_env()?);
//!     let report = pipeline.run("pop").await?;
//!     println!("{} tracks", report.tracks.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod pipeline;
pub mod spotify;
pub mod types;
pub mod utils;

/// Boxed result used at the binary boundary, where errors of any kind only
/// need to be printed.
///
/// Library operations return [`error::PipelineError`] instead, which converts
/// into this via `?`.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a progress line prefixed with a blue `o`.
///
/// ```ignore
/// info!("Category {} lists {} tracks", category, count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a completion line prefixed with a green `✓`.
///
/// ```ignore
/// success!("Wrote {}", path.display());
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits with status 1.
///
/// Only for the command layer: library code returns errors instead of
/// terminating the process.
///
/// ```ignore
/// error!("Cannot load configuration. Err: {}", e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for problems the run recovers from.
///
/// ```ignore
/// warning!("{} analysis requests still failing after retry", residual);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
