//! flex-endpoint CLI
//!
//! Reads a git tree listing on stdin and writes the endpoint JSON
//! files. Typical invocation from a recipes checkout:
//!
//! ```text
//! git ls-tree HEAD */* | flex-endpoint symfony/recipes main flex/main ./out
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use flex_endpoint::{generate, Config, Result};

#[derive(Parser)]
#[command(name = "flex-endpoint")]
#[command(about = "Generates the json files required by Flex", long_about = None)]
#[command(version)]
struct Cli {
    /// The name of the GitHub repository
    repository: String,

    /// The source branch of recipes
    source_branch: String,

    /// The branch of the target Flex endpoint
    flex_branch: String,

    /// The directory where generated files should be stored
    output_directory: PathBuf,

    /// Generate a contrib endpoint (no version matrix download)
    #[arg(long)]
    contrib: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let config = Config {
        repository: cli.repository,
        source_branch: cli.source_branch,
        flex_branch: cli.flex_branch,
        output_directory: cli.output_directory,
        contrib: cli.contrib,
        recipes_root: PathBuf::from("."),
    };

    let summary = generate(&config, io::stdin().lock())?;

    info!(
        "Generated {} package documents for {} packages ({} aliases) from {} listing entries",
        summary.recipes_written, summary.packages, summary.aliases, summary.entries
    );

    Ok(())
}
