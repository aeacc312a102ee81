use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{ContentWiseDataset, ReplayerDataset, ReplayerOptions};
use reports::{AnalysisOptions, StatValue, Statistics};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

/// dataset-stats - Descriptive statistics for recommendation datasets
#[derive(Parser)]
#[command(name = "dataset-stats")]
#[command(about = "Computes statistics and distributions of recommendation datasets", long_about = None)]
struct Cli {
    /// Also write the statistics table as stats.json
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the ContentWise impressions dataset
    Contentwise {
        /// Interactions CSV file
        interactions: PathBuf,

        /// Direct-link impressions CSV file
        direct: PathBuf,

        /// Non-direct-link impressions CSV file
        non_direct: PathBuf,

        /// Directory the reports are written to
        #[arg(long)]
        out: PathBuf,
    },

    /// Analyze the Yahoo! R6B (Replayer) dataset
    Replayer {
        /// Directory holding the daily event files
        dir: PathBuf,

        /// Directory the reports are written to
        #[arg(long)]
        out: PathBuf,

        /// Keep only users with at least this many events
        #[arg(long, default_value = "0")]
        min_interactions: usize,

        /// Minimum click value counted as relevant
        #[arg(long, default_value = "0.0")]
        threshold: f64,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let options = AnalysisOptions { json: cli.json };

    // Dispatch to appropriate command handler
    let stats = match cli.command {
        Commands::Contentwise {
            interactions,
            direct,
            non_direct,
            out,
        } => handle_contentwise(interactions, direct, non_direct, out, options)?,
        Commands::Replayer {
            dir,
            out,
            min_interactions,
            threshold,
        } => handle_replayer(dir, out, min_interactions, threshold, options)?,
    };

    print_statistics(&stats);
    Ok(())
}

/// Handle the 'contentwise' command
fn handle_contentwise(
    interactions: PathBuf,
    direct: PathBuf,
    non_direct: PathBuf,
    out: PathBuf,
    options: AnalysisOptions,
) -> Result<Statistics> {
    println!("Loading ContentWise dataset from {}...", interactions.display());
    let start = Instant::now();
    let mut dataset = ContentWiseDataset::load(&interactions, &direct, &non_direct)
        .context("Failed to load ContentWise dataset")?;
    println!("{} Data read in {:.2?}", "✓".green(), start.elapsed());

    let stats = reports::analyze_contentwise(&mut dataset, &out, options)
        .with_context(|| format!("Failed to write reports to {}", out.display()))?;
    println!(
        "{} Reports written to {} in {:.2?}",
        "✓".green(),
        out.display(),
        start.elapsed()
    );
    Ok(stats)
}

/// Handle the 'replayer' command
fn handle_replayer(
    dir: PathBuf,
    out: PathBuf,
    min_interactions: usize,
    threshold: f64,
    options: AnalysisOptions,
) -> Result<Statistics> {
    println!("Loading Yahoo! R6B dataset from {}...", dir.display());
    let start = Instant::now();
    let load_options = ReplayerOptions {
        min_interactions_per_user: min_interactions,
        threshold,
    };
    debug!(?load_options, "Replayer options");
    let mut dataset = ReplayerDataset::load(&dir, load_options).context("Failed to load Yahoo! R6B dataset")?;
    println!("{} Data read in {:.2?}", "✓".green(), start.elapsed());

    let stats = reports::analyze_replayer(&mut dataset, &out, options)
        .with_context(|| format!("Failed to write reports to {}", out.display()))?;
    println!(
        "{} Reports written to {} in {:.2?}",
        "✓".green(),
        out.display(),
        start.elapsed()
    );
    Ok(stats)
}

/// Prints the statistics table, names aligned
fn print_statistics(stats: &Statistics) {
    println!("{}", "Dataset statistics:".bold().blue());
    let width = stats.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in stats.iter() {
        let value = match value {
            StatValue::Real(real) if real.is_nan() => value.to_string().yellow(),
            _ => value.to_string().normal(),
        };
        println!("{}{:<width$}  {}", "• ".green(), name, value, width = width);
    }
}
