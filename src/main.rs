mod core;
mod decoder;
mod renderer;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::batch::{BatchDriver, BatchSummary, MatchConfig};
use crate::core::scorer::score;
use crate::core::signature::{PixelGrid, Signature};
use crate::decoder::{FileImageSource, ImageSource};
use crate::renderer::{JsonReporter, TextReporter};

#[derive(Parser)]
#[command(author, version, about = "Find the reference image whose colors best match each mystery image", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every mystery image against the reference library
    Match {
        #[arg(short, long, default_value = "flags")]
        flags: PathBuf,
        #[arg(short, long, default_value = "inputData")]
        inputs: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        #[arg(short, long, help = "Worker threads for scanning references (default: logical CPUs)")]
        threads: Option<usize>,
        #[arg(long, default_value_t = false, help = "Reuse reference signatures across mystery images")]
        cache: bool,
    },
    /// Print the color signature of one image as JSON
    Signature {
        image: PathBuf,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Score two same-sized images against each other
    Compare {
        first: PathBuf,
        second: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::logging::level_from_flags(cli.verbose, cli.quiet);
    utils::logging::init_log(level, cli.log_file.as_deref())?;

    match &cli.command {
        Commands::Match { flags, inputs, format, threads, cache } => {
            let mut config = MatchConfig { cache: *cache, ..MatchConfig::default() };
            if let Some(threads) = threads {
                config.threads = *threads;
            }
            let stdout = io::stdout().lock();
            run_match(flags, inputs, *format, config, stdout)?;
        }
        Commands::Signature { image, top } => {
            let report = describe_signature(&FileImageSource, image, *top)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Compare { first, second } => {
            let report = compare_files(&FileImageSource, first, second)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn run_match<W: Write>(
    flags: &Path,
    inputs: &Path,
    format: ReportFormat,
    config: MatchConfig,
    out: W,
) -> Result<BatchSummary> {
    let driver = BatchDriver::new(&FileImageSource, config);
    let summary = match format {
        ReportFormat::Text => driver.run_dirs(flags, inputs, &mut TextReporter::new(out)),
        ReportFormat::Json => driver.run_dirs(flags, inputs, &mut JsonReporter::new(out)),
    }
    .context("Batch aborted")?;
    Ok(summary)
}

fn describe_signature<S: ImageSource>(source: &S, path: &Path, top: usize) -> Result<serde_json::Value> {
    let image = source
        .decode(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let (width, height) = PixelGrid::dimensions(&image);
    let signature = Signature::build(&image);

    let colors: Vec<serde_json::Value> = signature
        .most_frequent(top)
        .into_iter()
        .map(|(key, count)| json!({ "r": key.r, "g": key.g, "b": key.b, "count": count }))
        .collect();

    Ok(json!({
        "image": path.display().to_string(),
        "width": width,
        "height": height,
        "total": signature.total(),
        "distinct_colors": signature.distinct_colors(),
        "top_colors": colors,
    }))
}

fn compare_files<S: ImageSource>(source: &S, first: &Path, second: &Path) -> Result<serde_json::Value> {
    let a = source
        .decode(first)
        .with_context(|| format!("Failed to decode {}", first.display()))?;
    let b = source
        .decode(second)
        .with_context(|| format!("Failed to decode {}", second.display()))?;

    let sig_a = Signature::build(&a);
    let rank = score(&sig_a, &Signature::build(&b))
        .with_context(|| format!("Cannot compare {} with {}", first.display(), second.display()))?;

    Ok(json!({
        "first": first.display().to_string(),
        "second": second.display().to_string(),
        "score": rank,
        "pixels": sig_a.total(),
    }))
}
