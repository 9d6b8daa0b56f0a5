use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use starchart::model::Note;
use starchart::rating::{ERROR_SENTINEL, compute_rating};
use starchart::util::logging::init_logging;

/// Rate a chart from a JSON note list.
///
/// The input file holds an array of `{"column", "head", "tail"?}` objects
/// with times in milliseconds; `tail` is omitted (or -1) for taps.
#[derive(Debug, Parser)]
#[command(name = "starchart", version)]
struct Args {
    /// Path to the JSON note list.
    input: PathBuf,

    /// Number of columns in the chart.
    #[arg(short, long)]
    keys: usize,

    /// Overall-difficulty value of the chart.
    #[arg(long, default_value_t = 8.0)]
    od: f64,

    /// Emit the result as JSON, including per-stage timings.
    #[arg(long)]
    json: bool,

    /// Also log to a daily-rotated file in this directory.
    #[arg(long, env = "STARCHART_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Show debug logs.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_dir.as_deref(), args.verbose)?;

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let notes: Vec<Note> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {} as a note list", args.input.display()))?;

    let outcome = compute_rating(&notes, args.keys, args.od);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.rating == ERROR_SENTINEL {
        let detail = outcome.diagnostics.error().unwrap_or("unknown failure");
        anyhow::bail!("rating failed: {detail}");
    } else {
        println!("{:.4}", outcome.rating);
        for (stage, elapsed) in outcome.diagnostics.stages() {
            tracing::info!(stage, ?elapsed, "stage timing");
        }
    }

    Ok(())
}
