// crates/sptrack-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sptrack_core::{
    compute_steps_multi_tau,
    io::{read_steps_auto, read_tracks_auto, write_steps_auto, write_summary_auto, write_tracks_auto},
    io_jsonl::write_tracks_jsonl,
    summary_by_tau, Summary,
};
use sptrack_sim::generator::{generate_tracks, SimParams};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "sptrack-cli",
    about = "Single-particle-tracking displacement statistics",
    long_about = "Single-particle-tracking displacement statistics.\n\nUse this tool to simulate track tables, extract per-lag displacement steps, and summarize them per lag.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a synthetic random-walk track table.
    Simulate {
        /// Number of trajectories (>0)
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        cells: u32,

        /// Frames per trajectory (>0), before drops
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
        frames: u32,

        /// Nominal frame interval (minutes)
        #[arg(long, default_value_t = 1.0)]
        dt_min: f64,

        /// Timing jitter upper bound per observation (minutes)
        #[arg(long, default_value_t = 0.0)]
        jitter_min: f64,

        /// Max per-axis increment per frame (micrometers)
        #[arg(long, default_value_t = 1.0)]
        sigma_um: f64,

        /// Probability of dropping an observation, in [0, 1)
        #[arg(long, default_value_t = 0.0)]
        drop_prob: f64,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output track table (JSON/CBOR/JSONL)
        #[arg(long, default_value = "tracks.jsonl")]
        out: PathBuf,
    },

    /// Extract displacement steps for one or more lags.
    Steps {
        /// Input track table (JSON/CBOR/JSONL)
        #[arg(long)]
        tracks: PathBuf,

        /// Lag in frames; repeat or comma-separate for several (e.g. --tau 1,2,4)
        #[arg(
            long = "tau",
            visible_alias = "taus",
            value_delimiter = ',',
            default_values_t = [1i64],
            allow_negative_numbers = true
        )]
        taus: Vec<i64>,

        /// Output steps table (JSON/CBOR/JSONL/CSV)
        #[arg(long, default_value = "steps.csv")]
        out: PathBuf,

        /// Also write the per-lag summary here (JSON/CBOR/JSONL/CSV)
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Summarize a steps table per lag.
    Summary {
        /// Input steps table (JSON/CBOR/JSONL)
        #[arg(long)]
        steps: PathBuf,

        /// Output path (JSON/CBOR/JSONL/CSV); prints a table to stdout if omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Convert a track table (JSON/CBOR/JSONL) to JSON Lines.
    ExportJsonl {
        /// Input track table
        #[arg(long)]
        input: PathBuf,
        /// Output JSONL path
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Simulate {
            cells,
            frames,
            dt_min,
            jitter_min,
            sigma_um,
            drop_prob,
            seed,
            out,
        } => simulate(
            &SimParams {
                cells,
                frames,
                dt_min,
                jitter_min,
                sigma_um,
                drop_prob,
                seed,
            },
            &out,
        ),

        Cmd::Steps {
            tracks,
            taus,
            out,
            summary,
        } => extract_steps(&tracks, &taus, &out, summary.as_deref()),

        Cmd::Summary { steps, out } => summarize(&steps, out.as_deref()),

        Cmd::ExportJsonl { input, output } => export_jsonl(&input, &output),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn simulate(params: &SimParams, out: &Path) -> Result<()> {
    info!(cells = params.cells, frames = params.frames, seed = params.seed, "generating tracks");
    let tracks = generate_tracks(params).context("generating synthetic tracks")?;
    write_tracks_auto(out, &tracks)
        .with_context(|| format!("writing tracks to {}", out.display()))?;

    println!(
        "Simulated {} cells × {} frames → {} rows → {}",
        params.cells,
        params.frames,
        tracks.len(),
        out.display()
    );
    Ok(())
}

fn extract_steps(tracks_path: &Path, taus: &[i64], out: &Path, summary_out: Option<&Path>) -> Result<()> {
    info!(tracks = %tracks_path.display(), ?taus, out = %out.display(), "extracting steps");
    let tracks = read_tracks_auto(tracks_path)
        .with_context(|| format!("reading tracks from {}", tracks_path.display()))?;

    let steps = compute_steps_multi_tau(&tracks, taus)
        .with_context(|| format!("computing steps for {}", tracks_path.display()))?;
    write_steps_auto(out, &steps)?;
    println!("Wrote {} steps for taus {:?} → {}", steps.len(), taus, out.display());

    if let Some(path) = summary_out {
        let summary = summary_by_tau(&steps);
        write_summary_auto(path, &summary)?;
        println!("Wrote summary ({} lags) → {}", summary.len(), path.display());
    }
    Ok(())
}

fn summarize(steps_path: &Path, out: Option<&Path>) -> Result<()> {
    info!(steps = %steps_path.display(), "summarizing steps");
    let steps = read_steps_auto(steps_path)
        .with_context(|| format!("reading steps from {}", steps_path.display()))?;
    let summary = summary_by_tau(&steps);

    match out {
        Some(path) => {
            write_summary_auto(path, &summary)?;
            println!("Wrote summary ({} lags) → {}", summary.len(), path.display());
        }
        None => print_summary(&summary),
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!(
        "{:>10} {:>10} {:>8} {:>15}",
        "tau_frames", "n_steps", "n_cells", "median_tau_min"
    );
    for r in summary.rows() {
        println!(
            "{:>10} {:>10} {:>8} {:>15.4}",
            r.tau_frames, r.n_steps, r.n_cells, r.median_tau_min
        );
    }
}

/// Convert any track table (JSON/CBOR/JSONL) into JSON Lines.
fn export_jsonl(input: &Path, output: &Path) -> Result<()> {
    info!(infile = %input.display(), outfile = %output.display(), "export to jsonl");
    let tracks = read_tracks_auto(input).context("reading input tracks")?;
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating parent directory {}", dir.display()))?;
    }
    write_tracks_jsonl(output, &tracks)?;
    println!("Exported {} rows → {}", tracks.len(), output.display());
    Ok(())
}
