//! sptrack-bench-harness
//!
//! Run small end-to-end benchmarks (simulate -> write -> read -> steps -> summary)
//! and append CSV rows into `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run --release -p sptrack-bench-harness -- --profile configs/profiles/small.toml
//!   cargo run --release -p sptrack-bench-harness -- --profile configs/profiles/medium.toml --format cbor

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

use sptrack_core::io::{read_tracks_auto, write_tracks_auto};
use sptrack_core::{compute_steps_multi_tau, summary_by_tau};
use sptrack_sim::generator::{generate_tracks, SimParams};

#[derive(Debug, Deserialize)]
struct Profile {
    /// Generator settings (cells, frames, dt_min, ...)
    #[serde(flatten)]
    sim: SimParams,
    /// Lags to extract, in frames
    taus: Vec<i64>,
    /// Repetitions of the whole pipeline
    repeats: u32,
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_ms(d: Duration) -> u128 {
    d.as_millis()
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag("profile", "configs/profiles/small.toml"));
    let format = parse_flag("format", "cbor");
    if !matches!(format.as_str(), "json" | "cbor" | "jsonl") {
        anyhow::bail!("unknown --format {format} (use json|cbor|jsonl)");
    }

    let profile_src = fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {}", profile_path.display()))?;
    let profile: Profile = toml::from_str(&profile_src).context("parse profile toml")?;
    let sim = &profile.sim;
    println!(
        "Profile: cells={}, frames={}, drop_prob={}, taus={:?}, repeats={}, format={format}",
        sim.cells, sim.frames, sim.drop_prob, profile.taus, profile.repeats
    );

    fs::create_dir_all("benchmarks/reports").context("create benchmarks/reports")?;

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_secs();
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)
        .with_context(|| format!("open {}", csv_path.display()))?;
    writeln!(csv, "timestamp,format,cells,frames,n_taus,repeat,stage,ms,extra")?;

    let row_prefix = |rep: u32| {
        format!(
            "{ts},{format},{},{},{},{rep}",
            sim.cells,
            sim.frames,
            profile.taus.len()
        )
    };

    for rep in 0..profile.repeats {
        let tracks_path = PathBuf::from(format!("benchmarks/tmp-tracks-{ts}-{rep}.{format}"));

        // 1) simulate
        let t0 = Instant::now();
        let tracks = generate_tracks(sim)?;
        let t_gen = t0.elapsed();
        writeln!(csv, "{},gen,{},rows={}", row_prefix(rep), dur_ms(t_gen), tracks.len())?;

        // 2) write + read back through the chosen format
        let t0 = Instant::now();
        write_tracks_auto(&tracks_path, &tracks)?;
        let t_write = t0.elapsed();
        let t0 = Instant::now();
        let tracks = read_tracks_auto(&tracks_path)?;
        let t_read = t0.elapsed();
        writeln!(csv, "{},write,{},", row_prefix(rep), dur_ms(t_write))?;
        writeln!(csv, "{},read,{},", row_prefix(rep), dur_ms(t_read))?;

        // 3) steps for all taus
        let t0 = Instant::now();
        let steps = compute_steps_multi_tau(&tracks, &profile.taus)?;
        let t_steps = t0.elapsed();
        writeln!(csv, "{},steps,{},n_steps={}", row_prefix(rep), dur_ms(t_steps), steps.len())?;

        // 4) summary
        let t0 = Instant::now();
        let summary = summary_by_tau(&steps);
        let t_sum = t0.elapsed();
        writeln!(csv, "{},summary,{},n_lags={}", row_prefix(rep), dur_ms(t_sum), summary.len())?;

        // cleanup temp files to avoid disk bloat
        let _ = fs::remove_file(&tracks_path);
    }

    println!("Wrote report → {}", csv_path.display());
    Ok(())
}
