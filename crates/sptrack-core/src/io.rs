//! File helpers for track tables, steps tables and summaries.
//!
//! Formats are picked by extension (case-insensitive):
//!
//! | extension          | tracks (read/write)   | steps (read/write) | summary (write) |
//! |--------------------|-----------------------|--------------------|-----------------|
//! | `.json`            | columnar object       | array of records   | array of records|
//! | `.cbor`            | columnar object       | array of records   | array of records|
//! | `.jsonl`/`.ndjson` | one record per line   | one record per line| one record per line |
//! | `.csv`             | —                     | write only         | write only      |
//!
//! Unknown/missing extensions are rejected for reads and default to JSON for
//! writes. Writers create missing parent directories.

use crate::io_jsonl::{read_tracks_jsonl, stream_jsonl, write_jsonl, write_tracks_jsonl};
use crate::{Step, StepsTable, Summary, SummaryRow, TrackTable};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", path_str(path)))?;
        }
    }
    Ok(())
}

/* ---------------- generic JSON / CBOR ---------------- */

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open {}", path_str(path)))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("deserialize JSON {what} from {}", path_str(path)))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, v: &T, what: &str) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path_str(path)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| format!("serialize JSON {what}"))?;
    w.flush().context("flush JSON writer")?;
    Ok(())
}

fn read_cbor<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open {}", path_str(path)))?;
    ciborium::de::from_reader(BufReader::new(f))
        .with_context(|| format!("deserialize CBOR {what} from {}", path_str(path)))
}

fn write_cbor<T: Serialize + ?Sized>(path: &Path, v: &T, what: &str) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path_str(path)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| format!("serialize CBOR {what}"))?;
    w.flush().context("flush CBOR writer")?;
    Ok(())
}

/* ---------------- CSV (write only) ---------------- */

/// A record type with a fixed CSV layout.
pub trait CsvRow {
    /// Header names, in field order.
    const HEADER: &'static [&'static str];

    /// Write one comma-separated line (without trailing newline).
    fn write_csv<W: Write>(&self, w: &mut W) -> std::io::Result<()>;
}

impl CsvRow for Step {
    const HEADER: &'static [&'static str] = &StepsTable::COLUMNS;

    fn write_csv<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        write!(
            w,
            "{},{},{},{},{},{},{},{},{}",
            self.cell_id,
            self.frame_start,
            self.t_start_min,
            self.frame_end,
            self.t_end_min,
            self.dx_um,
            self.dy_um,
            self.tau_frames,
            self.tau_min
        )
    }
}

impl CsvRow for SummaryRow {
    const HEADER: &'static [&'static str] = &Summary::COLUMNS;

    fn write_csv<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        write!(
            w,
            "{},{},{},{}",
            self.tau_frames, self.n_steps, self.n_cells, self.median_tau_min
        )
    }
}

/// Write rows as CSV; the header is always written, even for zero rows.
pub fn write_csv<P: AsRef<Path>, T: CsvRow>(path: P, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path_str(path)))?;
    let mut w = BufWriter::new(f);
    writeln!(w, "{}", T::HEADER.join(",")).context("write CSV header")?;
    for r in rows {
        r.write_csv(&mut w).context("write CSV row")?;
        w.write_all(b"\n").context("write newline")?;
    }
    w.flush().context("flush CSV writer")?;
    Ok(())
}

/* ---------------- tracks ---------------- */

/// Read a track table, picking the format by extension.
pub fn read_tracks_auto<P: AsRef<Path>>(path: P) -> Result<TrackTable> {
    let path = path.as_ref();
    let tracks: TrackTable = match ext_lower(path).as_deref() {
        Some("json") => read_json(path, "track table")?,
        Some("cbor") => read_cbor(path, "track table")?,
        Some("jsonl" | "ndjson") => read_tracks_jsonl(path)?,
        Some(other) => {
            return Err(anyhow!(
                "unsupported tracks extension: {} (supported: .json, .cbor, .jsonl, .ndjson)",
                other
            ))
        }
        None => {
            return Err(anyhow!(
                "path has no extension (expected .json, .cbor, .jsonl, or .ndjson)"
            ))
        }
    };
    debug!(path = %path_str(path), rows = tracks.len(), "read track table");
    Ok(tracks)
}

/// Write a track table (defaults to **JSON** if unknown or missing).
pub fn write_tracks_auto<P: AsRef<Path>>(path: P, tracks: &TrackTable) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    match ext_lower(path).as_deref() {
        Some("cbor") => write_cbor(path, tracks, "track table"),
        Some("jsonl" | "ndjson") => write_tracks_jsonl(path, tracks),
        _ => write_json(path, tracks, "track table"),
    }
}

/* ---------------- steps ---------------- */

/// Read a steps table, picking the format by extension.
pub fn read_steps_auto<P: AsRef<Path>>(path: P) -> Result<StepsTable> {
    let path = path.as_ref();
    match ext_lower(path).as_deref() {
        Some("json") => read_json(path, "steps table"),
        Some("cbor") => read_cbor(path, "steps table"),
        Some("jsonl" | "ndjson") => stream_jsonl::<Step, _>(path)?.collect(),
        Some(other) => Err(anyhow!(
            "unsupported steps extension: {} (supported: .json, .cbor, .jsonl, .ndjson)",
            other
        )),
        None => Err(anyhow!(
            "path has no extension (expected .json, .cbor, .jsonl, or .ndjson)"
        )),
    }
}

/// Write a steps table (defaults to **JSON** if unknown or missing).
pub fn write_steps_auto<P: AsRef<Path>>(path: P, steps: &StepsTable) -> Result<()> {
    write_rows_auto(path.as_ref(), steps.rows(), "steps table")
}

/* ---------------- summary ---------------- */

/// Write a summary (defaults to **JSON** if unknown or missing).
pub fn write_summary_auto<P: AsRef<Path>>(path: P, summary: &Summary) -> Result<()> {
    write_rows_auto(path.as_ref(), summary.rows(), "summary")
}

fn write_rows_auto<T: Serialize + CsvRow>(path: &Path, rows: &[T], what: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    let res = match ext_lower(path).as_deref() {
        Some("csv") => write_csv(path, rows),
        Some("cbor") => write_cbor(path, rows, what),
        Some("jsonl" | "ndjson") => write_jsonl(path, rows),
        _ => write_json(path, rows, what),
    };
    res.with_context(|| format!("writing {what} to {}", path_str(path)))
}

/* ---------------- small helpers ---------------- */

/// Return the lowercase extension (without dot) if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Human-friendly path display for error messages.
fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
