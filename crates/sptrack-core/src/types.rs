//! Row-level types shared across the workspace.
//!
//! These are re-exported at the crate root so callers can write
//! `sptrack_core::Step`, `sptrack_core::StepsTable`, etc. Serialized forms are
//! flat records whose field names match the column names of the tabular
//! outputs.

use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Index;

/// JSON has no NaN: `serde_json` writes it as `null`. Read `null` back as NaN.
pub(crate) fn f64_or_nan<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

/// Column form of [`f64_or_nan`].
pub(crate) fn f64s_or_nan<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
    let v = Vec::<Option<f64>>::deserialize(d)?;
    Ok(v.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
}

/// Trajectory identifier.
pub type CellId = i64;

/// Integer frame index.
pub type Frame = i64;

/// One observation of one trajectory at one frame.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackPoint {
    /// Trajectory identifier.
    pub cell_id: CellId,
    /// Frame index.
    pub frame: Frame,
    /// Observation time in minutes.
    #[serde(deserialize_with = "f64_or_nan")]
    pub t_min: f64,
    /// X position in micrometers.
    #[serde(deserialize_with = "f64_or_nan")]
    pub x_um: f64,
    /// Y position in micrometers.
    #[serde(deserialize_with = "f64_or_nan")]
    pub y_um: f64,
}

impl TrackPoint {
    /// Construct a point (no validation).
    #[inline]
    #[must_use]
    pub const fn new(cell_id: CellId, frame: Frame, t_min: f64, x_um: f64, y_um: f64) -> Self {
        Self {
            cell_id,
            frame,
            t_min,
            x_um,
            y_um,
        }
    }
}

/// Displacement between two points of the same trajectory, `tau_frames`
/// rows apart in that trajectory's frame-sorted order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Trajectory identifier.
    pub cell_id: CellId,
    /// Frame of the start point.
    pub frame_start: Frame,
    /// Time of the start point (minutes).
    #[serde(deserialize_with = "f64_or_nan")]
    pub t_start_min: f64,
    /// Frame of the end point.
    pub frame_end: Frame,
    /// Time of the end point (minutes).
    #[serde(deserialize_with = "f64_or_nan")]
    pub t_end_min: f64,
    /// `x_end - x_start` (micrometers).
    #[serde(deserialize_with = "f64_or_nan")]
    pub dx_um: f64,
    /// `y_end - y_start` (micrometers).
    #[serde(deserialize_with = "f64_or_nan")]
    pub dy_um: f64,
    /// Requested lag in rows of the trajectory.
    pub tau_frames: i64,
    /// Actual elapsed time `t_end_min - t_start_min`.
    #[serde(deserialize_with = "f64_or_nan")]
    pub tau_min: f64,
}

impl Step {
    /// Build the step from `start` to `end` for lag `tau_frames`.
    #[inline]
    #[must_use]
    pub fn between(start: &TrackPoint, end: &TrackPoint, tau_frames: i64) -> Self {
        Self {
            cell_id: start.cell_id,
            frame_start: start.frame,
            t_start_min: start.t_min,
            frame_end: end.frame,
            t_end_min: end.t_min,
            dx_um: end.x_um - start.x_um,
            dy_um: end.y_um - start.y_um,
            tau_frames,
            tau_min: end.t_min - start.t_min,
        }
    }
}

/// Ordered steps, possibly spanning several lags.
///
/// Row order is grouped by lag (in request order), then by trajectory, then
/// chronologically.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct StepsTable {
    rows: Vec<Step>,
}

impl StepsTable {
    /// Column names, in output order.
    pub const COLUMNS: [&'static str; 9] = [
        "cell_id",
        "frame_start",
        "t_start_min",
        "frame_end",
        "t_end_min",
        "dx_um",
        "dy_um",
        "tau_frames",
        "tau_min",
    ];

    /// Empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Number of steps.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no steps.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the rows.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Step] {
        &self.rows
    }

    /// Iterate the rows in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.rows.iter()
    }

    /// Append all rows of `other`, preserving both orders.
    pub fn append(&mut self, other: Self) {
        self.rows.extend(other.rows);
    }

    /// Rows with the given lag, in table order.
    pub fn for_tau(&self, tau_frames: i64) -> impl Iterator<Item = &Step> + '_ {
        self.rows.iter().filter(move |s| s.tau_frames == tau_frames)
    }

    /// Consume into the underlying rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Step> {
        self.rows
    }
}

impl From<Vec<Step>> for StepsTable {
    fn from(rows: Vec<Step>) -> Self {
        Self { rows }
    }
}

impl FromIterator<Step> for StepsTable {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl Extend<Step> for StepsTable {
    fn extend<I: IntoIterator<Item = Step>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl Index<usize> for StepsTable {
    type Output = Step;

    fn index(&self, i: usize) -> &Step {
        &self.rows[i]
    }
}

impl<'a> IntoIterator for &'a StepsTable {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Per-lag descriptive statistics.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SummaryRow {
    /// Lag in frames.
    pub tau_frames: i64,
    /// Number of steps with this lag.
    pub n_steps: usize,
    /// Number of distinct contributing trajectories.
    pub n_cells: usize,
    /// Median of `tau_min` over this lag's steps.
    #[serde(deserialize_with = "f64_or_nan")]
    pub median_tau_min: f64,
}

/// Summary rows, ascending by `tau_frames`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Summary {
    rows: Vec<SummaryRow>,
}

impl Summary {
    /// Column names, in output order.
    pub const COLUMNS: [&'static str; 4] = ["tau_frames", "n_steps", "n_cells", "median_tau_min"];

    /// Number of distinct lags summarized.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no lag was summarized.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow the rows.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Row for a given lag, if present.
    #[must_use]
    pub fn get(&self, tau_frames: i64) -> Option<&SummaryRow> {
        self.rows
            .binary_search_by_key(&tau_frames, |r| r.tau_frames)
            .ok()
            .map(|i| &self.rows[i])
    }
}

impl Summary {
    /// Wrap rows already ascending by `tau_frames`.
    pub(crate) fn from_sorted(rows: Vec<SummaryRow>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].tau_frames < w[1].tau_frames));
        Self { rows }
    }
}

impl From<Vec<SummaryRow>> for Summary {
    /// Takes ownership of `rows`, sorting them by `tau_frames` so that
    /// [`Summary::get`] can binary-search.
    fn from(mut rows: Vec<SummaryRow>) -> Self {
        rows.sort_by_key(|r| r.tau_frames);
        Self { rows }
    }
}
