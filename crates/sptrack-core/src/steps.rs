//! Displacement steps at one or several frame lags.
//!
//! ## Algorithm
//! 1. Stable-sort rows by `(cell_id, frame)`; ties keep input order.
//! 2. Split the sorted rows into contiguous per-`cell_id` runs
//!    ([`Trajectories`]).
//! 3. Inside each run pair position `i` with position `i + tau_frames`.
//!    The last `tau_frames` rows of a run have no partner and start no step.
//!
//! Pairing is positional, so a trajectory with a missing frame still pairs
//! its neighbours: `frame_end - frame_start` may exceed `tau_frames`, and
//! `tau_min` is always the literal time difference.
//!
//! ## Complexity
//! - Partition: `O(n log n)` (one sort), shared across lags in the
//!   multi-lag path.
//! - Pairing: `O(n)` per lag.

use crate::error::StepsError;
use crate::table::TrackTable;
use crate::types::{Step, StepsTable, TrackPoint};
use crate::validate::validate_tracks;
use std::ops::Range;
use tracing::debug;

/// Rows grouped into per-trajectory chronological runs.
#[derive(Clone, Debug, Default)]
pub struct Trajectories {
    sorted: Vec<TrackPoint>,
    runs: Vec<Range<usize>>,
}

impl Trajectories {
    /// Sort `points` by `(cell_id, frame)` (stable) and split by `cell_id`.
    #[must_use]
    pub fn partition(points: &[TrackPoint]) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by_key(|p| (p.cell_id, p.frame));

        let mut runs = Vec::new();
        let mut start = 0;
        for i in 1..=sorted.len() {
            if i == sorted.len() || sorted[i].cell_id != sorted[start].cell_id {
                runs.push(start..i);
                start = i;
            }
        }
        Self { sorted, runs }
    }

    /// Number of distinct trajectories.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether there are no trajectories.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total number of rows across trajectories.
    #[inline]
    #[must_use]
    pub fn n_points(&self) -> usize {
        self.sorted.len()
    }

    /// Each trajectory's rows in chronological order, trajectories ascending
    /// by `cell_id`.
    pub fn iter(&self) -> impl Iterator<Item = &[TrackPoint]> + '_ {
        self.runs.iter().map(|r| &self.sorted[r.clone()])
    }

    /// Steps at lag `tau_frames`, trajectory-sorted then chronological.
    ///
    /// # Errors
    /// `InvalidLag` if `tau_frames < 1`.
    pub fn steps(&self, tau_frames: i64) -> Result<Vec<Step>, StepsError> {
        let lag = lag_offset(tau_frames)?;
        let mut out = Vec::with_capacity(self.expected_steps(lag));
        for traj in self.iter() {
            out.extend(
                traj.iter()
                    .zip(traj.iter().skip(lag))
                    .map(|(start, end)| Step::between(start, end, tau_frames)),
            );
        }
        Ok(out)
    }

    /// `Σ max(0, len - lag)` over trajectories.
    fn expected_steps(&self, lag: usize) -> usize {
        self.runs.iter().map(|r| r.len().saturating_sub(lag)).sum()
    }
}

/// Validate a lag and convert it into a row offset.
///
/// Lags beyond `usize::MAX` saturate; they cannot pair any row anyway.
fn lag_offset(tau_frames: i64) -> Result<usize, StepsError> {
    if tau_frames < 1 {
        return Err(StepsError::InvalidLag(tau_frames));
    }
    Ok(usize::try_from(tau_frames).unwrap_or(usize::MAX))
}

/// Steps at one lag over already-typed points.
///
/// # Errors
/// `InvalidLag` if `tau_frames < 1`.
pub fn steps_for_points(points: &[TrackPoint], tau_frames: i64) -> Result<StepsTable, StepsError> {
    lag_offset(tau_frames)?;
    Trajectories::partition(points)
        .steps(tau_frames)
        .map(StepsTable::from)
}

/// Displacement steps of every trajectory in `tracks` at lag `tau_frames`.
///
/// Output row count is `Σ max(0, len(trajectory) - tau_frames)`.
///
/// # Errors
/// `MissingColumns` if a required column is absent, then `InvalidLag` if
/// `tau_frames < 1`, then `ColumnType` for mistyped required columns.
pub fn compute_steps_for_tau(tracks: &TrackTable, tau_frames: i64) -> Result<StepsTable, StepsError> {
    validate_tracks(tracks)?;
    lag_offset(tau_frames)?;

    let trajectories = Trajectories::partition(&tracks.points()?);
    let steps = trajectories.steps(tau_frames)?;
    debug!(
        tau_frames,
        rows = trajectories.n_points(),
        cells = trajectories.len(),
        steps = steps.len(),
        "computed steps"
    );
    Ok(StepsTable::from(steps))
}

/// Steps for each lag in `taus`, concatenated in the order given.
///
/// Every lag is checked before any extraction runs, so the call either
/// yields all blocks or fails on the first invalid lag. Duplicate lags yield
/// duplicate blocks; an empty `taus` yields an empty table.
///
/// # Errors
/// `MissingColumns`, `InvalidLag` (first offending lag), or `ColumnType`.
pub fn compute_steps_multi_tau(tracks: &TrackTable, taus: &[i64]) -> Result<StepsTable, StepsError> {
    validate_tracks(tracks)?;
    for &tau in taus {
        lag_offset(tau)?;
    }
    if taus.is_empty() {
        return Ok(StepsTable::new());
    }

    let trajectories = Trajectories::partition(&tracks.points()?);
    let mut all = StepsTable::new();
    for &tau in taus {
        let steps = trajectories.steps(tau)?;
        debug!(tau_frames = tau, steps = steps.len(), "computed steps");
        all.extend(steps);
    }
    Ok(all)
}
