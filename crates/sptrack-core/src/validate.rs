//! Required-column check for track tables.

use crate::error::StepsError;
use crate::table::{TrackTable, REQUIRED_TRACK_COLS};

/// Check that `tracks` carries every column in [`REQUIRED_TRACK_COLS`].
///
/// Extra columns are ignored. Only names are checked here; column types are
/// checked when rows are extracted ([`TrackTable::points`]).
///
/// # Errors
/// `MissingColumns` with the missing names sorted ascending.
pub fn validate_tracks(tracks: &TrackTable) -> Result<(), StepsError> {
    let mut missing: Vec<String> = REQUIRED_TRACK_COLS
        .iter()
        .filter(|name| tracks.column(name).is_none())
        .map(|name| (*name).to_owned())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    Err(StepsError::MissingColumns(missing))
}
