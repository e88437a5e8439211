//! sptrack-core — track tables, per-lag displacement steps and per-lag summaries.
//!
//! This crate is the analytical core of a single-particle-tracking pipeline:
//! - a columnar [`TrackTable`] with a required-column [validator](validate),
//! - the step extractor for one lag ([`compute_steps_for_tau`]) and for a set
//!   of lags ([`compute_steps_multi_tau`]),
//! - the per-lag [`summary_by_tau`], and
//! - JSON/CBOR/JSONL/CSV I/O with extension auto-detection ([`io`]).
//!
//! ```
//! use sptrack_core::{compute_steps_multi_tau, summary_by_tau, TrackPoint, TrackTable};
//!
//! let tracks = TrackTable::from_points(&[
//!     TrackPoint::new(1, 0, 0.0, 0.0, 0.0),
//!     TrackPoint::new(1, 1, 1.0, 1.0, 1.0),
//!     TrackPoint::new(1, 2, 2.0, 3.0, 3.0),
//! ]);
//! let steps = compute_steps_multi_tau(&tracks, &[1, 2])?;
//! assert_eq!(steps.len(), 3);
//!
//! let summary = summary_by_tau(&steps);
//! assert_eq!(summary.get(1).map(|r| r.n_steps), Some(2));
//! # Ok::<(), sptrack_core::StepsError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Typed error kinds for validation and extraction.
pub mod error;
/// JSON/CBOR/CSV helpers and auto-detecting read/write APIs.
pub mod io;
/// JSON Lines helpers for row-oriented files.
pub mod io_jsonl;
/// Step extractor and multi-lag composer.
pub mod steps;
/// Per-lag summary statistics.
pub mod summary;
/// Columnar track table.
pub mod table;
/// Row-level data types.
pub mod types;
/// Required-column validator.
pub mod validate;

pub use error::StepsError;
pub use steps::{compute_steps_for_tau, compute_steps_multi_tau, steps_for_points, Trajectories};
pub use summary::{median, summary_by_tau};
pub use table::{Column, TrackTable, REQUIRED_TRACK_COLS};
pub use types::*;
pub use validate::validate_tracks;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use sptrack_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        compute_steps_for_tau, compute_steps_multi_tau, summary_by_tau, validate_tracks,
        StepsError, TrackTable,
    };
    pub use crate::types::*;
}
