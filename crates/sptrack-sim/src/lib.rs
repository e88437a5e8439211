//! Synthetic track tables for tests, benches and the CLI `simulate` command.
//!
//! The generator is seeded and fully deterministic, so fixtures built from it
//! are stable across runs.
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `sptrack_sim::generator::generate_tracks`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// Seeded 2D random-walk generator.
pub mod generator;
