//! Per-lag summary of a steps table.

use crate::types::{StepsTable, Summary, SummaryRow};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct LagGroup {
    n_steps: usize,
    cells: BTreeSet<i64>,
    tau_min: Vec<f64>,
}

/// Group `steps` by `tau_frames` and report step count, distinct cell count
/// and median `tau_min` per lag, ascending by lag.
///
/// Empty input gives an empty summary.
#[must_use]
pub fn summary_by_tau(steps: &StepsTable) -> Summary {
    let mut groups: BTreeMap<i64, LagGroup> = BTreeMap::new();
    for s in steps {
        let g = groups.entry(s.tau_frames).or_default();
        g.n_steps += 1;
        g.cells.insert(s.cell_id);
        g.tau_min.push(s.tau_min);
    }

    let rows = groups
        .into_iter()
        .map(|(tau_frames, mut g)| SummaryRow {
            tau_frames,
            n_steps: g.n_steps,
            n_cells: g.cells.len(),
            median_tau_min: median(&mut g.tau_min).unwrap_or(f64::NAN),
        })
        .collect::<Vec<_>>();
    // BTreeMap iteration is already ascending by lag.
    Summary::from_sorted(rows)
}

/// Median of the non-NaN values, averaging the two middle values when the
/// count is even. `None` if nothing remains.
///
/// Reorders `values`.
#[must_use]
pub fn median(values: &mut [f64]) -> Option<f64> {
    values.sort_unstable_by(f64::total_cmp);
    // total_cmp orders positive NaN last and negative NaN first.
    let lo = values.iter().take_while(|v| v.is_nan()).count();
    let hi = values.len() - values.iter().rev().take_while(|v| v.is_nan()).count();
    let finite = values.get(lo..hi.max(lo))?;

    let n = finite.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(finite[n / 2]),
        _ => Some((finite[n / 2 - 1] + finite[n / 2]) / 2.0),
    }
}
