//! Behavioural properties of validation, step extraction and summaries.
//!
//! Concrete cases pin the displacement and timing arithmetic; property
//! tests cover the row-count law, input-order independence and multi-lag
//! concatenation over random trajectory sets.

use proptest::prelude::*;
use sptrack_core::{
    compute_steps_for_tau, compute_steps_multi_tau, summary_by_tau, validate_tracks, Column,
    Step, StepsError, StepsTable, TrackPoint, TrackTable,
};

/// Three-point trajectory: frames 0..=2, positions (0,0), (1,1), (3,3).
#[track_caller]
fn three_points(times: [f64; 3]) -> TrackTable {
    TrackTable::from_points(&[
        TrackPoint::new(1, 0, times[0], 0.0, 0.0),
        TrackPoint::new(1, 1, times[1], 1.0, 1.0),
        TrackPoint::new(1, 2, times[2], 3.0, 3.0),
    ])
}

fn dxdy_tau(s: &Step) -> (f64, f64, f64) {
    (s.dx_um, s.dy_um, s.tau_min)
}

#[test]
fn displacement_for_lag_one_and_two() {
    let tracks = three_points([0.0, 1.0, 2.0]);

    let s1 = compute_steps_for_tau(&tracks, 1).unwrap();
    assert_eq!(s1.len(), 2);
    assert_eq!(dxdy_tau(&s1[0]), (1.0, 1.0, 1.0));
    assert_eq!(dxdy_tau(&s1[1]), (2.0, 2.0, 1.0));
    assert!(s1.iter().all(|s| s.tau_frames == 1 && s.cell_id == 1));

    let s2 = compute_steps_for_tau(&tracks, 2).unwrap();
    assert_eq!(s2.len(), 1);
    assert_eq!(dxdy_tau(&s2[0]), (3.0, 3.0, 2.0));
    assert_eq!((s2[0].frame_start, s2[0].frame_end), (0, 2));
    assert_eq!((s2[0].t_start_min, s2[0].t_end_min), (0.0, 2.0));
}

#[test]
fn tau_min_is_the_literal_time_difference() {
    let tracks = three_points([0.0, 1.5, 2.0]);
    let s1 = compute_steps_for_tau(&tracks, 1).unwrap();
    let taus: Vec<f64> = s1.iter().map(|s| s.tau_min).collect();
    assert_eq!(taus, vec![1.5, 0.5]);
}

#[test]
fn lag_below_one_is_rejected() {
    let tracks = three_points([0.0, 1.0, 2.0]);
    assert_eq!(compute_steps_for_tau(&tracks, 0), Err(StepsError::InvalidLag(0)));
    assert_eq!(compute_steps_for_tau(&tracks, -1), Err(StepsError::InvalidLag(-1)));
    assert!(compute_steps_for_tau(&tracks, 1).is_ok());
}

#[test]
fn missing_columns_are_reported_sorted_by_every_entry_point() {
    let tracks = TrackTable::new()
        .with_column("y_um", Column::Float(vec![0.0]))
        .and_then(|t| t.with_column("frame", Column::Int(vec![0])))
        .unwrap();
    let expected = StepsError::MissingColumns(vec!["cell_id".into(), "t_min".into(), "x_um".into()]);

    assert_eq!(validate_tracks(&tracks), Err(expected.clone()));
    assert_eq!(compute_steps_for_tau(&tracks, 1), Err(expected.clone()));
    assert_eq!(compute_steps_multi_tau(&tracks, &[1, 2]), Err(expected.clone()));
    // Column check happens before the lag check.
    assert_eq!(compute_steps_for_tau(&tracks, 0), Err(expected));
}

#[test]
fn extra_columns_are_ignored() {
    let tracks = three_points([0.0, 1.0, 2.0])
        .with_column("area_um2", Column::Float(vec![10.0, 11.0, 12.0]))
        .and_then(|t| t.with_column("condition", Column::Text(vec!["ctrl".into(); 3])))
        .unwrap();
    assert_eq!(
        compute_steps_for_tau(&tracks, 1).unwrap(),
        compute_steps_for_tau(&three_points([0.0, 1.0, 2.0]), 1).unwrap()
    );
}

#[test]
fn trajectories_never_mix() {
    // Two cells, rows interleaved by frame.
    let tracks = TrackTable::from_points(&[
        TrackPoint::new(2, 0, 0.0, 100.0, 100.0),
        TrackPoint::new(1, 0, 0.0, 0.0, 0.0),
        TrackPoint::new(2, 1, 1.0, 101.0, 100.0),
        TrackPoint::new(1, 1, 1.0, 0.0, 1.0),
        TrackPoint::new(2, 2, 2.0, 103.0, 100.0),
    ]);
    let steps = compute_steps_for_tau(&tracks, 1).unwrap();
    let got: Vec<(i64, i64, f64, f64)> = steps
        .iter()
        .map(|s| (s.cell_id, s.frame_start, s.dx_um, s.dy_um))
        .collect();
    assert_eq!(
        got,
        vec![(1, 0, 0.0, 1.0), (2, 0, 1.0, 0.0), (2, 1, 2.0, 0.0)]
    );
}

#[test]
fn short_trajectories_contribute_nothing() {
    let tracks = three_points([0.0, 1.0, 2.0]);
    assert!(compute_steps_for_tau(&tracks, 3).unwrap().is_empty());
    assert!(compute_steps_for_tau(&tracks, 50).unwrap().is_empty());
}

#[test]
fn multi_lag_empty_and_duplicates() {
    let tracks = three_points([0.0, 1.0, 2.0]);
    assert_eq!(compute_steps_multi_tau(&tracks, &[]).unwrap(), StepsTable::new());

    let dup = compute_steps_multi_tau(&tracks, &[1, 1]).unwrap();
    let one = compute_steps_for_tau(&tracks, 1).unwrap();
    assert_eq!(dup.len(), 2 * one.len());
    assert_eq!(&dup.rows()[..one.len()], one.rows());
    assert_eq!(&dup.rows()[one.len()..], one.rows());
}

#[test]
fn multi_lag_fails_on_first_invalid_lag() {
    let tracks = three_points([0.0, 1.0, 2.0]);
    assert_eq!(
        compute_steps_multi_tau(&tracks, &[1, 0, -4]),
        Err(StepsError::InvalidLag(0))
    );
    assert_eq!(
        compute_steps_multi_tau(&tracks, &[-4, 0]),
        Err(StepsError::InvalidLag(-4))
    );
}

#[test]
fn summary_of_three_point_trajectory() {
    let steps = compute_steps_for_tau(&three_points([0.0, 1.0, 2.0]), 1).unwrap();
    let summary = summary_by_tau(&steps);
    assert_eq!(summary.len(), 1);
    let row = summary.rows()[0];
    assert_eq!(row.tau_frames, 1);
    assert_eq!(row.n_steps, 2);
    assert_eq!(row.n_cells, 1);
    assert_eq!(row.median_tau_min, 1.0);
}

#[test]
fn summary_of_nothing_is_empty() {
    assert!(summary_by_tau(&StepsTable::new()).is_empty());
}

/* ---------------- properties ---------------- */

/// Random trajectory set: per cell a strictly increasing frame list with
/// gaps, non-uniform times, arbitrary positions.
fn arb_points() -> impl Strategy<Value = Vec<TrackPoint>> {
    prop::collection::vec(
        (
            0i64..6,
            prop::collection::btree_set(0i64..40, 0..12),
            -50.0f64..50.0,
        ),
        0..6,
    )
    .prop_map(|cells| {
        let mut pts = Vec::new();
        for (cell_id, frames, x0) in cells {
            for f in frames {
                #[allow(clippy::cast_precision_loss)]
                let t = f as f64 * 0.75 + (f % 3) as f64 * 0.1;
                pts.push(TrackPoint::new(cell_id, f, t, x0 + t, x0 - 2.0 * t));
            }
        }
        pts
    })
}

/// Drop repeated `(cell_id, frame)` keys so the distinct-frame assumption holds.
fn dedup_keys(mut pts: Vec<TrackPoint>) -> Vec<TrackPoint> {
    let mut seen = std::collections::BTreeSet::new();
    pts.retain(|p| seen.insert((p.cell_id, p.frame)));
    pts
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn row_count_law(pts in arb_points().prop_map(dedup_keys), tau in 1i64..8) {
        let tracks = TrackTable::from_points(&pts);
        let steps = compute_steps_for_tau(&tracks, tau).unwrap();

        let mut per_cell = std::collections::BTreeMap::<i64, i64>::new();
        for p in &pts {
            *per_cell.entry(p.cell_id).or_default() += 1;
        }
        let expected: i64 = per_cell.values().map(|n| (n - tau).max(0)).sum();
        prop_assert_eq!(steps.len() as i64, expected);

        for s in &steps {
            prop_assert!(s.frame_end - s.frame_start >= tau);
            prop_assert_eq!(s.tau_min, s.t_end_min - s.t_start_min);
        }
    }

    #[test]
    fn input_order_does_not_matter(
        pts in arb_points().prop_map(dedup_keys),
        seed in any::<u64>(),
        tau in 1i64..5,
    ) {
        let mut sorted = pts.clone();
        sorted.sort_by_key(|p| (p.cell_id, p.frame));

        // Deterministic Fisher–Yates driven by a small LCG.
        let mut shuffled = pts;
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            let j = (state >> 33) as usize % (i + 1);
            shuffled.swap(i, j);
        }

        let a = compute_steps_for_tau(&TrackTable::from_points(&sorted), tau).unwrap();
        let b = compute_steps_for_tau(&TrackTable::from_points(&shuffled), tau).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn multi_lag_is_concatenation(
        pts in arb_points(),
        taus in prop::collection::vec(1i64..6, 0..5),
    ) {
        let tracks = TrackTable::from_points(&pts);
        let all = compute_steps_multi_tau(&tracks, &taus).unwrap();

        let mut expected = StepsTable::new();
        for &tau in &taus {
            expected.append(compute_steps_for_tau(&tracks, tau).unwrap());
        }
        prop_assert_eq!(all, expected);
    }

    #[test]
    fn summary_counts_match_rows(pts in arb_points(), taus in prop::collection::vec(1i64..6, 1..4)) {
        let steps = compute_steps_multi_tau(&TrackTable::from_points(&pts), &taus).unwrap();
        let summary = summary_by_tau(&steps);

        let total: usize = summary.rows().iter().map(|r| r.n_steps).sum();
        prop_assert_eq!(total, steps.len());
        prop_assert!(summary.rows().windows(2).all(|w| w[0].tau_frames < w[1].tau_frames));
        for r in summary.rows() {
            prop_assert!(r.n_cells >= 1 && r.n_cells <= r.n_steps);
        }
    }
}
