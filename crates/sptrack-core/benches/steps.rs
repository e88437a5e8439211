use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sptrack_core::{compute_steps_for_tau, compute_steps_multi_tau, summary_by_tau, TrackPoint, TrackTable};

/// Deterministic random-walk table, rows interleaved by frame.
fn det_tracks(cells: i64, frames: i64, seed: u64) -> TrackTable {
    let mut a = 1_664_525u64.wrapping_mul(seed).wrapping_add(1_013_904_223);
    let mut step = move || {
        a = a.wrapping_mul(1_664_525).wrapping_add(1_013_904_223) % (1u64 << 32);
        (a as f64 / (1u64 << 32) as f64) - 0.5
    };

    let mut pos = vec![(0.0f64, 0.0f64); cells as usize];
    let mut pts = Vec::with_capacity((cells * frames) as usize);
    for f in 0..frames {
        for c in 0..cells {
            let p = &mut pos[c as usize];
            p.0 += step();
            p.1 += step();
            pts.push(TrackPoint::new(c, f, f as f64 * 0.5, p.0, p.1));
        }
    }
    TrackTable::from_points(&pts)
}

fn bench_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("steps");
    for &(cells, frames) in &[(100i64, 100i64), (1_000, 200)] {
        let tracks = det_tracks(cells, frames, 2024);
        let label = format!("{cells}x{frames}");
        group.throughput(Throughput::Elements((cells * frames) as u64));

        group.bench_function(BenchmarkId::new("single_tau", &label), |b| {
            b.iter(|| black_box(compute_steps_for_tau(black_box(&tracks), 4)))
        });

        let taus: Vec<i64> = (1..=16).collect();
        group.bench_function(BenchmarkId::new("multi_tau_1_16", &label), |b| {
            b.iter(|| black_box(compute_steps_multi_tau(black_box(&tracks), &taus)))
        });

        if let Ok(steps) = compute_steps_multi_tau(&tracks, &taus) {
            group.bench_function(BenchmarkId::new("summary_by_tau", &label), |b| {
                b.iter(|| black_box(summary_by_tau(black_box(&steps))))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_steps);
criterion_main!(benches);
