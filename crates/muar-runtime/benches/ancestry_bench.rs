use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use muar_runtime::{AncestryResolver, ResolveStrategy, TrackId, TrajectoryRecord};
use muar_storage::ThreeVector;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Random trajectory forest with unique track ids in shuffled order
fn build_forest(tracks: i32, seed: u64) -> Vec<TrajectoryRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records: Vec<TrajectoryRecord> = (1..=tracks)
        .map(|tid| {
            let pid = if tid == 1 { 0 } else { rng.gen_range(tid.saturating_sub(8).max(1)..tid) };
            TrajectoryRecord::new(TrackId::new(tid), TrackId::new(pid), 11, "Lar_log", ThreeVector::ZERO)
        })
        .collect();
    records.shuffle(&mut rng);
    records
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestry_resolve");

    for &n in &[64i32, 512, 4096] {
        let records = build_forest(n, 1234);
        // One hit per 8 tracks, roughly what a shower deposits in the crystals
        let starts: Vec<TrackId> = (1..=n).step_by(8).map(TrackId::new).collect();
        group.throughput(Throughput::Elements(starts.len() as u64));

        for strategy in [ResolveStrategy::Scan, ResolveStrategy::Indexed] {
            group.bench_with_input(BenchmarkId::new(strategy.to_string(), n), &n, |b, &_n| {
                b.iter(|| {
                    let resolver = AncestryResolver::new(&records, strategy);
                    let mut links = 0;
                    for &start in &starts {
                        links += resolver.resolve(start).unwrap().len();
                    }
                    black_box(links)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
