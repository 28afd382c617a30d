use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rs_nbody::acceleration::{BackendKind, ForceLaw};
use rs_nbody::initial_conditions::uniform_cube;
use rs_nbody::utils::DEFAULT_SEED;

pub fn bench_accelerations(c: &mut Criterion) {
    let mut group = c.benchmark_group("accelerations");
    group.measurement_time(std::time::Duration::from_secs(5));
    group.sample_size(20);
    let law = ForceLaw::unit();

    for kind in BackendKind::ALL {
        let backend = match kind.create() {
            Ok(backend) => backend,
            Err(e) => {
                debug!("skipping {}: {}", kind, e);
                continue;
            }
        };
        if backend.warm_up().is_err() {
            continue;
        }

        for &n in &[128_usize, 512, 2048] {
            // Broadcast temporaries grow as N²; skip it at the largest size.
            if kind == BackendKind::Broadcast && n > 512 {
                continue;
            }
            let mut rng = ChaCha8Rng::seed_from_u64(DEFAULT_SEED);
            let positions = uniform_cube(&mut rng, n);
            group.bench_with_input(BenchmarkId::new(kind.name(), n), &positions, |b, positions| {
                b.iter(|| backend.acceleration(positions.view(), &law))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_accelerations);
criterion_main!(benches);
