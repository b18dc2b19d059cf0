use crate::bench_utils::{bench_params, describe};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use hypersig::{HyperSig, Seed};


static ALG_NAME: &str = "keygen";

fn keygen_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("HyperSig_{}", ALG_NAME));
    group.sample_size(10);

    for (name, params) in bench_params() {
        println!("{}", describe(name, &params));
        let scheme = HyperSig::new(params).unwrap();
        group.bench_function(BenchmarkId::new(ALG_NAME, name), |b| {
            b.iter_batched(
                Seed::fresh,
                |seed| black_box(scheme.keygen(seed).unwrap()),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, keygen_benchmarks);
criterion_main!(benches);
