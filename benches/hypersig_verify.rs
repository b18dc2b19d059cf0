use crate::bench_utils::{bench_params, describe};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hypersig::HyperSig;


static ALG_NAME: &str = "verify";

fn verify_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("HyperSig_{}", ALG_NAME));

    for (name, params) in bench_params() {
        println!("{}", describe(name, &params));
        let scheme = HyperSig::new(params).unwrap();
        let (mut sk, pk) = scheme.keygen_random().unwrap();
        let message = b"benchmark message";
        let sig = scheme.sign(message, &mut sk).unwrap();
        let sig_bytes = sig.to_bytes();
        let pk_bytes = pk.to_bytes();

        group.bench_function(BenchmarkId::new(ALG_NAME, name), |b| {
            b.iter(|| black_box(scheme.verify(message, &sig, &pk)))
        });
        group.bench_function(BenchmarkId::new("verify_bytes", name), |b| {
            b.iter(|| black_box(scheme.verify_bytes(message, &sig_bytes, &pk_bytes)))
        });
    }

    group.finish();
}

criterion_group!(benches, verify_benchmarks);
criterion_main!(benches);
