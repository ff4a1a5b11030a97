use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regblas::{DynamicMatrix, gemm, iamax, potrf, reference, syrk_lower};

const SIZES: &[usize] = &[8, 16, 32, 64, 128];

fn random(rng: &mut StdRng, m: usize, n: usize) -> DynamicMatrix<f64> {
    DynamicMatrix::from_fn(m, n, |_, _| rng.gen_range(-1.0..1.0))
}

fn spd(rng: &mut StdRng, m: usize) -> DynamicMatrix<f64> {
    let r = random(rng, m, m);
    DynamicMatrix::from_fn(m, m, |i, j| {
        (0..m).map(|k| r[(i, k)] * r[(j, k)]).sum::<f64>() + if i == j { m as f64 } else { 0.0 }
    })
}

fn bench_gemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm");
    let mut rng = StdRng::seed_from_u64(42);
    for &n in SIZES {
        group.throughput(Throughput::Elements(2 * (n as u64).pow(3)));
        let a = random(&mut rng, n, n);
        let b = random(&mut rng, n, n);
        let cm = random(&mut rng, n, n);
        let mut d = DynamicMatrix::<f64>::new(n, n);

        group.bench_with_input(BenchmarkId::new("blocked", n), &n, |bench, _| {
            bench.iter(|| gemm(1.0, black_box(&a), black_box(&b), 1.0, &cm, &mut d).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("reference", n), &n, |bench, _| {
            bench.iter(|| reference::gemm(1.0, black_box(&a), black_box(&b), 1.0, &cm, &mut d));
        });
    }
    group.finish();
}

fn bench_syrk(c: &mut Criterion) {
    let mut group = c.benchmark_group("syrk_lower");
    let mut rng = StdRng::seed_from_u64(43);
    for &n in SIZES {
        let n64 = n as u64;
        group.throughput(Throughput::Elements(n64 * (n64 + 1) * n64));
        let a = random(&mut rng, n, n);
        let cm = random(&mut rng, n, n);
        let mut d = DynamicMatrix::<f64>::new(n, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| syrk_lower(1.0, black_box(&a), 1.0, &cm, &mut d).unwrap());
        });
    }
    group.finish();
}

fn bench_potrf(c: &mut Criterion) {
    let mut group = c.benchmark_group("potrf");
    let mut rng = StdRng::seed_from_u64(44);
    for &n in SIZES {
        // (1 + 3m - 2n)(n - 1)n / 3 with m = n.
        let n64 = n as u64;
        group.throughput(Throughput::Elements((1 + n64) * (n64 - 1) * n64 / 3));
        let a = spd(&mut rng, n);
        let mut l = DynamicMatrix::<f64>::new(n, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| potrf(black_box(&a), &mut l).unwrap());
        });
    }
    group.finish();
}

fn bench_iamax(c: &mut Criterion) {
    let mut group = c.benchmark_group("iamax");
    let mut rng = StdRng::seed_from_u64(45);
    for &n in &[64usize, 1024, 16384] {
        group.throughput(Throughput::Elements(n as u64));
        let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| iamax(black_box(&x)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_gemm, bench_syrk, bench_potrf, bench_iamax);
criterion_main!(benches);
