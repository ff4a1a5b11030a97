use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regblas::{
    ColumnMajor, DynamicMatrix, Matrix, RowMajor, Scalar, Side, StaticMatrix, StorageOrder, UpLo, gemm, gemm_nn, ger, iamax,
    reference, syrk_lower, trmm,
};

fn random<T: Scalar, SO: StorageOrder>(rng: &mut StdRng, m: usize, n: usize) -> DynamicMatrix<T, SO>
where
    rand::distributions::Standard: rand::distributions::Distribution<T>,
{
    DynamicMatrix::from_fn(m, n, |_, _| {
        let v: T = rng.r#gen();
        v + v - T::one()
    })
}

fn assert_matrices_equal<T, MA, MB>(expected: &MA, actual: &MB, abs: T, rel: T, name: &str)
where
    T: Scalar,
    MA: Matrix<Element = T>,
    MB: Matrix<Element = T>,
{
    assert_eq!(expected.shape(), actual.shape(), "{}: shape mismatch", name);
    for i in 0..expected.rows() {
        for j in 0..expected.columns() {
            let (e, a) = (expected.get(i, j), actual.get(i, j));
            assert!(
                (e - a).abs() <= abs + rel * e.abs(),
                "{}: mismatch at ({}, {}): expected {:?}, got {:?}",
                name,
                i,
                j,
                e,
                a
            );
        }
    }
}

// ============================================================
// GEMM
// ============================================================

#[test]
fn test_gemm_4x4_exact() {
    // Small integers: every product and sum is exact.
    let a = DynamicMatrix::<f64>::from_row_slice(
        4,
        4,
        &[1.0, 2.0, 0.0, -1.0, 0.0, 1.0, 3.0, 2.0, 2.0, 0.0, 1.0, 1.0, -1.0, 1.0, 0.0, 2.0],
    );
    let b = DynamicMatrix::<f64>::from_row_slice(
        4,
        4,
        &[1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    );
    let c = DynamicMatrix::<f64>::from_fn(4, 4, |_, _| 123.0);
    let mut d = DynamicMatrix::<f64>::new(4, 4);
    gemm(1.0, &a, &b, 0.0, &c, &mut d).unwrap();
    for i in 0..4 {
        for j in 0..3 {
            assert_eq!(d[(i, j)], a[(i, j)]);
        }
        assert_eq!(d[(i, 3)], (0..4).map(|k| a[(i, k)]).sum::<f64>());
    }
}

#[test]
fn test_gemm_random_sizes() {
    let mut rng = StdRng::seed_from_u64(1);
    for m in 1..=20 {
        for n in 1..=20 {
            for k in [1, 2, 3, 4, 5, 8, 13, 20] {
                let a = random::<f64, ColumnMajor>(&mut rng, m, k);
                let b = random::<f64, ColumnMajor>(&mut rng, k, n);
                let c = random::<f64, ColumnMajor>(&mut rng, m, n);
                let (alpha, beta) = (rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0));

                let mut d = DynamicMatrix::<f64>::new(m, n);
                let mut expected = DynamicMatrix::<f64>::new(m, n);
                gemm(alpha, &a, &b, beta, &c, &mut d).unwrap();
                reference::gemm(alpha, &a, &b, beta, &c, &mut expected);
                assert_matrices_equal(&expected, &d, 1e-10, 1e-10, &format!("gemm {}x{}x{}", m, n, k));
            }
        }
    }
}

#[test]
fn test_gemm_row_major_b() {
    let mut rng = StdRng::seed_from_u64(2);
    for (m, n, k) in [(1, 1, 1), (5, 7, 3), (12, 4, 9), (17, 13, 6), (20, 20, 20)] {
        let a = random::<f64, ColumnMajor>(&mut rng, m, k);
        let b = random::<f64, RowMajor>(&mut rng, k, n);
        let c = random::<f64, ColumnMajor>(&mut rng, m, n);
        let mut d = DynamicMatrix::<f64>::new(m, n);
        let mut expected = DynamicMatrix::<f64>::new(m, n);
        gemm(1.0, &a, &b, -1.0, &c, &mut d).unwrap();
        reference::gemm(1.0, &a, &b, -1.0, &c, &mut expected);
        assert_matrices_equal(&expected, &d, 1e-10, 1e-10, &format!("gemm row-major B {}x{}x{}", m, n, k));
    }
}

#[test]
fn test_gemm_f32() {
    let mut rng = StdRng::seed_from_u64(3);
    for (m, n, k) in [(3, 3, 3), (8, 4, 8), (9, 5, 7), (25, 11, 16), (33, 17, 4)] {
        let a = random::<f32, ColumnMajor>(&mut rng, m, k);
        let b = random::<f32, ColumnMajor>(&mut rng, k, n);
        let c = random::<f32, ColumnMajor>(&mut rng, m, n);
        let mut d = DynamicMatrix::<f32>::new(m, n);
        let mut expected = DynamicMatrix::<f32>::new(m, n);
        gemm_nn(&a, &b, &c, &mut d).unwrap();
        reference::gemm(1.0, &a, &b, 1.0, &c, &mut expected);
        assert_matrices_equal(&expected, &d, 1e-5, 1e-4, &format!("gemm f32 {}x{}x{}", m, n, k));
    }
}

#[test]
fn test_gemm_static_matrices() {
    let a = StaticMatrix::<f64, 6, 3>::from_fn(|i, j| (i + j) as f64);
    let b = StaticMatrix::<f64, 3, 5>::from_fn(|i, j| (i * j) as f64);
    let c = StaticMatrix::<f64, 6, 5>::from_fn(|_, _| 1.0);
    let mut d = StaticMatrix::<f64, 6, 5>::zeros();
    let mut expected = StaticMatrix::<f64, 6, 5>::zeros();
    gemm(2.0, &a, &b, 1.0, &c, &mut d).unwrap();
    reference::gemm(2.0, &a, &b, 1.0, &c, &mut expected);
    assert_eq!(d, expected);
}

// ============================================================
// SYRK
// ============================================================

#[test]
fn test_syrk_lower_random_sizes() {
    let mut rng = StdRng::seed_from_u64(4);
    for m in 1..20 {
        for k in 1..20 {
            let a = random::<f64, ColumnMajor>(&mut rng, m, k);
            let c = random::<f64, ColumnMajor>(&mut rng, m, m);
            let mut d = DynamicMatrix::<f64>::from_fn(m, m, |_, _| 7.5);
            let mut expected = d.clone();
            syrk_lower(0.5, &a, 1.5, &c, &mut d).unwrap();
            reference::syrk_lower(0.5, &a, 1.5, &c, &mut expected);
            assert_matrices_equal(&expected, &d, 1e-10, 1e-10, &format!("syrk {}x{}", m, k));
            // Strictly upper part untouched, bit for bit.
            for i in 0..m {
                for j in i + 1..m {
                    assert_eq!(d[(i, j)], 7.5);
                }
            }
        }
    }
}

// ============================================================
// TRMM
// ============================================================

#[test]
fn test_trmm_all_variants() {
    let mut rng = StdRng::seed_from_u64(5);
    for (m, n) in [(1, 1), (4, 4), (7, 3), (3, 7), (13, 10), (24, 5)] {
        let b = random::<f64, ColumnMajor>(&mut rng, m, n);
        for side in [Side::Left, Side::Right] {
            let size = if side == Side::Left { m } else { n };
            for uplo in [UpLo::Upper, UpLo::Lower] {
                for unit in [false, true] {
                    let a = random::<f64, ColumnMajor>(&mut rng, size, size);
                    let mut c = DynamicMatrix::<f64>::new(m, n);
                    let mut expected = DynamicMatrix::<f64>::new(m, n);
                    trmm(side, uplo, unit, 1.25, &a, &b, &mut c).unwrap();
                    reference::trmm(side, uplo, unit, 1.25, &a, &b, &mut expected);
                    assert_matrices_equal(
                        &expected,
                        &c,
                        1e-10,
                        1e-10,
                        &format!("trmm {:?} {:?} unit={} {}x{}", side, uplo, unit, m, n),
                    );
                }
            }
        }
    }
}

// ============================================================
// GER and IAMAX
// ============================================================

#[test]
fn test_ger_random_sizes() {
    let mut rng = StdRng::seed_from_u64(6);
    for m in [1, 3, 4, 8, 11, 16, 29] {
        for n in [1, 2, 4, 5, 9] {
            let x: Vec<f64> = (0..m).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let y: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let a = random::<f64, ColumnMajor>(&mut rng, m, n);
            let mut b = DynamicMatrix::<f64>::new(m, n);
            let mut expected = DynamicMatrix::<f64>::new(m, n);
            ger(-0.75, &x, &y, &a, &mut b).unwrap();
            reference::ger(-0.75, &x, &y, &a, &mut expected);
            assert_matrices_equal(&expected, &b, 1e-12, 1e-12, &format!("ger {}x{}", m, n));
        }
    }
}

#[test]
fn test_iamax_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in 1..100 {
        let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
        assert_eq!(iamax(&x).unwrap(), reference::iamax(&x).unwrap(), "n={}", n);
        let y: Vec<f32> = x.iter().map(|&v| v as f32).collect();
        assert_eq!(iamax(&y).unwrap(), reference::iamax(&y).unwrap(), "f32 n={}", n);
    }
}

#[test]
fn test_iamax_all_equal_and_negative_extreme() {
    for n in 1..40 {
        assert_eq!(iamax(&vec![3.0f64; n]).unwrap(), 0);
        let mut x = vec![1.0f32; n];
        x[n - 1] = -2.0;
        assert_eq!(iamax(&x).unwrap(), n - 1);
    }
}

// ============================================================
// Argument validation
// ============================================================

#[test]
fn test_shape_errors_leave_output_untouched() {
    let a = DynamicMatrix::<f64>::new(4, 3);
    let b = DynamicMatrix::<f64>::new(3, 4);
    let c = DynamicMatrix::<f64>::new(5, 4);
    let mut d = DynamicMatrix::<f64>::from_fn(4, 4, |_, _| 1.0);
    assert!(gemm(1.0, &a, &b, 1.0, &c, &mut d).is_err());
    assert!(syrk_lower(1.0, &a, 1.0, &c, &mut d).is_err());
    assert!(ger(1.0, &[1.0; 4], &[1.0; 3], &a, &mut d).is_err());
    assert!(iamax::<f64>(&[]).is_err());
    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(d[(i, j)], 1.0);
        }
    }
}
