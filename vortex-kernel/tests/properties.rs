use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vortex_kernel::{cosine_similarity, euclidean_distance, normalize, Backend, Kernel, KernelError};

const DIMS: [usize; 9] = [1, 3, 4, 5, 16, 31, 128, 384, 1024];

fn available_kernels() -> Vec<Kernel> {
    Backend::ALL
        .into_iter()
        .filter_map(|backend| Kernel::new(backend).ok())
        .collect()
}

fn random_vec(rng: &mut StdRng, n: usize) -> Vec<f32> {
    (0..n).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
}

fn l2(v: &[f32]) -> f32 {
    v.iter().map(|&x| x as f64 * x as f64).sum::<f64>().sqrt() as f32
}

#[test]
fn distance_to_self_is_zero() {
    let mut rng = StdRng::seed_from_u64(1);
    for kernel in available_kernels() {
        for n in DIMS {
            let a = random_vec(&mut rng, n);
            let d = kernel.euclidean_distance(&a, &a, n).unwrap();
            assert_eq!(d, 0.0, "{:?} n = {}", kernel, n);
        }
    }
}

#[test]
fn similarity_to_self_is_one() {
    let mut rng = StdRng::seed_from_u64(2);
    for kernel in available_kernels() {
        for n in DIMS {
            let a = random_vec(&mut rng, n);
            let s = kernel.cosine_similarity(&a, &a, n).unwrap();
            assert!((s - 1.0).abs() < 1e-5, "{:?} n = {}: {}", kernel, n, s);
        }
    }
}

#[test]
fn similarity_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(3);
    for kernel in available_kernels() {
        for n in DIMS {
            let a = random_vec(&mut rng, n);
            let b = random_vec(&mut rng, n);
            let ab = kernel.cosine_similarity(&a, &b, n).unwrap();
            let ba = kernel.cosine_similarity(&b, &a, n).unwrap();
            assert_eq!(ab.to_bits(), ba.to_bits(), "{:?} n = {}", kernel, n);
            assert!(ab.abs() <= 1.0 + 1e-5, "{:?} n = {}: {}", kernel, n, ab);
        }
    }
}

#[test]
fn distance_satisfies_triangle_inequality() {
    let mut rng = StdRng::seed_from_u64(4);
    for kernel in available_kernels() {
        for _ in 0..50 {
            let n = rng.gen_range(1..=200);
            let a = random_vec(&mut rng, n);
            let b = random_vec(&mut rng, n);
            let c = random_vec(&mut rng, n);

            let ac = kernel.euclidean_distance(&a, &c, n).unwrap();
            let ab = kernel.euclidean_distance(&a, &b, n).unwrap();
            let bc = kernel.euclidean_distance(&b, &c, n).unwrap();
            assert!(ac <= ab + bc + 1e-4, "{:?}: {} > {} + {}", kernel, ac, ab, bc);
        }
    }
}

#[test]
fn normalize_gives_unit_norm_and_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(5);
    for kernel in available_kernels() {
        for n in DIMS {
            let mut v = random_vec(&mut rng, n);
            v[0] = 0.5; // never all zeros
            kernel.normalize(&mut v, n).unwrap();
            assert!((l2(&v) - 1.0).abs() < 1e-4, "{:?} n = {}: norm {}", kernel, n, l2(&v));

            let once = v.clone();
            kernel.normalize(&mut v, n).unwrap();
            for (x, y) in v.iter().zip(&once) {
                assert!((x - y).abs() < 1e-5, "{:?} n = {}: {} vs {}", kernel, n, x, y);
            }
        }
    }
}

#[test]
fn orthogonal_unit_vectors() {
    let a = [1.0f32, 0.0, 0.0, 0.0];
    let b = [0.0f32, 1.0, 0.0, 0.0];
    for kernel in available_kernels() {
        let d = kernel.euclidean_distance(&a, &b, 4).unwrap();
        assert!((d - 1.414_21).abs() < 1e-5, "{:?}: {}", kernel, d);
        assert_eq!(kernel.cosine_similarity(&a, &b, 4).unwrap(), 0.0);
    }
}

#[test]
fn normalize_three_four() {
    for kernel in available_kernels() {
        let mut v = [3.0f32, 4.0, 0.0, 0.0];
        kernel.normalize(&mut v, 4).unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6, "{:?}: {:?}", kernel, v);
        assert!((v[1] - 0.8).abs() < 1e-6, "{:?}: {:?}", kernel, v);
        assert_eq!(v[2], 0.0);
        assert_eq!(v[3], 0.0);
    }
}

#[test]
fn normalize_zero_vector_is_left_unchanged() {
    for kernel in available_kernels() {
        let mut v = [0.0f32; 4];
        kernel.normalize(&mut v, 4).unwrap();
        // Exactly zero: no NaN, no sign flip.
        assert!(v.iter().all(|x| x.to_bits() == 0), "{:?}: {:?}", kernel, v);

        let mut negative_zero = [-0.0f32; 7];
        kernel.normalize(&mut negative_zero, 7).unwrap();
        assert!(negative_zero.iter().all(|x| x.to_bits() == (-0.0f32).to_bits()));
    }
}

#[test]
fn similarity_with_zero_vector_is_nan() {
    let zero = [0.0f32; 12];
    let other: Vec<f32> = (1..=12).map(|i| i as f32).collect();
    for kernel in available_kernels() {
        assert!(kernel.cosine_similarity(&zero, &other, 12).unwrap().is_nan());
        assert!(kernel.cosine_similarity(&other, &zero, 12).unwrap().is_nan());
        assert!(kernel.cosine_similarity(&zero, &zero, 12).unwrap().is_nan());
    }
}

#[test]
fn reference_exact_backends_agree_bit_for_bit() {
    let mut rng = StdRng::seed_from_u64(6);
    let exact: Vec<Kernel> = available_kernels()
        .into_iter()
        .filter(|k| k.backend().is_reference_exact())
        .collect();

    for n in 0..=70 {
        let a = random_vec(&mut rng, n);
        let b = random_vec(&mut rng, n);
        let d = Kernel::PORTABLE.distance(&a, &b).to_bits();
        let s = Kernel::PORTABLE.similarity(&a, &b).to_bits();
        for kernel in &exact {
            assert_eq!(kernel.distance(&a, &b).to_bits(), d, "{:?} n = {}", kernel, n);
            assert_eq!(kernel.similarity(&a, &b).to_bits(), s, "{:?} n = {}", kernel, n);
        }
    }
}

#[test]
fn wide_and_serial_backends_stay_close_to_reference() {
    let mut rng = StdRng::seed_from_u64(7);
    for kernel in available_kernels() {
        for n in DIMS {
            let a = random_vec(&mut rng, n);
            let b = random_vec(&mut rng, n);
            let d = kernel.distance(&a, &b);
            let d_ref = Kernel::PORTABLE.distance(&a, &b);
            assert!((d - d_ref).abs() <= 1e-4 * d_ref.max(1.0), "{:?} n = {}", kernel, n);

            let s = kernel.similarity(&a, &b);
            let s_ref = Kernel::PORTABLE.similarity(&a, &b);
            assert!((s - s_ref).abs() < 1e-4, "{:?} n = {}", kernel, n);
        }
    }
}

#[test]
fn free_functions_use_detected_backend() {
    let a = [1.0f32, 2.0, 3.0, 4.0, 5.0];
    let b = [5.0f32, 4.0, 3.0, 2.0, 1.0];
    let kernel = Kernel::global();
    assert_eq!(kernel.backend(), Backend::detect());
    assert_eq!(euclidean_distance(&a, &b, 5).unwrap(), kernel.distance(&a, &b));
    assert_eq!(cosine_similarity(&a, &b, 5).unwrap(), kernel.similarity(&a, &b));

    let mut v = a;
    normalize(&mut v, 5).unwrap();
    let mut w = a;
    kernel.normalize_in_place(&mut w);
    assert_eq!(v, w);
}

#[test]
fn out_of_bounds_is_reported_not_read() {
    let a = [1.0f32; 3];
    let b = [1.0f32; 8];
    assert_eq!(
        euclidean_distance(&a, &b, 4),
        Err(KernelError::OutOfBounds {
            operand: "a",
            length: 4,
            available: 3
        })
    );
    assert!(cosine_similarity(&b, &a, 8).is_err());

    let mut v = [2.0f32; 2];
    assert!(normalize(&mut v, 3).is_err());
    assert_eq!(v, [2.0, 2.0]);
}
