//! The AVX2 Intrinsic Kernels.
//! Uses 256-bit YMM registers and Fused Multiply-Add (FMA).
//!
//! Native-width path: 8 lanes and fused accumulation, so results differ in
//! the last bits from the 4-lane reference grouping.

use std::arch::x86_64::*;

use super::{finish_distance, finish_similarity, inverse_norm};

const WIDTH: usize = 8;

/// Horizontal sum of 8 lanes to a single f32.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn hsum(v: __m256) -> f32 {
    let upper = _mm256_extractf128_ps(v, 1);
    let lower = _mm256_castps256_ps128(v);
    let sum128 = _mm_add_ps(upper, lower);
    let sum_h = _mm_hadd_ps(sum128, sum128);
    _mm_cvtss_f32(_mm_hadd_ps(sum_h, sum_h))
}

#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn sum_sq_diff(a: &[f32], b: &[f32], n: usize) -> f32 {
    let mut acc0 = _mm256_setzero_ps();
    let mut acc1 = _mm256_setzero_ps();

    let mut i = 0;
    // Two accumulators x 8 floats per step
    while i + 2 * WIDTH <= n {
        let d0 = _mm256_sub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i)),
            _mm256_loadu_ps(b.as_ptr().add(i)),
        );
        acc0 = _mm256_fmadd_ps(d0, d0, acc0);

        let d1 = _mm256_sub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i + WIDTH)),
            _mm256_loadu_ps(b.as_ptr().add(i + WIDTH)),
        );
        acc1 = _mm256_fmadd_ps(d1, d1, acc1);

        i += 2 * WIDTH;
    }

    while i + WIDTH <= n {
        let d = _mm256_sub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i)),
            _mm256_loadu_ps(b.as_ptr().add(i)),
        );
        acc0 = _mm256_fmadd_ps(d, d, acc0);
        i += WIDTH;
    }

    let mut result = hsum(_mm256_add_ps(acc0, acc1));

    // Tail (n % 8)
    while i < n {
        let diff = a[i] - b[i];
        result += diff * diff;
        i += 1;
    }
    result
}

#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn dot_and_norms(a: &[f32], b: &[f32], n: usize) -> (f32, f32, f32) {
    let mut dot = _mm256_setzero_ps();
    let mut norm_a = _mm256_setzero_ps();
    let mut norm_b = _mm256_setzero_ps();

    let mut i = 0;
    while i + WIDTH <= n {
        let va = _mm256_loadu_ps(a.as_ptr().add(i));
        let vb = _mm256_loadu_ps(b.as_ptr().add(i));
        dot = _mm256_fmadd_ps(va, vb, dot);
        norm_a = _mm256_fmadd_ps(va, va, norm_a);
        norm_b = _mm256_fmadd_ps(vb, vb, norm_b);
        i += WIDTH;
    }

    let mut dot = hsum(dot);
    let mut norm_a = hsum(norm_a);
    let mut norm_b = hsum(norm_b);
    while i < n {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
        i += 1;
    }
    (dot, norm_a, norm_b)
}

#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn sum_sq(v: &[f32]) -> f32 {
    let n = v.len();
    let mut acc = _mm256_setzero_ps();
    let mut i = 0;
    while i + WIDTH <= n {
        let x = _mm256_loadu_ps(v.as_ptr().add(i));
        acc = _mm256_fmadd_ps(x, x, acc);
        i += WIDTH;
    }
    let mut result = hsum(acc);
    for x in &v[i..] {
        result += x * x;
    }
    result
}

#[target_feature(enable = "avx2")]
unsafe fn scale_in_place(v: &mut [f32], scale: f32) {
    let n = v.len();
    let factor = _mm256_set1_ps(scale);
    let ptr = v.as_mut_ptr();
    let mut i = 0;
    while i + WIDTH <= n {
        let x = _mm256_loadu_ps(ptr.add(i));
        _mm256_storeu_ps(ptr.add(i), _mm256_mul_ps(x, factor));
        i += WIDTH;
    }
    for x in &mut v[i..] {
        *x *= scale;
    }
}

// The safe wrappers below are only installed into a `Kernel` after
// `Backend::Avx2.is_available()` confirmed AVX2 and FMA at runtime.

pub(crate) fn distance(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    // SAFETY: CPU support checked by the dispatcher; loads stay below n.
    finish_distance(unsafe { sum_sq_diff(a, b, n) })
}

pub(crate) fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    // SAFETY: CPU support checked by the dispatcher; loads stay below n.
    let (dot, norm_a, norm_b) = unsafe { dot_and_norms(a, b, n) };
    finish_similarity(dot, norm_a, norm_b)
}

pub(crate) fn normalize(v: &mut [f32]) {
    // SAFETY: CPU support checked by the dispatcher.
    let sum = unsafe { sum_sq(v) };
    if let Some(scale) = inverse_norm(sum) {
        // SAFETY: as above; loads and stores stay inside `v`.
        unsafe { scale_in_place(v, scale) }
    }
}
