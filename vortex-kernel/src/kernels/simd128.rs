//! WebAssembly `simd128` kernels.
//!
//! Only compiled when the target enables `simd128` at build time
//! (`RUSTFLAGS="-C target-feature=+simd128"`); wasm has no runtime feature
//! detection.

use std::arch::wasm32::*;

use super::{finish_distance, finish_similarity, inverse_norm};

const WIDTH: usize = 4;

#[inline(always)]
fn hsum(v: v128) -> f32 {
    ((f32x4_extract_lane::<0>(v) + f32x4_extract_lane::<1>(v)) + f32x4_extract_lane::<2>(v))
        + f32x4_extract_lane::<3>(v)
}

unsafe fn sum_sq(v: &[f32], body: usize) -> f32 {
    let mut acc = f32x4_splat(0.0);
    let mut i = 0;
    while i < body {
        let x = v128_load(v.as_ptr().add(i) as *const v128);
        acc = f32x4_add(acc, f32x4_mul(x, x));
        i += WIDTH;
    }
    hsum(acc)
}

pub(crate) fn distance(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let body = n - n % WIDTH;

    // SAFETY: every load reads [i, i + 4) with i + 4 <= body <= n; v128_load
    // tolerates unaligned addresses.
    let mut sum = unsafe {
        let mut acc = f32x4_splat(0.0);
        let mut i = 0;
        while i < body {
            let va = v128_load(a.as_ptr().add(i) as *const v128);
            let vb = v128_load(b.as_ptr().add(i) as *const v128);
            let diff = f32x4_sub(va, vb);
            acc = f32x4_add(acc, f32x4_mul(diff, diff));
            i += WIDTH;
        }
        hsum(acc)
    };

    for i in body..n {
        let diff = a[i] - b[i];
        sum += diff * diff;
    }
    finish_distance(sum)
}

pub(crate) fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let body = n - n % WIDTH;

    // SAFETY: every load reads [i, i + 4) with i + 4 <= body <= n.
    let (mut dot, mut norm_a, mut norm_b) = unsafe {
        let mut dot = f32x4_splat(0.0);
        let mut norm_a = f32x4_splat(0.0);
        let mut norm_b = f32x4_splat(0.0);
        let mut i = 0;
        while i < body {
            let va = v128_load(a.as_ptr().add(i) as *const v128);
            let vb = v128_load(b.as_ptr().add(i) as *const v128);
            dot = f32x4_add(dot, f32x4_mul(va, vb));
            norm_a = f32x4_add(norm_a, f32x4_mul(va, va));
            norm_b = f32x4_add(norm_b, f32x4_mul(vb, vb));
            i += WIDTH;
        }
        (hsum(dot), hsum(norm_a), hsum(norm_b))
    };

    for i in body..n {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    finish_similarity(dot, norm_a, norm_b)
}

pub(crate) fn normalize(v: &mut [f32]) {
    let n = v.len();
    let body = n - n % WIDTH;

    // SAFETY: loads stay inside [0, body).
    let mut sum = unsafe { sum_sq(v, body) };
    for x in &v[body..] {
        sum += x * x;
    }

    let Some(scale) = inverse_norm(sum) else {
        return;
    };

    // SAFETY: loads and stores stay inside [0, body); `v` is borrowed mutably.
    unsafe {
        let factor = f32x4_splat(scale);
        let ptr = v.as_mut_ptr();
        let mut i = 0;
        while i < body {
            let lane_ptr = ptr.add(i) as *mut v128;
            v128_store(lane_ptr, f32x4_mul(v128_load(lane_ptr), factor));
            i += WIDTH;
        }
    }
    for x in &mut v[body..] {
        *x *= scale;
    }
}
