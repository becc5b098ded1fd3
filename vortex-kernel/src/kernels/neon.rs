//! NEON kernels (aarch64, 128-bit Q registers).
//!
//! NEON is mandatory on aarch64. Accumulation is a separate `vmulq_f32` +
//! `vaddq_f32`, never fused, so results match the portable kernels bit for
//! bit.

use std::arch::aarch64::*;

use super::{finish_distance, finish_similarity, inverse_norm};

const WIDTH: usize = 4;

#[inline(always)]
unsafe fn hsum(v: float32x4_t) -> f32 {
    let mut lanes = [0.0f32; WIDTH];
    vst1q_f32(lanes.as_mut_ptr(), v);
    ((lanes[0] + lanes[1]) + lanes[2]) + lanes[3]
}

unsafe fn sum_sq(v: &[f32], body: usize) -> f32 {
    let mut acc = vdupq_n_f32(0.0);
    let mut i = 0;
    while i < body {
        let x = vld1q_f32(v.as_ptr().add(i));
        acc = vaddq_f32(acc, vmulq_f32(x, x));
        i += WIDTH;
    }
    hsum(acc)
}

pub(crate) fn distance(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let body = n - n % WIDTH;

    // SAFETY: every load reads [i, i + 4) with i + 4 <= body <= n.
    let mut sum = unsafe {
        let mut acc = vdupq_n_f32(0.0);
        let mut i = 0;
        while i < body {
            let va = vld1q_f32(a.as_ptr().add(i));
            let vb = vld1q_f32(b.as_ptr().add(i));
            let diff = vsubq_f32(va, vb);
            acc = vaddq_f32(acc, vmulq_f32(diff, diff));
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
        let mut dot = vdupq_n_f32(0.0);
        let mut norm_a = vdupq_n_f32(0.0);
        let mut norm_b = vdupq_n_f32(0.0);
        let mut i = 0;
        while i < body {
            let va = vld1q_f32(a.as_ptr().add(i));
            let vb = vld1q_f32(b.as_ptr().add(i));
            dot = vaddq_f32(dot, vmulq_f32(va, vb));
            norm_a = vaddq_f32(norm_a, vmulq_f32(va, va));
            norm_b = vaddq_f32(norm_b, vmulq_f32(vb, vb));
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
        let factor = vdupq_n_f32(scale);
        let ptr = v.as_mut_ptr();
        let mut i = 0;
        while i < body {
            let x = vld1q_f32(ptr.add(i));
            vst1q_f32(ptr.add(i), vmulq_f32(x, factor));
            i += WIDTH;
        }
    }
    for x in &mut v[body..] {
        *x *= scale;
    }
}
