//! SSE kernels (x86_64, 128-bit XMM registers).
//!
//! SSE2 is part of the x86_64 baseline, so no runtime detection is needed.
//! Plain mul + add, no FMA: results match the portable kernels bit for bit.

use std::arch::x86_64::*;

use super::{finish_distance, finish_similarity, inverse_norm};

const WIDTH: usize = 4;

/// Left-to-right horizontal sum, same order as `F32x4::horizontal_sum`.
#[inline(always)]
unsafe fn hsum(v: __m128) -> f32 {
    let mut lanes = [0.0f32; WIDTH];
    _mm_storeu_ps(lanes.as_mut_ptr(), v);
    ((lanes[0] + lanes[1]) + lanes[2]) + lanes[3]
}

unsafe fn sum_sq(v: &[f32], body: usize) -> f32 {
    let mut acc = _mm_setzero_ps();
    let mut i = 0;
    while i < body {
        let x = _mm_loadu_ps(v.as_ptr().add(i));
        acc = _mm_add_ps(acc, _mm_mul_ps(x, x));
        i += WIDTH;
    }
    hsum(acc)
}

pub(crate) fn distance(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let body = n - n % WIDTH;

    // SAFETY: every load reads [i, i + 4) with i + 4 <= body <= n.
    let mut sum = unsafe {
        let mut acc = _mm_setzero_ps();
        let mut i = 0;
        while i < body {
            let va = _mm_loadu_ps(a.as_ptr().add(i));
            let vb = _mm_loadu_ps(b.as_ptr().add(i));
            let diff = _mm_sub_ps(va, vb);
            acc = _mm_add_ps(acc, _mm_mul_ps(diff, diff));
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
        let mut dot = _mm_setzero_ps();
        let mut norm_a = _mm_setzero_ps();
        let mut norm_b = _mm_setzero_ps();
        let mut i = 0;
        while i < body {
            let va = _mm_loadu_ps(a.as_ptr().add(i));
            let vb = _mm_loadu_ps(b.as_ptr().add(i));
            dot = _mm_add_ps(dot, _mm_mul_ps(va, vb));
            norm_a = _mm_add_ps(norm_a, _mm_mul_ps(va, va));
            norm_b = _mm_add_ps(norm_b, _mm_mul_ps(vb, vb));
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
        let factor = _mm_set1_ps(scale);
        let ptr = v.as_mut_ptr();
        let mut i = 0;
        while i < body {
            let x = _mm_loadu_ps(ptr.add(i));
            _mm_storeu_ps(ptr.add(i), _mm_mul_ps(x, factor));
            i += WIDTH;
        }
    }
    for x in &mut v[body..] {
        *x *= scale;
    }
}
